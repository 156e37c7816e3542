//! Core types and configuration for the market-unify system.
//!
//! This crate provides shared types used across all other crates:
//! - Raw quote and unified product records
//! - Engine configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
