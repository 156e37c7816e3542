//! Price coercion.
//!
//! Turns a [`RawPrice`] into a probability in [0, 1]. Failures are data
//! quality problems, reported as a [`PriceRejection`] so the caller can drop
//! the quote and count it.

use thiserror::Error;
use unify_core::RawPrice;

/// Why a raw price could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceRejection {
    /// No price was supplied.
    #[error("price is missing")]
    Missing,
    /// Text that does not parse as a number.
    #[error("price {0:?} is not numeric")]
    NotNumeric(String),
    /// JSON value of the wrong type.
    #[error("price has unsupported type: {0}")]
    UnsupportedType(String),
    /// NaN or infinite.
    #[error("price is not finite")]
    NonFinite,
    /// Finite but outside [0, 1].
    #[error("price {0} is outside [0, 1]")]
    OutOfRange(f64),
}

/// Coerce a raw price to a finite probability in [0, 1].
pub fn coerce_price(raw: &RawPrice) -> Result<f64, PriceRejection> {
    let value = match raw {
        RawPrice::Number(v) => *v,
        RawPrice::Text(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<f64>()
                .map_err(|_| PriceRejection::NotNumeric(trimmed.to_string()))?
        }
        RawPrice::Missing => return Err(PriceRejection::Missing),
        RawPrice::Other(value) => return Err(PriceRejection::UnsupportedType(value.to_string())),
    };

    if !value.is_finite() {
        return Err(PriceRejection::NonFinite);
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(PriceRejection::OutOfRange(value));
    }
    Ok(value)
}
