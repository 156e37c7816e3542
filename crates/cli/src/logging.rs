//! Logging initialization.

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogArgs;

impl LogArgs {
    /// Install the global tracing subscriber. `RUST_LOG` wins over `--log-level`.
    ///
    /// Logs go to stderr so stdout stays clean for JSON output.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        if self.json_logs {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        } else {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
