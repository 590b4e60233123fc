//! Logging configuration

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::MockError;

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter directive, overridden by `RUST_LOG` when set
    pub log_level: String,

    /// Emit JSON lines instead of human-readable records
    pub json_format: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Initialize logging
pub fn init_logging(options: LogOptions) -> Result<(), MockError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.log_level))
        .map_err(|e| MockError::ServerError(format!("invalid log filter: {}", e)))?;

    let subscriber = tracing_subscriber::registry().with(filter);

    if options.json_format {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| MockError::ServerError(e.to_string()))?;
    } else {
        subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| MockError::ServerError(e.to_string()))?;
    }

    Ok(())
}
