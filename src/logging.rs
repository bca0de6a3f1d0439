//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs for log aggregation
//! - Development: Colorful, human-readable logs

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

/// Environment variable selecting the log format
pub const ENVIRONMENT_VAR: &str = "OUTLOOK_ENV";

/// Whether `environment` names a production deployment
pub fn is_production(environment: &str) -> bool {
    matches!(environment.to_ascii_lowercase().as_str(), "production" | "prod")
}

/// Install the global subscriber
///
/// The filter comes from `RUST_LOG` and defaults to `info`. JSON output is
/// used when `OUTLOOK_ENV` is `production` or `prod`. Fails if a global
/// subscriber is already installed.
pub fn init_logging() -> Result<(), TryInitError> {
    let environment = std::env::var(ENVIRONMENT_VAR).unwrap_or_default();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if is_production(&environment) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_production() {
        assert!(is_production("production"));
        assert!(is_production("PROD"));
        assert!(!is_production("sandbox"));
        assert!(!is_production(""));
    }

    #[test]
    fn test_second_init_fails_cleanly() {
        let _ = init_logging();
        assert!(init_logging().is_err());
    }
}
