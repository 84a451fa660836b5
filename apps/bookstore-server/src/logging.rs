use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Console logging with an env-filter directive from config; `RUST_LOG`
/// takes precedence when set.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
