//! Logging setup.

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level; `RUST_LOG` directives still apply on top.
    pub level: Level,
    /// Whether to include source code locations.
    pub source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            source_location: false,
        }
    }
}

/// Initialize the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn setup_logging(config: LogConfig) -> Result<(), String> {
    let mut result = Ok(());

    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env().add_directive(config.level.into());
        result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(config.source_location)
            .with_line_number(config.source_location)
            .try_init()
            .map_err(|error| format!("Failed to set global subscriber: {error}"));
    });

    result
}
