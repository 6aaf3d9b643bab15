//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Logs go to stderr so that step output on stdout stays machine readable.
//! `RUST_LOG` wins over the `-v`/`-q` flags unless a flag was given.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    pub use_env_filter: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: false,
        }
    }
}

/// Installs the global subscriber. Must be called once, before any step runs.
pub fn init_logging(config: &LogConfig) {
    let filter = if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(config.level_filter))
    } else {
        build_filter(config.level_filter)
    };
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.with_ansi)
        .with_target(false)
        .without_time();
    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn build_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::new(filter_directives(level))
}

// External crates stay at warn.
fn filter_directives(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    format!(
        "warn,simplex_steps={level},simplex_tableau={level},big_m_fraction={level}",
        level = level
    )
}

#[cfg(test)]
mod tests {
    use super::filter_directives;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_filter_directives() {
        assert_eq!(
            filter_directives(LevelFilter::DEBUG),
            "warn,simplex_steps=debug,simplex_tableau=debug,big_m_fraction=debug"
        );
        assert!(filter_directives(LevelFilter::OFF).contains("simplex_tableau=off"));
    }
}
