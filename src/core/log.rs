use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Log level for the `rateio` target when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// `--verbose` raises the configured level to at least debug.
pub fn effective_level(verbose: bool, configured: LogLevel) -> LevelFilter {
    let configured = LevelFilter::from(configured);
    if verbose {
        configured.max(LevelFilter::DEBUG)
    } else {
        configured
    }
}

pub fn init_logging(verbose: bool, configured: LogLevel) {
    let level = effective_level(verbose, configured);
    let app_filter = Targets::new()
        .with_target("rateio", level)
        .with_default(LevelFilter::WARN);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_raises_quiet_levels_only() {
        assert_eq!(effective_level(false, LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(effective_level(true, LogLevel::Warn), LevelFilter::DEBUG);
        assert_eq!(effective_level(true, LogLevel::Error), LevelFilter::DEBUG);
        assert_eq!(effective_level(true, LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(effective_level(false, LogLevel::Info), LevelFilter::INFO);
    }

    #[test]
    fn test_log_level_names() {
        let level: LogLevel = serde_yaml::from_str("debug").unwrap();
        assert_eq!(level, LogLevel::Debug);
        assert!(serde_yaml::from_str::<LogLevel>("loud").is_err());
    }
}
