use crate::config::Config;
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// HTTP plumbing underneath the token exchange and the router. Chatty at
/// Debug, so it is silenced unless the level is Trace.
const NOISY_TARGETS: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "rustls",
    "tower",
    "tower_http",
    "axum",
];

pub struct Logger {}

impl Logger {
    /// Install the terminal logger at `config.log_level_filter`.
    ///
    /// Errors if a global logger is already set.
    pub fn init_logger(config: &Config) -> Result<(), log::SetLoggerError> {
        let level = config.log_level_filter;
        TermLogger::init(
            level,
            Self::log_config(level),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )
    }

    fn silenced_targets(level: LevelFilter) -> &'static [&'static str] {
        match level {
            LevelFilter::Trace => &[],
            _ => NOISY_TARGETS,
        }
    }

    // Source locations only help once we are debugging.
    fn location_level(level: LevelFilter) -> LevelFilter {
        if level >= LevelFilter::Debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Off
        }
    }

    fn log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_location_level(Self::location_level(level));
        for target in Self::silenced_targets(level) {
            builder.add_filter_ignore_str(target);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_shows_dependency_logs() {
        assert!(Logger::silenced_targets(LevelFilter::Trace).is_empty());
    }

    #[test]
    fn test_below_trace_silences_http_stack() {
        for level in [LevelFilter::Error, LevelFilter::Info, LevelFilter::Debug] {
            let silenced = Logger::silenced_targets(level);
            for target in ["hyper", "reqwest", "rustls", "axum"] {
                assert!(silenced.contains(&target), "{target} loud at {level}");
            }
        }
    }

    #[test]
    fn test_locations_only_printed_when_debugging() {
        assert_eq!(Logger::location_level(LevelFilter::Info), LevelFilter::Off);
        assert_eq!(Logger::location_level(LevelFilter::Debug), LevelFilter::Debug);
        assert_eq!(Logger::location_level(LevelFilter::Trace), LevelFilter::Debug);
    }

    #[test]
    fn test_log_config_builds_for_each_level() {
        for level in [LevelFilter::Warn, LevelFilter::Debug, LevelFilter::Trace] {
            let _config = Logger::log_config(level);
        }
    }
}
