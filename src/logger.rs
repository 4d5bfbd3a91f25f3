use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Config, Log, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

fn add_console_sinks(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    let stdout = Arc::new(StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(Level::Warn))
        .build()?);

    let stderr = Arc::new(StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?);

    builder.sink(stdout).sink(stderr);

    Ok(())
}

/// Where the server log goes: `[log].location`, unset until the binary
/// fills in its default.
fn log_file(config: &Config) -> Option<(&Log, &Path)> {
    let log = config.log.as_ref()?;
    let location = log.location.as_deref()?;
    Some((log, location))
}

/// Replaces the default console logger with a daily rotating file logger
/// when `[log]` names a location. Otherwise spdlog's console logger stays.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    let Some((log, location)) = log_file(config) else {
        return Ok(());
    };

    let daily_sink = Arc::new(RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(60)
        .rotate_on_open(false)
        .build()?);

    let mut builder = Logger::builder();

    builder.sink(daily_sink);
    if log.log_to_console {
        add_console_sinks(&mut builder)?;
    }

    let daily_logger = Arc::new(builder.build()?);
    daily_logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    daily_logger.set_flush_period(Some(Duration::from_secs(2)));
    daily_logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));

    spdlog::set_default_logger(daily_logger);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::parse_config;

    use super::*;

    const CONFIG: &str = r##"
[site]
title = "spacetraveling"

[paths]
template_dir = "res/template"
public_dir = "res/public"

[content_api]
kind = "fixture"
fixture = "fixtures/posts.json"

[defaults]
page_size = 2

[server]
address = "127.0.0.1"
port = 8001
"##;

    #[test]
    fn test_console_only_without_location() {
        let config = parse_config(CONFIG).unwrap();
        assert!(log_file(&config).is_none());
        assert!(configure_logger(&config).is_ok());

        let config = parse_config(&format!("{}\n[log]\nlevel = \"Debug\"\nlog_to_console = true\n", CONFIG)).unwrap();
        assert!(log_file(&config).is_none());
        assert!(configure_logger(&config).is_ok());
    }

    #[test]
    fn test_log_file_location() {
        let config = parse_config(&format!(
            "{}\n[log]\nlevel = \"Warn\"\nlog_to_console = false\nlocation = \"/var/log/spacetraveling/server.log\"\n", CONFIG)).unwrap();
        let (log, location) = log_file(&config).unwrap();
        assert_eq!(location, Path::new("/var/log/spacetraveling/server.log"));
        assert_eq!(Level::from(log.level), Level::Warn);
    }
}
