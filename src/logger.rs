//! Console and file logging through `spdlog`.
//!
//! Messages below `warn` go to stdout, `warn` and above to stderr, so a build
//! piped into a file still surfaces problems on the terminal. When `[log] file`
//! is set, a daily rotating file sink receives everything as well.

use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{LogConfig, LogLevel};

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
    let stdout = Arc::new(
        StdStreamSink::builder()
            .std_stream(StdStream::Stdout)
            .level_filter(LevelFilter::MoreVerbose(Level::Warn))
            .build()?,
    );

    let stderr = Arc::new(
        StdStreamSink::builder()
            .std_stream(StdStream::Stderr)
            .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
            .build()?,
    );

    builder.sink(stdout).sink(stderr);
    Ok(())
}

/// Install the default logger for the run.
pub fn configure(log: &LogConfig) -> spdlog::Result<()> {
    let mut builder = Logger::builder();
    add_console_sinks(&mut builder)?;

    if let Some(path) = &log.file {
        let daily_sink = Arc::new(
            RotatingFileSink::builder()
                .base_path(path)
                .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
                .max_files(30)
                .rotate_on_open(false)
                .build()?,
        );
        builder.sink(daily_sink);
    }

    let logger = Arc::new(builder.build()?);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));
    if log.file.is_some() {
        logger.set_flush_period(Some(Duration::from_secs(2)));
    }

    spdlog::set_default_logger(logger);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_map_onto_spdlog() {
        assert_eq!(Level::from(LogLevel::Critical), Level::Critical);
        assert_eq!(Level::from(LogLevel::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevel::Trace), Level::Trace);
    }

    #[test]
    fn configure_console_only() {
        let log = LogConfig::default();
        assert!(configure(&log).is_ok());
    }
}
