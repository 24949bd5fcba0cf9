//! Diagnostic logging setup.
//!
//! User-facing output goes through `colored` on stdout; internal diagnostics
//! (skipped settings, detection results) go through `log` to stderr. The
//! `-v` count picks the level, and `RUST_LOG` overrides it.

use log::LevelFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl From<u8> for LogLevel {
    fn from(verbose: u8) -> Self {
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Install the global logger. Safe to call more than once.
pub fn init(verbose: u8) {
    let level: LevelFilter = LogLevel::from(verbose).into();
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}
