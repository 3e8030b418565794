//! Minimal `log` backend for the command line tool.

use chrono::{DateTime, Utc};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        StderrLogger { level }
    }

    fn format(&self, now: DateTime<Utc>, record: &Record) -> String {
        format!("[{}] {} - {}", now.to_rfc3339(), record.level(), record.args())
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            // stdout is reserved for the report itself.
            eprintln!("{}", self.format(Utc::now(), record));
        }
    }

    fn flush(&self) {}
}

/// Install the logger once for the process.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}
