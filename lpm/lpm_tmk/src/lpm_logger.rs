// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Logger implementation for the migration test.
//! Every record is written to the console as one JSON line, stamped with
//! the timebase so the trace can be lined up against the host's view of
//! the migration.

use alloc::borrow::ToOwned;
use alloc::fmt::format;
use alloc::string::String;
use alloc::string::ToString;
use core::fmt::Write;

use log::LevelFilter;
use log::SetLoggerError;
use serde::Serialize;
use spin::Mutex;
use spin::MutexGuard;

/// Records above this level are dropped. Without the `diag` feature nothing
/// is logged at all.
pub const MAX_LEVEL: LevelFilter = if cfg!(feature = "diag") {
    LevelFilter::Debug
} else {
    LevelFilter::Off
};

#[derive(Serialize)]
struct LogEntry {
    #[serde(rename = "type")]
    log_type: &'static str,
    level: String,
    message: String,
    line: String,
    tb: u64,
}

impl LogEntry {
    fn new(level: log::Level, message: &str, line: &str, tb: u64) -> Self {
        LogEntry {
            log_type: "log",
            level: level.as_str().to_string(),
            message: message.to_owned(),
            line: line.to_owned(),
            tb,
        }
    }
}

/// Formats a log message into a JSON string.
pub(crate) fn format_log_string_to_json(
    message: &str,
    line: &str,
    terminate_new_line: bool,
    level: log::Level,
    tb: u64,
) -> String {
    let log_entry = LogEntry::new(level, message, line, tb);
    let mut out = serde_json::to_string(&log_entry).unwrap_or_default();
    if terminate_new_line {
        out.push('\n');
    }
    out
}

/// A logger that writes log messages to a provided writer, such as the
/// firmware console.
pub struct LpmLogger<T> {
    writer: T,
    timebase: fn() -> u64,
}

impl<T> LpmLogger<Mutex<T>>
where
    T: Write + Send,
{
    /// Creates a new `LpmLogger` writing to `provider` and stamping records
    /// with `timebase`.
    pub const fn new(provider: T, timebase: fn() -> u64) -> Self {
        LpmLogger {
            writer: Mutex::new(provider),
            timebase,
        }
    }

    /// Returns a lock guard to the underlying writer.
    /// This allows direct access to the writer for custom logging operations.
    pub fn get_writer(&self) -> MutexGuard<'_, T> {
        self.writer.lock()
    }
}

impl<T> log::Log for LpmLogger<Mutex<T>>
where
    T: Write + Send,
{
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= MAX_LEVEL
    }

    fn log(&self, record: &log::Record<'_>) {
        let str = format(*record.args());
        let line = format!(
            "{}:{}",
            record.file().unwrap_or_default(),
            record.line().unwrap_or_default()
        );
        let str =
            format_log_string_to_json(&str, &line, true, record.level(), (self.timebase)());
        _ = self.writer.lock().write_str(str.as_str());
    }

    fn flush(&self) {}
}

/// Installs `logger` as the global logger.
pub fn init(logger: &'static dyn log::Log) -> Result<(), SetLoggerError> {
    log::set_logger(logger).map(|()| log::set_max_level(MAX_LEVEL))
}

/// Writes preformatted text straight to the console, bypassing the level
/// filter.
pub fn write_raw(s: &str) {
    #[cfg(all(not(test), target_os = "none"))]
    {
        _ = crate::runtime::LOGGER.get_writer().write_str(s);
    }
    #[cfg(any(test, not(target_os = "none")))]
    {
        std::eprint!("{s}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    fn timebase() -> u64 {
        0xabc
    }

    #[test]
    fn records_are_json_lines() {
        let logger = LpmLogger::new(String::new(), timebase);
        logger.log(
            &log::Record::builder()
                .args(format_args!("DECR 0x{:016x}", 0x16))
                .level(log::Level::Debug)
                .file(Some("src/compare.rs"))
                .line(Some(42))
                .build(),
        );

        let out = logger.get_writer().clone();
        assert!(out.ends_with('\n'));
        assert_eq!(out.lines().count(), 1);

        let entry: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(entry["type"], "log");
        assert_eq!(entry["level"], "DEBUG");
        assert_eq!(entry["message"], "DECR 0x0000000000000016");
        assert_eq!(entry["line"], "src/compare.rs:42");
        assert_eq!(entry["tb"], 0xabc);
    }

    #[test]
    fn level_filter_follows_diag_feature() {
        let logger = LpmLogger::new(String::new(), timebase);
        let metadata = log::Metadata::builder().level(log::Level::Debug).build();
        assert_eq!(logger.enabled(&metadata), cfg!(feature = "diag"));
        let metadata = log::Metadata::builder().level(log::Level::Trace).build();
        assert!(!logger.enabled(&metadata));
    }
}
