//! Conversion log.
//!
//! Every message is printed to stderr and broadcast to subscribers.
//! `sheetgen convert --log <file>` subscribes before converting and saves
//! the session as JSON lines, one [`LogEntry`] per line.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// Entries a subscriber may fall behind by before older ones are dropped
const LOG_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn marker(self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting under the previous top-level message
    #[serde(default)]
    pub indent: u8,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            at: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = "   ".repeat(self.indent as usize);
        write!(f, "{}{} {}", indent, self.level.marker(), self.message)
    }
}

pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        eprintln!("{}", entry);
        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Take everything queued on `receiver` without waiting.
///
/// Entries lost because the subscriber fell behind show up as a single
/// warning in their place.
pub fn drain(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(missed)) => entries.push(LogEntry::new(
                LogLevel::Warning,
                format!("{} log entries dropped", missed),
            )),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
    entries
}

/// Write entries as JSON lines.
pub fn write_json_lines<W: Write>(mut writer: W, entries: &[LogEntry]) -> io::Result<()> {
    for entry in entries {
        serde_json::to_writer(&mut writer, entry)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_collects_in_order() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Info, "Reading Items.xlsx"));
        broadcaster.log(LogEntry::new(LogLevel::Warning, "Invalid data type: date").with_indent(1));

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[1].indent, 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_drain_reports_dropped_entries() {
        let broadcaster = LogBroadcaster::with_capacity(2);
        let mut rx = broadcaster.subscribe();
        for i in 0..4 {
            broadcaster.log(LogEntry::new(LogLevel::Info, format!("column {}", i)));
        }

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "2 log entries dropped");
        assert_eq!(entries[2].message, "column 3");
    }

    #[test]
    fn test_log_without_subscribers() {
        let broadcaster = LogBroadcaster::new();
        broadcaster.log(LogEntry::new(LogLevel::Info, "nobody listening"));
    }

    #[test]
    fn test_display_indents_nested_entries() {
        let entry = LogEntry::new(LogLevel::Success, "Read 4 rows").with_indent(1);
        assert_eq!(entry.to_string(), "      ✓ Read 4 rows");
    }

    #[test]
    fn test_json_lines() {
        let entries = vec![
            LogEntry::new(LogLevel::Success, "done"),
            LogEntry::new(LogLevel::Error, "Conversion failed").with_indent(2),
        ];
        let mut out = Vec::new();
        write_json_lines(&mut out, &entries).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["level"], "success");
        assert!(first["at"].is_string());
        let second: LogEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.level, LogLevel::Error);
        assert_eq!(second.indent, 2);
    }
}
