use crate::traits::LogSink;
use crate::utils::logger::ACTIVITY_TARGET;
use chrono::Local;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.timestamp, self.message)
    }
}

/// Append-only activity log shared between the workflows and the menu.
///
/// Every line is also emitted on the `activity` tracing target so the console
/// and the rolling log file see it as it happens.
#[derive(Debug, Clone, Default)]
pub struct LogBook {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl LogBook {
    pub const CLEARED: &'static str = "Transaction logs cleared.";

    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogLine>> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|l| l.message.clone()).collect()
    }

    /// Number of lines whose message contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lock()
            .iter()
            .filter(|l| l.message.contains(needle))
            .count()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl LogSink for LogBook {
    fn append(&self, message: &str) {
        let line = LogLine {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            message: message.to_string(),
        };
        info!(target: ACTIVITY_TARGET, "{}", line);
        self.lock().push(line);
    }

    fn clear(&self) {
        self.lock().clear();
        self.append(Self::CLEARED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let book = LogBook::new();
        book.append("first");
        book.append("second");
        assert_eq!(book.messages(), vec!["first", "second"]);
        assert_eq!(book.lines()[0].timestamp.len(), 8);
    }

    #[test]
    fn test_clear_leaves_confirmation_only() {
        let book = LogBook::new();
        book.append("a");
        book.append("b");
        book.clear();
        assert_eq!(book.messages(), vec![LogBook::CLEARED]);
    }

    #[test]
    fn test_clones_share_lines() {
        let book = LogBook::new();
        let other = book.clone();
        other.append("shared");
        assert_eq!(book.count_containing("shared"), 1);
    }
}
