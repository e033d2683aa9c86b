use std::fmt;

/// Per-run step counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub success: u64,
    pub failed: u64,
}

impl RunStats {
    pub fn total(&self) -> u64 {
        self.success + self.failed
    }
}

/// How a workflow invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run of the same kind (or a blocking one) was active; nothing happened.
    Rejected,
    Completed(RunStats),
    Cancelled(RunStats),
    /// Stopped early by a fatal error or a missing precondition.
    Aborted(RunStats),
}

impl RunOutcome {
    pub fn stats(&self) -> RunStats {
        match self {
            RunOutcome::Rejected => RunStats::default(),
            RunOutcome::Completed(s) | RunOutcome::Cancelled(s) | RunOutcome::Aborted(s) => *s,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Rejected => write!(f, "rejected"),
            RunOutcome::Completed(s) => write!(f, "completed ({} ok, {} failed)", s.success, s.failed),
            RunOutcome::Cancelled(s) => write!(f, "cancelled ({} ok, {} failed)", s.success, s.failed),
            RunOutcome::Aborted(s) => write!(f, "aborted ({} ok, {} failed)", s.success, s.failed),
        }
    }
}

/// Destination for human-readable activity lines.
pub trait LogSink: Send + Sync {
    /// Timestamps and stores one line.
    fn append(&self, message: &str);

    /// Drops every stored line, then appends a confirmation line.
    fn clear(&self);
}
