use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::fs::FileSystem;

/// One completed move: the entry now lives at `target` and came from `original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub target: PathBuf,
    pub original: PathBuf,
}

#[derive(Error, Debug)]
#[error("Could not move {} back to {}: {source}", .failed.target.display(), .failed.original.display())]
pub struct RollbackError {
    pub failed: LogEntry,
    #[source]
    pub source: io::Error,
    /// Entries never attempted because the rollback stopped, oldest first.
    pub unreverted: Vec<LogEntry>,
}

/// Moves completed so far in one `execute` call. Append-only while the batch
/// is in flight; emptied by either `commit` or `rollback`.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: Vec<LogEntry>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, target: PathBuf, original: PathBuf) {
        self.entries.push(LogEntry { target, original });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets the recorded moves once the whole batch succeeded.
    pub fn commit(&mut self) {
        self.entries.clear();
    }

    /// Undoes recorded moves newest first. Stops at the first move that
    /// cannot be undone; the log is empty afterwards either way.
    pub fn rollback(&mut self, fs: &dyn FileSystem) -> Result<usize, RollbackError> {
        let mut reverted = 0;
        while let Some(entry) = self.entries.pop() {
            if let Err(source) = fs.rename(&entry.target, &entry.original) {
                return Err(RollbackError {
                    failed: entry,
                    source,
                    unreverted: std::mem::take(&mut self.entries),
                });
            }
            reverted += 1;
        }
        Ok(reverted)
    }
}
