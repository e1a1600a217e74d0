use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::rename::{LogEntry, RenameResult, RenameStatus};

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Rename error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),
}

/// A directory below a scan root could not be read. Aborts the whole scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Scan root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

impl ScanError {
    pub fn unreadable(path: &Path, source: io::Error) -> Self {
        ScanError::Unreadable {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Content sniffing failures. Never surfaced past the proposal engine.
#[derive(Error, Debug)]
pub enum HintError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed content: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum TransactionError {
    /// Rejected before any file was touched.
    #[error(
        "Name collision detected: {} -> {}{}",
        .original.display(),
        .target.display(),
        describe_claimant(.claimed_by)
    )]
    Collision {
        original: PathBuf,
        target: PathBuf,
        claimed_by: Option<PathBuf>,
    },

    /// A move failed and every earlier move was reverted.
    #[error("Move failed for {}: {source}", .original.display())]
    MoveFailure {
        original: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
        results: Vec<RenameResult>,
    },

    /// Reverting an earlier move failed. The filesystem is left partially renamed.
    #[error(
        "Rollback failed restoring {} from {}: {source}; {} move(s) left unreverted \
         (triggered by move failure on {}: {trigger})",
        .failed.original.display(),
        .failed.target.display(),
        .unreverted.len() + 1,
        .trigger_path.display()
    )]
    RollbackFailure {
        trigger_path: PathBuf,
        trigger: io::Error,
        failed: LogEntry,
        #[source]
        source: io::Error,
        unreverted: Vec<LogEntry>,
        results: Vec<RenameResult>,
    },
}

impl TransactionError {
    /// Per-proposal outcomes for the proposals that were attempted.
    pub fn results(&self) -> &[RenameResult] {
        match self {
            TransactionError::Collision { .. } => &[],
            TransactionError::MoveFailure { results, .. }
            | TransactionError::RollbackFailure { results, .. } => results,
        }
    }

    pub fn is_rollback_failure(&self) -> bool {
        matches!(self, TransactionError::RollbackFailure { .. })
    }

    /// What the failed batch left on disk, in words.
    pub fn outcome(&self) -> String {
        match self {
            TransactionError::Collision { .. } => {
                "batch rejected before any move, nothing was renamed".to_string()
            }
            TransactionError::MoveFailure { .. } => {
                "all moves were rolled back, nothing was renamed".to_string()
            }
            TransactionError::RollbackFailure { results, .. } => {
                let stranded = results
                    .iter()
                    .filter(|r| r.status == RenameStatus::Stranded)
                    .count();
                format!("rollback incomplete, {} entries left at their new names", stranded)
            }
        }
    }
}

fn describe_claimant(claimed_by: &Option<PathBuf>) -> String {
    match claimed_by {
        Some(earlier) => format!(" (already claimed by {})", earlier.display()),
        None => " (target already exists)".to_string(),
    }
}
