use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::planner::ValidationPlanner;
use super::transaction::TransactionLog;
use crate::error::TransactionError;
use crate::fs::FileSystem;
use crate::model::RenameProposal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RenameStatus {
    /// The entry now lives at its target path.
    Renamed,
    /// The entry was moved, then restored to its original path.
    RolledBack,
    /// Moving the entry failed; it was never moved.
    Failed,
    /// The entry was moved and could not be restored.
    Stranded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameResult {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub status: RenameStatus,
}

impl RenameResult {
    pub fn succeeded(&self) -> bool {
        self.status == RenameStatus::Renamed
    }
}

/// Applies a batch of renames as one unit.
///
/// Phase 1 rejects the whole batch on any collision before anything moves.
/// Phase 2 moves entries in order and, on the first failure, moves every
/// already-renamed entry back, newest first. Write permission is not checked
/// up front; a denied move is handled like any other move failure.
///
/// The executor does no locking and expects exclusive access to the affected
/// directories for the duration of a call.
pub struct RenameExecutor<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> RenameExecutor<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    pub fn execute(
        &self,
        proposals: &[RenameProposal],
    ) -> Result<Vec<RenameResult>, TransactionError> {
        let mut planner = ValidationPlanner::new(self.fs);
        let targets = proposals
            .iter()
            .map(|proposal| planner.reserve(proposal))
            .collect::<Result<Vec<PathBuf>, _>>()
            .map_err(|e| {
                warn!("Batch rejected before any move: {}", e);
                e
            })?;

        let mut log = TransactionLog::new();
        for (index, (proposal, target)) in proposals.iter().zip(&targets).enumerate() {
            let original = proposal.original_path();
            if let Err(source) = self.fs.rename(original, target) {
                warn!(
                    "Moving {} to {} failed: {}; rolling back {} move(s)",
                    original.display(),
                    target.display(),
                    source,
                    log.len()
                );
                return Err(self.abort(&mut log, proposals, &targets, index, source));
            }
            log.record(target.clone(), original.to_path_buf());
            debug!("Renamed {} -> {}", original.display(), target.display());
        }
        log.commit();

        info!("Renamed {} entries", proposals.len());
        Ok(proposals
            .iter()
            .zip(targets)
            .map(|(proposal, target_path)| RenameResult {
                original_path: proposal.original_path().to_path_buf(),
                target_path,
                status: RenameStatus::Renamed,
            })
            .collect())
    }

    /// Rolls back and builds the error for a move failure at `failed_index`.
    fn abort(
        &self,
        log: &mut TransactionLog,
        proposals: &[RenameProposal],
        targets: &[PathBuf],
        failed_index: usize,
        trigger: io::Error,
    ) -> TransactionError {
        let mut results: Vec<RenameResult> = proposals[..=failed_index]
            .iter()
            .zip(targets)
            .map(|(proposal, target)| RenameResult {
                original_path: proposal.original_path().to_path_buf(),
                target_path: target.clone(),
                status: RenameStatus::RolledBack,
            })
            .collect();
        results[failed_index].status = RenameStatus::Failed;

        let original = proposals[failed_index].original_path().to_path_buf();
        let target = targets[failed_index].clone();

        match log.rollback(self.fs) {
            Ok(reverted) => {
                warn!("Rolled back {} move(s)", reverted);
                TransactionError::MoveFailure {
                    original,
                    target,
                    source: trigger,
                    results,
                }
            }
            Err(rollback) => {
                for entry in std::iter::once(&rollback.failed).chain(&rollback.unreverted) {
                    if let Some(result) = results
                        .iter_mut()
                        .find(|r| r.original_path == entry.original)
                    {
                        result.status = RenameStatus::Stranded;
                    }
                }
                error!(
                    "Rollback failed, {} entries remain renamed: {}",
                    rollback.unreverted.len() + 1,
                    rollback
                );
                TransactionError::RollbackFailure {
                    trigger_path: original,
                    trigger,
                    failed: rollback.failed,
                    source: rollback.source,
                    unreverted: rollback.unreverted,
                    results,
                }
            }
        }
    }
}
