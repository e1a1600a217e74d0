use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::TransactionError;
use crate::fs::FileSystem;
use crate::model::RenameProposal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Ok,
    Collision,
    PermissionDenied,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Ok => "ok",
            Verdict::Collision => "collision",
            Verdict::PermissionDenied => "permission denied",
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub proposal: RenameProposal,
    pub target_path: PathBuf,
    pub verdict: Verdict,
    pub detail: String,
}

/// Target paths handed out so far in one planner run, each mapped to the
/// original path that claimed it.
#[derive(Debug, Default)]
pub struct ClaimedTargetSet {
    claims: HashMap<PathBuf, PathBuf>,
}

impl ClaimedTargetSet {
    pub fn claimant(&self, target: &Path) -> Option<&Path> {
        self.claims.get(target).map(PathBuf::as_path)
    }

    /// False if `target` was already claimed; the earlier claim is kept.
    pub fn claim(&mut self, target: PathBuf, original: &Path) -> bool {
        if self.claims.contains_key(&target) {
            return false;
        }
        self.claims.insert(target, original.to_path_buf());
        true
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    OnDisk,
    ClaimedBy(PathBuf),
}

/// Resolves and checks proposals in batch order. Holds the claimed set for a
/// single run, so build a new planner for every batch.
pub struct ValidationPlanner<'a> {
    fs: &'a dyn FileSystem,
    claimed: ClaimedTargetSet,
}

impl<'a> ValidationPlanner<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            claimed: ClaimedTargetSet::default(),
        }
    }

    /// Validates a whole batch with a fresh claimed set.
    pub fn validate_all(fs: &'a dyn FileSystem, proposals: &[RenameProposal]) -> Vec<ValidationOutcome> {
        let mut planner = Self::new(fs);
        proposals.iter().map(|p| planner.validate(p)).collect()
    }

    pub fn collision(&self, target: &Path) -> Option<Conflict> {
        if let Some(earlier) = self.claimed.claimant(target) {
            return Some(Conflict::ClaimedBy(earlier.to_path_buf()));
        }
        self.fs.exists(target).then_some(Conflict::OnDisk)
    }

    pub fn parent_writable(&self, proposal: &RenameProposal) -> bool {
        let parent = proposal.original_path().parent().unwrap_or(Path::new(""));
        self.fs.is_writable_dir(parent)
    }

    /// Collision check then permission check; claims the target only if both pass.
    pub fn validate(&mut self, proposal: &RenameProposal) -> ValidationOutcome {
        let target_path = proposal.target_path();

        let (verdict, detail) = if let Some(conflict) = self.collision(&target_path) {
            let detail = match conflict {
                Conflict::OnDisk => {
                    format!("Name collision would occur: {} already exists", proposal.new_name())
                }
                Conflict::ClaimedBy(earlier) => format!(
                    "Name collision would occur: {} is already claimed by {}",
                    proposal.new_name(),
                    earlier.display()
                ),
            };
            (Verdict::Collision, detail)
        } else if !self.parent_writable(proposal) {
            (
                Verdict::PermissionDenied,
                format!(
                    "Insufficient permissions to rename: {}",
                    display_name(proposal.original_path())
                ),
            )
        } else {
            self.claimed
                .claim(target_path.clone(), proposal.original_path());
            (Verdict::Ok, "Ready to rename".to_string())
        };

        ValidationOutcome {
            proposal: proposal.clone(),
            target_path,
            verdict,
            detail,
        }
    }

    /// Collision check alone, claiming the target on success. Used as the
    /// executor's pre-flight gate.
    pub fn reserve(&mut self, proposal: &RenameProposal) -> Result<PathBuf, TransactionError> {
        let target = proposal.target_path();
        if let Some(conflict) = self.collision(&target) {
            return Err(TransactionError::Collision {
                original: proposal.original_path().to_path_buf(),
                target,
                claimed_by: match conflict {
                    Conflict::OnDisk => None,
                    Conflict::ClaimedBy(earlier) => Some(earlier),
                },
            });
        }
        self.claimed.claim(target.clone(), proposal.original_path());
        Ok(target)
    }

    pub fn claimed(&self) -> &ClaimedTargetSet {
        &self.claimed
    }
}

/// Stable sort putting deeper original paths first. Renaming a directory
/// invalidates the original paths of everything below it, so contents must
/// move before their parent.
pub fn deepest_first(proposals: &mut [RenameProposal]) {
    proposals.sort_by_key(|p| Reverse(p.original_path().components().count()));
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
