//! Planning, simulating and applying a batch of rename proposals.

pub mod dry_run;
pub mod executor;
pub mod planner;
pub mod transaction;

pub use dry_run::{DryRunSimulator, SimulatedRename};
pub use executor::{RenameExecutor, RenameResult, RenameStatus};
pub use planner::{
    deepest_first, ClaimedTargetSet, Conflict, ValidationOutcome, ValidationPlanner, Verdict,
};
pub use transaction::{LogEntry, RollbackError, TransactionLog};
