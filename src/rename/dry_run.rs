use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tracing::info;

use super::planner::{display_name, ValidationOutcome, ValidationPlanner, Verdict};
use crate::error::Error;
use crate::fs::FileSystem;
use crate::model::RenameProposal;

/// What would happen to one proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRename {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub verdict: Verdict,
    pub detail: String,
}

impl SimulatedRename {
    pub fn would_succeed(&self) -> bool {
        self.verdict == Verdict::Ok
    }
}

impl From<ValidationOutcome> for SimulatedRename {
    fn from(outcome: ValidationOutcome) -> Self {
        Self {
            original_path: outcome.proposal.original_path().to_path_buf(),
            target_path: outcome.target_path,
            verdict: outcome.verdict,
            detail: outcome.detail,
        }
    }
}

/// Plans a batch without touching the filesystem.
pub struct DryRunSimulator<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> DryRunSimulator<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// One result per proposal, in order. Failures never stop the run.
    pub fn simulate(&self, proposals: &[RenameProposal]) -> Vec<SimulatedRename> {
        let results: Vec<SimulatedRename> = ValidationPlanner::validate_all(self.fs, proposals)
            .into_iter()
            .map(SimulatedRename::from)
            .collect();

        info!(
            "Dry run: {} of {} renames would succeed",
            results.iter().filter(|r| r.would_succeed()).count(),
            results.len()
        );
        results
    }
}

pub fn report(results: &[SimulatedRename]) -> String {
    let successful = results.iter().filter(|r| r.would_succeed()).count();
    let failed = results.len() - successful;

    let mut report = String::from("Dry Run Report\n==============\n\n");
    report += "Summary:\n";
    report += &format!("- Total operations: {}\n", results.len());
    report += &format!("- Would succeed: {}\n", successful);
    report += &format!("- Would fail: {}\n\n", failed);

    report += "Details:\n";
    for result in results {
        report += &format!(
            "\n{} → {}\n",
            display_name(&result.original_path),
            display_name(&result.target_path)
        );
        if result.would_succeed() {
            report += "  Would succeed\n";
        } else {
            report += &format!("  Would fail ({}): {}\n", result.verdict, result.detail);
        }
    }

    report
}

#[derive(Serialize)]
struct CsvRow<'r> {
    original: String,
    target: String,
    verdict: Verdict,
    detail: &'r str,
}

/// Writes one row per simulated rename with a header line.
pub fn write_csv<W: io::Write>(results: &[SimulatedRename], writer: W) -> Result<(), Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for result in results {
        wtr.serialize(CsvRow {
            original: result.original_path.display().to_string(),
            target: result.target_path.display().to_string(),
            verdict: result.verdict,
            detail: &result.detail,
        })?;
    }
    wtr.flush()?;
    Ok(())
}
