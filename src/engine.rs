use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::analysis::{ContentHintProvider, NameProposalEngine, SniffingHintProvider};
use crate::config::{self, AppConfig};
use crate::error::{Error, TransactionError};
use crate::fs::{FileSystem, OsFileSystem};
use crate::model::{FileSystemEntry, RenameProposal};
use crate::progress::ProgressReporter;
use crate::rename::{self, DryRunSimulator, RenameExecutor, RenameResult, SimulatedRename};
use crate::scanner::Scanner;

pub struct RenameEngine {
    config: AppConfig,
    fs: Box<dyn FileSystem>,
    hints: Box<dyn ContentHintProvider>,
}

#[derive(Debug)]
pub struct ScanResult {
    pub roots: Vec<PathBuf>,
    pub entries: Vec<FileSystemEntry>,
    pub scan_duration: Duration,
}

impl RenameEngine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            fs: Box::new(OsFileSystem),
            hints: Box::new(SniffingHintProvider),
        }
    }

    pub fn with_filesystem(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_hint_provider(mut self, hints: impl ContentHintProvider + 'static) -> Self {
        self.hints = Box::new(hints);
        self
    }

    /// Replaces the configured roots, e.g. with paths given on the command line.
    pub fn with_roots(mut self, roots: Vec<String>) -> Self {
        if !roots.is_empty() {
            self.config.root_paths = roots;
        }
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn filesystem(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Finds placeholder-named entries under every configured root. Roots
    /// nested inside another root are dropped, so each entry is found once.
    pub fn scan(&self, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        let roots: Vec<PathBuf> = self.config.root_paths.iter().map(PathBuf::from).collect();
        let roots = config::non_overlapping_directories(&roots);
        info!("Scanning directories: {:?}", roots);

        reporter.on_scan_start();
        let scan_start = Instant::now();
        let scanner = Scanner::new(self.fs.as_ref())
            .with_placeholders(&self.config.placeholder_patterns)
            .with_ignore_globs(&self.config.ignore_patterns);
        let mut entries = Vec::new();
        for root in &roots {
            entries.extend(scanner.scan(root)?);
        }
        let scan_duration = scan_start.elapsed();
        reporter.on_scan_complete(entries.len(), scan_duration.as_secs_f64());

        debug!(
            "Scan completed in {:.2}s, {} placeholder entries",
            scan_duration.as_secs_f64(),
            entries.len()
        );

        Ok(ScanResult {
            roots,
            entries,
            scan_duration,
        })
    }

    /// One proposal per entry, minus those under `min_confidence` and those
    /// that would keep the current name. Returned deepest path first, so an
    /// entry is always renamed before the directory that contains it.
    pub fn propose(
        &self,
        entries: &[FileSystemEntry],
        reporter: &dyn ProgressReporter,
    ) -> Vec<RenameProposal> {
        info!("Analyzing {} entries...", entries.len());
        let analyze_start = Instant::now();
        let proposals = NameProposalEngine::new(self.hints.as_ref()).propose_all(entries, reporter);
        let total = proposals.len();

        let min_confidence = self.config.min_confidence;
        let confident: Vec<RenameProposal> = proposals
            .into_iter()
            .filter(|p| p.confidence() >= min_confidence)
            .collect();
        let below_confidence = total - confident.len();
        let mut proposals: Vec<RenameProposal> = confident
            .into_iter()
            .filter(|p| p.target_path() != p.original_path())
            .collect();
        rename::deepest_first(&mut proposals);

        let analyze_duration = analyze_start.elapsed();
        reporter.on_analyze_complete(proposals.len(), analyze_duration.as_secs_f64());

        debug!(
            "Analysis completed in {:.2}s, {} proposals, {} below confidence {}, {} already named",
            analyze_duration.as_secs_f64(),
            proposals.len(),
            below_confidence,
            min_confidence,
            total - below_confidence - proposals.len()
        );
        proposals
    }

    pub fn dry_run(&self, proposals: &[RenameProposal]) -> Vec<SimulatedRename> {
        DryRunSimulator::new(self.fs.as_ref()).simulate(proposals)
    }

    pub fn apply(
        &self,
        proposals: &[RenameProposal],
        reporter: &dyn ProgressReporter,
    ) -> Result<Vec<RenameResult>, TransactionError> {
        info!("Applying {} renames...", proposals.len());
        reporter.on_apply_start(proposals.len());
        let apply_start = Instant::now();
        let results = RenameExecutor::new(self.fs.as_ref()).execute(proposals)?;
        let apply_duration = apply_start.elapsed();
        reporter.on_apply_complete(results.len(), apply_duration.as_secs_f64());

        debug!("Apply completed in {:.2}s", apply_duration.as_secs_f64());
        Ok(results)
    }
}
