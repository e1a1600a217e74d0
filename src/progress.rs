/// Trait for reporting engine progress.
///
/// The CLI implements it with indicatif spinners. All methods have default
/// no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _matches: usize, _duration_secs: f64) {}
    fn on_analyze_start(&self, _total: usize) {}
    fn on_analyze_progress(&self, _analyzed: usize, _total: usize) {}
    fn on_analyze_complete(&self, _proposals: usize, _duration_secs: f64) {}
    fn on_apply_start(&self, _total: usize) {}
    fn on_apply_complete(&self, _renamed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
