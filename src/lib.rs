pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod model;
pub mod platform;
pub mod progress;
pub mod rename;
pub mod scanner;

pub use config::AppConfig;
pub use engine::{RenameEngine, ScanResult};
pub use error::{Error, HintError, ScanError, TransactionError};
pub use model::{Category, FileSystemEntry, RenameProposal};
pub use progress::{ProgressReporter, SilentReporter};
