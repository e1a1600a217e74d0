pub mod hints;
pub mod naming;
mod sniff;

pub use hints::{ContentHintProvider, DocumentHint, ImageHint, NoHints, SniffingHintProvider};
pub use naming::NameProposalEngine;
