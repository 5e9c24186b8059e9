pub mod use_cases;

pub use use_cases::batch_classifier::{BatchClassifier, RunState, RunSummary};
pub use use_cases::pacing::{Pacer, PacingPolicy};
