pub mod batch_classifier;
pub mod pacing;
