//! Batch classification driver
//!
//! Runs one pass over a dataset: `Loading → Iterating → Finalizing →
//! CleaningUp → Done`. Rows that already carry a classification are never
//! re-queried, and an oracle failure only leaves that row unset.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::pacing::Pacer;
use crate::domain::dataset::{ColumnNames, Dataset};
use crate::domain::error::{AppError, Result};
use crate::domain::vehicle::Classification;
use crate::infrastructure::oracle::ClassificationOracle;
use crate::infrastructure::progress::ProgressSink;
use crate::infrastructure::spreadsheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Loading,
    Iterating,
    Finalizing,
    CleaningUp,
    Done,
}

impl RunState {
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::Loading => Some(RunState::Iterating),
            RunState::Iterating => Some(RunState::Finalizing),
            RunState::Finalizing => Some(RunState::CleaningUp),
            RunState::CleaningUp => Some(RunState::Done),
            RunState::Done => None,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Rows that received a classification in this run
    pub modified: usize,
    /// Rows the oracle could not classify (left unset in the output)
    pub failed: usize,
    /// Rows skipped because they were already classified
    pub skipped: usize,
    pub output_path: PathBuf,
}

#[derive(Debug, Default)]
struct RowCounts {
    modified: usize,
    failed: usize,
    skipped: usize,
}

pub struct BatchClassifier<O, P> {
    oracle: O,
    progress: P,
    pacer: Pacer,
    columns: ColumnNames,
    state: RunState,
}

impl<O, P> BatchClassifier<O, P>
where
    O: ClassificationOracle,
    P: ProgressSink,
{
    pub fn new(oracle: O, progress: P, pacer: Pacer, columns: ColumnNames) -> Self {
        Self {
            oracle,
            progress,
            pacer,
            columns,
            state: RunState::Loading,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Classify `input` and write the result to `output`.
    pub async fn run(&mut self, input: &Path, output: &Path) -> Result<RunSummary> {
        if self.state != RunState::Loading {
            return Err(AppError::Internal(format!(
                "batch run cannot start from state {:?}",
                self.state
            )));
        }

        info!(input = %input.display(), "Loading dataset");
        let (mut dataset, format) = spreadsheet::read_dataset(input, &self.columns)?;
        let total = dataset.len();
        if dataset.is_empty() {
            warn!(input = %input.display(), "Input has no data rows");
        }
        self.progress.report(0, total);

        self.advance(RunState::Iterating)?;
        info!(rows = total, "Classifying rows");
        let counts = self.classify_rows(&mut dataset).await;

        self.advance(RunState::Finalizing)?;
        spreadsheet::write_dataset(output, &dataset, format)?;
        info!(output = %output.display(), "Wrote output file");
        self.progress.report_done(counts.modified);

        self.advance(RunState::CleaningUp)?;
        self.progress.cleanup().await;

        self.advance(RunState::Done)?;
        let summary = RunSummary {
            total,
            modified: counts.modified,
            failed: counts.failed,
            skipped: counts.skipped,
            output_path: output.to_path_buf(),
        };
        info!(
            total = summary.total,
            modified = summary.modified,
            failed = summary.failed,
            skipped = summary.skipped,
            "Inference finished"
        );
        Ok(summary)
    }

    fn advance(&mut self, next: RunState) -> Result<()> {
        if self.state.next() != Some(next) {
            return Err(AppError::Internal(format!(
                "invalid run transition {:?} -> {:?}",
                self.state, next
            )));
        }
        debug!(from = ?self.state, to = ?next, "Run state transition");
        self.state = next;
        Ok(())
    }

    async fn classify_rows(&mut self, dataset: &mut Dataset) -> RowCounts {
        let total = dataset.len();
        let mut counts = RowCounts::default();

        for index in 0..total {
            let row_number = index + 1;

            if !dataset.rows()[index].classification().is_unset() {
                counts.skipped += 1;
            } else if let Some(query) = dataset.query_for(index, &self.columns) {
                self.pacer.wait().await;
                match self.oracle.classify(&query).await {
                    Ok(category) => {
                        debug!(row = row_number, vehicle = %query, category = %category, "Classified");
                        dataset.set_classification(index, Classification::from(category));
                        counts.modified += 1;
                    }
                    Err(e) => {
                        debug!(row = row_number, vehicle = %query, error = %e, "No classification available");
                        dataset.set_classification(index, Classification::Failed);
                        counts.failed += 1;
                    }
                }
            } else {
                debug!(row = row_number, "Row has no usable year/make/model");
                dataset.set_classification(index, Classification::Failed);
                counts.failed += 1;
            }

            self.progress.report(row_number, total);
        }

        counts
    }
}
