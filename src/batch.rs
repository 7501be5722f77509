use crate::clipboard::ClipboardSink;
use crate::error::Result;
use crate::pipeline::{Failed, ItemOutcome, PipelineRunner, Published, Stage};
use crate::source::ItemSource;
use crate::utils::savings_percent;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    AllSucceeded,
    PartialSuccess,
    AllFailed,
}

/// Results of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<Published>,
    pub failed: Vec<Failed>,
    /// Only items that reached the store are counted.
    pub total_original_bytes: u64,
    pub total_final_bytes: u64,
    /// Whether the joined URLs reached the clipboard.
    pub copied: bool,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Success(published) => {
                self.total_original_bytes += published.original_size;
                self.total_final_bytes += published.final_size;
                self.succeeded.push(published);
            }
            ItemOutcome::Failure(failed) => self.failed.push(failed),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.succeeded.is_empty(), self.failed.is_empty()) {
            (false, true) => BatchStatus::AllSucceeded,
            (false, false) => BatchStatus::PartialSuccess,
            (true, _) => BatchStatus::AllFailed,
        }
    }

    /// Bytes saved across uploaded items; negative if compression grew them.
    pub fn saved_bytes(&self) -> i64 {
        self.total_original_bytes as i64 - self.total_final_bytes as i64
    }

    pub fn savings_percent(&self) -> String {
        savings_percent(self.total_original_bytes, self.total_final_bytes)
    }

    /// Every formatted URL, one per line, in input order.
    pub fn clipboard_text(&self) -> String {
        self.succeeded
            .iter()
            .map(|p| p.formatted_url.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug)]
pub enum BatchReport {
    /// Nothing qualified for upload; no network call was made.
    NoCandidates,
    Completed(BatchSummary),
}

/// Per-item progress callbacks for batch runs. All methods default to no-ops.
pub trait BatchObserver {
    fn item_started(&mut self, _index: usize, _total: usize, _label: &str) {}
    fn stage(&mut self, _index: usize, _stage: &Stage) {}
    fn item_finished(&mut self, _index: usize, _outcome: &ItemOutcome) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl BatchObserver for Silent {}

/// Runs the pipeline over many sources one after another.
///
/// A failing item is recorded and the batch moves on. The clipboard is
/// written once, after the last item, with every successful URL.
pub struct BatchOrchestrator<'a> {
    runner: PipelineRunner<'a>,
}

impl<'a> BatchOrchestrator<'a> {
    pub fn new(runner: PipelineRunner<'a>) -> Self {
        Self { runner }
    }

    /// Setup problems (missing API key) abort with `Err` before any item is
    /// touched; item problems end up in `BatchSummary::failed`.
    pub async fn run<S: ItemSource>(
        &self,
        sources: &[S],
        clipboard: &dyn ClipboardSink,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchReport> {
        self.runner.check_credentials()?;

        if sources.is_empty() {
            return Ok(BatchReport::NoCandidates);
        }

        let total = sources.len();
        let mut summary = BatchSummary::default();

        for (index, source) in sources.iter().enumerate() {
            let label = source.label();
            observer.item_started(index, total, &label);
            debug!(index, total, source = %label, "processing item");

            let outcome = {
                let mut forward = |stage: &Stage| observer.stage(index, stage);
                self.runner.process(source, &mut forward).await
            };
            if let ItemOutcome::Failure(failed) = &outcome {
                warn!(source = %failed.source, error = %failed.error, "item failed");
            }
            observer.item_finished(index, &outcome);
            summary.record(outcome);
        }

        if !summary.succeeded.is_empty() {
            match clipboard.write_text(&summary.clipboard_text()) {
                Ok(()) => summary.copied = true,
                Err(e) => warn!(error = %e, "could not copy URLs to clipboard"),
            }
        }

        info!(
            succeeded = summary.succeeded.len(),
            failed = summary.failed.len(),
            saved = %summary.savings_percent(),
            "batch complete"
        );
        Ok(BatchReport::Completed(summary))
    }
}
