use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::ReconcileCache;
use crate::config::ReconcileConfig;
use crate::error::{Result, RowError, ToolError};
use crate::join::DescriptionIndex;
use crate::model::{
    DESCRIPTION_MIN_COLUMNS, DescriptionRecord, MARKUP_MIN_COLUMNS, MatchedPair, ProductId,
    RawRecord, ReconciliationResult, Table,
};
use crate::text::{extract_prices, normalize, word_diff};

/// Progress report emitted after every completed batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchProgress {
    /// 1-based number of the batch that just finished.
    pub batch_number: usize,
    pub batch_size: usize,
    pub total_rows: usize,
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub progress_percent: f32,
}

impl BatchProgress {
    fn new(batch_number: usize, batch_size: usize, total_rows: usize, tally: &Tally) -> Self {
        let processed = tally.attempted();
        let progress_percent = if total_rows > 0 {
            (processed as f32 / total_rows as f32) * 100.0
        } else {
            0.0
        };
        Self {
            batch_number,
            batch_size,
            total_rows,
            processed,
            matched: tally.pairs.len(),
            unmatched: tally.unmatched,
            failed: tally.failed,
            progress_percent,
        }
    }
}

#[derive(Debug)]
enum RowOutcome {
    Matched(MatchedPair),
    Unmatched(ProductId),
    Failed(RowError),
}

#[derive(Debug, Default)]
struct Tally {
    pairs: Vec<MatchedPair>,
    unmatched: usize,
    failed: usize,
}

impl Tally {
    fn attempted(&self) -> usize {
        self.pairs.len() + self.unmatched + self.failed
    }

    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Matched(pair) => self.pairs.push(pair),
            RowOutcome::Unmatched(product_id) => {
                warn!(product_id = %product_id, "no matching product found");
                self.unmatched += 1;
            }
            RowOutcome::Failed(row_error) => {
                error!(error = %row_error, "error processing row");
                self.failed += 1;
            }
        }
    }
}

/// Drives normalisation, extraction and joining over whole datasets.
///
/// A reconciler owns a fixed-size worker pool and a bounded cache, both
/// reused by every run made through it.
pub struct Reconciler {
    config: ReconcileConfig,
    pool: ThreadPool,
    cache: ReconcileCache,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|index| format!("reconcile-worker-{index}"))
            .build()?;
        let cache = ReconcileCache::new(config.cache_capacity);
        Ok(Self {
            config,
            pool,
            cache,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn cache(&self) -> &ReconcileCache {
        &self.cache
    }

    /// Reconciles the two datasets without progress reporting or
    /// cancellation.
    pub fn run(&self, markup: &Table, descriptions: &Table) -> Result<ReconciliationResult> {
        self.run_with(markup, descriptions, |_| {}, || false)
    }

    /// Reconciles the two datasets batch by batch.
    ///
    /// `should_cancel` is consulted before each batch; once it returns true
    /// the run stops and keeps only the batches already completed.
    /// `on_progress` is called after every completed batch.
    #[instrument(
        level = "info",
        skip_all,
        fields(markup_rows = markup.rows.len(), description_rows = descriptions.rows.len())
    )]
    pub fn run_with(
        &self,
        markup: &Table,
        descriptions: &Table,
        mut on_progress: impl FnMut(&BatchProgress),
        should_cancel: impl Fn() -> bool,
    ) -> Result<ReconciliationResult> {
        validate_shape(markup, descriptions)?;

        let description_records: Vec<DescriptionRecord> = descriptions
            .rows
            .iter()
            .filter_map(|row| DescriptionRecord::from_row(row))
            .collect();
        let index = DescriptionIndex::build(&description_records);
        if index.duplicates() > 0 {
            debug!(
                duplicates = index.duplicates(),
                "ignoring repeated product identifiers in descriptions"
            );
        }

        let total_rows = markup.rows.len();
        let batch_size = self.config.batch_size;
        let mut tally = Tally::default();
        let mut cancelled = false;

        for (batch_index, batch) in markup.rows.chunks(batch_size).enumerate() {
            if should_cancel() {
                info!(
                    completed_batches = batch_index,
                    "reconciliation cancelled at batch boundary"
                );
                cancelled = true;
                break;
            }

            let offset = batch_index * batch_size;
            let outcomes: Vec<RowOutcome> = self.pool.install(|| {
                batch
                    .par_iter()
                    .enumerate()
                    .map(|(position, row)| self.process_row(offset + position, row, &index))
                    .collect()
            });
            for outcome in outcomes {
                tally.record(outcome);
            }

            let progress = BatchProgress::new(batch_index + 1, batch.len(), total_rows, &tally);
            info!(
                batch = progress.batch_number,
                processed = progress.processed,
                total = total_rows,
                "batch complete"
            );
            on_progress(&progress);
        }

        let attempted = tally.attempted();
        if tally.pairs.is_empty() {
            error!(attempted, "no data was processed successfully");
            return Err(ToolError::NoOutput { attempted });
        }

        info!(
            matched = tally.pairs.len(),
            errors = tally.unmatched + tally.failed,
            "processing complete"
        );

        Ok(ReconciliationResult {
            matched: tally.pairs.len(),
            pairs: tally.pairs,
            attempted,
            unmatched: tally.unmatched,
            failed: tally.failed,
            cancelled,
            include_diff: self.config.include_diff,
        })
    }

    fn process_row(
        &self,
        row_index: usize,
        row: &[String],
        index: &DescriptionIndex<'_>,
    ) -> RowOutcome {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.reconcile_row(row_index, row, index)
        }));
        match attempt {
            Ok(Ok(Some(pair))) => RowOutcome::Matched(pair),
            Ok(Ok(None)) => RowOutcome::Unmatched(row.first().cloned().unwrap_or_default()),
            Ok(Err(row_error)) => RowOutcome::Failed(row_error),
            Err(payload) => RowOutcome::Failed(RowError::Panicked {
                row: row_index,
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    fn reconcile_row(
        &self,
        row_index: usize,
        row: &[String],
        index: &DescriptionIndex<'_>,
    ) -> std::result::Result<Option<MatchedPair>, RowError> {
        let record = RawRecord::from_row(row_index, row)?;
        let Some(description) = index.lookup(&record.product_id) else {
            return Ok(None);
        };

        let normalized_text = self.cache.normalized(&record.markup_content, normalize);
        let prices_from_markup = self.cache.prices(&normalized_text, extract_prices);
        let prices_from_description = self.cache.prices(&description.description, extract_prices);
        let diff = self
            .config
            .include_diff
            .then(|| word_diff(&normalized_text, &description.description));

        Ok(Some(MatchedPair {
            product_id: record.product_id,
            normalized_text,
            description: description.description.clone(),
            prices_from_markup,
            prices_from_description,
            diff,
        }))
    }
}

/// Checks both datasets against their minimum column contract.
pub fn validate_shape(markup: &Table, descriptions: &Table) -> Result<()> {
    debug!(
        markup_columns = ?markup.columns,
        description_columns = ?descriptions.columns,
        "validating dataset shape"
    );
    if markup.width() < MARKUP_MIN_COLUMNS {
        return Err(ToolError::Structural {
            dataset: "markup dataset (product number and markup content)",
            required: MARKUP_MIN_COLUMNS,
            found: markup.width(),
        });
    }
    if descriptions.width() < DESCRIPTION_MIN_COLUMNS {
        return Err(ToolError::Structural {
            dataset: "description dataset (product number and description in 4th column)",
            required: DESCRIPTION_MIN_COLUMNS,
            found: descriptions.width(),
        });
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
