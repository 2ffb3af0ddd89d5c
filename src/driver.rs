//! Batch driver (C6)
//!
//! Polls the store for alignment, pulls a full batch, drives the parser,
//! deduper, filter builder and chain hasher over it, and commits the result
//! transactionally while reclaiming the raw rows it consumed (§4.6).

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::builder::build_block_filters;
use crate::chain::{advance_block, ChainState};
use crate::config::CompressorConfig;
use crate::dedupe::{assert_fresh, BatchDeduper};
use crate::parser::parse_block_filter;
use crate::store::{FilterRecord, Store};
use crate::types::{CompressorError, Result};

/// Batch size: 144 blocks/day * 7 days (§3, invariant 1).
pub const BATCH_SIZE: i64 = 144 * 7;

/// Statistics emitted after each committed batch (§4.6 step 7).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub elements_count: u64,
    pub elements_size: u64,
    pub duplicates_count: u64,
    pub duplicates_size: u64,
    pub batch_index: i64,
    pub range_start: i64,
    pub range_end: i64,
}

impl BatchStats {
    fn log(&self) {
        info!(
            "Created block filters batch {}; Range {} -> {};",
            self.batch_index, self.range_start, self.range_end
        );
        if self.elements_count > 0 {
            debug!(
                "    Elements: {};  bytes per element {:.4}",
                self.elements_count,
                self.elements_size as f64 / self.elements_count as f64
            );
        }
        if self.duplicates_count > 0 {
            debug!(
                "    Duplicates: {};  bytes per duplicate {:.4}",
                self.duplicates_count,
                self.duplicates_size as f64 / self.duplicates_count as f64
            );
        }
        let total_count = self.elements_count + self.duplicates_count;
        if total_count > 0 {
            debug!(
                "    Size: {}; bytes per address {:.4}",
                total_count,
                (self.elements_size + self.duplicates_size) as f64 / total_count as f64
            );
        }
    }
}

/// Outcome of one attempt to make batch progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A batch was committed; statistics to log.
    Committed(BatchStats),
    /// Nothing to do yet (mid-batch cursor, or fewer than `BATCH_SIZE` rows
    /// available); the caller should wait and retry.
    Waiting,
}

pub struct Driver {
    store: Store,
    config: CompressorConfig,
}

impl Driver {
    pub fn new(store: Store, config: CompressorConfig) -> Self {
        Self { store, config }
    }

    /// Seed chain state from the highest persisted height (§4.6
    /// initialization). Called once before entering the loop.
    async fn seed_chain_state(&self) -> Result<ChainState> {
        match self.store.highest_compressed_height().await? {
            Some(height) => {
                let heads = self.store.chain_heads_at(height).await?;
                Ok(ChainState::seeded(heads))
            }
            None => Ok(ChainState::new()),
        }
    }

    /// Run the compressor loop until `cancel` is triggered. On cancellation
    /// the loop finishes at the next safe point (between iterations);
    /// in-flight work is not a thing because each iteration either commits
    /// wholly or returns without having written anything (§5).
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let mut chain_state = self.seed_chain_state().await?;
        info!("batch compressor started");

        loop {
            if cancel.is_cancelled() {
                info!("Filter compressor module stopped");
                return Ok(());
            }

            match self.try_advance(&mut chain_state).await {
                Ok(Progress::Committed(stats)) => stats.log(),
                Ok(Progress::Waiting) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.poll_idle_delay()) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
                Err(err) => {
                    error!("filter compressor error: {err}");
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.retry_delay()) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
            }
        }
    }

    /// One iteration of the driver loop (§4.6 steps 1-7). Returns
    /// `Progress::Waiting` without touching the store's write side when the
    /// store isn't ready for a new batch yet. Exposed as `pub` (rather than
    /// private) so integration tests can drive a single iteration directly
    /// against a real store.
    pub async fn try_advance(&self, chain_state: &mut ChainState) -> Result<Progress> {
        let highest = self.store.highest_compressed_height().await?;
        let last_height = match highest {
            Some(h) => {
                let last_batch_height = (h / BATCH_SIZE) * BATCH_SIZE;
                let expected_cursor = last_batch_height + BATCH_SIZE - 1;
                if h != expected_cursor {
                    warn!(
                        "store is mid-batch (height {h}, expected cursor {expected_cursor}); waiting"
                    );
                    return Ok(Progress::Waiting);
                }
                expected_cursor
            }
            None => -1,
        };

        let rows = self
            .store
            .fetch_raw_batch(last_height, BATCH_SIZE)
            .await?;
        if rows.len() < BATCH_SIZE as usize {
            return Ok(Progress::Waiting);
        }

        for (i, row) in rows.iter().enumerate() {
            let expected = last_height + 1 + i as i64;
            if row.height != expected {
                return Err(CompressorError::DataIntegrity(format!(
                    "height gap in raw batch: expected {expected}, got {}",
                    row.height
                )));
            }
        }

        let mut deduper = BatchDeduper::new();
        assert_fresh(&deduper);
        let mut records = Vec::new();
        let mut stats = BatchStats::default();

        for row in &rows {
            let parsed = parse_block_filter(&row.filter)?;
            let filters = build_block_filters(&parsed, &mut deduper);

            for filter in &filters {
                stats.elements_count += filter.new_count as u64;
                stats.elements_size += filter.new_segment_len as u64;
                stats.duplicates_count += filter.duplicate_count as u64;
                stats.duplicates_size += filter.duplicate_segment_len as u64;
            }

            for (filter_type, hash, filter_bytes) in advance_block(chain_state, &filters) {
                records.push(FilterRecord {
                    height: row.height,
                    filter_type,
                    hash,
                    filter: filter_bytes,
                });
            }
        }

        let range_start = rows.first().expect("BATCH_SIZE rows present").height;
        let range_end = rows.last().expect("BATCH_SIZE rows present").height;
        self.store
            .commit_batch(&records, range_start, range_end)
            .await?;

        stats.batch_index = range_end / BATCH_SIZE;
        stats.range_start = range_start;
        stats.range_end = range_end;

        Ok(Progress::Committed(stats))
    }
}
