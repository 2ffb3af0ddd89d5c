//! Block filter batch compressor
//!
//! Consolidates per-block raw address-filter records into fixed-size
//! batches of Golomb-Coded-Set filters, deduplicating elements across the
//! batch, chaining the resulting filters into a tamper-evident hash chain,
//! and persisting the compacted batch transactionally while reclaiming the
//! raw source rows it consumed.
//!
//! ## Module map
//!
//! - [`codec`] — SipHash, range mapping, GCS encoding, varints, digests (C1)
//! - [`parser`] — raw 25-byte record parsing (C2)
//! - [`dedupe`] — per-type batch-wide dense-index assignment (C3)
//! - [`builder`] — per-block filter byte-string construction (C4)
//! - [`chain`] — rolling per-type chain hashing (C5)
//! - [`driver`] — the polling loop that ties C1-C5 to the store (C6)
//! - [`store`] — the Postgres accessor backing the driver (C7)
//! - [`config`] — configuration loading (C8)
//! - [`types`] — the canonical filter type enum and error taxonomy (C9)

pub mod builder;
pub mod chain;
pub mod codec;
pub mod config;
pub mod dedupe;
pub mod driver;
pub mod parser;
pub mod store;
pub mod types;
pub mod utils;

pub use config::CompressorConfig;
pub use driver::{Driver, Progress};
pub use store::Store;
pub use types::{CompressorError, FilterType, Result};
