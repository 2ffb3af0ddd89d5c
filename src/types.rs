//! Shared data types: the canonical filter type enumeration and the error
//! taxonomy used across the batch compression pipeline (C9, §4.9).

use thiserror::Error;

/// One of the five filter kinds the upstream indexer produces raw records for.
///
/// The raw on-disk tag uses a different, non-contiguous namespace (§3); this
/// type holds only the canonical, persisted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterType {
    /// Canonical code 1 (raw tag 2).
    Type1 = 1,
    /// Canonical code 2 (raw tag 0).
    Type2 = 2,
    /// Canonical code 4 (raw tag 1).
    Type4 = 4,
    /// Canonical code 8 (raw tag 5).
    Type8 = 8,
    /// Canonical code 16 (raw tag 6).
    Type16 = 16,
}

/// The five canonical filter types, in a fixed order used wherever all types
/// must be iterated (batch initialization, chain-head seeding, etc).
pub const ALL_FILTER_TYPES: [FilterType; 5] = [
    FilterType::Type1,
    FilterType::Type2,
    FilterType::Type4,
    FilterType::Type8,
    FilterType::Type16,
];

impl FilterType {
    /// Canonical persisted code.
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Translate a raw on-disk tag to its canonical type, per the fixed
    /// bijection in §3. Returns `None` for any tag outside the domain, which
    /// the caller must treat as a fatal data-integrity error.
    pub fn from_raw_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FilterType::Type2),
            1 => Some(FilterType::Type4),
            2 => Some(FilterType::Type1),
            5 => Some(FilterType::Type8),
            6 => Some(FilterType::Type16),
            _ => None,
        }
    }

    /// Dense array index (0..5) for this type, used to back the five
    /// per-type dedupe/chain states with a small array instead of a map (§9).
    pub fn slot(self) -> usize {
        match self {
            FilterType::Type1 => 0,
            FilterType::Type2 => 1,
            FilterType::Type4 => 2,
            FilterType::Type8 => 3,
            FilterType::Type16 => 4,
        }
    }
}

/// Errors surfaced by the batch compression pipeline.
///
/// Per §7, only [`CompressorError::Store`] is routed to the transient-retry
/// path automatically; [`CompressorError::DataIntegrity`] is handled as
/// transient-in-the-first-instance by the driver (§4.6, §7) since the
/// upstream producer may still be catching up. Codec-level contract
/// violations are `assert!`/`debug_assert!` programmer errors and never
/// reach this enum.
#[derive(Debug, Error)]
pub enum CompressorError {
    /// A store operation failed (connection loss, query timeout, transaction
    /// conflict). Treated as transient I/O (§7).
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    /// A data-integrity condition: malformed raw record, unknown raw tag, a
    /// height gap, or a batch that stayed under-filled past expectation.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CompressorError>;
