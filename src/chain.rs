//! Chain hasher (C5)
//!
//! Maintains a rolling per-type hash linking successive block filters
//! (§4.5). Undefined until the first non-empty filter for a type is seen;
//! from then on every subsequent block of that type advances the chain,
//! empty or not.

use crate::builder::BlockTypeFilter;
use crate::codec::double_sha256;
use crate::types::{FilterType, ALL_FILTER_TYPES};

/// Rolling per-type chain head state.
#[derive(Debug, Default, Clone)]
pub struct ChainState {
    heads: [Option<[u8; 32]>; 5],
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed chain heads from the persisted `(type, hash)` rows at the
    /// highest compressed height (§4.6 initialization). Types absent from
    /// `seeds` remain undefined.
    pub fn seeded(seeds: impl IntoIterator<Item = (FilterType, [u8; 32])>) -> Self {
        let mut state = Self::new();
        for (t, hash) in seeds {
            state.heads[t.slot()] = Some(hash);
        }
        state
    }

    pub fn head(&self, t: FilterType) -> Option<[u8; 32]> {
        self.heads[t.slot()]
    }

    /// Advance the chain for `filter.filter_type` by folding in `filter`.
    /// Returns the new chain head when a record should be persisted, or
    /// `None` when the filter is empty and the chain isn't initialized yet
    /// (§4.5, the "skip" branch).
    pub fn advance(&mut self, filter: &BlockTypeFilter) -> Option<[u8; 32]> {
        let slot = filter.filter_type.slot();
        let new_head = match self.heads[slot] {
            Some(prev) => {
                let mut preimage = double_sha256(&filter.bytes).to_vec();
                preimage.extend_from_slice(&prev);
                double_sha256(&preimage)
            }
            None => {
                if filter.is_empty() {
                    return None;
                }
                let mut preimage = double_sha256(&filter.bytes).to_vec();
                preimage.extend_from_slice(&[0u8; 32]);
                double_sha256(&preimage)
            }
        };
        self.heads[slot] = Some(new_head);
        Some(new_head)
    }
}

/// Advance every type's chain for one block's filters, returning the
/// `(type, hash, filter_bytes)` records to persist. Types whose filter was
/// skipped (empty, chain not yet initialized) contribute nothing.
pub fn advance_block(
    state: &mut ChainState,
    filters: &[BlockTypeFilter],
) -> Vec<(FilterType, [u8; 32], Vec<u8>)> {
    let mut records = Vec::new();
    for t in ALL_FILTER_TYPES {
        let filter = filters
            .iter()
            .find(|f| f.filter_type == t)
            .expect("build_block_filters always emits all five types");
        if let Some(hash) = state.advance(filter) {
            records.push((t, hash, filter.bytes.clone()));
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(t: FilterType, bytes: Vec<u8>) -> BlockTypeFilter {
        BlockTypeFilter {
            filter_type: t,
            new_count: 0,
            duplicate_count: 0,
            new_segment_len: 0,
            duplicate_segment_len: 0,
            bytes,
        }
    }

    #[test]
    fn empty_filter_before_init_is_skipped() {
        let mut state = ChainState::new();
        let f = filter(FilterType::Type1, vec![0x00, 0x00]);
        assert_eq!(state.advance(&f), None);
        assert_eq!(state.head(FilterType::Type1), None);
    }

    #[test]
    fn first_non_empty_filter_seeds_from_zero() {
        let mut state = ChainState::new();
        let f = filter(FilterType::Type1, vec![0x01, 0x00]);
        let expected = double_sha256(&{
            let mut v = double_sha256(&f.bytes).to_vec();
            v.extend_from_slice(&[0u8; 32]);
            v
        });
        assert_eq!(state.advance(&f), Some(expected));
    }

    #[test]
    fn empty_filter_after_init_still_advances_chain() {
        let mut state = ChainState::new();
        let first = filter(FilterType::Type1, vec![0x01, 0x00]);
        let head1 = state.advance(&first).unwrap();

        let second = filter(FilterType::Type1, vec![0x00, 0x00]);
        let head2 = state.advance(&second).unwrap();

        let expected = double_sha256(&{
            let mut v = double_sha256(&second.bytes).to_vec();
            v.extend_from_slice(&head1);
            v
        });
        assert_eq!(head2, expected);
    }

    #[test]
    fn seeded_state_resumes_from_given_head() {
        let seed = [7u8; 32];
        let mut state = ChainState::seeded([(FilterType::Type1, seed)]);
        let f = filter(FilterType::Type1, vec![0x00, 0x00]);
        let head = state.advance(&f).unwrap();
        let expected = double_sha256(&{
            let mut v = double_sha256(&f.bytes).to_vec();
            v.extend_from_slice(&seed);
            v
        });
        assert_eq!(head, expected);
    }

    #[test]
    fn types_chain_independently() {
        let mut state = ChainState::new();
        state.advance(&filter(FilterType::Type1, vec![0x01, 0x00]));
        assert_eq!(state.head(FilterType::Type2), None);
    }
}
