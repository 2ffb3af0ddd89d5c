//! Batch deduper (C3)
//!
//! Maintains, for each canonical filter type, an ordered mapping from
//! element to its 0-based dense index in first-seen order across the
//! current batch (§4.3). Assignment is deliberately two-phase: a lookup
//! during block processing never mutates the map, and indices are only
//! handed out once the caller has finished sorting a block's new-element
//! set (§4.4 step 2). That ordering is what makes the mapping a
//! deterministic function of the block sequence alone (§9).

use std::collections::BTreeMap;

use crate::types::{FilterType, ALL_FILTER_TYPES};

/// Per-type dedupe state for a single batch.
///
/// Backed by a fixed 5-element array rather than a `HashMap<FilterType, _>`,
/// since the five canonical codes are dense once addressed through
/// [`FilterType::slot`] (§9).
#[derive(Debug, Default)]
pub struct BatchDeduper {
    maps: [BTreeMap<u32, u32>; 5],
}

impl BatchDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a deduper with pre-seeded state. Not used by the live driver
    /// (each batch starts empty per §4.6), but kept for tests that want to
    /// exercise the dense-index bookkeeping directly.
    #[cfg(test)]
    fn slot(&self, t: FilterType) -> &BTreeMap<u32, u32> {
        &self.maps[t.slot()]
    }

    /// Dense index already assigned to `element` under type `t`, if any.
    /// Never mutates — this is the read-only half of the two-phase rule.
    pub fn dense_index(&self, t: FilterType, element: u32) -> Option<u32> {
        self.maps[t.slot()].get(&element).copied()
    }

    /// Assign dense indices to a block's finalized, ascending-sorted
    /// new-element set for type `t`. Indices accumulate monotonically
    /// across the batch (§4.3): the next call picks up where this one left
    /// off, regardless of which block it belongs to.
    pub fn assign_new_elements(&mut self, t: FilterType, sorted_new: &[u32]) {
        let map = &mut self.maps[t.slot()];
        let mut next = map.len() as u32;
        for &element in sorted_new {
            debug_assert!(
                !map.contains_key(&element),
                "element already assigned a dense index for this type"
            );
            map.insert(element, next);
            next += 1;
        }
    }
}

/// Chain heads and dedupe state live for the lifetime of exactly one batch;
/// this helper asserts that invariant holds for every canonical type at
/// batch start.
pub fn assert_fresh(deduper: &BatchDeduper) {
    for t in ALL_FILTER_TYPES {
        debug_assert!(deduper.maps[t.slot()].is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_element_has_no_dense_index() {
        let deduper = BatchDeduper::new();
        assert_eq!(deduper.dense_index(FilterType::Type1, 42), None);
    }

    #[test]
    fn assignment_is_contiguous_from_zero() {
        let mut deduper = BatchDeduper::new();
        deduper.assign_new_elements(FilterType::Type1, &[10, 20, 30]);
        assert_eq!(deduper.dense_index(FilterType::Type1, 10), Some(0));
        assert_eq!(deduper.dense_index(FilterType::Type1, 20), Some(1));
        assert_eq!(deduper.dense_index(FilterType::Type1, 30), Some(2));
    }

    #[test]
    fn assignment_accumulates_across_blocks() {
        let mut deduper = BatchDeduper::new();
        deduper.assign_new_elements(FilterType::Type1, &[1, 2]);
        deduper.assign_new_elements(FilterType::Type1, &[3]);
        assert_eq!(deduper.dense_index(FilterType::Type1, 3), Some(2));
    }

    #[test]
    fn types_are_independent() {
        let mut deduper = BatchDeduper::new();
        deduper.assign_new_elements(FilterType::Type1, &[7]);
        assert_eq!(deduper.dense_index(FilterType::Type2, 7), None);
    }

    #[test]
    fn slot_reflects_assigned_size() {
        let mut deduper = BatchDeduper::new();
        deduper.assign_new_elements(FilterType::Type4, &[1, 2, 3]);
        assert_eq!(deduper.slot(FilterType::Type4).len(), 3);
    }
}
