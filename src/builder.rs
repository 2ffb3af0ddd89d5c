//! Per-block filter builder (C4)
//!
//! For one block, builds the `<elements-GCS><duplicate-pointers-GCS><tx-digest?>`
//! byte string for each of the five canonical filter types (§4.4), assigning
//! dense indices to newly-seen elements along the way.

use std::collections::{BTreeMap, BTreeSet};

use crate::codec::{encode_gcs, int_to_var_int, ripemd160, sha256};
use crate::dedupe::BatchDeduper;
use crate::parser::ParsedElement;
use crate::types::{FilterType, ALL_FILTER_TYPES};

/// The built filter bytes for one `(block, filter_type)` pair, plus the
/// counts the driver folds into batch statistics (§4.6 step 7).
#[derive(Debug, Clone)]
pub struct BlockTypeFilter {
    pub filter_type: FilterType,
    /// `f`: the byte string described in §4.4.
    pub bytes: Vec<u8>,
    pub new_count: usize,
    pub duplicate_count: usize,
    /// Byte length of the `varint(Ne) || GCS(new_elements)` segment, used
    /// for the "bytes per element" batch statistic (§4.6 step 7).
    pub new_segment_len: usize,
    /// Byte length of the `varint(Nd) || GCS(duplicate_indices)` segment.
    pub duplicate_segment_len: usize,
}

impl BlockTypeFilter {
    /// The "filter is non-empty" predicate of §3: the two leading varints
    /// are not both zero.
    pub fn is_empty(&self) -> bool {
        self.bytes == [0x00, 0x00]
    }
}

/// Build the per-type filters for one block's parsed elements, mutating
/// `deduper` to record any newly-seen elements (§4.3, §4.4 step 2).
///
/// Always returns exactly five entries, one per [`ALL_FILTER_TYPES`], even
/// when a type had no contribution in this block (its filter is then the
/// two-byte `0x00 0x00` empty marker).
pub fn build_block_filters(
    parsed: &[ParsedElement],
    deduper: &mut BatchDeduper,
) -> Vec<BlockTypeFilter> {
    ALL_FILTER_TYPES
        .into_iter()
        .map(|t| build_one_type(t, parsed, deduper))
        .collect()
}

fn build_one_type(
    t: FilterType,
    parsed: &[ParsedElement],
    deduper: &mut BatchDeduper,
) -> BlockTypeFilter {
    let mut new_elements: BTreeSet<u32> = BTreeSet::new();
    let mut duplicate_elements: BTreeSet<u32> = BTreeSet::new();
    let mut tx_filters: BTreeMap<u32, BTreeSet<[u8; 4]>> = BTreeMap::new();

    for pe in parsed.iter().filter(|pe| pe.filter_type == t) {
        if deduper.dense_index(t, pe.element).is_some() {
            duplicate_elements.insert(pe.element);
        } else {
            new_elements.insert(pe.element);
        }
        tx_filters
            .entry(pe.tx_index)
            .or_default()
            .insert(pe.element.to_le_bytes());
    }

    let mut f = Vec::new();

    if !new_elements.is_empty() {
        let sorted_new: Vec<u32> = new_elements.iter().copied().collect();
        deduper.assign_new_elements(t, &sorted_new);
        let gcs = encode_gcs(sorted_new.iter().map(|&e| e as u64), false);
        f.extend_from_slice(&int_to_var_int(gcs.len() as u64));
        f.extend_from_slice(&gcs);
    } else {
        f.extend_from_slice(&int_to_var_int(0));
    }
    let new_segment_len = f.len();

    if !duplicate_elements.is_empty() {
        let pointers: Vec<u64> = duplicate_elements
            .iter()
            .map(|&e| {
                deduper
                    .dense_index(t, e)
                    .expect("duplicate element must already have a dense index") as u64
            })
            .collect();
        let gcs = encode_gcs(pointers, true);
        f.extend_from_slice(&int_to_var_int(gcs.len() as u64));
        f.extend_from_slice(&gcs);
    } else {
        f.extend_from_slice(&int_to_var_int(0));
    }
    let duplicate_segment_len = f.len() - new_segment_len;

    if f != [0x00, 0x00] {
        let mut digest_input = Vec::new();
        for (_, codes) in tx_filters.iter() {
            for code in codes {
                digest_input.extend_from_slice(code);
            }
        }
        f.extend_from_slice(&ripemd160(&sha256(&digest_input)));
    }

    BlockTypeFilter {
        filter_type: t,
        bytes: f,
        new_count: new_elements.len(),
        duplicate_count: duplicate_elements.len(),
        new_segment_len,
        duplicate_segment_len,
    }
}
