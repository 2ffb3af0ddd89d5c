//! Raw element parser (C2)
//!
//! Slices a block's raw filter blob into 25-byte records and maps each one
//! to `(canonical_type, tx_index, element)`. Identical 25-byte records within
//! a single block are coalesced before mapping, per §4.2.

use std::collections::BTreeSet;

use crate::codec::{map_into_range, siphash};
use crate::types::{CompressorError, FilterType, Result};

/// Width in bytes of a single raw element record: 1 tag byte + 4 tx-index
/// bytes + 20 payload bytes.
pub const RAW_RECORD_LEN: usize = 25;

const F: u64 = 1u64 << 32;

/// One parsed contribution of a block to a filter type: the tx that produced
/// it and the mapped 32-bit element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedElement {
    pub filter_type: FilterType,
    pub tx_index: u32,
    pub element: u32,
}

/// Parse a raw block blob into its deduplicated, mapped elements.
///
/// `blob.len()` must be a multiple of [`RAW_RECORD_LEN`]; this is the
/// contract of the `raw_block_filters` table (§6) and a violation is a fatal
/// data-integrity error, not a programmer error, since it originates from
/// external data.
pub fn parse_block_filter(blob: &[u8]) -> Result<Vec<ParsedElement>> {
    if blob.len() % RAW_RECORD_LEN != 0 {
        return Err(CompressorError::DataIntegrity(format!(
            "raw filter blob length {} is not a multiple of {}",
            blob.len(),
            RAW_RECORD_LEN
        )));
    }

    // Pre-dedupe identical 25-byte records within this block before mapping
    // (§4.2): a BTreeSet over the raw slices is equivalent to "the set of
    // 25-byte slices" and gives a deterministic iteration order for free.
    let mut unique_records: BTreeSet<&[u8]> = BTreeSet::new();
    for chunk in blob.chunks_exact(RAW_RECORD_LEN) {
        unique_records.insert(chunk);
    }

    let mut out = Vec::with_capacity(unique_records.len());
    for record in unique_records {
        let raw_tag = record[0];
        let filter_type = FilterType::from_raw_tag(raw_tag).ok_or_else(|| {
            CompressorError::DataIntegrity(format!("unknown raw filter tag {raw_tag}"))
        })?;
        let tx_index = u32::from_le_bytes([record[1], record[2], record[3], record[4]]);
        let payload = &record[5..25];
        let element = map_into_range(siphash(payload), F) as u32;
        out.push(ParsedElement {
            filter_type,
            tx_index,
            element,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw_tag: u8, tx_index: u32, payload_fill: u8) -> [u8; RAW_RECORD_LEN] {
        let mut rec = [payload_fill; RAW_RECORD_LEN];
        rec[0] = raw_tag;
        rec[1..5].copy_from_slice(&tx_index.to_le_bytes());
        rec
    }

    #[test]
    fn rejects_misaligned_blob() {
        let blob = vec![0u8; RAW_RECORD_LEN - 1];
        assert!(parse_block_filter(&blob).is_err());
    }

    #[test]
    fn rejects_unknown_raw_tag() {
        let blob = record(99, 0, 1);
        assert!(parse_block_filter(&blob).is_err());
    }

    #[test]
    fn maps_raw_tags_to_canonical_types() {
        let cases = [(0, FilterType::Type2), (1, FilterType::Type4), (2, FilterType::Type1), (5, FilterType::Type8), (6, FilterType::Type16)];
        for (raw_tag, expected) in cases {
            let blob = record(raw_tag, 0, 7);
            let parsed = parse_block_filter(&blob).unwrap();
            assert_eq!(parsed.len(), 1);
            assert_eq!(parsed[0].filter_type, expected);
        }
    }

    #[test]
    fn dedupes_identical_records_within_a_block() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&record(2, 3, 9));
        blob.extend_from_slice(&record(2, 3, 9));
        let parsed = parse_block_filter(&blob).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn preserves_distinct_records() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&record(2, 3, 9));
        blob.extend_from_slice(&record(2, 4, 9));
        let parsed = parse_block_filter(&blob).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn tx_index_round_trips_little_endian() {
        let blob = record(0, 0xdead_beef, 1);
        let parsed = parse_block_filter(&blob).unwrap();
        assert_eq!(parsed[0].tx_index, 0xdead_beef);
    }
}
