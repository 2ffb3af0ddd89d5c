//! Codec primitives shared with filter consumers
//!
//! Implements the low-level building blocks the rest of the crate composes:
//! keyed SipHash, the multiply-shift range mapping, Golomb-Coded Set (GCS)
//! encoding in the BIP158 family, compact-size varints, and the SHA-256 /
//! RIPEMD-160 digests used for the tx-digest and chain hash.
//!
//! Byte layout here must stay bit-exact: clients verify filters against this
//! output, so nothing in this module may change its framing without breaking
//! every consumer.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use siphasher::sip::SipHasher24;

/// Golomb-Rice parameter shared with consumers (BIP158 family: P = 19).
pub const GCS_P: u8 = 19;

/// Fixed SipHash key shared with consumers. Values are implementation-defined
/// but must match the reader side exactly.
const SIPHASH_KEY0: u64 = 0x0706_0504_0302_0100;
const SIPHASH_KEY1: u64 = 0x0f0e_0d0c_0b0a_0908;

/// Keyed SipHash-2-4 over a payload, using the fixed key shared with consumers.
pub fn siphash(payload: &[u8]) -> u64 {
    use std::hash::Hasher;
    let mut hasher = SipHasher24::new_with_keys(SIPHASH_KEY0, SIPHASH_KEY1);
    hasher.write(payload);
    hasher.finish()
}

/// Map a 64-bit hash into the range `[0, f)` via multiply-shift: `(h * f) >> 64`.
pub fn map_into_range(h: u64, f: u64) -> u64 {
    ((h as u128) * (f as u128) >> 64) as u64
}

/// SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256 digest.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 digest.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(data).into()
}

/// Compact-size varint encoding (Bitcoin-style `CompactSize`).
pub fn int_to_var_int(n: u64) -> Vec<u8> {
    if n < 0xfd {
        vec![n as u8]
    } else if n <= 0xffff {
        let mut out = vec![0xfd];
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out
    } else if n <= 0xffff_ffff {
        let mut out = vec![0xfe];
        out.extend_from_slice(&(n as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xff];
        out.extend_from_slice(&n.to_le_bytes());
        out
    }
}

/// Bit-level writer used by the Golomb-Rice encoder, MSB-first within each byte.
struct BitWriter {
    data: Vec<u8>,
    current: u8,
    bits: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            current: 0,
            bits: 0,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        if bit {
            self.current |= 1u8 << (7 - self.bits);
        }
        self.bits += 1;
        if self.bits == 8 {
            self.data.push(self.current);
            self.current = 0;
            self.bits = 0;
        }
    }

    fn write_unary(&mut self, quotient: u64) {
        for _ in 0..quotient {
            self.write_bit(true);
        }
        self.write_bit(false);
    }

    fn write_bits(&mut self, value: u64, num_bits: u8) {
        for i in 0..num_bits {
            self.write_bit(((value >> (num_bits - 1 - i)) & 1) != 0);
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.data.push(self.current);
        }
        self.data
    }
}

/// Encode a Golomb-Coded Set over `values`.
///
/// `values` are already elements of the shared range (they are not re-hashed
/// or re-scaled here). When `sort` is `false` the caller asserts the input is
/// already sorted ascending; this is the fast path used for per-block
/// new-element sets, which are built in a `BTreeSet` and therefore already
/// ordered. When `sort` is `true` the input is sorted before encoding, used
/// for duplicate dense-index pointers collected in an unordered set.
///
/// Encodes the deltas between consecutive sorted values with Golomb-Rice
/// coding at parameter [`GCS_P`].
pub fn encode_gcs<I>(values: I, sort: bool) -> Vec<u8>
where
    I: IntoIterator<Item = u64>,
{
    let mut sorted: Vec<u64> = values.into_iter().collect();
    if sort {
        sorted.sort_unstable();
    } else {
        debug_assert!(
            sorted.windows(2).all(|w| w[0] <= w[1]),
            "encode_gcs called with sort=false on unsorted input"
        );
    }

    let mut writer = BitWriter::new();
    let mut last = 0u64;
    for value in sorted {
        let delta = value - last;
        last = value;
        writer.write_unary(delta >> GCS_P);
        writer.write_bits(delta & ((1u64 << GCS_P) - 1), GCS_P);
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siphash_is_deterministic() {
        let a = siphash(b"some twenty byte payload!!!!");
        let b = siphash(b"some twenty byte payload!!!!");
        assert_eq!(a, b);
    }

    #[test]
    fn map_into_range_stays_in_bounds() {
        for h in [0u64, 1, u64::MAX, 0xdead_beef_cafe_babe] {
            let mapped = map_into_range(h, 1 << 32);
            assert!(mapped < (1u64 << 32));
        }
    }

    #[test]
    fn map_into_range_is_monotonic_in_f() {
        let h = 0x1234_5678_9abc_def0u64;
        assert_eq!(map_into_range(h, 0), 0);
        assert!(map_into_range(h, 1 << 32) <= map_into_range(h, 1 << 40));
    }

    #[test]
    fn var_int_matches_compact_size() {
        assert_eq!(int_to_var_int(0), vec![0x00]);
        assert_eq!(int_to_var_int(0xfc), vec![0xfc]);
        assert_eq!(int_to_var_int(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(int_to_var_int(0x1_0000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn gcs_encode_empty_is_empty() {
        assert!(encode_gcs(std::iter::empty(), false).is_empty());
    }

    #[test]
    fn gcs_encode_sort_true_tolerates_unordered_input() {
        let unsorted = vec![30u64, 10, 20];
        let a = encode_gcs(unsorted.clone(), true);
        let mut sorted = unsorted;
        sorted.sort_unstable();
        let b = encode_gcs(sorted, false);
        assert_eq!(a, b);
    }

    #[test]
    fn gcs_encode_is_deterministic_for_same_set() {
        let values = vec![5u64, 1000, 1_000_000];
        assert_eq!(encode_gcs(values.clone(), false), encode_gcs(values, false));
    }

    #[test]
    fn double_sha256_matches_two_sha256_passes() {
        let data = b"chain filter";
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn ripemd160_produces_20_bytes() {
        assert_eq!(ripemd160(b"x").len(), 20);
    }
}
