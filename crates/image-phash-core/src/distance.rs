//! Hamming distance over fixed-width fingerprints.

use crate::error::{Error, Result};
use crate::types::Fingerprint;

/// Count the differing bit positions between two fingerprints of equal width.
///
/// XOR plus popcount, so the distance is symmetric, zero between identical
/// fingerprints, and satisfies the triangle inequality. Fingerprints of
/// different widths never compare; the call fails with
/// [`Error::WidthMismatch`] instead of truncating or padding.
pub fn hamming_distance(a: &Fingerprint, b: &Fingerprint) -> Result<u32> {
    match (a, b) {
        (Fingerprint::Dct(x), Fingerprint::Dct(y)) => Ok(x.distance(y)),
        (Fingerprint::Mh(x), Fingerprint::Mh(y)) => Ok(x.distance(y)),
        _ => Err(Error::WidthMismatch {
            left: a.bits(),
            right: b.bits(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DctHash, MhHash};

    #[test]
    fn distance_to_self_is_zero() {
        let dct = Fingerprint::Dct(DctHash(0xdead_beef_cafe_f00d));
        assert_eq!(hamming_distance(&dct, &dct).unwrap(), 0);

        let mh = Fingerprint::Mh(MhHash([0x5a; MhHash::BYTES]));
        assert_eq!(hamming_distance(&mh, &mh).unwrap(), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Fingerprint::Dct(DctHash(0x0f0f_0f0f_0f0f_0f0f));
        let b = Fingerprint::Dct(DctHash(0xff00_ff00_ff00_ff00));
        assert_eq!(
            hamming_distance(&a, &b).unwrap(),
            hamming_distance(&b, &a).unwrap()
        );
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = Fingerprint::Dct(DctHash(0));
        let b = Fingerprint::Dct(DctHash(0b1011));
        assert_eq!(hamming_distance(&a, &b).unwrap(), 3);

        let mut bytes = [0u8; MhHash::BYTES];
        bytes[0] = 0xff;
        bytes[71] = 0x01;
        let c = Fingerprint::Mh(MhHash([0u8; MhHash::BYTES]));
        let d = Fingerprint::Mh(MhHash(bytes));
        assert_eq!(hamming_distance(&c, &d).unwrap(), 9);
    }

    #[test]
    fn mixed_widths_always_fail() {
        let dct = Fingerprint::Dct(DctHash(1));
        let mh = Fingerprint::Mh(MhHash([1u8; MhHash::BYTES]));
        match hamming_distance(&dct, &mh) {
            Err(Error::WidthMismatch { left, right }) => {
                assert_eq!((left, right), (64, 576));
            }
            other => panic!("expected width mismatch, got {:?}", other),
        }
        assert!(hamming_distance(&mh, &dct).is_err());
    }

    #[test]
    fn decimal_and_buffer_forms_compare_at_zero() {
        let hash = DctHash(2816561582497829945);
        let from_buffer = Fingerprint::from_bytes(&hash.to_bytes()).unwrap();
        let from_decimal = Fingerprint::from_decimal(&hash.to_decimal_string()).unwrap();
        assert_eq!(hamming_distance(&from_buffer, &from_decimal).unwrap(), 0);
    }
}
