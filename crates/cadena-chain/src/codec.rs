//! Persisted form of a chain order.
//!
//! An order is stored as one signed 32-bit integer per position, in
//! position order, each integer being a [`StageKind`] ordinal. In byte form
//! every integer is 4 bytes little-endian, so a complete order is
//! `4 * StageKind::COUNT` bytes.
//!
//! Decoding is strict: wrong length, unknown ordinals and non-permutations
//! are all errors, and a decoded order is always safe to push.

use crate::{ChainError, ChainOrder, StageKind};

/// Bytes per persisted integer.
const INT_BYTES: usize = 4;

/// Integer form of `order`: ordinal per position, `-1` for an empty
/// position.
///
/// # Example
///
/// ```rust
/// use cadena_chain::{ChainOrder, codec};
///
/// assert_eq!(codec::encode_order(&ChainOrder::STANDARD), vec![0, 1, 2, 3, 4]);
/// ```
pub fn encode_order(order: &ChainOrder) -> Vec<i32> {
    order
        .iter()
        .map(|slot| slot.map_or(-1, |kind| kind.ordinal() as i32))
        .collect()
}

/// Order from its integer form.
///
/// Fails with [`ChainError::InvalidOrderLength`] unless there is exactly one
/// integer per stage kind, [`ChainError::UnknownStageOrdinal`] for an
/// integer outside the kind range, and [`ChainError::NotPermutation`] when a
/// kind repeats.
pub fn decode_order(ints: &[i32]) -> Result<ChainOrder, ChainError> {
    if ints.len() != StageKind::COUNT {
        return Err(ChainError::InvalidOrderLength {
            expected: StageKind::COUNT,
            found: ints.len(),
        });
    }
    let kinds = ints
        .iter()
        .map(|&ordinal| StageKind::from_ordinal(ordinal))
        .collect::<Result<Vec<_>, _>>()?;
    ChainOrder::try_from(kinds.as_slice())
}

/// Byte form of `order`: [`encode_order`] with each integer little-endian.
pub fn order_to_bytes(order: &ChainOrder) -> Vec<u8> {
    encode_order(order)
        .into_iter()
        .flat_map(i32::to_le_bytes)
        .collect()
}

/// Order from its byte form.
///
/// A byte length that is not a whole number of integers, or not one integer
/// per kind, is [`ChainError::InvalidOrderLength`] (counted in integers,
/// a trailing partial integer counting as one).
pub fn order_from_bytes(bytes: &[u8]) -> Result<ChainOrder, ChainError> {
    if bytes.len() != INT_BYTES * StageKind::COUNT {
        return Err(ChainError::InvalidOrderLength {
            expected: StageKind::COUNT,
            found: bytes.len().div_ceil(INT_BYTES),
        });
    }
    let ints: Vec<i32> = bytes
        .chunks_exact(INT_BYTES)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    decode_order(&ints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageKind::{Chorus, LadderFilter, Overdrive, ParametricFilter, Phaser};

    #[test]
    fn encode_is_ordinals_in_position_order() {
        let order = ChainOrder::new([LadderFilter, Phaser, Chorus, Overdrive, ParametricFilter]);
        assert_eq!(encode_order(&order), vec![3, 0, 1, 2, 4]);
        assert_eq!(decode_order(&[3, 0, 1, 2, 4]).unwrap(), order);
    }

    #[test]
    fn short_order_is_rejected() {
        assert!(matches!(
            decode_order(&[0, 1, 2]),
            Err(ChainError::InvalidOrderLength {
                expected: 5,
                found: 3
            })
        ));
        assert!(matches!(
            decode_order(&[]),
            Err(ChainError::InvalidOrderLength { found: 0, .. })
        ));
    }

    #[test]
    fn unknown_ordinal_is_rejected() {
        assert!(matches!(
            decode_order(&[0, 1, 2, 3, 7]),
            Err(ChainError::UnknownStageOrdinal(7))
        ));
        assert!(matches!(
            decode_order(&[-1, 1, 2, 3, 4]),
            Err(ChainError::UnknownStageOrdinal(-1))
        ));
    }

    #[test]
    fn duplicate_is_rejected() {
        assert!(matches!(
            decode_order(&[0, 0, 2, 3, 4]),
            Err(ChainError::NotPermutation {
                duplicate: Some(Phaser),
                missing: Some(Chorus)
            })
        ));
    }

    #[test]
    fn bytes_are_little_endian() {
        let bytes = order_to_bytes(&ChainOrder::STANDARD);
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(order_from_bytes(&bytes).unwrap(), ChainOrder::STANDARD);
    }

    #[test]
    fn byte_length_is_checked() {
        assert!(matches!(
            order_from_bytes(&[0; 12]),
            Err(ChainError::InvalidOrderLength { found: 3, .. })
        ));
        assert!(matches!(
            order_from_bytes(&[0; 21]),
            Err(ChainError::InvalidOrderLength { found: 6, .. })
        ));
    }

    #[test]
    fn empty_order_encodes_but_does_not_decode() {
        let ints = encode_order(&ChainOrder::EMPTY);
        assert_eq!(ints, vec![-1; 5]);
        assert!(decode_order(&ints).is_err());
    }
}
