//! Chain order: which stage kind runs at each position.
//!
//! A [`ChainOrder`] is a small `Copy` value. It crosses threads by value
//! through the [`OrderQueue`](crate::OrderQueue), packed into a single `u64`
//! (one byte per position), so a queued order can never be observed half
//! written.
//!
//! Two special values:
//!
//! - [`ChainOrder::EMPTY`] (also `Default`) has no kind at any position. It
//!   is the "no update" sentinel: the audio thread ignores it.
//! - [`ChainOrder::STANDARD`] runs the kinds in ordinal order.
//!
//! Only permutations (each kind exactly once) are adopted as working orders.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{ChainError, StageKind};

const LEN: usize = StageKind::COUNT;

/// Fixed-length sequence of stage kinds, position 0 first.
///
/// # Example
///
/// ```rust
/// use cadena_chain::{ChainOrder, StageKind};
///
/// let order: ChainOrder = "ladder, phaser, chorus, overdrive, eq".parse().unwrap();
/// assert_eq!(order.get(0), Some(StageKind::LadderFilter));
/// assert!(order.is_permutation());
///
/// let moved = order.with_moved(0, 4).unwrap();
/// assert_eq!(moved.get(4), Some(StageKind::LadderFilter));
/// assert_eq!(moved.get(0), Some(StageKind::Phaser));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChainOrder([Option<StageKind>; LEN]);

impl ChainOrder {
    /// The no-op sentinel: no kind at any position.
    pub const EMPTY: Self = Self([None; LEN]);

    /// Kinds in ordinal order.
    pub const STANDARD: Self = Self::new(StageKind::ALL);

    /// Order from a complete sequence of kinds. Not validated.
    pub const fn new(kinds: [StageKind; LEN]) -> Self {
        let mut slots = [None; LEN];
        let mut i = 0;
        while i < LEN {
            slots[i] = Some(kinds[i]);
            i += 1;
        }
        Self(slots)
    }

    /// Order from raw positions, empty positions allowed. Not validated.
    pub const fn from_slots(slots: [Option<StageKind>; LEN]) -> Self {
        Self(slots)
    }

    /// Uniformly random permutation.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut kinds = StageKind::ALL;
        kinds.shuffle(rng);
        Self::new(kinds)
    }

    /// Kind at `position`, `None` for an empty or out-of-range position.
    #[inline]
    pub fn get(&self, position: usize) -> Option<StageKind> {
        self.0.get(position).copied().flatten()
    }

    /// Raw positions.
    pub fn slots(&self) -> &[Option<StageKind>; LEN] {
        &self.0
    }

    /// Positions in execution order.
    pub fn iter(&self) -> impl Iterator<Item = Option<StageKind>> + '_ {
        self.0.iter().copied()
    }

    /// Position of the first occurrence of `kind`.
    pub fn position_of(&self, kind: StageKind) -> Option<usize> {
        self.0.iter().position(|&slot| slot == Some(kind))
    }

    /// Whether this is the [`EMPTY`](Self::EMPTY) sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// Whether every kind appears exactly once.
    ///
    /// Allocation-free and branch-light; safe to call on the audio thread.
    #[inline]
    pub fn is_permutation(&self) -> bool {
        let mut mask = 0u32;
        for slot in self.0 {
            let Some(kind) = slot else {
                return false;
            };
            mask |= 1 << kind.ordinal();
        }
        mask == (1 << LEN) - 1
    }

    /// Check that every kind appears exactly once, naming the first
    /// duplicate and first missing kind otherwise.
    pub fn validate(&self) -> Result<(), ChainError> {
        let mut seen = [false; LEN];
        let mut duplicate = None;
        for kind in self.0.into_iter().flatten() {
            if seen[kind.ordinal()] {
                duplicate.get_or_insert(kind);
            }
            seen[kind.ordinal()] = true;
        }
        let missing = StageKind::ALL.into_iter().find(|k| !seen[k.ordinal()]);

        if duplicate.is_none() && missing.is_none() {
            Ok(())
        } else {
            Err(ChainError::NotPermutation { duplicate, missing })
        }
    }

    /// Copy with the stage at `from` moved to `to`, the stages between
    /// shifting by one. This is a drag-and-drop reorder.
    pub fn with_moved(&self, from: usize, to: usize) -> Result<Self, ChainError> {
        check_position(from)?;
        check_position(to)?;
        let mut slots = self.0;
        if from < to {
            slots[from..=to].rotate_left(1);
        } else {
            slots[to..=from].rotate_right(1);
        }
        Ok(Self(slots))
    }

    /// Copy with positions `a` and `b` exchanged.
    pub fn with_swapped(&self, a: usize, b: usize) -> Result<Self, ChainError> {
        check_position(a)?;
        check_position(b)?;
        let mut slots = self.0;
        slots.swap(a, b);
        Ok(Self(slots))
    }

    /// Pack into one byte per position: 0 empty, ordinal + 1 otherwise.
    pub(crate) fn to_bits(self) -> u64 {
        self.0.iter().enumerate().fold(0u64, |bits, (i, slot)| {
            let byte = slot.map_or(0, |kind| kind.ordinal() as u64 + 1);
            bits | (byte << (8 * i))
        })
    }

    /// Inverse of [`to_bits`](Self::to_bits). Unknown bytes read as empty.
    pub(crate) fn from_bits(bits: u64) -> Self {
        Self(core::array::from_fn(|i| {
            let byte = ((bits >> (8 * i)) & 0xff) as usize;
            byte.checked_sub(1).and_then(|o| StageKind::ALL.get(o).copied())
        }))
    }
}

fn check_position(position: usize) -> Result<(), ChainError> {
    if position < LEN {
        Ok(())
    } else {
        Err(ChainError::PositionOutOfRange { position, len: LEN })
    }
}

impl TryFrom<&[StageKind]> for ChainOrder {
    type Error = ChainError;

    /// Validated order from a list naming every kind once.
    fn try_from(kinds: &[StageKind]) -> Result<Self, Self::Error> {
        if kinds.len() != LEN {
            return Err(ChainError::InvalidOrderLength {
                expected: LEN,
                found: kinds.len(),
            });
        }
        let order = Self(core::array::from_fn(|i| Some(kinds[i])));
        order.validate()?;
        Ok(order)
    }
}

impl FromStr for ChainOrder {
    type Err = ChainError;

    /// Parse a comma-separated list of stage names into a validated order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = s
            .split(',')
            .map(str::parse::<StageKind>)
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(kinds.as_slice())
    }
}

impl fmt::Display for ChainOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(empty)");
        }
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" → ")?;
            }
            match slot {
                Some(kind) => write!(f, "{kind}")?,
                None => f.write_str("-")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use StageKind::{Chorus, LadderFilter, Overdrive, ParametricFilter, Phaser};

    #[test]
    fn test_empty_is_default() {
        assert_eq!(ChainOrder::default(), ChainOrder::EMPTY);
        assert!(ChainOrder::EMPTY.is_empty());
        assert!(!ChainOrder::EMPTY.is_permutation());
        assert!(!ChainOrder::STANDARD.is_empty());
    }

    #[test]
    fn test_standard_is_ordinal_order() {
        for (i, kind) in StageKind::ALL.iter().enumerate() {
            assert_eq!(ChainOrder::STANDARD.get(i), Some(*kind));
        }
        assert!(ChainOrder::STANDARD.is_permutation());
        assert!(ChainOrder::STANDARD.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_duplicate_and_missing() {
        let order = ChainOrder::new([Phaser, Chorus, Chorus, LadderFilter, ParametricFilter]);
        assert!(!order.is_permutation());
        match order.validate() {
            Err(ChainError::NotPermutation { duplicate, missing }) => {
                assert_eq!(duplicate, Some(Chorus));
                assert_eq!(missing, Some(Overdrive));
            }
            other => panic!("expected NotPermutation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_position() {
        let order = ChainOrder::from_slots([
            Some(Phaser),
            Some(Chorus),
            None,
            Some(Overdrive),
            Some(LadderFilter),
        ]);
        assert!(matches!(
            order.validate(),
            Err(ChainError::NotPermutation {
                duplicate: None,
                missing: Some(ParametricFilter)
            })
        ));
    }

    #[test]
    fn test_with_moved() {
        let order = ChainOrder::STANDARD;
        let moved = order.with_moved(3, 0).unwrap();
        assert_eq!(
            moved,
            ChainOrder::new([LadderFilter, Phaser, Chorus, Overdrive, ParametricFilter])
        );
        assert_eq!(moved.position_of(LadderFilter), Some(0));
        assert_eq!(moved.position_of(Overdrive), Some(3));
        assert_eq!(ChainOrder::EMPTY.position_of(Phaser), None);
        assert_eq!(moved.with_moved(0, 3).unwrap(), order);
        assert_eq!(order.with_moved(2, 2).unwrap(), order);
        assert!(matches!(
            order.with_moved(5, 0),
            Err(ChainError::PositionOutOfRange { position: 5, len: 5 })
        ));
    }

    #[test]
    fn test_with_swapped() {
        let swapped = ChainOrder::STANDARD.with_swapped(0, 4).unwrap();
        assert_eq!(swapped.get(0), Some(ParametricFilter));
        assert_eq!(swapped.get(4), Some(Phaser));
        assert!(swapped.is_permutation());
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(ChainOrder::shuffled(&mut rng).is_permutation());
        }
    }

    #[test]
    fn test_bits_roundtrip() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let order = ChainOrder::shuffled(&mut rng);
            assert_eq!(ChainOrder::from_bits(order.to_bits()), order);
        }
        assert_eq!(ChainOrder::EMPTY.to_bits(), 0);
        assert_eq!(ChainOrder::from_bits(0), ChainOrder::EMPTY);
        let partial = ChainOrder::from_slots([None, Some(Overdrive), None, None, Some(Phaser)]);
        assert_eq!(ChainOrder::from_bits(partial.to_bits()), partial);
    }

    #[test]
    fn test_parse() {
        let order: ChainOrder = "ladder,phaser,chorus,overdrive,parametric".parse().unwrap();
        assert_eq!(
            order,
            ChainOrder::new([LadderFilter, Phaser, Chorus, Overdrive, ParametricFilter])
        );
        assert!(matches!(
            "phaser,chorus".parse::<ChainOrder>(),
            Err(ChainError::InvalidOrderLength { expected: 5, found: 2 })
        ));
        assert!(matches!(
            "phaser,phaser,chorus,overdrive,eq".parse::<ChainOrder>(),
            Err(ChainError::NotPermutation { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ChainOrder::STANDARD.to_string(),
            "phaser → chorus → overdrive → ladder_filter → parametric_filter"
        );
        assert_eq!(ChainOrder::EMPTY.to_string(), "(empty)");
    }
}
