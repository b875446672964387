//! Stage kinds and per-kind bypass flags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChainError;

/// The closed set of effect algorithms a chain position can hold.
///
/// Ordinals are stable: they index per-kind tables and are the integers
/// written by the state codec.
///
/// | Ordinal | Kind | id |
/// |---------|------|----|
/// | 0 | Phaser | `phaser` |
/// | 1 | Chorus | `chorus` |
/// | 2 | Overdrive | `overdrive` |
/// | 3 | LadderFilter | `ladder_filter` |
/// | 4 | ParametricFilter | `parametric_filter` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StageKind {
    /// Swept allpass phaser
    Phaser = 0,
    /// Modulated delay chorus
    Chorus = 1,
    /// tanh overdrive
    Overdrive = 2,
    /// Resonant ladder filter
    LadderFilter = 3,
    /// RBJ parametric filter
    ParametricFilter = 4,
}

impl StageKind {
    /// Number of stage kinds, and therefore the length of every chain order.
    pub const COUNT: usize = 5;

    /// All kinds in ordinal order.
    pub const ALL: [StageKind; Self::COUNT] = [
        StageKind::Phaser,
        StageKind::Chorus,
        StageKind::Overdrive,
        StageKind::LadderFilter,
        StageKind::ParametricFilter,
    ];

    /// Table index of this kind.
    #[inline]
    pub const fn ordinal(self) -> usize {
        self as usize
    }

    /// Kind for a persisted integer.
    pub fn from_ordinal(ordinal: i32) -> Result<Self, ChainError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(ChainError::UnknownStageOrdinal(ordinal))
    }

    /// Stable lowercase identifier.
    pub const fn id(self) -> &'static str {
        match self {
            StageKind::Phaser => "phaser",
            StageKind::Chorus => "chorus",
            StageKind::Overdrive => "overdrive",
            StageKind::LadderFilter => "ladder_filter",
            StageKind::ParametricFilter => "parametric_filter",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            StageKind::Phaser => "Phaser",
            StageKind::Chorus => "Chorus",
            StageKind::Overdrive => "Overdrive",
            StageKind::LadderFilter => "Ladder Filter",
            StageKind::ParametricFilter => "Parametric Filter",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StageKind {
    type Err = ChainError;

    /// Accepts ids case-insensitively, plus the short aliases `ladder`,
    /// `parametric` and `eq`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match name.as_str() {
            "phaser" => Ok(StageKind::Phaser),
            "chorus" => Ok(StageKind::Chorus),
            "overdrive" | "drive" => Ok(StageKind::Overdrive),
            "ladder_filter" | "ladder" => Ok(StageKind::LadderFilter),
            "parametric_filter" | "parametric" | "eq" => Ok(StageKind::ParametricFilter),
            _ => Err(ChainError::UnknownStageName(s.to_string())),
        }
    }
}

/// Per-kind bypass flags, indexed by ordinal.
///
/// Bypass belongs to the kind, not the position: moving a bypassed stage
/// keeps it bypassed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BypassSet([bool; StageKind::COUNT]);

impl BypassSet {
    /// No stage bypassed.
    pub const NONE: Self = Self([false; StageKind::COUNT]);

    /// Build from a predicate over kinds.
    pub fn from_fn(f: impl FnMut(StageKind) -> bool) -> Self {
        Self(StageKind::ALL.map(f))
    }

    /// Whether `kind` runs in pass-through mode.
    #[inline]
    pub fn get(&self, kind: StageKind) -> bool {
        self.0[kind.ordinal()]
    }

    /// Set the flag for `kind`.
    #[inline]
    pub fn set(&mut self, kind: StageKind, bypassed: bool) {
        self.0[kind.ordinal()] = bypassed;
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, kind: StageKind, bypassed: bool) -> Self {
        self.set(kind, bypassed);
        self
    }

    /// Kinds currently bypassed, in ordinal order.
    pub fn bypassed(&self) -> impl Iterator<Item = StageKind> + '_ {
        StageKind::ALL.into_iter().filter(|&kind| self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_stable() {
        for (i, kind) in StageKind::ALL.iter().enumerate() {
            assert_eq!(kind.ordinal(), i);
            assert_eq!(StageKind::from_ordinal(i as i32).unwrap(), *kind);
        }
    }

    #[test]
    fn test_from_ordinal_rejects_out_of_range() {
        for bad in [-1, 5, 42, i32::MIN, i32::MAX] {
            assert!(matches!(
                StageKind::from_ordinal(bad),
                Err(ChainError::UnknownStageOrdinal(n)) if n == bad
            ));
        }
    }

    #[test]
    fn test_parse_ids_and_aliases() {
        for kind in StageKind::ALL {
            assert_eq!(kind.id().parse::<StageKind>().unwrap(), kind);
        }
        assert_eq!("Ladder".parse::<StageKind>().unwrap(), StageKind::LadderFilter);
        assert_eq!("eq".parse::<StageKind>().unwrap(), StageKind::ParametricFilter);
        assert_eq!(
            "parametric-filter".parse::<StageKind>().unwrap(),
            StageKind::ParametricFilter
        );
        assert!(matches!(
            "flanger".parse::<StageKind>(),
            Err(ChainError::UnknownStageName(_))
        ));
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&StageKind::LadderFilter).unwrap();
        assert_eq!(json, "\"ladder_filter\"");
        let back: StageKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StageKind::LadderFilter);
    }

    #[test]
    fn test_bypass_set() {
        let mut set = BypassSet::NONE;
        assert!(!set.get(StageKind::Chorus));
        set.set(StageKind::Chorus, true);
        assert!(set.get(StageKind::Chorus));
        assert_eq!(set.bypassed().collect::<Vec<_>>(), vec![StageKind::Chorus]);

        let all = BypassSet::from_fn(|_| true);
        assert_eq!(all.bypassed().count(), StageKind::COUNT);
        assert_eq!(
            BypassSet::NONE.with(StageKind::Overdrive, true),
            BypassSet::from_fn(|k| k == StageKind::Overdrive)
        );
    }
}
