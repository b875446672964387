//! Per-channel ownership of one instance of every stage kind.

use cadena_core::{Effect, ProcessSpec};
use cadena_effects::{Chorus, LadderFilter, Overdrive, ParametricFilter, Phaser};

use crate::{ParamSnapshot, StageKind};

/// Lookup from stage kind to a live stage, used by the assembler.
///
/// `stages_mut` hands out every stage at once, indexed by ordinal, so the
/// assembler can distribute disjoint `&mut` borrows without allocating.
pub trait StageTable {
    /// Every stage, `[i]` being the stage of kind ordinal `i`.
    fn stages_mut(&mut self) -> [&mut dyn Effect; StageKind::COUNT];
}

/// One channel's stages.
///
/// Constructed once per channel and kept for the life of the processor, so
/// stage state (delay lines, filter memories, LFO phase) survives any number
/// of reorders. Stages are never shared between channels.
#[derive(Debug, Clone)]
pub struct StageRegistry {
    phaser: Phaser,
    chorus: Chorus,
    overdrive: Overdrive,
    ladder: LadderFilter,
    parametric: ParametricFilter,
    spec: ProcessSpec,
}

impl StageRegistry {
    /// Construct, prepare and reset every stage for `spec` (forced to one
    /// channel).
    pub fn new(spec: &ProcessSpec) -> Self {
        let mut registry = Self {
            phaser: Phaser::new(spec.sample_rate),
            chorus: Chorus::new(spec.sample_rate),
            overdrive: Overdrive::new(spec.sample_rate),
            ladder: LadderFilter::new(spec.sample_rate),
            parametric: ParametricFilter::new(spec.sample_rate),
            spec: *spec,
        };
        registry.prepare(spec);
        registry
    }

    /// Prepare every stage. May allocate (delay lines); control context only.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        let mono = ProcessSpec::mono(spec.sample_rate, spec.max_block_size);
        self.spec = mono;
        for stage in self.stages_mut() {
            stage.prepare(&mono);
        }
    }

    /// Clear every stage's state.
    pub fn reset(&mut self) {
        for stage in self.stages_mut() {
            stage.reset();
        }
    }

    /// Hand each stage its settings from this block's snapshot.
    #[inline]
    pub fn apply(&mut self, snapshot: &ParamSnapshot) {
        self.phaser.apply(&snapshot.phaser);
        self.chorus.apply(&snapshot.chorus);
        self.overdrive.apply(&snapshot.overdrive);
        self.ladder.apply(&snapshot.ladder);
        self.parametric.apply(&snapshot.parametric);
    }

    /// Stage of `kind`.
    pub fn stage(&self, kind: StageKind) -> &dyn Effect {
        match kind {
            StageKind::Phaser => &self.phaser,
            StageKind::Chorus => &self.chorus,
            StageKind::Overdrive => &self.overdrive,
            StageKind::LadderFilter => &self.ladder,
            StageKind::ParametricFilter => &self.parametric,
        }
    }

    /// Mutable stage of `kind`.
    pub fn stage_mut(&mut self, kind: StageKind) -> &mut dyn Effect {
        match kind {
            StageKind::Phaser => &mut self.phaser,
            StageKind::Chorus => &mut self.chorus,
            StageKind::Overdrive => &mut self.overdrive,
            StageKind::LadderFilter => &mut self.ladder,
            StageKind::ParametricFilter => &mut self.parametric,
        }
    }

    /// Total latency of all stages in samples.
    pub fn latency_samples(&self) -> usize {
        StageKind::ALL
            .iter()
            .map(|&kind| self.stage(kind).latency_samples())
            .sum()
    }

    /// Spec the stages were last prepared with.
    pub fn spec(&self) -> ProcessSpec {
        self.spec
    }
}

impl StageTable for StageRegistry {
    fn stages_mut(&mut self) -> [&mut dyn Effect; StageKind::COUNT] {
        [
            &mut self.phaser,
            &mut self.chorus,
            &mut self.overdrive,
            &mut self.ladder,
            &mut self.parametric,
        ]
    }
}
