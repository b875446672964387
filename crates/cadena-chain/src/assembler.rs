//! Per-block chain assembly.
//!
//! Given the working order, the stage table of one channel and the bypass
//! flags, [`assemble`] resolves each position to a live stage and returns an
//! [`Assembly`] that runs them in position order over a block.
//!
//! Everything lives in fixed-size arrays sized by [`StageKind::COUNT`]: no
//! allocation, no locks, safe on the audio thread.
//!
//! ```text
//! order:   [ladder, phaser, chorus, overdrive, parametric]
//! table:   [phaser, chorus, overdrive, ladder, parametric]   (by ordinal)
//!                 │
//!                 ▼
//! block ─► ladder ─► phaser ─► chorus ─► overdrive ─► parametric ─► block
//! ```
//!
//! A kind is handed out at most once. An empty position, or a second
//! occurrence of a kind in a malformed order, resolves to no stage and is
//! skipped; [`Assembly::unresolved`] counts those.

use std::fmt;

use cadena_core::Effect;

use crate::{BypassSet, ChainOrder, StageKind, StageTable};

struct Step<'a> {
    kind: StageKind,
    stage: &'a mut dyn Effect,
    bypassed: bool,
}

/// Resolved, ready-to-run chain for one channel and one block.
pub struct Assembly<'a> {
    steps: [Option<Step<'a>>; StageKind::COUNT],
    unresolved: usize,
}

/// Resolve `order` against `table`.
///
/// The bypass flag of each stage is looked up by kind, so a bypassed stage
/// stays bypassed wherever it moves.
pub fn assemble<'a, T>(order: &ChainOrder, table: &'a mut T, bypass: &BypassSet) -> Assembly<'a>
where
    T: StageTable + ?Sized,
{
    let mut pool = table.stages_mut().map(Some);
    let mut unresolved = 0;

    let steps = core::array::from_fn(|position| {
        let step = order.get(position).and_then(|kind| {
            pool[kind.ordinal()].take().map(|stage| Step {
                kind,
                stage,
                bypassed: bypass.get(kind),
            })
        });
        if step.is_none() {
            unresolved += 1;
        }
        step
    });

    Assembly { steps, unresolved }
}

impl Assembly<'_> {
    /// Run every resolved stage over `block`, in place, in position order.
    ///
    /// Bypassed stages still run (and advance their state) but leave the
    /// block untouched.
    #[inline]
    pub fn run(&mut self, block: &mut [f32]) {
        for step in self.steps.iter_mut().flatten() {
            step.stage.process(block, step.bypassed);
        }
    }

    /// Positions that resolved to no stage.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// Plain record of what will run.
    pub fn plan(&self) -> ExecutionPlan {
        ExecutionPlan(self.steps.each_ref().map(|slot| {
            slot.as_ref().map(|step| PlannedStage {
                kind: step.kind,
                bypassed: step.bypassed,
            })
        }))
    }
}

impl fmt::Debug for Assembly<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembly")
            .field("plan", &self.plan())
            .field("unresolved", &self.unresolved)
            .finish()
    }
}

/// One resolved position of an [`ExecutionPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedStage {
    /// Stage kind run at this position
    pub kind: StageKind,
    /// Whether it ran in pass-through mode
    pub bypassed: bool,
}

/// `Copy` snapshot of an assembled chain, for introspection from the
/// control side and in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionPlan([Option<PlannedStage>; StageKind::COUNT]);

impl ExecutionPlan {
    /// Resolved stages in execution order.
    pub fn stages(&self) -> impl Iterator<Item = PlannedStage> + '_ {
        self.0.iter().flatten().copied()
    }

    /// Resolved kinds in execution order.
    pub fn kinds(&self) -> impl Iterator<Item = StageKind> + '_ {
        self.stages().map(|stage| stage.kind)
    }

    /// First stage to run.
    pub fn first(&self) -> Option<StageKind> {
        self.kinds().next()
    }

    /// Last stage to run.
    pub fn last(&self) -> Option<StageKind> {
        self.kinds().last()
    }

    /// Whether nothing has been planned yet.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages().enumerate() {
            if i > 0 {
                f.write_str(" → ")?;
            }
            write!(f, "{}", stage.kind)?;
            if stage.bypassed {
                f.write_str(" (bypassed)")?;
            }
        }
        Ok(())
    }
}
