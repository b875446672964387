//! Control-side half of the chain.
//!
//! [`ChainController`] is owned by whichever thread issues reorders,
//! parameter changes and state restores. It is the only writer of the order
//! queue. Everything here may allocate and log; nothing here is called from
//! the audio thread.

use std::sync::Arc;

use rand::Rng;

use crate::state::{PersistedState, RestoreReport};
use crate::{
    ChainError, ChainOrder, ChainParams, ChainShared, DiagnosticsSnapshot, OrderProducer,
    StageKind,
};

/// Control-thread handle of a chain.
pub struct ChainController {
    producer: OrderProducer,
    params: Arc<ChainParams>,
    shared: Arc<ChainShared>,
    /// Last order accepted by the queue, possibly not yet adopted.
    pending: Option<ChainOrder>,
}

impl ChainController {
    pub(crate) fn new(
        producer: OrderProducer,
        params: Arc<ChainParams>,
        shared: Arc<ChainShared>,
    ) -> Self {
        Self {
            producer,
            params,
            shared,
            pending: None,
        }
    }

    // ── Ordering ─────────────────────────────────────────────────────────

    /// Queue `order` for adoption at the next block.
    ///
    /// Non-permutations are rejected here and never reach the audio thread.
    /// [`ChainOrder::EMPTY`] is queued as a no-op; as the newest entry it
    /// makes the audio thread skip anything queued before it, so it also
    /// clears the pending order. When the queue is full the update is
    /// dropped and counted, and [`ChainError::QueueFull`] is returned for
    /// the caller to retry or give up.
    pub fn push_order(&mut self, order: ChainOrder) -> Result<(), ChainError> {
        match self.producer.push(order) {
            Ok(()) => {
                self.pending = (!order.is_empty()).then_some(order);
                tracing::debug!(%order, "chain order queued");
                Ok(())
            }
            Err(ChainError::QueueFull) => {
                self.shared.diagnostics().push_dropped();
                tracing::warn!(%order, "order queue full, update dropped");
                Err(ChainError::QueueFull)
            }
            Err(e) => {
                tracing::warn!(%order, error = %e, "chain order rejected");
                Err(e)
            }
        }
    }

    /// Move the stage at `from` to `to`, shifting the stages between.
    pub fn move_stage(&mut self, from: usize, to: usize) -> Result<ChainOrder, ChainError> {
        let order = self.current_order().with_moved(from, to)?;
        self.push_order(order)?;
        Ok(order)
    }

    /// Exchange the stages at positions `a` and `b`.
    pub fn swap_stages(&mut self, a: usize, b: usize) -> Result<ChainOrder, ChainError> {
        let order = self.current_order().with_swapped(a, b)?;
        self.push_order(order)?;
        Ok(order)
    }

    /// Queue a uniformly random permutation.
    pub fn randomize_order<R>(&mut self, rng: &mut R) -> Result<ChainOrder, ChainError>
    where
        R: Rng + ?Sized,
    {
        let order = ChainOrder::shuffled(rng);
        self.push_order(order)?;
        Ok(order)
    }

    /// The order the chain is heading to: the last accepted push, or the
    /// published working order when nothing has been pushed.
    pub fn current_order(&self) -> ChainOrder {
        self.pending.unwrap_or_else(|| self.published_order())
    }

    /// Order most recently adopted by the audio thread.
    pub fn published_order(&self) -> ChainOrder {
        self.shared.published_order()
    }

    /// Orders queued and not yet drained.
    pub fn queued(&self) -> usize {
        self.producer.len()
    }

    #[cfg(test)]
    pub(crate) fn push_unchecked(&mut self, order: ChainOrder) -> bool {
        self.producer.push_unchecked(order)
    }

    // ── Parameters ───────────────────────────────────────────────────────

    /// Switch `kind` between active and pass-through. Takes effect at the
    /// next block.
    pub fn set_bypassed(&self, kind: StageKind, bypassed: bool) {
        self.params.set_bypassed(kind, bypassed);
        tracing::debug!(stage = %kind, bypassed, "bypass changed");
    }

    /// Whether `kind` is in pass-through mode.
    pub fn is_bypassed(&self, kind: StageKind) -> bool {
        self.params.is_bypassed(kind)
    }

    /// Set a parameter by id, clamped to its range.
    pub fn set_param(&self, id: &str, value: f32) -> Result<(), ChainError> {
        self.params.set_plain(id, value)
    }

    /// The shared parameter set.
    pub fn params(&self) -> &Arc<ChainParams> {
        &self.params
    }

    // ── State ────────────────────────────────────────────────────────────

    /// Serialize every parameter and the current order.
    pub fn save_state(&self) -> Result<Vec<u8>, ChainError> {
        PersistedState::capture(&self.params, &self.current_order()).to_bytes()
    }

    /// Restore a state written by [`save_state`](Self::save_state).
    ///
    /// An unreadable document or unknown version changes nothing and is
    /// returned as an error. Otherwise parameters are restored first, then
    /// the persisted order is decoded on its own: a damaged order is logged
    /// and reported in [`RestoreReport::order_error`] while the current
    /// order and the restored parameters stay. A good order goes through the
    /// queue like any other reorder.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<RestoreReport, ChainError> {
        let state = PersistedState::from_bytes(bytes)?;

        let ignored = state.apply_params(&self.params);
        for id in &ignored {
            tracing::warn!(id = %id, "ignoring unknown parameter in saved state");
        }
        let mut report = RestoreReport {
            params_restored: state.params.len() - ignored.len(),
            params_ignored: ignored,
            ..RestoreReport::default()
        };

        match state.order() {
            None => tracing::debug!("saved state has no chain order"),
            Some(Ok(order)) => match self.push_order(order) {
                Ok(()) => report.order = Some(order),
                Err(e) => report.order_error = Some(e),
            },
            Some(Err(e)) => {
                if matches!(e, ChainError::UnknownStageOrdinal(_)) {
                    tracing::error!(error = %e, "saved chain order ignored");
                } else {
                    tracing::warn!(error = %e, "saved chain order ignored");
                }
                report.order_error = Some(e);
            }
        }

        tracing::info!(
            params = report.params_restored,
            order_restored = report.order.is_some(),
            "state restored"
        );
        Ok(report)
    }

    // ── Diagnostics ──────────────────────────────────────────────────────

    /// Current counter values.
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.shared.diagnostics().snapshot()
    }

    /// Emit the counters as an `info` event.
    pub fn log_diagnostics(&self) {
        let snapshot = self.diagnostics();
        tracing::info!(
            blocks = snapshot.blocks_processed,
            adopted = snapshot.orders_adopted,
            rejected = snapshot.orders_rejected,
            skipped = snapshot.positions_skipped,
            dropped = snapshot.pushes_dropped,
            order = %self.published_order(),
            "chain diagnostics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChainConfig, ChainProcessor};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pair() -> (ChainProcessor, ChainController) {
        let config = ChainConfig::default()
            .with_channels(1)
            .with_max_block_size(16);
        ChainProcessor::new(&config).unwrap()
    }

    fn render(processor: &mut ChainProcessor) {
        let mut block = [0.0_f32; 16];
        processor.process(&mut [&mut block[..]]);
    }

    #[test]
    fn current_order_tracks_pending_push() {
        let (mut processor, mut controller) = pair();
        let moved = controller.move_stage(0, 4).unwrap();
        assert_eq!(controller.current_order(), moved);
        assert_eq!(controller.published_order(), ChainOrder::STANDARD);
        assert_eq!(controller.queued(), 1);

        render(&mut processor);
        assert_eq!(controller.published_order(), moved);
        assert_eq!(controller.queued(), 0);
    }

    #[test]
    fn consecutive_edits_build_on_each_other() {
        let (mut processor, mut controller) = pair();
        controller.swap_stages(0, 1).unwrap();
        let second = controller.swap_stages(1, 2).unwrap();
        render(&mut processor);
        assert_eq!(
            processor.working_order(),
            ChainOrder::new([
                StageKind::Chorus,
                StageKind::Overdrive,
                StageKind::Phaser,
                StageKind::LadderFilter,
                StageKind::ParametricFilter,
            ])
        );
        assert_eq!(processor.working_order(), second);
    }

    #[test]
    fn invalid_push_changes_nothing() {
        let (_processor, mut controller) = pair();
        let bad = ChainOrder::new([StageKind::Phaser; StageKind::COUNT]);
        assert!(matches!(
            controller.push_order(bad),
            Err(ChainError::NotPermutation { .. })
        ));
        assert_eq!(controller.current_order(), ChainOrder::STANDARD);
        assert_eq!(controller.queued(), 0);
        assert!(controller.move_stage(0, 9).is_err());
    }

    #[test]
    fn full_queue_is_counted() {
        let config = ChainConfig {
            queue_capacity: 2,
            ..ChainConfig::default()
        };
        let (_processor, mut controller) = ChainProcessor::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        controller.randomize_order(&mut rng).unwrap();
        controller.randomize_order(&mut rng).unwrap();
        assert!(matches!(
            controller.randomize_order(&mut rng),
            Err(ChainError::QueueFull)
        ));
        assert_eq!(controller.diagnostics().pushes_dropped, 1);
    }

    #[test]
    fn state_roundtrip_through_queue() {
        let (mut processor, mut controller) = pair();
        controller.set_param("ladder_cutoff_hz", 640.0).unwrap();
        controller.set_bypassed(StageKind::Phaser, true);
        let order = controller.move_stage(2, 0).unwrap();
        render(&mut processor);
        let saved = controller.save_state().unwrap();

        let (mut processor2, mut controller2) = pair();
        let report = controller2.load_state(&saved).unwrap();
        assert!(report.is_complete());
        assert_eq!(report.order, Some(order));
        assert_eq!(controller2.params().ladder.cutoff_hz.get(), 640.0);
        assert!(controller2.is_bypassed(StageKind::Phaser));

        // Adopted at the next drain, not before
        assert_eq!(processor2.working_order(), ChainOrder::STANDARD);
        render(&mut processor2);
        assert_eq!(processor2.working_order(), order);
    }

    #[test]
    fn damaged_order_keeps_params() {
        let (_processor, mut controller) = pair();
        let json = br#"{
            "version": 1,
            "params": { "overdrive_saturation": 30.0 },
            "properties": {
                "dsp_order": [0, 0, 0, 0, 9, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0]
            }
        }"#;
        let report = controller.load_state(json).unwrap();
        assert!(matches!(report.order_error, Some(ChainError::UnknownStageOrdinal(9))));
        assert!(!report.is_complete());
        assert_eq!(report.params_restored, 1);
        assert_eq!(controller.params().overdrive.saturation.get(), 30.0);
        assert_eq!(controller.queued(), 0);
    }
}
