//! Audio-side half of the chain.
//!
//! [`ChainProcessor`] lives on the audio thread. Once per block it:
//!
//! 1. drains the order queue, keeping only the newest entry
//! 2. adopts that entry as the working order if it is a permutation (the
//!    empty sentinel and an empty queue leave the working order alone)
//! 3. snapshots the parameters
//! 4. per channel, hands the settings to that channel's stages, assembles
//!    them in working order and runs the block through them
//!
//! `process` never fails, never blocks and never allocates. Anomalies are
//! counted in [`Diagnostics`](crate::Diagnostics) instead of logged.

use std::sync::Arc;

use cadena_core::ProcessSpec;

use crate::{
    ChainConfig, ChainController, ChainError, ChainOrder, ChainParams, ChainShared,
    ExecutionPlan, OrderConsumer, OrderQueue, StageRegistry, assemble,
};

/// Audio-thread processor.
///
/// # Example
///
/// ```rust
/// use cadena_chain::{ChainConfig, ChainOrder, ChainProcessor, StageKind};
///
/// let config = ChainConfig::default().with_channels(1).with_max_block_size(64);
/// let (mut processor, mut controller) = ChainProcessor::new(&config).unwrap();
///
/// let order: ChainOrder = "ladder, phaser, chorus, overdrive, eq".parse().unwrap();
/// controller.push_order(order).unwrap();
///
/// let mut block = [0.1_f32; 64];
/// processor.process(&mut [&mut block[..]]);
///
/// assert_eq!(processor.working_order(), order);
/// assert_eq!(processor.last_plan().first(), Some(StageKind::LadderFilter));
/// assert_eq!(controller.published_order(), order);
/// ```
pub struct ChainProcessor {
    consumer: OrderConsumer,
    working: ChainOrder,
    /// One registry per channel, never shared.
    registries: Vec<StageRegistry>,
    params: Arc<ChainParams>,
    shared: Arc<ChainShared>,
    last_plan: ExecutionPlan,
    spec: ProcessSpec,
}

impl ChainProcessor {
    /// Build a prepared processor and its controller from `config`.
    ///
    /// Configured parameter values and bypass flags are applied before the
    /// stages are reset, so the first block starts at those settings rather
    /// than gliding to them.
    pub fn new(config: &ChainConfig) -> Result<(Self, ChainController), ChainError> {
        config.validate()?;
        let order = config.initial_order()?;

        let params = Arc::new(ChainParams::new());
        for (id, &value) in &config.params {
            params.set_plain(id, value)?;
        }
        for &kind in &config.bypass {
            params.set_bypassed(kind, true);
        }

        let shared = Arc::new(ChainShared::new(order));
        let (producer, consumer) = OrderQueue::with_capacity(config.queue_capacity);
        let spec = ProcessSpec {
            sample_rate: config.sample_rate,
            max_block_size: config.max_block_size,
            channels: config.channels,
        };

        let mut processor = Self {
            consumer,
            working: order,
            registries: Vec::new(),
            params: Arc::clone(&params),
            shared: Arc::clone(&shared),
            last_plan: ExecutionPlan::default(),
            spec,
        };
        processor.prepare(spec);

        tracing::info!(
            sample_rate = spec.sample_rate,
            max_block_size = spec.max_block_size,
            channels = spec.channels,
            queue_capacity = producer.capacity(),
            order = %order,
            "chain processor ready"
        );

        let controller = ChainController::new(producer, params, shared);
        Ok((processor, controller))
    }

    /// Prepare for a new sample rate, block size or channel count.
    ///
    /// Control context only: may allocate when channels are added. Stage
    /// state is cleared and current settings take effect immediately.
    pub fn prepare(&mut self, spec: ProcessSpec) {
        let mono = ProcessSpec::mono(spec.sample_rate, spec.max_block_size);
        self.registries
            .resize_with(spec.channels, || StageRegistry::new(&mono));

        let snapshot = self.params.snapshot();
        for registry in &mut self.registries {
            registry.prepare(&mono);
            registry.apply(&snapshot);
            registry.reset();
        }
        self.spec = spec;
        tracing::debug!(channels = spec.channels, sample_rate = spec.sample_rate, "prepared");
    }

    /// Clear all stage state, keeping settings and order.
    pub fn reset(&mut self) {
        for registry in &mut self.registries {
            registry.reset();
        }
    }

    /// Render one block in place.
    ///
    /// `channels[i]` is processed by channel `i`'s stages. Buffers beyond the
    /// prepared channel count pass through untouched.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        if let Some(order) = self.consumer.drain_latest() {
            self.adopt(order);
        }

        let snapshot = self.params.snapshot();
        let diagnostics = self.shared.diagnostics();

        for (registry, block) in self.registries.iter_mut().zip(channels.iter_mut()) {
            registry.apply(&snapshot);
            let mut assembly = assemble(&self.working, registry, &snapshot.bypass);

            // The working order is always a permutation
            debug_assert_eq!(assembly.unresolved(), 0, "unresolved chain position");
            diagnostics.positions_skipped(assembly.unresolved());

            assembly.run(block);
            self.last_plan = assembly.plan();
        }

        diagnostics.block_processed();
    }

    fn adopt(&mut self, order: ChainOrder) {
        if order.is_empty() {
            return;
        }
        let diagnostics = self.shared.diagnostics();
        if !order.is_permutation() {
            diagnostics.order_rejected();
            return;
        }
        self.working = order;
        self.shared.publish(order);
        diagnostics.order_adopted();
    }

    /// Order the chain currently runs in.
    pub fn working_order(&self) -> ChainOrder {
        self.working
    }

    /// What ran during the last block (last channel).
    pub fn last_plan(&self) -> ExecutionPlan {
        self.last_plan
    }

    /// Spec from the last [`prepare`](Self::prepare).
    pub fn spec(&self) -> ProcessSpec {
        self.spec
    }

    /// Channel `index`'s stages.
    pub fn registry(&self, index: usize) -> Option<&StageRegistry> {
        self.registries.get(index)
    }

    /// Total chain latency in samples.
    pub fn latency_samples(&self) -> usize {
        self.registries
            .first()
            .map_or(0, StageRegistry::latency_samples)
    }
}
