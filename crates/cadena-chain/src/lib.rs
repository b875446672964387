//! Cadena Chain - a reorderable, real-time safe effect chain
//!
//! Five stages (phaser, chorus, overdrive, ladder filter, parametric
//! filter) run in an order that a control thread may change at any time
//! while the audio thread keeps rendering glitch-free blocks.
//!
//! # Two contexts
//!
//! [`ChainProcessor::new`] returns two halves:
//!
//! - [`ChainProcessor`] for the audio thread. Once per block it drains the
//!   order queue keeping only the newest order, snapshots the parameters and
//!   runs every channel through its stages in the working order. It never
//!   locks, blocks, allocates or fails.
//! - [`ChainController`] for the control thread. It validates and queues
//!   reorders, writes parameters and bypass flags, and saves and restores
//!   state.
//!
//! ```text
//!  control thread                          audio thread
//! ┌──────────────────┐   OrderQueue    ┌──────────────────────┐
//! │ ChainController  │ ──(SPSC, u64)──►│ ChainProcessor       │
//! │  push_order      │                 │  drain_latest        │
//! │  set_param ──────┼─► ChainParams ─►│  snapshot            │
//! │  load_state      │   (atomics)     │  assemble + run      │
//! │  diagnostics  ◄──┼── ChainShared ◄─┤  publish, count      │
//! └──────────────────┘                 └──────────────────────┘
//! ```
//!
//! # Chain orders
//!
//! A [`ChainOrder`] names the [`StageKind`] at each position. Only
//! permutations are ever adopted: the controller rejects anything else with
//! [`ChainError::NotPermutation`], and the processor checks again before
//! adopting. [`ChainOrder::EMPTY`] is a no-op sentinel.
//!
//! Bypass belongs to the kind, not the position, and a bypassed stage keeps
//! running so its state stays warm.
//!
//! # Example
//!
//! ```rust
//! use cadena_chain::{ChainConfig, ChainProcessor, StageKind};
//!
//! let config = ChainConfig::default().with_max_block_size(128);
//! let (mut processor, mut controller) = ChainProcessor::new(&config).unwrap();
//!
//! controller.move_stage(3, 0).unwrap(); // ladder filter first
//! controller.set_bypassed(StageKind::Chorus, true);
//!
//! let mut left = [0.0_f32; 128];
//! let mut right = [0.0_f32; 128];
//! processor.process(&mut [&mut left[..], &mut right[..]]);
//!
//! assert_eq!(processor.working_order().get(0), Some(StageKind::LadderFilter));
//! ```

pub mod assembler;
pub mod codec;
pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod kind;
pub mod order;
pub mod params;
pub mod processor;
pub mod queue;
pub mod registry;
pub mod shared;
pub mod state;

pub use assembler::{Assembly, ExecutionPlan, PlannedStage, assemble};
pub use config::{ChainConfig, MAX_CHANNELS, MAX_QUEUE_CAPACITY, SAMPLE_RATE_RANGE};
pub use controller::ChainController;
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use error::{ChainError, ConfigError};
pub use kind::{BypassSet, StageKind};
pub use order::ChainOrder;
pub use params::{BoolParam, ChainParams, ChoiceParam, FloatParam, ParamRef, ParamSnapshot};
pub use processor::ChainProcessor;
pub use queue::{DEFAULT_QUEUE_CAPACITY, OrderConsumer, OrderProducer, OrderQueue};
pub use registry::{StageRegistry, StageTable};
pub use shared::ChainShared;
pub use state::{ORDER_PROPERTY, PersistedState, RestoreReport, STATE_VERSION};
