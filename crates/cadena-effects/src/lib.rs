//! Cadena Effects - the stage kinds of the cadena chain
//!
//! Every stage implements [`cadena_core::Effect`] and is driven once per
//! block through a plain `Copy` settings value:
//!
//! | Stage | Settings | Character |
//! |-------|----------|-----------|
//! | [`Phaser`] | [`PhaserSettings`] | Six LFO-swept allpass sections with feedback |
//! | [`Chorus`] | [`ChorusSettings`] | LFO-modulated delay with feedback |
//! | [`Overdrive`] | [`OverdriveSettings`] | tanh saturation with level compensation |
//! | [`LadderFilter`] | [`LadderSettings`] | Four-pole resonant ladder, six modes |
//! | [`ParametricFilter`] | [`ParametricSettings`] | RBJ biquad: peak, band-pass, notch, all-pass |
//!
//! `apply` is cheap when nothing changed, so callers may hand every stage its
//! settings at every block.
//!
//! # Example
//!
//! ```rust
//! use cadena_core::{Effect, ProcessSpec};
//! use cadena_effects::{Overdrive, OverdriveSettings};
//!
//! let mut drive = Overdrive::default();
//! drive.prepare(&ProcessSpec::mono(48000.0, 64));
//! drive.apply(&OverdriveSettings { saturation: 20.0 });
//!
//! let mut block = [0.5_f32; 64];
//! drive.process(&mut block, false);
//! assert!(block.iter().all(|s| s.abs() < 1.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chorus;
pub mod ladder;
pub mod overdrive;
pub mod parametric;
pub mod phaser;

pub use chorus::{Chorus, ChorusSettings};
pub use ladder::{LadderFilter, LadderMode, LadderSettings};
pub use overdrive::{Overdrive, OverdriveSettings};
pub use parametric::{ParametricFilter, ParametricMode, ParametricSettings};
pub use phaser::{Phaser, PhaserSettings};
