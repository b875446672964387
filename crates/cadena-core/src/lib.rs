//! Cadena Core - DSP primitives and the processing-stage capability
//!
//! This crate provides the building blocks the cadena stages are made of,
//! designed for real-time audio processing with zero allocation in the audio
//! path.
//!
//! # Core Abstractions
//!
//! ## Stage Capability
//!
//! - [`Effect`] - Object-safe trait every chain stage implements
//! - [`ProcessSpec`] - Sample rate, block size and channel count handed to `prepare`
//!
//! ## Parameters
//!
//! - [`ParamDescriptor`] / [`ParamUnit`] - Range and display metadata
//! - [`SmoothedParam`] - Exponential smoothing for zipper-free changes
//!
//! ## Building Blocks
//!
//! - [`Biquad`] - Second-order IIR filter with RBJ cookbook coefficients
//! - [`FirstOrderAllpass`] - Bilinear first-order allpass (phaser stages)
//! - [`InterpolatedDelay`] - Variable-length delay with linear interpolation
//! - [`Lfo`] - Low-frequency oscillator
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`soft_clip`], [`wet_dry_mix`], etc.
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build without the standard library:
//!
//! ```toml
//! [dependencies]
//! cadena-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Object-safe traits**: stages are driven through `&mut dyn Effect`

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod delay;
pub mod effect;
pub mod lfo;
pub mod math;
pub mod param;
pub mod param_info;

pub use allpass::FirstOrderAllpass;
pub use biquad::{
    Biquad, BiquadCoefficients, allpass_coefficients, bandpass_coefficients, notch_coefficients,
    peaking_eq_coefficients,
};
pub use delay::InterpolatedDelay;
pub use effect::{Effect, ProcessSpec};
pub use lfo::Lfo;
pub use math::{
    db_to_linear, drive_compensation, flush_denormal, ms_to_samples, soft_clip, wet_dry_mix,
};
pub use param::SmoothedParam;
pub use param_info::{ParamDescriptor, ParamUnit};
