//! azfx - concrete DSP effect library for azaudio
//!
//! Every effect here implements [`azcore::Dsp`] and is built from the
//! same `azcore` primitives: [`azcore::Buffer`] views, [`azcore::ChannelData`]
//! per-channel state, and [`azcore::scratch`] for multi-pass blocks that
//! need temporaries without allocating mid-callback.
//!
//! - [`Rms`] - windowed RMS level detector, also used as the sidechain
//!   for [`Compressor`] and [`Gate`]
//! - [`Filter`] - one-pole low/high/band-pass smoother with dry/wet blend
//! - [`Limiter`] - lookahead brickwall limiter
//! - [`Compressor`] - feedforward dynamics compressor/expander
//! - [`Gate`] - downward expander with an optional sidechain-shaping chain
//! - [`Delay`] - fixed-length feedback delay with ping-pong
//! - [`DynamicDelay`] - variable-length delay with Lanczos-interpolated glide
//! - [`Reverb`] - fixed-topology feedback delay network
//! - [`Sampler`] - one-shot/looping sample playback at arbitrary speed
//! - [`Spatializer`] - mono point-source placement into a channel layout
//!
//! # no_std support
//!
//! Mirrors `azcore`: disable the default `std` feature to build without
//! it (the `scratch` pool this crate's multi-pass effects depend on stays
//! `std`-only upstream).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod delay;
pub mod delay_dynamic;
pub mod filter;
pub mod gate;
pub mod limiter;
pub mod reverb;
pub mod rms;
pub mod sampler;
pub mod spatializer;

pub use compressor::{Compressor, CompressorConfig};
pub use delay::{Delay, DelayConfig};
pub use delay_dynamic::{DynamicDelay, DynamicDelayConfig};
pub use filter::{Filter, FilterConfig, FilterMode};
pub use gate::{Gate, GateConfig};
pub use limiter::{Limiter, LimiterConfig, LOOKAHEAD};
pub use reverb::{Reverb, ReverbConfig};
pub use rms::{Rms, RmsConfig};
pub use sampler::{Sampler, SamplerConfig, TRANSITION_FRAMES};
pub use spatializer::Spatializer;
