//! azcore - mixer graph, DSP framework and realtime scratch allocator for
//! azaudio
//!
//! This crate provides the foundation `azfx`'s concrete DSP blocks are
//! built on, and the graph/scheduler a host wires a backend stream into.
//! None of it touches actual audio hardware — see the `azstream` crate
//! for that boundary.
//!
//! # Core Abstractions
//!
//! ## Graph
//!
//! - [`Track`] / [`TrackId`] - a node in the routing graph: a buffer, a
//!   DSP chain, and a list of weighted sends from other tracks
//! - [`Mixer`] - the graph itself: an arena of tracks rooted at an output
//!   track, evaluated pull-style every block
//!
//! ## DSP framework
//!
//! - [`Dsp`] - object-safe "process a buffer in place" contract every
//!   effect in `azfx` implements
//! - [`DspChain`] - an ordered, short-circuiting list of [`Dsp`] blocks
//! - [`ChannelData`] - per-channel effect state that starts inline and
//!   spills to the heap only once it outgrows its inline capacity
//!
//! ## Buffers and layouts
//!
//! - [`Buffer`] - a non-owning, freely aliasable view over interleaved
//!   `f32` samples
//! - [`ChannelLayout`] / [`ChannelPosition`] - named physical speaker
//!   positions
//!
//! ## Realtime-safe scratch memory
//!
//! - [`scratch`] - a thread-local stack of reusable scratch buffers for
//!   multi-pass DSP blocks (reverb, dynamic delay, sidechained gates) that
//!   need temporaries without allocating mid-callback
//!
//! ## Shared tables and math
//!
//! - [`AzContext`] - the process-wide default listener pose, sine table
//!   and Lanczos kernel, gathered behind one `init()` call
//! - [`math`] - level/time conversions, a minimal 3D vector/matrix kit,
//!   and the tabulated Lanczos kernel
//!
//! # no_std support
//!
//! This crate is `no_std` compatible (the thread-local [`scratch`] pool
//! excepted, which inherently needs `std`). Disable the default `std`
//! feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! azcore = { version = "0.1", default-features = false }
//! ```
//!
//! # Design principles
//!
//! - **Realtime safe**: the DSP path never allocates once a track and its
//!   effect chain have been sized for the host's worst-case block size
//! - **No `unsafe`**: buffer aliasing is expressed with
//!   [`core::cell::Cell`] rather than raw pointers
//! - **Object-safe dispatch**: effects are `Box<dyn Dsp>` so `azfx` can
//!   depend on `azcore` without a cycle back the other way

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod channel_data;
pub mod channel_layout;
pub mod context;
pub mod dsp;
pub mod error;
pub mod math;
pub mod mixer;
pub mod osc;
pub mod scratch;
pub mod track;
pub mod world;

pub use buffer::{mix, mix_fade, Buffer};
pub use channel_data::ChannelData;
pub use channel_layout::{ChannelLayout, ChannelPosition, FormFactor, MAX_CHANNELS};
pub use context::AzContext;
pub use dsp::{Dsp, DspChain, DspKind};
pub use error::{AzError, AzResult};
pub use mixer::{Mixer, MixerConfig};
pub use osc::SineTable;
pub use track::{Receive, Track, TrackId};
pub use world::World;
