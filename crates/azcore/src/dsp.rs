//! The DSP framework: a uniform "process a buffer in place, optionally
//! chained to the next effect" contract (spec.md §4.3).
//!
//! The original C implementation gives every effect struct a header
//! `(kind, struct_size, next)` and dispatches on `kind` through a giant
//! switch, with `next` as an intrusive singly-linked list. Since `azfx`
//! (which defines the concrete effect kinds) depends on `azcore` and not
//! the other way around, a closed sum type enumerating every concrete
//! effect here would force a dependency cycle. Spec.md §9 explicitly
//! offers a second architecture for the `next` link — "a flat vector of
//! boxed effects" — and that's what's used: [`DspChain`] owns a
//! `Vec<Box<dyn Dsp>>`, walked in order, short-circuiting on the first
//! non-success (spec.md §4.3, §8 "Chain walk" invariant). Every concrete
//! effect still reports a [`DspKind`] tag from the closed enumeration
//! (spec.md §3 "DSP header") for introspection and for the
//! `InvalidDspKind` error path, but runtime dispatch to the handler is a
//! vtable call rather than a match on that tag.

use crate::buffer::Buffer;
use crate::error::AzResult;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

/// Closed enumeration of DSP block kinds (spec.md §3 "DSP header").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DspKind {
    Rms,
    Filter,
    Limiter,
    Compressor,
    Gate,
    Delay,
    DelayDynamic,
    Reverb,
    Sampler,
    Spatializer,
    /// An effect kind defined outside this workspace (host application
    /// extension point). Matches the C API's tolerance for generic/custom
    /// `azaDSPData` structs as long as they honor the handler contract.
    Custom,
}

/// Common contract every DSP block in `azfx` implements.
///
/// Handlers are responsible for the full per-call contract described in
/// spec.md §4.3: validate the buffer (`buffer.validate()`), grow any
/// per-channel state to cover `buffer.channels()`, process in place, and
/// return the resulting status. [`DspChain::process`] handles walking to
/// the next effect; individual `Dsp` impls never call another `Dsp`
/// directly.
pub trait Dsp: Send {
    /// Which closed-enumeration kind this block reports as.
    fn kind(&self) -> DspKind;

    /// Validate, grow state, and process `buffer` in place.
    fn process(&mut self, buffer: Buffer) -> AzResult;

    /// Clear internal state (delay lines, filter history, envelope
    /// followers, ...) without touching parameters. Default: no state to
    /// clear.
    fn reset(&mut self) {}

    /// Latency introduced by this block, in samples. Used by hosts that
    /// need to compensate parallel paths. Default: zero (most blocks in
    /// this library are zero-latency; the lookahead limiter overrides
    /// this).
    fn latency_samples(&self) -> usize {
        0
    }
}

/// An ordered list of [`Dsp`] blocks processed in place on the same
/// buffer, one after another. Used as a track's effect chain (spec.md
/// §3 "Track", §4.14).
#[derive(Default)]
pub struct DspChain {
    effects: Vec<Box<dyn Dsp>>,
}

impl DspChain {
    pub fn new() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Append a DSP block to the end of the chain (spec.md §4.14
    /// `append_dsp`).
    pub fn append(&mut self, dsp: Box<dyn Dsp>) {
        self.effects.push(dsp);
    }

    /// Insert a DSP block at the start of the chain (spec.md §4.14
    /// `prepend_dsp`).
    pub fn prepend(&mut self, dsp: Box<dyn Dsp>) {
        self.effects.insert(0, dsp);
    }

    /// Walk the chain in order. The first non-success result aborts the
    /// walk and is returned immediately (spec.md §4.3, §8 "Chain walk"
    /// invariant); if every handler returns success, the chain returns
    /// success.
    pub fn process(&mut self, buffer: Buffer) -> AzResult {
        for dsp in &mut self.effects {
            dsp.process(buffer)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        for dsp in &mut self.effects {
            dsp.reset();
        }
    }

    pub fn latency_samples(&self) -> usize {
        self.effects.iter().map(|d| d.latency_samples()).sum()
    }
}
