//! A track: buffer + DSP chain + list of receives (spec.md §3 "Track",
//! §4.14).
//!
//! Tracks live in a [`crate::mixer::Mixer`]'s arena and reference each
//! other by [`TrackId`] rather than by pointer, so recursive pull-based
//! processing can be expressed with ordinary indexing (see
//! [`crate::mixer::Mixer::process`]) instead of the original C pointer
//! chase. A track owns its own buffer but never the tracks it receives
//! from — disconnecting or freeing an upstream track is the mixer's
//! responsibility, not this one's.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::buffer::Buffer;
use crate::channel_layout::ChannelLayout;
use crate::dsp::DspChain;

/// Stable identifier for a track inside a single [`crate::mixer::Mixer`].
/// Never reused while the mixer that issued it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub(crate) usize);

impl TrackId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A gain-weighted connection from an upstream track into this one
/// (spec.md §3: `receives[]` is a dynamic list of `(source_track,
/// gain_dB)`).
#[derive(Debug, Clone, Copy)]
pub struct Receive {
    pub source: TrackId,
    pub gain_db: f32,
}

/// Three-state mark used only during [`crate::mixer::Mixer::check_routing`]
/// cycle detection. Kept in a side table on the mixer rather than on the
/// track itself (spec.md §9 DESIGN NOTES: "keep marks in a side table
/// indexed by track id so the track struct is immutable during the
/// check").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mark {
    #[default]
    Unvisited,
    OnStack,
    Done,
}

/// `(buffer, dsp_chain_head, receives[])`. A track owns its interleaved
/// sample storage and DSP chain; it does not own the tracks referenced by
/// its receives.
pub struct Track {
    storage: Vec<f32>,
    capacity_frames: usize,
    layout: ChannelLayout,
    pub dsp_chain: DspChain,
    receives: Vec<Receive>,
}

impl Track {
    /// Allocate a track buffer able to hold up to `capacity_frames` frames
    /// at `layout` (spec.md §4.14 `init`).
    pub fn new(capacity_frames: usize, layout: ChannelLayout) -> Self {
        Self {
            storage: vec![0.0; capacity_frames * layout.count()],
            capacity_frames,
            layout,
            dsp_chain: DspChain::new(),
            receives: Vec::new(),
        }
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    pub fn receives(&self) -> &[Receive] {
        &self.receives
    }

    /// A transient view of this track's buffer sliced to `frames` (spec.md
    /// §4.14 step 1: "alias track buffer at samplerate, slice it to
    /// frames"). `frames` must not exceed `capacity_frames`.
    pub fn buffer_view(&mut self, frames: usize, samplerate: u32) -> Buffer<'_> {
        assert!(frames <= self.capacity_frames, "frames exceeds track buffer capacity");
        let stride = self.layout.count();
        Buffer::from_mut(&mut self.storage, frames, stride, self.layout, samplerate)
    }

    /// Append a DSP block to the end of the chain (spec.md §4.14
    /// `append_dsp`).
    pub fn append_dsp(&mut self, dsp: alloc::boxed::Box<dyn crate::dsp::Dsp>) {
        self.dsp_chain.append(dsp);
    }

    /// Insert a DSP block at the start of the chain (spec.md §4.14
    /// `prepend_dsp`).
    pub fn prepend_dsp(&mut self, dsp: alloc::boxed::Box<dyn crate::dsp::Dsp>) {
        self.dsp_chain.prepend(dsp);
    }

    /// Run this track's DSP chain over its own buffer view, sliced to
    /// `frames` at `samplerate`.
    pub fn process_dsp_chain(&mut self, frames: usize, samplerate: u32) -> crate::error::AzResult {
        assert!(frames <= self.capacity_frames, "frames exceeds track buffer capacity");
        let stride = self.layout.count();
        let buf = Buffer::from_mut(&mut self.storage, frames, stride, self.layout, samplerate);
        self.dsp_chain.process(buf)
    }

    /// Add a send from `source` into this track at `gain_db`. Calling
    /// again with the same `source` updates the gain in place rather than
    /// adding a duplicate route (spec.md §4.14 `connect`).
    pub fn connect(&mut self, source: TrackId, gain_db: f32) {
        if let Some(existing) = self.receives.iter_mut().find(|r| r.source == source) {
            existing.gain_db = gain_db;
        } else {
            self.receives.push(Receive { source, gain_db });
        }
    }

    /// Remove the send from `source`, if any (spec.md §4.14 `disconnect`).
    pub fn disconnect(&mut self, source: TrackId) {
        self.receives.retain(|r| r.source != source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_then_reconnect_updates_gain_in_place() {
        let mut t = Track::new(64, ChannelLayout::stereo());
        let src = TrackId(3);
        t.connect(src, -6.0);
        t.connect(src, 0.0);
        assert_eq!(t.receives().len(), 1);
        assert_eq!(t.receives()[0].gain_db, 0.0);
    }

    #[test]
    fn disconnect_removes_route() {
        let mut t = Track::new(64, ChannelLayout::stereo());
        let src = TrackId(1);
        t.connect(src, 0.0);
        t.disconnect(src);
        assert!(t.receives().is_empty());
    }

    #[test]
    fn buffer_view_is_zero_sized_cost() {
        let mut t = Track::new(128, ChannelLayout::stereo());
        let buf = t.buffer_view(64, 48000);
        assert_eq!(buf.frames(), 64);
        assert_eq!(buf.channels(), 2);
    }

    #[test]
    #[should_panic]
    fn buffer_view_rejects_oversized_request() {
        let mut t = Track::new(32, ChannelLayout::stereo());
        t.buffer_view(64, 48000);
    }
}
