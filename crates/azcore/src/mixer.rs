//! The mixer: a graph of [`Track`]s rooted at an output track, evaluated
//! pull-style every block (spec.md §3 "Mixer", §4.15).
//!
//! # The streaming aliasing trick, redesigned
//!
//! The original C mixer renders straight into the audio backend's device
//! buffer by temporarily swapping the output track's storage pointer to
//! point at that buffer for the duration of one callback, then swapping it
//! back. That's exactly the kind of pointer aliasing [`crate::buffer`]
//! was built to avoid. Spec.md §9 DESIGN NOTES calls for re-architecting
//! this as "an explicit target-override parameter on `process()`" instead,
//! which is what [`Mixer::process_into`] does: it always renders into the
//! output track's own storage, then — if a target was supplied — copies
//! the result into it. A caller driving a device callback (see the
//! `azstream` crate) passes its own device buffer as the target; nothing
//! in `azcore` ever aliases a track's storage with anyone else's.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::buffer::{mix, Buffer};
use crate::channel_layout::ChannelLayout;
use crate::error::{AzError, AzResult};
use crate::math::db_to_amp;
use crate::track::{Mark, Track, TrackId};

/// Fixed, process-rate configuration a [`Mixer`] was built with (spec.md
/// §3 "Mixer config").
#[derive(Debug, Clone, Copy)]
pub struct MixerConfig {
    pub samplerate: u32,
    pub max_frames: usize,
    pub layout: ChannelLayout,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            samplerate: 48_000,
            max_frames: 1024,
            layout: ChannelLayout::stereo(),
        }
    }
}

/// A routing graph of tracks rooted at a single output track, evaluated
/// pull-style (spec.md §4.15).
///
/// Tracks are held in a flat arena; the output track is simply the last
/// one created, referenced by [`Mixer::output_id`]. Every other track is
/// wired with a default 0 dB send into the output when created by
/// [`Mixer::add_track`] (spec.md §4.15 step: "every non-output track
/// receives a send into the output track at 0 dB (wire-once default)").
pub struct Mixer {
    config: MixerConfig,
    tracks: Vec<Track>,
    output_id: TrackId,
    marks: Vec<Mark>,
}

impl Mixer {
    /// Create a mixer with just its output track (spec.md §4.15 `init`).
    pub fn new(config: MixerConfig) -> Self {
        let output = Track::new(config.max_frames, config.layout);
        Self {
            config,
            tracks: vec![output],
            output_id: TrackId(0),
            marks: vec![Mark::Unvisited],
        }
    }

    pub fn config(&self) -> MixerConfig {
        self.config
    }

    pub fn output_id(&self) -> TrackId {
        self.output_id
    }

    /// Allocate a new track and wire a default 0 dB send from it into the
    /// output track.
    pub fn add_track(&mut self) -> TrackId {
        let id = TrackId(self.tracks.len());
        self.tracks.push(Track::new(self.config.max_frames, self.config.layout));
        self.marks.push(Mark::Unvisited);
        let output = self.output_id;
        self.track_mut(output).connect(id, 0.0);
        id
    }

    pub fn track(&self, id: TrackId) -> &Track {
        &self.tracks[id.index()]
    }

    pub fn track_mut(&mut self, id: TrackId) -> &mut Track {
        &mut self.tracks[id.index()]
    }

    /// `from -> to` at `gain_db`. Mirrors `Track::connect`, just resolved
    /// through the mixer's arena (spec.md §4.15 `connect`).
    pub fn connect(&mut self, from: TrackId, to: TrackId, gain_db: f32) {
        self.track_mut(to).connect(from, gain_db);
    }

    pub fn disconnect(&mut self, from: TrackId, to: TrackId) {
        self.track_mut(to).disconnect(from);
    }

    /// Three-state DFS cycle check over the receive graph, rooted at the
    /// output track (spec.md §4.15 `check_routing`). Marks live in a side
    /// table (`self.marks`) rather than on the tracks themselves, so this
    /// never needs `&mut` access to more than one track's fields at a time
    /// (spec.md §9 DESIGN NOTES).
    pub fn check_routing(&mut self) -> AzResult {
        for m in &mut self.marks {
            *m = Mark::Unvisited;
        }
        self.visit(self.output_id)
    }

    fn visit(&mut self, id: TrackId) -> AzResult {
        match self.marks[id.index()] {
            Mark::Done => return Ok(()),
            Mark::OnStack => return Err(AzError::MixerRoutingCycle),
            Mark::Unvisited => {}
        }
        self.marks[id.index()] = Mark::OnStack;
        let receives: Vec<TrackId> = self.tracks[id.index()].receives().iter().map(|r| r.source).collect();
        for source in receives {
            self.visit(source)?;
        }
        self.marks[id.index()] = Mark::Done;
        Ok(())
    }

    /// Render one block into the output track's own buffer (spec.md
    /// §4.15 `process`). Checks routing first; on a cycle, no track buffer
    /// is touched (spec.md §8 "graph errors leave mixer state otherwise
    /// unchanged").
    pub fn process(&mut self, frames: usize, samplerate: u32) -> AzResult {
        self.process_into(None, frames, samplerate)
    }

    /// Like [`Mixer::process`], but additionally copies the rendered
    /// output track into `target` if given — the redesigned replacement
    /// for the original pointer-swap-into-the-device-buffer trick (see
    /// the module docs).
    pub fn process_into(&mut self, target: Option<Buffer<'_>>, frames: usize, samplerate: u32) -> AzResult {
        self.check_routing()?;
        self.process_track(self.output_id, frames, samplerate)?;
        if let Some(target) = target {
            let out = self.tracks[self.output_id.index()].buffer_view(frames, samplerate);
            out.copy_into(&target)?;
        }
        Ok(())
    }

    /// Pull-model recursion (spec.md §4.14 `process`): zero the track's
    /// buffer, mix in every receive (recursively processing the upstream
    /// track first), then run the DSP chain in place. No memoization — a
    /// track fed by two downstream tracks is recomputed for each pull,
    /// matching the original's naive recursive walk.
    fn process_track(&mut self, id: TrackId, frames: usize, samplerate: u32) -> AzResult {
        {
            let buf = self.tracks[id.index()].buffer_view(frames, samplerate);
            buf.validate()?;
            buf.zero();
        }
        let receives: Vec<(TrackId, f32)> = self.tracks[id.index()]
            .receives()
            .iter()
            .map(|r| (r.source, r.gain_db))
            .collect();
        for (source, gain_db) in receives {
            self.process_track(source, frames, samplerate)?;
            let amp = db_to_amp(gain_db);
            let (dst_track, src_track) = split_two_mut(&mut self.tracks, id.index(), source.index());
            let dst_buf = dst_track.buffer_view(frames, samplerate);
            let src_buf = src_track.buffer_view(frames, samplerate);
            mix(&dst_buf, 1.0, &src_buf, amp)?;
        }
        self.tracks[id.index()].process_dsp_chain(frames, samplerate)
    }
}

/// Borrow two distinct elements of `slice` mutably at once. Panics if
/// `a == b`; a track can never receive from itself once `check_routing`
/// has run (a self-send is a one-node cycle).
fn split_two_mut<T>(slice: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    assert_ne!(a, b, "a track cannot receive from itself");
    if a < b {
        let (left, right) = slice.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = slice.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_track_routes_straight_through() {
        let mut mixer = Mixer::new(MixerConfig { max_frames: 4, ..Default::default() });
        let a = mixer.add_track();
        {
            let buf = mixer.track_mut(a).buffer_view(4, 48000);
            for i in 0..4 {
                buf.set(i, 0, 1.0);
                buf.set(i, 1, 1.0);
            }
        }
        mixer.process(4, 48000).unwrap();
        let out = mixer.track_mut(mixer.output_id()).buffer_view(4, 48000);
        for i in 0..4 {
            assert_eq!(out.get(i, 0), 1.0);
        }
    }

    #[test]
    fn detects_two_node_cycle() {
        let mut mixer = Mixer::new(MixerConfig { max_frames: 4, ..Default::default() });
        let a = mixer.add_track();
        let b = mixer.add_track();
        mixer.connect(a, b, 0.0);
        mixer.connect(b, a, 0.0);
        assert_eq!(mixer.check_routing(), Err(AzError::MixerRoutingCycle));
    }

    #[test]
    fn cycle_leaves_output_buffer_untouched() {
        let mut mixer = Mixer::new(MixerConfig { max_frames: 4, ..Default::default() });
        let a = mixer.add_track();
        mixer.connect(a, a, 0.0);
        {
            let out = mixer.track_mut(mixer.output_id()).buffer_view(4, 48000);
            for i in 0..4 {
                out.set(i, 0, 7.0);
            }
        }
        assert!(mixer.process(4, 48000).is_err());
        let out = mixer.track_mut(mixer.output_id()).buffer_view(4, 48000);
        assert_eq!(out.get(0, 0), 7.0);
    }

    #[test]
    fn diamond_routes_recompute_without_panicking() {
        let mut mixer = Mixer::new(MixerConfig { max_frames: 4, ..Default::default() });
        let src = mixer.add_track();
        let a = mixer.add_track();
        let b = mixer.add_track();
        mixer.disconnect(a, mixer.output_id());
        mixer.disconnect(b, mixer.output_id());
        mixer.connect(src, a, 0.0);
        mixer.connect(src, b, 0.0);
        mixer.connect(a, mixer.output_id(), 0.0);
        mixer.connect(b, mixer.output_id(), 0.0);
        {
            let buf = mixer.track_mut(src).buffer_view(4, 48000);
            for i in 0..4 {
                buf.set(i, 0, 0.5);
                buf.set(i, 1, 0.5);
            }
        }
        mixer.process(4, 48000).unwrap();
        let out = mixer.track_mut(mixer.output_id()).buffer_view(4, 48000);
        assert!((out.get(0, 0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn process_into_copies_to_target() {
        let mut mixer = Mixer::new(MixerConfig { max_frames: 4, ..Default::default() });
        let a = mixer.add_track();
        {
            let buf = mixer.track_mut(a).buffer_view(4, 48000);
            for i in 0..4 {
                buf.set(i, 0, 0.25);
                buf.set(i, 1, 0.25);
            }
        }
        let mut target_storage = [0.0f32; 8];
        let target = Buffer::from_mut(&mut target_storage, 4, 2, ChannelLayout::stereo(), 48000);
        mixer.process_into(Some(target), 4, 48000).unwrap();
        assert_eq!(target.get(0, 0), 0.25);
    }
}
