//! Lookahead brickwall limiter (spec.md §4.6, grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaProcessLookaheadLimiter`).
//!
//! Runs two passes over the block. The first computes, per frame, the
//! single linear gain every channel will be scaled by — a shared peak
//! detector across channels, smoothed by a `LOOKAHEAD`-sample ring buffer
//! so the gain can start dropping before the peak it's reacting to
//! actually arrives. The second pass applies that gain to a per-channel
//! delay line sized the same `LOOKAHEAD`, so the delayed dry signal and
//! its gain line up exactly. Both passes advance the shared ring index by
//! one per frame, so a single saved starting index lets the second pass
//! replay the exact same rotation the first pass walked.

use azcore::buffer::Buffer;
use azcore::channel_data::ChannelData;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::{amp_to_db, db_to_amp};
use azcore::scratch;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::vec;
use alloc::vec::Vec;

/// Lookahead window, in samples. Fixed rather than configurable: it sets
/// both the per-channel delay-line length and the gain smoothing ring's
/// size, and the two must match exactly for the dry signal and its gain
/// to land on the same frame.
pub const LOOKAHEAD: usize = 128;

#[derive(Debug, Clone)]
struct LimiterChannel {
    /// Per-channel delay line holding the last `LOOKAHEAD` dry samples.
    values: Vec<f32>,
}

impl Default for LimiterChannel {
    fn default() -> Self {
        Self { values: vec![0.0; LOOKAHEAD] }
    }
}

/// Configuration for [`Limiter`].
#[derive(Debug, Clone, Copy)]
pub struct LimiterConfig {
    pub gain_input_db: f32,
    pub gain_output_db: f32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { gain_input_db: 0.0, gain_output_db: 0.0 }
    }
}

/// Lookahead limiter (spec.md §4.6). Shared across channels: a signal
/// peaking on any one channel reduces the gain applied to all of them.
#[derive(Debug, Clone)]
pub struct Limiter {
    pub config: LimiterConfig,
    channels: ChannelData<LimiterChannel, 2>,
    gain_ring: Vec<f32>,
    sum: f32,
    index: usize,
}

impl Limiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            channels: ChannelData::new(),
            gain_ring: vec![0.0; LOOKAHEAD],
            sum: 0.0,
            index: 0,
        }
    }
}

impl Dsp for Limiter {
    fn kind(&self) -> DspKind {
        DspKind::Limiter
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        self.channels.grow_to(buffer.channels());
        let frames = buffer.frames();
        let channels = buffer.channels();
        let starting_index = self.index;

        let gain_scratch = scratch::ScratchGuard::push_zero(frames, 1, buffer.samplerate());
        gain_scratch.handle().with_slice_mut(|gains| {
            for i in 0..frames {
                let mut peak_sample = 0.0f32;
                for c in 0..channels {
                    peak_sample = peak_sample.max(buffer.get(i, c).abs());
                }
                let mut peak = (amp_to_db(peak_sample) + self.config.gain_input_db).max(0.0);
                self.sum += peak - self.gain_ring[self.index];
                let average = self.sum / LOOKAHEAD as f32;
                if average > peak {
                    self.sum += average - peak;
                    peak = average;
                }
                self.gain_ring[self.index] = peak;
                self.index = (self.index + 1) % LOOKAHEAD;
                let reference = if average > self.gain_ring[self.index] { average } else { self.gain_ring[self.index] };
                let gain = self.config.gain_input_db - reference;
                gains[i] = db_to_amp(gain);
            }

            for c in 0..channels {
                let mut index = starting_index;
                let ch = self.channels.get_mut(c);
                for i in 0..frames {
                    let dry = buffer.get(i, c);
                    ch.values[index] = dry;
                    index = (index + 1) % LOOKAHEAD;
                    let out = (ch.values[index] * gains[i]).clamp(-1.0, 1.0) * db_to_amp(self.config.gain_output_db);
                    buffer.set(i, c, out);
                }
            }
        });

        Ok(())
    }

    fn reset(&mut self) {
        self.channels.reset_all();
        self.gain_ring.iter_mut().for_each(|g| *g = 0.0);
        self.sum = 0.0;
        self.index = 0;
    }

    /// The dry signal is delayed by a full `LOOKAHEAD` samples before it
    /// reaches the output (see the per-channel delay line in `process`),
    /// so that's the latency this block introduces.
    fn latency_samples(&self) -> usize {
        LOOKAHEAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    #[test]
    fn silence_stays_silent() {
        let mut limiter = Limiter::new(LimiterConfig::default());
        let mut data = [0.0f32; 64];
        let buf = Buffer::from_mut(&mut data, 32, 2, ChannelLayout::stereo(), 48000);
        limiter.process(buf).unwrap();
        assert!(data.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn loud_signal_is_brought_under_unity_eventually() {
        let mut limiter = Limiter::new(LimiterConfig::default());
        // Run several blocks of a hot constant signal through; the lookahead
        // window needs more than one block's worth of frames to settle.
        for _ in 0..8 {
            let mut data = [4.0f32; 256];
            let buf = Buffer::from_mut(&mut data, 128, 2, ChannelLayout::stereo(), 48000);
            limiter.process(buf).unwrap();
        }
        let mut data = [4.0f32; 256];
        let buf = Buffer::from_mut(&mut data, 128, 2, ChannelLayout::stereo(), 48000);
        limiter.process(buf).unwrap();
        assert!(data.iter().all(|&x| x.abs() <= 1.0 + 1e-4));
    }
}
