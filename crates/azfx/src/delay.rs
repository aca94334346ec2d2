//! Fixed-length feedback delay with optional ping-pong and a "wet
//! effects" chain run on the fed-back signal (spec.md §4.9, grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaProcessDelay`).
//!
//! Each channel owns its own ring buffer sized to `delay_ms`, shared by
//! every channel. Feedback and ping-pong routing happen through a shared
//! scratch buffer covering every channel at once — tap `c`'s
//! contribution to the next ring write is split between channel `c`
//! (the `1 - pingpong` share) and channel `(c + 1) % channels` (the
//! `pingpong` share) before `wet_effects` runs once over that whole
//! buffer and the result is written back into each channel's ring.

use azcore::buffer::Buffer;
use azcore::channel_data::ChannelData;
use azcore::dsp::{Dsp, DspChain, DspKind};
use azcore::error::AzResult;
use azcore::math::{db_to_amp, ms_to_samples};
use azcore::scratch;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::vec;
use alloc::vec::Vec;

/// Ring buffers grow in units of this many samples, matching the
/// original's realloc granularity, so re-tuning `delay_ms` by small
/// amounts doesn't reallocate every block.
const RING_ALIGNMENT: usize = 256;

#[derive(Debug, Clone, Default)]
struct DelayChannel {
    ring: Vec<f32>,
    /// Exact configured delay length, in samples — the wrap modulus for
    /// `index`. Kept separate from `ring.len()`, which is the ring's
    /// over-allocated capacity (grown in `RING_ALIGNMENT`-sized steps so
    /// small retunes of `delay_ms` don't reallocate every block).
    delay_samples: usize,
    index: usize,
}

impl DelayChannel {
    fn ensure_len(&mut self, samples: usize) {
        if self.ring.len() < samples {
            let aligned = samples.div_ceil(RING_ALIGNMENT) * RING_ALIGNMENT;
            self.ring.resize(aligned, 0.0);
        }
        self.delay_samples = samples;
        if self.index >= samples {
            self.index = 0;
        }
    }
}

/// Configuration for [`Delay`].
#[derive(Debug, Clone, Copy)]
pub struct DelayConfig {
    pub delay_ms: f32,
    /// Linear feedback coefficient: the fraction of each ring slot's
    /// current contents mixed back into the next write to that slot
    /// (spec.md §4.9).
    pub feedback: f32,
    pub pingpong: f32,
    pub gain_db: f32,
    pub gain_dry_db: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self { delay_ms: 250.0, feedback: 0.3, pingpong: 0.0, gain_db: 0.0, gain_dry_db: 0.0 }
    }
}

/// Fixed-length feedback delay (spec.md §4.9). `wet_effects` runs once
/// per block over the shared feedback bus after ping-pong routing and
/// before it's written back into each channel's ring — it colors what
/// feeds back, not the dry-passthrough path.
pub struct Delay {
    pub config: DelayConfig,
    pub wet_effects: DspChain,
    channels: ChannelData<DelayChannel, 2>,
}

impl Delay {
    pub fn new(config: DelayConfig) -> Self {
        Self { config, wet_effects: DspChain::new(), channels: ChannelData::new() }
    }
}

impl Dsp for Delay {
    fn kind(&self) -> DspKind {
        DspKind::Delay
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let frames = buffer.frames();
        let channels = buffer.channels();
        let samplerate = buffer.samplerate();
        self.channels.grow_to(channels);

        let delay_samples = ms_to_samples(self.config.delay_ms, samplerate).max(1.0) as usize;
        for c in 0..channels {
            self.channels.get_mut(c).ensure_len(delay_samples);
        }

        let side = scratch::ScratchGuard::push_zero(frames, channels, samplerate);
        side.handle().with_slice_mut(|side_storage| {
            let side_buf = Buffer::from_mut(side_storage, frames, channels, buffer.layout(), samplerate);
            for c in 0..channels {
                let ch = self.channels.get(c);
                let wrap = ch.delay_samples;
                let mut index = ch.index;
                let ch = self.channels.get_mut(c);
                for i in 0..frames {
                    let dry = buffer.get(i, c);
                    let to_add = dry + ch.ring[index] * self.config.feedback;
                    let direct = side_buf.get(i, c) + to_add * (1.0 - self.config.pingpong);
                    side_buf.set(i, c, direct);
                    let other = (c + 1) % channels;
                    let crossed = side_buf.get(i, other) + to_add * self.config.pingpong;
                    side_buf.set(i, other, crossed);
                    index = (index + 1) % wrap;
                }
            }

            if !self.wet_effects.is_empty() {
                self.wet_effects.process(side_buf)?;
            }

            let gain = db_to_amp(self.config.gain_db);
            let gain_dry = db_to_amp(self.config.gain_dry_db);
            for c in 0..channels {
                let wrap = self.channels.get(c).delay_samples;
                let ch = self.channels.get_mut(c);
                let mut index = ch.index;
                for i in 0..frames {
                    ch.ring[index] = side_buf.get(i, c);
                    index = (index + 1) % wrap;
                    let dry = buffer.get(i, c);
                    buffer.set(i, c, ch.ring[index] * gain + dry * gain_dry);
                }
                ch.index = index;
            }
            Ok(())
        })
    }

    fn reset(&mut self) {
        self.channels.reset_all();
        self.wet_effects.reset();
    }

    fn latency_samples(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    #[test]
    fn silence_stays_silent() {
        let mut delay = Delay::new(DelayConfig::default());
        let mut data = [0.0f32; 64];
        let buf = Buffer::from_mut(&mut data, 32, 2, ChannelLayout::stereo(), 48000);
        delay.process(buf).unwrap();
        assert!(data.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn impulse_reappears_after_delay_time() {
        let mut delay = Delay::new(DelayConfig { delay_ms: 10.0, feedback: 0.0, pingpong: 0.0, gain_db: 0.0, gain_dry_db: -1000.0 });
        let samplerate = 48000u32;
        let delay_samples = ms_to_samples(10.0, samplerate) as usize;
        let total_frames = delay_samples + 16;
        let mut data = vec![0.0f32; total_frames * 2];
        data[0] = 1.0;
        data[1] = 1.0;
        let buf = Buffer::from_mut(&mut data, total_frames, 2, ChannelLayout::stereo(), samplerate);
        delay.process(buf).unwrap();
        let echoed = buf.get(delay_samples, 0);
        assert!(echoed.abs() > 0.01, "expected an echo near frame {delay_samples}, got {echoed}");
    }
}
