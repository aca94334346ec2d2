//! Windowed RMS detector (grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaProcessRMS` /
//! `azaProcessRMSCombined`).

use azcore::buffer::Buffer;
use azcore::channel_data::ChannelData;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use libm::sqrtf;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::vec;
use alloc::vec::Vec;

#[derive(Debug, Clone, Default)]
struct RmsChannel {
    squared_sum: f32,
    ring: Vec<f32>,
}

/// Configuration for [`Rms`]: the window size, in samples.
#[derive(Debug, Clone, Copy)]
pub struct RmsConfig {
    pub window_samples: usize,
}

impl Default for RmsConfig {
    fn default() -> Self {
        Self { window_samples: 128 }
    }
}

/// Per-channel RMS level detector. `process` replaces each channel's
/// signal with its own running RMS envelope; [`Rms::process_combined`]
/// instead collapses every input channel into a single RMS trace written
/// uniformly across a (typically mono) destination buffer, for sidechain
/// use by the compressor and gate.
///
/// The ring index is a single counter shared across channels rather than
/// reset per channel — each call to `process` advances it once per
/// `(channel, frame)` pair, exactly mirroring the source's nested loop
/// order, so successive channels sample the ring at a rotating phase
/// offset rather than in lockstep.
#[derive(Debug, Clone)]
pub struct Rms {
    config: RmsConfig,
    state: ChannelData<RmsChannel, 2>,
    index: usize,
}

impl Rms {
    pub fn new(config: RmsConfig) -> Self {
        Self { config, state: ChannelData::new(), index: 0 }
    }

    fn ensure_ring(ch: &mut RmsChannel, window: usize) {
        if ch.ring.len() != window {
            ch.ring = vec![0.0; window.max(1)];
            ch.squared_sum = 0.0;
        }
    }

    /// Collapse `src`'s channels into one RMS trace written into every
    /// channel of `dst` (frame and samplerate must match; `dst` may have
    /// any channel count, typically 1).
    pub fn process_combined(&mut self, dst: Buffer, src: Buffer) -> AzResult {
        dst.validate()?;
        src.validate()?;
        if dst.frames() != src.frames() {
            return Err(azcore::error::AzError::MismatchedFrameCount);
        }
        let window = self.config.window_samples.max(1);
        self.state.grow_to(1);
        let ch = self.state.get_mut(0);
        Self::ensure_ring(ch, window);
        for i in 0..src.frames() {
            let mut acc = 0.0f32;
            for c in 0..src.channels() {
                let s = src.get(i, c);
                acc = acc.max(s * s);
            }
            ch.squared_sum -= ch.ring[self.index];
            ch.ring[self.index] = acc;
            ch.squared_sum += acc;
            if ch.squared_sum < 0.0 {
                ch.squared_sum = 0.0;
            }
            let level = sqrtf(ch.squared_sum / (window * src.channels()) as f32);
            for c in 0..dst.channels() {
                dst.set(i, c, level);
            }
            self.index = (self.index + 1) % window;
        }
        Ok(())
    }
}

impl Dsp for Rms {
    fn kind(&self) -> DspKind {
        DspKind::Rms
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let window = self.config.window_samples.max(1);
        self.state.grow_to(buffer.channels());
        for c in 0..buffer.channels() {
            let ch = self.state.get_mut(c);
            Self::ensure_ring(ch, window);
            for i in 0..buffer.frames() {
                let x = buffer.get(i, c);
                ch.squared_sum -= ch.ring[self.index];
                ch.ring[self.index] = x * x;
                ch.squared_sum += ch.ring[self.index];
                if ch.squared_sum < 0.0 {
                    ch.squared_sum = 0.0;
                }
                self.index = (self.index + 1) % window;
                buffer.set(i, c, sqrtf(ch.squared_sum / window as f32));
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset_all();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    #[test]
    fn silence_in_gives_silence_out() {
        let mut rms = Rms::new(RmsConfig { window_samples: 16 });
        let mut data = [0.0f32; 32];
        let buf = Buffer::from_mut(&mut data, 16, 2, ChannelLayout::stereo(), 48000);
        rms.process(buf).unwrap();
        assert!(data.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn constant_input_converges_to_its_own_amplitude() {
        let mut rms = Rms::new(RmsConfig { window_samples: 8 });
        let mut data = [0.5f32; 64];
        let buf = Buffer::from_mut(&mut data, 32, 2, ChannelLayout::stereo(), 48000);
        rms.process(buf).unwrap();
        assert!((data[62] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn process_combined_writes_uniform_trace() {
        let mut rms = Rms::new(RmsConfig { window_samples: 8 });
        let mut src_data = [0.5f32; 8];
        let src = Buffer::from_mut(&mut src_data, 4, 2, ChannelLayout::stereo(), 48000);
        let mut dst_data = [0.0f32; 4];
        let dst = Buffer::from_mut(&mut dst_data, 4, 1, ChannelLayout::mono(), 48000);
        rms.process_combined(dst, src).unwrap();
        assert!(dst_data.iter().all(|&x| x > 0.0));
    }
}
