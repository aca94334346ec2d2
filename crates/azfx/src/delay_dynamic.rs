//! Variable-length delay line with sub-sample interpolation via Lanczos
//! kernel convolution (spec.md §4.10). Unlike [`crate::delay::Delay`], the
//! delay time can glide continuously within a block, which is what lets
//! this double as a chorus/flanger modulation source as well as a plain
//! delay.
//!
//! Each channel keeps a contiguous history buffer sized `delay_max_ms`
//! worth of samples plus one block, laid out oldest-to-newest so the most
//! recent `block_frames` samples always live at the tail. Every block:
//! write the incoming dry+feedback signal into the tail, read back a
//! glide from `delay_start_ms` to `delay_end_ms` via the Lanczos kernel,
//! then shift the buffer left by `block_frames` to make room for the
//! next write.

use azcore::buffer::Buffer;
use azcore::channel_data::ChannelData;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::{kernel_sample, lerp, ms_to_samples, LanczosKernel};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

#[derive(Debug, Clone, Default)]
struct DynamicDelayChannel {
    history: Vec<f32>,
}

impl DynamicDelayChannel {
    fn ensure_len(&mut self, needed: usize) {
        if self.history.len() != needed {
            let mut grown = vec![0.0; needed];
            let keep = grown.len().min(self.history.len());
            let src_start = self.history.len() - keep;
            let dst_start = grown.len() - keep;
            grown[dst_start..].copy_from_slice(&self.history[src_start..]);
            self.history = grown;
        }
    }
}

/// Configuration for [`DynamicDelay`].
#[derive(Debug, Clone, Copy)]
pub struct DynamicDelayConfig {
    pub delay_max_ms: f32,
    pub delay_start_ms: f32,
    /// `None` holds the delay time constant at `delay_start_ms` across the
    /// block; `Some(ms)` glides linearly from `delay_start_ms` to `ms`.
    pub delay_end_ms: Option<f32>,
    pub feedback: f32,
    pub pingpong: f32,
}

impl Default for DynamicDelayConfig {
    fn default() -> Self {
        Self { delay_max_ms: 30.0, delay_start_ms: 10.0, delay_end_ms: None, feedback: 0.0, pingpong: 0.0 }
    }
}

/// Lanczos-interpolated variable delay (spec.md §4.10).
#[derive(Debug, Clone)]
pub struct DynamicDelay {
    pub config: DynamicDelayConfig,
    channels: ChannelData<DynamicDelayChannel, 2>,
    kernel: Arc<LanczosKernel>,
}

impl DynamicDelay {
    pub fn new(config: DynamicDelayConfig, kernel: Arc<LanczosKernel>) -> Self {
        Self { config, channels: ChannelData::new(), kernel }
    }
}

impl Dsp for DynamicDelay {
    fn kind(&self) -> DspKind {
        DspKind::DelayDynamic
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let frames = buffer.frames();
        let channels = buffer.channels();
        let samplerate = buffer.samplerate();
        self.channels.grow_to(channels);

        let delay_max_samples = ms_to_samples(self.config.delay_max_ms, samplerate).max(1.0) as usize;
        let capacity = delay_max_samples + frames;
        for c in 0..channels {
            self.channels.get_mut(c).ensure_len(capacity);
        }

        let start_offset = ms_to_samples(self.config.delay_start_ms, samplerate);
        let end_offset = match self.config.delay_end_ms {
            Some(ms) => ms_to_samples(ms, samplerate),
            None => start_offset,
        };

        // Pass 1: write the incoming signal (plus feedback picked up from
        // the previous block's tail) into the buffer's tail region.
        for c in 0..channels {
            let tail_start = capacity - frames;
            let ch = self.channels.get_mut(c);
            let prior_tail_value = ch.history[tail_start.saturating_sub(1).min(capacity - 1)];
            for i in 0..frames {
                let dry = buffer.get(i, c);
                let fed_back = if i == 0 { prior_tail_value } else { ch.history[tail_start + i - 1] };
                ch.history[tail_start + i] = dry + fed_back * self.config.feedback * (1.0 - self.config.pingpong);
            }
        }

        // Pass 2: read the glide via the Lanczos kernel before shifting.
        for c in 0..channels {
            let ch_len = self.channels.get(c).history.len();
            for i in 0..frames {
                let t = if frames > 1 { i as f32 / (frames - 1) as f32 } else { 0.0 };
                let offset = lerp(start_offset, end_offset, t);
                let write_pos = (ch_len - frames + i) as f32;
                let tap_index = write_pos - offset;
                let history = &self.channels.get(c).history;
                let value = kernel_sample(history, &self.kernel, tap_index);
                buffer.set(i, c, value);
            }
        }

        // Ping-pong's cross-channel share lands in the *next* channel's
        // just-written tail before the shift below discards anything.
        if self.config.pingpong > 0.0 && channels > 1 {
            for c in 0..channels {
                let other = (c + 1) % channels;
                let tail_start = capacity - frames;
                for i in 0..frames {
                    let fed_back = self.channels.get(c).history[tail_start + i];
                    let share = fed_back * self.config.feedback * self.config.pingpong;
                    let dst = self.channels.get_mut(other);
                    dst.history[tail_start + i] += share;
                }
            }
        }

        for c in 0..channels {
            let ch = self.channels.get_mut(c);
            ch.history.copy_within(frames.., 0);
            let len = ch.history.len();
            ch.history[len - frames..].fill(0.0);
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.channels.reset_all();
    }

    fn latency_samples(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    fn kernel() -> Arc<LanczosKernel> {
        Arc::new(LanczosKernel::new(3, 64))
    }

    #[test]
    fn silence_stays_silent() {
        let mut dd = DynamicDelay::new(DynamicDelayConfig::default(), kernel());
        let mut data = [0.0f32; 128];
        let buf = Buffer::from_mut(&mut data, 64, 2, ChannelLayout::stereo(), 48000);
        dd.process(buf).unwrap();
        assert!(data.iter().all(|&x| x.abs() < 1e-6));
    }

    #[test]
    fn constant_input_settles_to_the_same_constant() {
        let mut dd = DynamicDelay::new(
            DynamicDelayConfig { delay_max_ms: 5.0, delay_start_ms: 2.0, delay_end_ms: None, feedback: 0.0, pingpong: 0.0 },
            kernel(),
        );
        let samplerate = 48000u32;
        for _ in 0..6 {
            let mut data = [1.0f32; 128];
            let buf = Buffer::from_mut(&mut data, 64, 2, ChannelLayout::stereo(), samplerate);
            dd.process(buf).unwrap();
        }
        let mut data = [1.0f32; 128];
        let buf = Buffer::from_mut(&mut data, 64, 2, ChannelLayout::stereo(), samplerate);
        dd.process(buf).unwrap();
        assert!((data[126] - 1.0).abs() < 0.05);
    }
}
