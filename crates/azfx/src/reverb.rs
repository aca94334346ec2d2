//! Fixed-topology feedback delay network reverb (spec.md §4.11, grounded
//! on `original_source/base/src/AzAudio/dsp.c` `azaProcessReverb`).
//!
//! 30 fixed prime-sample delay lengths, tabulated at 48 kHz and converted
//! to milliseconds so they scale to other samplerates. The first `2N/3`
//! taps ("early") each delay-and-filter a copy of the (already
//! input-delayed) dry signal into a shared `combined` bus at `1/N` gain.
//! The remaining `N/3` taps ("diffuse") instead delay-and-filter a copy
//! of the *combined* bus itself and feed that back into it — the
//! recirculating stage that gives the tail its density.

use azcore::buffer::Buffer;
use azcore::channel_layout::ChannelLayout;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::{db_to_amp, samples_to_ms};
use azcore::scratch;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::vec::Vec;

use crate::delay::{Delay, DelayConfig};
use crate::filter::{Filter, FilterConfig, FilterMode};

const DELAY_LENGTHS_SAMPLES_AT_48K: [u32; 30] = [
    2111, 2129, 2017, 2029, 1753, 1733, 1699, 1621, 1447, 1429, 1361, 1319, 1201, 1171, 1129, 1117, 1063, 1051, 1039,
    1009, 977, 919, 857, 773, 743, 719, 643, 641, 631, 619,
];

struct Tap {
    delay: Delay,
    filter: Filter,
}

/// Configuration for [`Reverb`].
#[derive(Debug, Clone, Copy)]
pub struct ReverbConfig {
    pub roomsize: f32,
    pub color: f32,
    pub delay_ms: f32,
    pub gain_db: f32,
    pub gain_dry_db: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self { roomsize: 10.0, color: 0.5, delay_ms: 0.0, gain_db: 0.0, gain_dry_db: 0.0 }
    }
}

/// Fixed-topology FDN reverb (spec.md §4.11). Mono in, mono `combined`
/// bus; the caller's buffer's own channel count is preserved on output
/// (every channel receives the same combined bus, matching the source's
/// single-bus topology).
pub struct Reverb {
    pub config: ReverbConfig,
    input_delay: Delay,
    taps: Vec<Tap>,
    early_count: usize,
}

impl Reverb {
    pub fn new(config: ReverbConfig) -> Self {
        let n = DELAY_LENGTHS_SAMPLES_AT_48K.len();
        let early_count = 2 * n / 3;
        let feedback_early = 0.985 - 0.2 / config.roomsize.max(0.001);
        let mut taps = Vec::with_capacity(n);
        for (idx, &len_samples) in DELAY_LENGTHS_SAMPLES_AT_48K.iter().enumerate() {
            let delay_ms = samples_to_ms(len_samples as f32, 48_000);
            let is_early = idx < early_count;
            let feedback = if is_early { feedback_early } else { (idx + n) as f32 / (2 * n) as f32 };
            let cutoff = if is_early { config.color * 4000.0 } else { config.color * 4000.0 * 4.0 };
            taps.push(Tap {
                delay: Delay::new(DelayConfig { delay_ms, feedback, pingpong: 0.05, gain_db: 0.0, gain_dry_db: -1000.0 }),
                filter: Filter::new(FilterConfig { mode: FilterMode::LowPass, cutoff_hz: cutoff, dry_mix: 0.0 }),
            });
        }
        Self {
            input_delay: Delay::new(DelayConfig {
                delay_ms: config.delay_ms,
                feedback: 0.0,
                pingpong: 0.0,
                gain_db: 0.0,
                gain_dry_db: -1000.0,
            }),
            taps,
            early_count,
            config,
        }
    }
}

impl Dsp for Reverb {
    fn kind(&self) -> DspKind {
        DspKind::Reverb
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let frames = buffer.frames();
        let samplerate = buffer.samplerate();
        let mono = ChannelLayout::mono();

        let dry_delayed = scratch::ScratchGuard::push_zero(frames, 1, samplerate);
        dry_delayed.handle().with_slice_mut(|dry_storage| {
            let dry_buf = Buffer::from_mut(dry_storage, frames, 1, mono, samplerate);
            for i in 0..frames {
                let mut sum = 0.0f32;
                for c in 0..buffer.channels() {
                    sum += buffer.get(i, c);
                }
                dry_buf.set(i, 0, sum / buffer.channels() as f32);
            }
            self.input_delay.process(dry_buf)?;

            let combined = scratch::ScratchGuard::push_zero(frames, 1, samplerate);
            combined.handle().with_slice_mut(|combined_storage| {
                let combined_buf = Buffer::from_mut(combined_storage, frames, 1, mono, samplerate);

                let tap_scratch = scratch::ScratchGuard::push_zero(frames, 1, samplerate);
                tap_scratch.handle().with_slice_mut(|tap_storage| {
                    let tap_buf = Buffer::from_mut(tap_storage, frames, 1, mono, samplerate);
                    let n = self.taps.len() as f32;
                    for (idx, tap) in self.taps.iter_mut().enumerate() {
                        let source = if idx < self.early_count { dry_buf } else { combined_buf };
                        source.copy_into(&tap_buf)?;
                        tap.delay.process(tap_buf)?;
                        tap.filter.process(tap_buf)?;
                        for i in 0..frames {
                            combined_buf.set(i, 0, combined_buf.get(i, 0) + tap_buf.get(i, 0) / n);
                        }
                    }
                    Ok(())
                })?;

                let gain = db_to_amp(self.config.gain_db);
                let gain_dry = db_to_amp(self.config.gain_dry_db);
                for i in 0..frames {
                    let wet = combined_buf.get(i, 0) * gain;
                    for c in 0..buffer.channels() {
                        let dry = buffer.get(i, c);
                        buffer.set(i, c, dry * gain_dry + wet);
                    }
                }
                Ok(())
            })
        })
    }

    fn reset(&mut self) {
        self.input_delay.reset();
        for tap in &mut self.taps {
            tap.delay.reset();
            tap.filter.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_stays_silent() {
        let mut reverb = Reverb::new(ReverbConfig::default());
        let mut data = [0.0f32; 128];
        let buf = Buffer::from_mut(&mut data, 64, 2, ChannelLayout::stereo(), 48000);
        reverb.process(buf).unwrap();
        assert!(data.iter().all(|&x| x.abs() < 1e-5));
    }

    #[test]
    fn impulse_produces_a_tail() {
        let mut reverb = Reverb::new(ReverbConfig { gain_dry_db: -1000.0, gain_db: 0.0, ..Default::default() });
        let mut data = [0.0f32; 8192 * 2];
        data[0] = 1.0;
        data[1] = 1.0;
        let buf = Buffer::from_mut(&mut data, 8192, 2, ChannelLayout::stereo(), 48000);
        reverb.process(buf).unwrap();
        let energy_tail: f32 = data[4000..8000].iter().map(|x| x * x).sum();
        assert!(energy_tail > 0.0, "expected nonzero reverb tail energy");
    }
}
