//! Noise gate / downward expander with an optional sidechain-shaping
//! effects chain (spec.md §4.8, grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaProcessGate`).
//!
//! Shares the compressor's attack/decay envelope shape over an RMS
//! detector, but with a soft-knee gain curve (slope 10 dB per dB under
//! threshold) instead of a ratio, and an optional [`DspChain`] that
//! reshapes a scratch copy of the input before detection — e.g. a
//! band-pass filter so the gate keys off a kick drum's fundamental
//! without being tripped by cymbal bleed.

use azcore::buffer::Buffer;
use azcore::channel_layout::ChannelLayout;
use azcore::dsp::{Dsp, DspChain, DspKind};
use azcore::error::AzResult;
use azcore::math::{amp_to_db, db_to_amp};
use azcore::scratch;
use libm::expf;

use crate::rms::{Rms, RmsConfig};

/// Configuration for [`Gate`].
#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub threshold_db: f32,
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub rms_window_samples: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { threshold_db: -40.0, attack_ms: 2.0, decay_ms: 150.0, rms_window_samples: 128 }
    }
}

/// Noise gate (spec.md §4.8). `activation_effects` runs on a scratch copy
/// of the input before the RMS sidechain detector sees it, and never
/// touches the actual signal path.
pub struct Gate {
    pub config: GateConfig,
    pub activation_effects: DspChain,
    detector: Rms,
    attenuation_db: f32,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            detector: Rms::new(RmsConfig { window_samples: config.rms_window_samples }),
            config,
            activation_effects: DspChain::new(),
            attenuation_db: 0.0,
        }
    }
}

impl Dsp for Gate {
    fn kind(&self) -> DspKind {
        DspKind::Gate
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let frames = buffer.frames();
        let channels = buffer.channels();
        let samplerate = buffer.samplerate();
        let t = samplerate as f32 / 1000.0;
        let attack_factor = expf(-1.0 / (self.config.attack_ms * t).max(1e-6));
        let decay_factor = expf(-1.0 / (self.config.decay_ms * t).max(1e-6));

        let sidechain_src = scratch::ScratchGuard::push(frames, channels, samplerate);
        sidechain_src.handle().with_slice_mut(|storage| {
            let side_buf = Buffer::from_mut(storage, frames, channels, buffer.layout(), samplerate);
            buffer.copy_into(&side_buf)?;
            if !self.activation_effects.is_empty() {
                self.activation_effects.process(side_buf)?;
            }

            let rms_scratch = scratch::ScratchGuard::push_zero(frames, 1, samplerate);
            rms_scratch.handle().with_slice_mut(|rms_storage| {
                let rms_buf = Buffer::from_mut(rms_storage, frames, 1, ChannelLayout::mono(), samplerate);
                self.detector.process_combined(rms_buf, side_buf)?;
                for i in 0..frames {
                    let rms_db = amp_to_db(rms_buf.get(i, 0)).max(-120.0);
                    let factor = if rms_db > self.attenuation_db { attack_factor } else { decay_factor };
                    self.attenuation_db = rms_db + factor * (self.attenuation_db - rms_db);
                    let gain_db = if self.attenuation_db > self.config.threshold_db {
                        0.0
                    } else {
                        -10.0 * (self.config.threshold_db - self.attenuation_db)
                    };
                    let amp = db_to_amp(gain_db);
                    for c in 0..channels {
                        buffer.set(i, c, buffer.get(i, c) * amp);
                    }
                }
                Ok(())
            })
        })
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.activation_effects.reset();
        self.attenuation_db = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_stays_gated_closed_but_finite() {
        let mut gate = Gate::new(GateConfig::default());
        let mut data = [0.0f32; 64];
        let buf = Buffer::from_mut(&mut data, 32, 2, ChannelLayout::stereo(), 48000);
        gate.process(buf).unwrap();
        assert!(data.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn loud_signal_passes_through_open_gate() {
        let mut gate = Gate::new(GateConfig { threshold_db: -60.0, attack_ms: 0.1, decay_ms: 50.0, rms_window_samples: 16 });
        let mut data = [0.5f32; 2048];
        let buf = Buffer::from_mut(&mut data, 1024, 2, ChannelLayout::stereo(), 48000);
        gate.process(buf).unwrap();
        assert!(data[2046].abs() > 0.1);
    }
}
