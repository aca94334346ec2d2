//! Feedforward compressor (spec.md §4.7, grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaProcessCompressor`).
//!
//! Sidechain detection is [`crate::rms::Rms::process_combined`] over the
//! input itself (no external sidechain input in this library). The
//! envelope smoothing uses separate one-pole time constants for attack
//! and decay, applied in the dB domain, then a knee turns the smoothed
//! level into a uniform gain reduction applied to every channel.

use azcore::buffer::Buffer;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::{amp_to_db, db_to_amp};
use azcore::scratch;
use libm::expf;

use crate::rms::{Rms, RmsConfig};

/// Configuration for [`Compressor`].
#[derive(Debug, Clone, Copy)]
pub struct CompressorConfig {
    pub threshold_db: f32,
    /// `> 1.0`: standard compression ratio. `< 0.0`: expansion (the
    /// original's negative-ratio convention, see `azaProcessCompressor`).
    /// `0.0` (or `1.0`): no gain reduction at all.
    pub ratio: f32,
    pub attack_ms: f32,
    pub decay_ms: f32,
    pub rms_window_samples: usize,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 4.0,
            attack_ms: 5.0,
            decay_ms: 100.0,
            rms_window_samples: 128,
        }
    }
}

/// Feedforward compressor/expander (spec.md §4.7).
#[derive(Debug, Clone)]
pub struct Compressor {
    pub config: CompressorConfig,
    detector: Rms,
    attenuation_db: f32,
}

impl Compressor {
    pub fn new(config: CompressorConfig) -> Self {
        Self {
            detector: Rms::new(RmsConfig { window_samples: config.rms_window_samples }),
            config,
            attenuation_db: 0.0,
        }
    }

    fn overgain_factor(ratio: f32) -> f32 {
        if ratio > 1.0 {
            1.0 - 1.0 / ratio
        } else if ratio < 0.0 {
            -ratio
        } else {
            0.0
        }
    }
}

impl Dsp for Compressor {
    fn kind(&self) -> DspKind {
        DspKind::Compressor
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        let frames = buffer.frames();
        let samplerate = buffer.samplerate();
        let t = samplerate as f32 / 1000.0;
        let attack_factor = expf(-1.0 / (self.config.attack_ms * t).max(1e-6));
        let decay_factor = expf(-1.0 / (self.config.decay_ms * t).max(1e-6));
        let overgain = Self::overgain_factor(self.config.ratio);

        let rms_scratch = scratch::ScratchGuard::push_zero(frames, 1, samplerate);
        {
            let layout = azcore::channel_layout::ChannelLayout::mono();
            rms_scratch.handle().with_slice_mut(|rms_storage| {
                let rms_buf = Buffer::from_mut(rms_storage, frames, 1, layout, samplerate);
                self.detector.process_combined(rms_buf, buffer)?;
                for i in 0..frames {
                    let rms_sample = rms_buf.get(i, 0);
                    let rms_db = amp_to_db(rms_sample).max(-120.0);
                    let factor = if rms_db > self.attenuation_db { attack_factor } else { decay_factor };
                    self.attenuation_db = rms_db + factor * (self.attenuation_db - rms_db);
                    let gain_db = if self.attenuation_db > self.config.threshold_db {
                        overgain * (self.config.threshold_db - self.attenuation_db)
                    } else {
                        0.0
                    };
                    let amp = db_to_amp(gain_db);
                    for c in 0..buffer.channels() {
                        buffer.set(i, c, buffer.get(i, c) * amp);
                    }
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.detector.reset();
        self.attenuation_db = 0.0;
    }
}
