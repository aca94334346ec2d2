//! One-pole low/high/band-pass smoother with dry/wet blend (spec.md §4.5,
//! grounded on `original_source/base/src/AzAudio/dsp.c`
//! `azaProcessFilter`).

use azcore::buffer::Buffer;
use azcore::channel_data::ChannelData;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::clampf;
use libm::expf;

/// Which one-pole topology [`Filter`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
}

#[derive(Debug, Clone, Copy, Default)]
struct FilterChannel {
    y0: f32,
    y1: f32,
}

/// Configuration for [`Filter`].
#[derive(Debug, Clone, Copy)]
pub struct FilterConfig {
    pub mode: FilterMode,
    pub cutoff_hz: f32,
    /// `0.0` = fully wet (filtered), `1.0` = fully dry (bypassed).
    pub dry_mix: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { mode: FilterMode::LowPass, cutoff_hz: 1000.0, dry_mix: 0.0 }
    }
}

/// Single-pole smoother used for low/high/band-pass filtering (spec.md
/// §4.5). `decay = exp(-2π·cutoff/samplerate)` is recomputed every
/// `process` call since it depends on the buffer's samplerate.
#[derive(Debug, Clone)]
pub struct Filter {
    pub config: FilterConfig,
    state: ChannelData<FilterChannel, 2>,
}

impl Filter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config, state: ChannelData::new() }
    }
}

impl Dsp for Filter {
    fn kind(&self) -> DspKind {
        DspKind::Filter
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        buffer.validate()?;
        self.state.grow_to(buffer.channels());
        let wet_amount = clampf(1.0 - self.config.dry_mix, 0.0, 1.0);
        let dry_amount = clampf(self.config.dry_mix, 0.0, 1.0);
        let decay = clampf(
            expf(-core::f32::consts::TAU * (self.config.cutoff_hz / buffer.samplerate() as f32)),
            0.0,
            1.0,
        );
        for c in 0..buffer.channels() {
            let st = self.state.get_mut(c);
            for i in 0..buffer.frames() {
                let x = buffer.get(i, c);
                st.y0 = x + decay * (st.y0 - x);
                let wet = match self.config.mode {
                    FilterMode::LowPass => st.y0,
                    FilterMode::HighPass => x - st.y0,
                    FilterMode::BandPass => {
                        st.y1 = st.y0 + decay * (st.y1 - st.y0);
                        (st.y0 - st.y1) * 2.0
                    }
                };
                buffer.set(i, c, wet * wet_amount + x * dry_amount);
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    #[test]
    fn low_pass_on_constant_input_converges_to_input() {
        let mut f = Filter::new(FilterConfig { mode: FilterMode::LowPass, cutoff_hz: 2000.0, dry_mix: 0.0 });
        let mut data = [1.0f32; 64];
        let buf = Buffer::from_mut(&mut data, 32, 2, ChannelLayout::stereo(), 48000);
        f.process(buf).unwrap();
        assert!((data[62] - 1.0).abs() < 1e-2);
    }

    #[test]
    fn dry_mix_one_is_bypass() {
        let mut f = Filter::new(FilterConfig { mode: FilterMode::LowPass, cutoff_hz: 100.0, dry_mix: 1.0 });
        let mut data = [0.3f32, -0.7, 0.9, 0.1];
        let original = data;
        let buf = Buffer::from_mut(&mut data, 2, 2, ChannelLayout::stereo(), 48000);
        f.process(buf).unwrap();
        assert_eq!(data, original);
    }
}
