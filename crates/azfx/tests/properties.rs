//! Property-based tests for azfx effects: every effect should stay finite
//! for arbitrary finite input (spec.md §8).

use azcore::buffer::Buffer;
use azcore::channel_layout::ChannelLayout;
use azcore::dsp::Dsp;
use azfx::{Compressor, CompressorConfig, Delay, DelayConfig, Filter, FilterConfig, Gate, GateConfig, Limiter, LimiterConfig};
use proptest::prelude::*;

const FRAMES: usize = 32;
const SAMPLERATE: u32 = 48_000;

fn run_stereo(dsp: &mut dyn Dsp, input: &[f32]) -> Vec<f32> {
    let mut data = vec![0.0f32; FRAMES * 2];
    for i in 0..FRAMES {
        data[i * 2] = input[i];
        data[i * 2 + 1] = input[i];
    }
    let buf = Buffer::from_mut(&mut data, FRAMES, 2, ChannelLayout::stereo(), SAMPLERATE);
    dsp.process(buf).unwrap();
    data
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any cutoff in the audible range, [`Filter`] stays finite across
    /// a block of random finite input.
    #[test]
    fn filter_stays_finite(
        cutoff in 20.0f32..20_000.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut f = Filter::new(FilterConfig { cutoff_hz: cutoff, ..Default::default() });
        let out = run_stereo(&mut f, &input);
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }

    /// [`Limiter`] never lets a sample escape beyond a small margin over
    /// full scale, for any finite input block.
    #[test]
    fn limiter_stays_bounded(
        input in prop::array::uniform32(-4.0f32..=4.0f32),
    ) {
        let mut l = Limiter::new(LimiterConfig::default());
        let out = run_stereo(&mut l, &input);
        prop_assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.01));
    }

    /// [`Compressor`] stays finite across any threshold/ratio combination.
    #[test]
    fn compressor_stays_finite(
        threshold_db in -60.0f32..0.0f32,
        ratio in 1.0f32..20.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut c = Compressor::new(CompressorConfig { threshold_db, ratio, ..Default::default() });
        let out = run_stereo(&mut c, &input);
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }

    /// [`Gate`] stays finite across any threshold.
    #[test]
    fn gate_stays_finite(
        threshold_db in -80.0f32..-10.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut g = Gate::new(GateConfig { threshold_db, ..Default::default() });
        let out = run_stereo(&mut g, &input);
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }

    /// [`Delay`] stays finite for any feedback in its sane range.
    #[test]
    fn delay_stays_finite(
        feedback in 0.0f32..0.99f32,
        delay_ms in 1.0f32..500.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut d = Delay::new(DelayConfig { feedback, delay_ms, ..Default::default() });
        let out = run_stereo(&mut d, &input);
        prop_assert!(out.iter().all(|s| s.is_finite()));
    }
}
