//! Criterion benchmarks for azfx effects.
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use azcore::buffer::Buffer;
use azcore::channel_layout::ChannelLayout;
use azcore::dsp::Dsp;
use azfx::{Compressor, CompressorConfig, Delay, DelayConfig, Filter, FilterConfig, Limiter, LimiterConfig, Reverb, ReverbConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SAMPLERATE: u32 = 48_000;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn test_signal(frames: usize) -> Vec<f32> {
    (0..frames * 2)
        .map(|i| {
            let t = (i / 2) as f32 / SAMPLERATE as f32;
            (2.0 * core::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_dsp(c: &mut Criterion, name: &str, mut dsp: impl Dsp) {
    let mut group = c.benchmark_group(name);
    for &frames in BLOCK_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(frames), &frames, |b, &frames| {
            let mut data = test_signal(frames);
            b.iter(|| {
                let buf = Buffer::from_mut(&mut data, frames, 2, ChannelLayout::stereo(), SAMPLERATE);
                dsp.process(black_box(buf)).unwrap();
                black_box(data[0])
            });
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    bench_dsp(c, "Filter", Filter::new(FilterConfig::default()));
}

fn bench_limiter(c: &mut Criterion) {
    bench_dsp(c, "Limiter", Limiter::new(LimiterConfig::default()));
}

fn bench_compressor(c: &mut Criterion) {
    bench_dsp(c, "Compressor", Compressor::new(CompressorConfig::default()));
}

fn bench_delay(c: &mut Criterion) {
    bench_dsp(c, "Delay", Delay::new(DelayConfig::default()));
}

fn bench_reverb(c: &mut Criterion) {
    bench_dsp(c, "Reverb", Reverb::new(ReverbConfig::default()));
}

criterion_group!(benches, bench_filter, bench_limiter, bench_compressor, bench_delay, bench_reverb);
criterion_main!(benches);
