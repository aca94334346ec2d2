//! Criterion benchmarks for the mixer graph, isolating routing/mix overhead
//! from DSP cost (no effects attached to any track).
//!
//! Run with: `cargo bench -p azcore`
#![allow(missing_docs)]

use azcore::{ChannelLayout, Mixer, MixerConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const SAMPLERATE: u32 = 48_000;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn build_chain(track_count: usize, max_frames: usize) -> Mixer {
    let mut mixer = Mixer::new(MixerConfig { samplerate: SAMPLERATE, max_frames, layout: ChannelLayout::stereo() });
    let mut prev = mixer.add_track();
    for i in 0..track_count {
        {
            let buf = mixer.track_mut(prev).buffer_view(max_frames, SAMPLERATE);
            for f in 0..max_frames {
                buf.set(f, 0, (i as f32 + 1.0) * 0.01);
                buf.set(f, 1, (i as f32 + 1.0) * 0.01);
            }
        }
        if i + 1 < track_count {
            let next = mixer.add_track();
            mixer.connect(prev, next, -3.0);
            prev = next;
        }
    }
    mixer.connect(prev, mixer.output_id(), 0.0);
    mixer
}

fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixer_chain");
    for &frames in BLOCK_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(frames), &frames, |b, &frames| {
            let mut mixer = build_chain(8, frames);
            b.iter(|| {
                mixer.process(black_box(frames), SAMPLERATE).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_chain_depth);
criterion_main!(benches);
