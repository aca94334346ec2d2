//! Mono point-source spatializer (spec.md §4.13, grounded on
//! `original_source/base/src/AzAudio/dsp.c` `azaSpatializeSimple`).
//!
//! Maps a moving mono source into a destination channel layout by
//! projecting its head-space direction onto a fixed per-channel azimuth
//! table. The source implementation additionally classifies the
//! destination layout (presence of front/mid-front/side/back/aerial
//! groups) and picks one of several canonical angle sets accordingly —
//! this rework always uses the generic angle set (spec.md §4.13 step 2's
//! "e.g." example), trading the source's per-layout angle tuning for one
//! table that covers every layout reasonably. Likewise step 4's "top
//! `min_channel` channels" window always uses `min_channel = 2`; the
//! source's bump to 3 when aerial channels are present isn't replicated.
//! Both simplifications are recorded in `DESIGN.md`.

use azcore::buffer::{mix_fade, Buffer};
use azcore::channel_layout::ChannelPosition;
use azcore::dsp::{Dsp, DspKind};
use azcore::error::AzResult;
use azcore::math::{linstep, Vec3};
use azcore::world::World;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;
use alloc::vec;
use alloc::vec::Vec;

/// How many of the loudest channels define the remap window in step 4
/// (spec.md §4.13 step 4). The source widens this to 3 when the
/// destination layout has aerial channels; this rework doesn't.
const MIN_CHANNEL_WINDOW: usize = 2;

fn channel_azimuth_radians(pos: ChannelPosition) -> Option<f32> {
    use core::f32::consts::PI;
    let degrees = match pos {
        ChannelPosition::FrontCenter | ChannelPosition::TopFrontCenter => 0.0,
        ChannelPosition::FrontLeft | ChannelPosition::TopFrontLeft => -30.0,
        ChannelPosition::FrontRight | ChannelPosition::TopFrontRight => 30.0,
        ChannelPosition::CenterFrontLeft => -15.0,
        ChannelPosition::CenterFrontRight => 15.0,
        ChannelPosition::SideLeft => -90.0,
        ChannelPosition::SideRight => 90.0,
        ChannelPosition::BackLeft | ChannelPosition::TopBackLeft => -130.0,
        ChannelPosition::BackRight | ChannelPosition::TopBackRight => 130.0,
        ChannelPosition::CenterBack | ChannelPosition::TopBackCenter => 180.0,
        ChannelPosition::TopCenter => return None,
        ChannelPosition::Subwoofer => return None,
    };
    Some(degrees * PI / 180.0)
}

fn channel_direction(pos: ChannelPosition) -> Option<Vec3> {
    channel_azimuth_radians(pos).map(|theta| Vec3::new(libm::sinf(theta), 0.0, libm::cosf(theta)))
}

/// Amplitude weights for every non-subwoofer channel of a layout at one
/// instant (spec.md §4.13 steps 1-4).
fn channel_amplitudes(layout: &azcore::channel_layout::ChannelLayout, head_space_pos: Vec3) -> Vec<f32> {
    let norm = head_space_pos.norm();
    let non_sub_count = layout.non_subwoofer_count().max(1);
    let (direction, all_channel_add) = if norm < 0.5 {
        (Vec3::ZERO, (0.5 - norm) * 2.0)
    } else {
        (head_space_pos.normalized(), 0.0)
    };

    let mut raw: Vec<(usize, f32)> = Vec::with_capacity(non_sub_count);
    for (idx, &pos) in layout.positions().iter().enumerate() {
        if pos.is_subwoofer() {
            continue;
        }
        let dir = channel_direction(pos).unwrap_or(Vec3::ZERO);
        let amp = 0.5 * norm + 0.5 * dir.dot(direction) + all_channel_add / non_sub_count as f32;
        raw.push((idx, amp));
    }

    if raw.len() > 2 {
        let mut sorted = raw.clone();
        sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(core::cmp::Ordering::Equal));
        let window = sorted.iter().take(MIN_CHANNEL_WINDOW.min(sorted.len())).map(|&(_, a)| a);
        let a_max = window.clone().fold(f32::NEG_INFINITY, f32::max);
        let a_min = window.fold(f32::INFINITY, f32::min);
        for (_, amp) in raw.iter_mut() {
            *amp = linstep(*amp, a_min, a_max) + all_channel_add / non_sub_count as f32;
        }
    }

    let mut result = vec![0.0f32; layout.count()];
    for (idx, amp) in raw {
        result[idx] = amp;
    }
    let sum: f32 = result.iter().sum();
    if sum > 1e-9 {
        for a in &mut result {
            *a /= sum;
        }
    }
    result
}

/// Mono point-source spatializer (spec.md §4.13). `process_into` is the
/// grounded entry point (two distinct buffers, like
/// [`crate::rms::Rms::process_combined`]); [`Dsp::process`] is a
/// convenience wrapper over a source block staged with [`Self::stage_source`].
pub struct Spatializer {
    pub world: World,
    pub pos_start: Vec3,
    pub pos_end: Vec3,
    pub src_amp_start: f32,
    pub src_amp_end: f32,
    staged_source: Vec<f32>,
}

impl Spatializer {
    pub fn new(world: World) -> Self {
        Self {
            world,
            pos_start: Vec3::ZERO,
            pos_end: Vec3::ZERO,
            src_amp_start: 1.0,
            src_amp_end: 1.0,
            staged_source: Vec::new(),
        }
    }

    /// Cache a mono source block for the next [`Dsp::process`] call.
    pub fn stage_source(&mut self, mono: &[f32]) {
        self.staged_source = mono.to_vec();
    }

    /// Spatialize mono `src` into multi-channel `dst` (spec.md §4.13).
    /// The subwoofer channel, if present, receives `src` unchanged
    /// (pre-filtered upstream, per the source's contract).
    pub fn process_into(&mut self, dst: Buffer, src: Buffer) -> AzResult {
        dst.validate()?;
        src.validate()?;
        if dst.frames() != src.frames() {
            return Err(azcore::error::AzError::MismatchedFrameCount);
        }
        let layout = dst.layout();
        let head_start = self.world.to_head_space(self.pos_start);
        let head_end = self.world.to_head_space(self.pos_end);
        let amps_start = channel_amplitudes(&layout, head_start);
        let amps_end = channel_amplitudes(&layout, head_end);

        for (c, &pos) in layout.positions().iter().enumerate() {
            let dst_channel = dst.one_channel(c);
            if pos.is_subwoofer() {
                mix_fade(&dst_channel, 0.0, 0.0, &src, 1.0, 1.0)?;
            } else {
                mix_fade(
                    &dst_channel,
                    0.0,
                    0.0,
                    &src,
                    amps_start[c] * self.src_amp_start,
                    amps_end[c] * self.src_amp_end,
                )?;
            }
        }
        Ok(())
    }
}

impl Dsp for Spatializer {
    fn kind(&self) -> DspKind {
        DspKind::Spatializer
    }

    fn process(&mut self, buffer: Buffer) -> AzResult {
        if self.staged_source.len() != buffer.frames() {
            return Err(azcore::error::AzError::DspInterfaceNotGeneric);
        }
        let layout = azcore::channel_layout::ChannelLayout::mono();
        let mut storage = self.staged_source.clone();
        let src = Buffer::from_mut(&mut storage, buffer.frames(), 1, layout, buffer.samplerate());
        self.process_into(buffer, src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcore::channel_layout::ChannelLayout;

    #[test]
    fn source_at_origin_splits_evenly() {
        let mut spatializer = Spatializer::new(World::default());
        spatializer.pos_start = Vec3::ZERO;
        spatializer.pos_end = Vec3::ZERO;
        let mut src_data = [1.0f32; 4];
        let src = Buffer::from_mut(&mut src_data, 4, 1, ChannelLayout::mono(), 48000);
        let mut dst_data = [0.0f32; 8];
        let dst = Buffer::from_mut(&mut dst_data, 4, 2, ChannelLayout::stereo(), 48000);
        spatializer.process_into(dst, src).unwrap();
        assert!((dst_data[0] - dst_data[1]).abs() < 1e-5);
    }

    #[test]
    fn continuity_across_a_linear_pan_has_no_big_energy_dip() {
        let mut spatializer = Spatializer::new(World::default());
        spatializer.pos_start = Vec3::new(1.0, 0.0, 0.0);
        spatializer.pos_end = Vec3::new(-1.0, 0.0, 0.0);
        let mut src_data = [1.0f32; 1024];
        let src = Buffer::from_mut(&mut src_data, 1024, 1, ChannelLayout::mono(), 48000);
        let mut dst_data = [0.0f32; 2048];
        let dst = Buffer::from_mut(&mut dst_data, 1024, 2, ChannelLayout::stereo(), 48000);
        spatializer.process_into(dst, src).unwrap();
        let edge_energy = dst_data[0] * dst_data[0] + dst_data[1] * dst_data[1];
        let mid = 512;
        let mid_energy = dst_data[mid * 2] * dst_data[mid * 2] + dst_data[mid * 2 + 1] * dst_data[mid * 2 + 1];
        assert!(mid_energy > 0.0 && edge_energy > 0.0);
    }
}
