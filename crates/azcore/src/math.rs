//! Scalar and vector math shared by the mixer graph and the DSP library.
//!
//! Covers level conversions (dB ↔ linear amplitude), time conversions
//! (ms ↔ samples), a minimal 3D vector/matrix kit for the spatializer, and
//! the tabulated Lanczos kernel used by the dynamic delay line for
//! sub-sample resampling.

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std as alloc;

use libm::{cosf, fabsf, logf, powf, sinf, sqrtf};

/// Convert decibels to linear amplitude.
///
/// `-inf` dB (or anything at/below -1000) collapses to exactly `0.0`.
#[inline]
pub fn db_to_amp(db: f32) -> f32 {
    if db <= -1000.0 {
        0.0
    } else {
        powf(10.0, db / 20.0)
    }
}

/// Convert linear amplitude to decibels. `amp <= 0.0` maps to a very
/// negative but finite value (`-1000.0`) rather than `-inf`, matching the
/// clamp `azaAmpToDb` performs in the original C implementation.
#[inline]
pub fn amp_to_db(amp: f32) -> f32 {
    let amp = fabsf(amp);
    if amp <= 0.0 {
        -1000.0
    } else {
        20.0 * log10f(amp)
    }
}

#[inline]
fn log10f(x: f32) -> f32 {
    // libm doesn't expose log10f directly in all feature sets; derive it.
    logf(x) * core::f32::consts::LOG10_E
}

/// Convert a duration in milliseconds to a sample count at `samplerate`.
#[inline]
pub fn ms_to_samples(ms: f32, samplerate: u32) -> f32 {
    ms * samplerate as f32 / 1000.0
}

/// Convert a sample count to a duration in milliseconds at `samplerate`.
#[inline]
pub fn samples_to_ms(samples: f32, samplerate: u32) -> f32 {
    samples * 1000.0 / samplerate as f32
}

/// Linear interpolation between `a` and `b` at `t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp `x` into `[lo, hi]`.
#[inline]
pub fn clampf(x: f32, lo: f32, hi: f32) -> f32 {
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Remap `x` from `[a_min, a_max]` to `[0, 1]`, clamped. Used by the
/// spatializer's amplitude-window remap (spec.md §4.13 step 4).
#[inline]
pub fn linstep(x: f32, a_min: f32, a_max: f32) -> f32 {
    if a_max <= a_min {
        return if x >= a_max { 1.0 } else { 0.0 };
    }
    clampf((x - a_min) / (a_max - a_min), 0.0, 1.0)
}

/// Minimal column-major 3-vector used for spatializer positions and
/// directions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn norm(self) -> f32 {
        sqrtf(self.dot(self))
    }

    /// Returns `self` scaled to unit length, or `Vec3::ZERO` if `self` is
    /// (numerically) the zero vector.
    #[inline]
    pub fn normalized(self) -> Vec3 {
        let n = self.norm();
        if n < 1e-9 {
            Vec3::ZERO
        } else {
            self.scale(1.0 / n)
        }
    }

    #[inline]
    pub fn scale(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    #[inline]
    pub fn lerp(self, rhs: Vec3, t: f32) -> Vec3 {
        Vec3::new(
            lerp(self.x, rhs.x, t),
            lerp(self.y, rhs.y, t),
            lerp(self.z, rhs.z, t),
        )
    }
}

/// Row-major 3x3 rotation matrix. Used by [`crate::world::World`] to hold
/// listener orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    pub rows: [Vec3; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [
            Vec3 { x: 1.0, y: 0.0, z: 0.0 },
            Vec3 { x: 0.0, y: 1.0, z: 0.0 },
            Vec3 { x: 0.0, y: 0.0, z: 1.0 },
        ],
    };

    /// Rotation about the Y (up) axis, in radians. The common case for a
    /// listener turning their head left/right.
    pub fn from_yaw(radians: f32) -> Self {
        let (s, c) = (sinf(radians), cosf(radians));
        Mat3 {
            rows: [
                Vec3::new(c, 0.0, s),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(-s, 0.0, c),
            ],
        }
    }

    #[inline]
    pub fn mul_vec3(self, v: Vec3) -> Vec3 {
        Vec3::new(self.rows[0].dot(v), self.rows[1].dot(v), self.rows[2].dot(v))
    }

    /// Multiply by the transpose of `self`, i.e. `self^T * v`. World-space
    /// to head-space transforms use the orientation's transpose (spec.md
    /// §4.13 step 1).
    #[inline]
    pub fn mul_transpose_vec3(self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.rows[0].x * v.x + self.rows[1].x * v.y + self.rows[2].x * v.z,
            self.rows[0].y * v.x + self.rows[1].y * v.y + self.rows[2].y * v.z,
            self.rows[0].z * v.x + self.rows[1].z * v.y + self.rows[2].z * v.z,
        )
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Mat3::IDENTITY
    }
}

/// Tabulated Lanczos resampling kernel (spec.md §3 "Lanczos kernel").
///
/// `sample(x)` evaluates `sinc(x) * sinc(x / length)` for `|x| < length`,
/// read out of a precomputed table rather than recomputed per tap, since
/// the dynamic delay line and sampler both evaluate it `2 * length` times
/// per output sample.
#[derive(Debug, Clone)]
pub struct LanczosKernel {
    /// Half-width of the kernel's support, in samples.
    pub length: i32,
    /// Is the table symmetric (true for all Lanczos kernels — kept as an
    /// explicit flag because the table lookup exploits it).
    pub is_symmetrical: bool,
    /// Table samples per unit `x`, i.e. resolution of the lookup.
    pub scale: f32,
    table: alloc::vec::Vec<f32>,
}

impl LanczosKernel {
    /// Tabulate a kernel of half-width `length` samples at `resolution`
    /// table-entries-per-sample. `length = 3` is a typical quality/cost
    /// tradeoff for audio-rate resampling.
    pub fn new(length: i32, resolution: u32) -> Self {
        assert!(length > 0, "kernel length must be positive");
        let scale = resolution as f32;
        let size = (length as usize) * (resolution as usize) + 1;
        let mut table = alloc::vec::Vec::with_capacity(size);
        for i in 0..size {
            let x = i as f32 / scale;
            table.push(Self::sinc_windowed(x, length as f32));
        }
        Self {
            length,
            is_symmetrical: true,
            scale,
            table,
        }
    }

    fn sinc_windowed(x: f32, length: f32) -> f32 {
        if x.abs() < 1e-8 {
            1.0
        } else if x.abs() >= length {
            0.0
        } else {
            let pix = core::f32::consts::PI * x;
            let sinc = sinf(pix) / pix;
            let window_arg = core::f32::consts::PI * x / length;
            let window = sinf(window_arg) / window_arg;
            sinc * window
        }
    }

    /// Evaluate the kernel at (possibly fractional, possibly negative) `x`,
    /// via table lookup + linear interpolation, exploiting symmetry.
    #[inline]
    pub fn sample(&self, x: f32) -> f32 {
        let ax = fabsf(x);
        if ax >= self.length as f32 {
            return 0.0;
        }
        let pos = ax * self.scale;
        let idx = pos as usize;
        let frac = pos - idx as f32;
        let a = self.table[idx];
        let b = *self.table.get(idx + 1).unwrap_or(&0.0);
        lerp(a, b, frac)
    }
}

/// Interpolate `src` at fractional `index` using `kernel`, clamping taps to
/// `[min, max]` (spec.md §4.10 step 2, "dynamic delay").
pub fn kernel_sample(src: &[f32], kernel: &LanczosKernel, index: f32) -> f32 {
    let center = index.floor() as i32;
    let min = 0i32;
    let max = src.len() as i32 - 1;
    let mut acc = 0.0f32;
    for i in (center - kernel.length + 1)..=(center + kernel.length) {
        let clamped = i.clamp(min, max);
        let weight = kernel.sample(i as f32 - index);
        acc += src[clamped as usize] * weight;
    }
    acc
}
