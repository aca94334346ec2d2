//! Precomputed sine table for cheap synthesis (spec.md §2 "Oscillator
//! tables").
//!
//! A single process-wide table, read-only after construction, shared by any
//! DSP block that wants cheap-but-not-free sine generation (e.g. an LFO
//! driving the dynamic delay's glide) without paying a `sinf` call per
//! sample.

use libm::sinf;

/// Table resolution: samples per full cycle. A power of two makes the
/// wrap-around mask cheap.
pub const SINE_TABLE_SIZE: usize = 4096;

/// A precomputed sine lookup table over one full cycle `[0, 2π)`, with
/// linear interpolation between entries.
pub struct SineTable {
    table: [f32; SINE_TABLE_SIZE + 1],
}

impl SineTable {
    pub fn new() -> Self {
        let mut table = [0.0f32; SINE_TABLE_SIZE + 1];
        for (i, slot) in table.iter_mut().enumerate() {
            let phase = i as f32 / SINE_TABLE_SIZE as f32 * core::f32::consts::TAU;
            *slot = sinf(phase);
        }
        Self { table }
    }

    /// Sample the table at `phase` (in turns, i.e. `0.0..=1.0` is one
    /// cycle); wraps for any real `phase`.
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        let wrapped = phase - libm::floorf(phase);
        let pos = wrapped * SINE_TABLE_SIZE as f32;
        let idx = pos as usize;
        let frac = pos - idx as f32;
        let a = self.table[idx];
        let b = self.table[idx + 1];
        crate::math::lerp(a, b, frac)
    }
}

impl Default for SineTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_sinf_closely() {
        let table = SineTable::new();
        for i in 0..37 {
            let turns = i as f32 / 36.0;
            let expected = sinf(turns * core::f32::consts::TAU);
            let got = table.sample(turns);
            assert!((got - expected).abs() < 2e-3, "turns={turns} expected={expected} got={got}");
        }
    }

    #[test]
    fn wraps_negative_and_large_phase() {
        let table = SineTable::new();
        assert!((table.sample(0.25) - table.sample(1.25)).abs() < 1e-3);
        assert!((table.sample(0.25) - table.sample(-0.75)).abs() < 1e-3);
    }
}
