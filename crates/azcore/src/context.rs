//! Process-wide initialization context (spec.md §9 DESIGN NOTES: "gather
//! the allocator hooks, default listener pose, sine table and Lanczos
//! kernel into a single context created by init()").
//!
//! The original C library takes an explicit allocator vtable
//! (`malloc`/`realloc`/`free` function pointers) at init time so host
//! applications can route DSP allocations through their own arena. Rust's
//! global allocator already plays that role for every `alloc`-backed type
//! in this crate ([`crate::channel_data::ChannelData`]'s heap spill,
//! [`crate::track::Track`]'s storage, ...); [`AzContext`] therefore does
//! not carry an allocator hook itself; a host that needs a custom
//! allocator installs one with `#[global_allocator]` the normal Rust way.
//! What it does carry is everything else that used to live behind that
//! same "call this once at startup" boundary: the default [`World`] pose,
//! a shared [`SineTable`], and a shared [`LanczosKernel`] sized for the
//! library's default resampling quality, so DSP blocks that need them
//! don't each tabulate their own copy.

use crate::math::LanczosKernel;
use crate::osc::SineTable;
use crate::world::World;

/// Half-width, in samples, of the shared Lanczos kernel context construct
/// by default. Matches the dynamic delay and sampler's typical
/// quality/cost tradeoff (spec.md §4.10, §4.12).
pub const DEFAULT_LANCZOS_LENGTH: i32 = 3;
/// Table resolution (entries per unit `x`) for the shared kernel.
pub const DEFAULT_LANCZOS_RESOLUTION: u32 = 64;

/// Shared, process-wide state handed out by [`AzContext::init`]. Cheap to
/// construct; a host typically builds one at startup and threads
/// references to its tables into whichever DSP blocks want them.
pub struct AzContext {
    pub world: World,
    pub sine_table: SineTable,
    pub lanczos: LanczosKernel,
}

impl AzContext {
    /// Build a context with library defaults: identity-oriented world at
    /// the origin, a full-resolution sine table, and a length-3 Lanczos
    /// kernel.
    pub fn init() -> Self {
        Self {
            world: World::default(),
            sine_table: SineTable::new(),
            lanczos: LanczosKernel::new(DEFAULT_LANCZOS_LENGTH, DEFAULT_LANCZOS_RESOLUTION),
        }
    }

    /// Build a context with an explicit listener pose, keeping the default
    /// sine table and Lanczos kernel.
    pub fn with_world(world: World) -> Self {
        Self { world, ..Self::init() }
    }
}

impl Default for AzContext {
    fn default() -> Self {
        Self::init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_produces_usable_tables() {
        let ctx = AzContext::init();
        assert!((ctx.sine_table.sample(0.25) - 1.0).abs() < 2e-3);
        assert!((ctx.lanczos.sample(0.0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn with_world_overrides_only_the_pose() {
        let custom = World::new(crate::math::Vec3::new(1.0, 0.0, 0.0), crate::math::Mat3::IDENTITY);
        let ctx = AzContext::with_world(custom);
        assert_eq!(ctx.world, custom);
    }
}
