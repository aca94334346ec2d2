//! Thread-local scratch buffer pool (spec.md §4.1).
//!
//! Multi-pass effects (reverb, dynamic delay, gate sidechain) need
//! temporaries sized to the current block without touching a general
//! allocator on the audio thread. The pool is a stack of up to
//! [`MAX_POOL_BUFFERS`] buffers: `push` hands out the next slot, growing its
//! backing storage only if the slot's previous peak capacity was too small;
//! `pop` returns it. After warm-up (the first few blocks at the engine's
//! real block size), every `push`/`pop` pair is allocation-free because
//! each stack depth has already memoized its peak capacity.

use std::cell::RefCell;

/// Maximum simultaneously "live" (pushed but not popped) scratch buffers.
/// Exceeding this is a programming error (spec.md §4.1).
pub const MAX_POOL_BUFFERS: usize = 64;

struct Slot {
    storage: Vec<f32>,
    frames: usize,
    channels: usize,
    samplerate: u32,
}

impl Slot {
    fn empty() -> Self {
        Self {
            storage: Vec::new(),
            frames: 0,
            channels: 0,
            samplerate: 0,
        }
    }

    fn ensure_capacity(&mut self, frames: usize, channels: usize, samplerate: u32) {
        let needed = frames * channels;
        if self.storage.len() < needed {
            self.storage.resize(needed, 0.0);
        }
        self.frames = frames;
        self.channels = channels;
        self.samplerate = samplerate;
    }
}

/// Per-thread scratch pool state.
pub struct ScratchPool {
    slots: Vec<Slot>,
    active_count: usize,
}

impl ScratchPool {
    fn new() -> Self {
        Self {
            slots: Vec::new(),
            active_count: 0,
        }
    }

    /// Number of buffers currently pushed (not yet popped).
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    fn push_slot(&mut self, frames: usize, channels: usize, samplerate: u32) -> usize {
        assert!(
            self.active_count < MAX_POOL_BUFFERS,
            "scratch pool exceeded {MAX_POOL_BUFFERS} live buffers — programming error"
        );
        let depth = self.active_count;
        if depth == self.slots.len() {
            self.slots.push(Slot::empty());
        }
        self.slots[depth].ensure_capacity(frames, channels, samplerate);
        self.active_count += 1;
        depth
    }

    fn pop_slot(&mut self) {
        assert!(self.active_count > 0, "scratch pool underflow");
        self.active_count -= 1;
    }
}

thread_local! {
    static POOL: RefCell<ScratchPool> = RefCell::new(ScratchPool::new());
}

/// A scratch buffer checked out from the thread-local [`ScratchPool`].
/// Its planar storage lives at depth `depth` in the pool; dropping it
/// without calling [`ScratchHandle::pop`] leaks the slot until the next
/// `pop` (use [`ScratchGuard`] for the drop-discipline-enforced version).
pub struct ScratchHandle {
    depth: usize,
    frames: usize,
    channels: usize,
}

impl ScratchHandle {
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Borrow this handle's storage as a planar-interleaved slice with
    /// stride == channels (spec.md §3 buffer view).
    pub fn with_slice<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        POOL.with(|pool| {
            let pool = pool.borrow();
            f(&pool.slots[self.depth].storage[..self.frames * self.channels])
        })
    }

    pub fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [f32]) -> R) -> R {
        POOL.with(|pool| {
            let mut pool = pool.borrow_mut();
            let len = self.frames * self.channels;
            f(&mut pool.slots[self.depth].storage[..len])
        })
    }
}

/// Push a new scratch buffer of `frames * channels` samples, reusing the
/// slot's backing storage when it's already large enough.
pub fn push(frames: usize, channels: usize, samplerate: u32) -> ScratchHandle {
    let depth = POOL.with(|pool| pool.borrow_mut().push_slot(frames, channels, samplerate));
    ScratchHandle { depth, frames, channels }
}

/// `push` followed by copying `src` into the new buffer.
pub fn push_copy(src: &[f32], frames: usize, channels: usize, samplerate: u32) -> ScratchHandle {
    let handle = push(frames, channels, samplerate);
    handle.with_slice_mut(|dst| dst.copy_from_slice(&src[..frames * channels]));
    handle
}

/// `push` followed by zeroing the new buffer.
pub fn push_zero(frames: usize, channels: usize, samplerate: u32) -> ScratchHandle {
    let handle = push(frames, channels, samplerate);
    handle.with_slice_mut(|dst| dst.fill(0.0));
    handle
}

/// Pop the most recently pushed buffer. Must be called in strict LIFO order
/// relative to `push`.
pub fn pop() {
    POOL.with(|pool| pool.borrow_mut().pop_slot());
}

/// Pop `k` buffers at once.
pub fn pop_n(k: usize) {
    POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        for _ in 0..k {
            pool.pop_slot();
        }
    });
}

/// Number of buffers currently live on this thread's pool.
pub fn active_count() -> usize {
    POOL.with(|pool| pool.borrow().active_count())
}

/// RAII guard that pops its scratch buffer on drop (spec.md §9 DESIGN
/// NOTES: "enforce stack discipline with a guard type that pops on drop").
pub struct ScratchGuard {
    handle: ScratchHandle,
}

impl ScratchGuard {
    pub fn push(frames: usize, channels: usize, samplerate: u32) -> Self {
        Self { handle: push(frames, channels, samplerate) }
    }

    pub fn push_zero(frames: usize, channels: usize, samplerate: u32) -> Self {
        Self { handle: push_zero(frames, channels, samplerate) }
    }

    pub fn push_copy(src: &[f32], frames: usize, channels: usize, samplerate: u32) -> Self {
        Self { handle: push_copy(src, frames, channels, samplerate) }
    }

    pub fn handle(&self) -> &ScratchHandle {
        &self.handle
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_restores_active_count() {
        let before = active_count();
        {
            let _a = push(128, 2, 48000);
            let _b = push(64, 1, 48000);
            assert_eq!(active_count(), before + 2);
            pop_n(2);
        }
        assert_eq!(active_count(), before);
    }

    #[test]
    fn guard_pops_on_drop() {
        let before = active_count();
        {
            let _g = ScratchGuard::push_zero(32, 2, 48000);
            assert_eq!(active_count(), before + 1);
        }
        assert_eq!(active_count(), before);
    }

    #[test]
    fn push_zero_is_actually_zeroed() {
        let h = push_zero(16, 1, 48000);
        h.with_slice(|s| assert!(s.iter().all(|&x| x == 0.0)));
        pop();
    }

    #[test]
    fn push_copy_roundtrips() {
        let src = [1.0f32, 2.0, 3.0, 4.0];
        let h = push_copy(&src, 2, 2, 48000);
        h.with_slice(|s| assert_eq!(s, &src[..]));
        pop();
    }

    #[test]
    #[should_panic]
    fn underflow_panics() {
        // Don't disturb the shared thread-local pool's real accounting for
        // other tests: spin up a dedicated thread.
        std::thread::spawn(|| {
            pop();
        })
        .join()
        .unwrap();
    }
}
