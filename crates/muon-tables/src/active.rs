//! Activation bookkeeping: which entries each ABI may still select.
//!
//! The counters live inside the shared region so one child retiring a
//! call retires it for every child. Reads are racy on purpose: the
//! selector tolerates lag and retries. Only the decrement-then-check
//! step needs exactness, and the caller serializes that with the
//! table-wide lock.

use core::sync::atomic::{AtomicU32, Ordering};

use muon_rand::Rng;
use muon_sys::Abi;

/// Capacity of the activation arrays. The dense table must fit; the
/// spare room keeps the shared layout stable when the table grows.
pub const MAX_SYSCALLS: usize = 128;

/// Per-entry activation counters for both ABIs, plus one remaining
/// count per ABI for fast exhaustion checks.
#[repr(C)]
pub struct ActiveSet {
    counters: [[AtomicU32; 2]; MAX_SYSCALLS],
    remaining: [AtomicU32; 2],
}

impl ActiveSet {
    /// A set with every entry inactive on both ABIs.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counters: [const { [AtomicU32::new(0), AtomicU32::new(0)] }; MAX_SYSCALLS],
            remaining: [AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    /// Activates one entry on one ABI. Idempotent; called only during
    /// single-process table setup.
    ///
    /// # Panics
    ///
    /// Panics if `idx` exceeds the activation capacity.
    pub fn activate(&self, idx: usize, abi: Abi) {
        assert!(idx < MAX_SYSCALLS, "entry index beyond activation capacity");
        let counter = &self.counters[idx][abi.index()];
        if counter.load(Ordering::Relaxed) == 0 {
            counter.store(1, Ordering::Relaxed);
            self.remaining[abi.index()].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The entry's activation count on one ABI; zero means inactive.
    #[must_use]
    pub fn active_number(&self, idx: usize, abi: Abi) -> u32 {
        self.counters[idx][abi.index()].load(Ordering::Relaxed)
    }

    /// Number of entries still active on one ABI.
    #[must_use]
    pub fn remaining(&self, abi: Abi) -> u32 {
        self.remaining[abi.index()].load(Ordering::Relaxed)
    }

    /// Decrements one entry's count on one ABI. Returns `false` when
    /// another child already drove it to zero.
    ///
    /// Callers must hold the table-wide lock: the decrement-then-check
    /// pair is what keeps the remaining count honest.
    pub fn deactivate(&self, idx: usize, abi: Abi) -> bool {
        let counter = &self.counters[idx][abi.index()];
        let current = counter.load(Ordering::Relaxed);
        if current == 0 {
            return false;
        }
        counter.store(current - 1, Ordering::Relaxed);
        if current == 1 {
            self.remaining[abi.index()].fetch_sub(1, Ordering::Relaxed);
        }
        true
    }

    /// Uniformly picks an index whose entry is active on `abi`.
    ///
    /// Rejection-sampled: a draw that lands on a just-retired entry is
    /// thrown away and redrawn. Returns `None` once the ABI has no
    /// active entries left.
    pub fn pick(&self, rng: &mut Rng, count: usize, abi: Abi) -> Option<usize> {
        debug_assert!(count > 0 && count <= MAX_SYSCALLS);
        while self.remaining(abi) > 0 {
            let idx = rng.below(count as u64) as usize;
            if self.active_number(idx, abi) > 0 {
                return Some(idx);
            }
        }
        None
    }
}

impl Default for ActiveSet {
    fn default() -> Self {
        Self::new()
    }
}
