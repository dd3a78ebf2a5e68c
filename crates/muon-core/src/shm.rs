//! The shared bookkeeping region.
//!
//! One anonymous `MAP_SHARED` mapping holds the global counters, the
//! table-wide lock, the activation counters, and one slot per child.
//! The mapping is created before the first fork, so every child and the
//! supervisor see the same physical pages.
//!
//! Locking is two distinct scopes that must not be conflated:
//!
//! - the table lock serializes the decrement-then-check step of
//!   deactivation, nothing else;
//! - each record's lock covers only that record's fields, held for
//!   short bounded sections on both the child and supervisor sides.
//!
//! Counters are relaxed atomics: slight skew under races is tolerated,
//! since nothing gates on their exactness.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use muon_sys::consts::PAGE_SIZE;
use muon_sys::{Abi, Errno, SyscallArgs, Timeval, calls};
use muon_tables::ActiveSet;

/// Capacity of the per-child slot array.
pub const MAX_CHILDREN: usize = 64;

/// Lifecycle state of one call record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RecState {
    /// Slot not in use; the starting and recycled state.
    Unused,
    /// Arguments being generated and sanitized under the record lock.
    Prep,
    /// In or about to enter the kernel. A record stuck here past the
    /// hang threshold is the supervisor's kill signal.
    Before,
    /// Returned from the kernel; outcome fields are now meaningful.
    After,
    /// Iteration fully accounted.
    Done,
    /// Handed to a throwaway process that exited as planned.
    GoingAway,
}

/// The lock-protected payload of one call record.
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct RecordData {
    /// Chosen table index.
    pub nr: usize,
    /// The six argument words.
    pub args: SyscallArgs,
    /// Entry convention for this call.
    pub abi: Abi,
    /// Wall-clock stamp taken right after the trap returns.
    pub tv: Timeval,
    /// Monotone per-child operation counter.
    pub op_nr: u64,
    /// Errno channel of the last trap; meaningful from `After` on.
    pub errno_post: u32,
    /// Return of the last trap; meaningful from `After` on.
    pub retval: u64,
    /// State machine position.
    pub state: RecState,
}

impl RecordData {
    /// An idle record, as found in a freshly mapped region.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nr: 0,
            args: SyscallArgs::zeroed(),
            abi: Abi::Native,
            tv: Timeval { tv_sec: 0, tv_usec: 0 },
            op_nr: 0,
            errno_post: 0,
            retval: 0,
            state: RecState::Unused,
        }
    }
}

impl Default for RecordData {
    fn default() -> Self {
        Self::new()
    }
}

/// One call record: the payload under its per-record lock.
///
/// The owning child is the only writer. The supervisor reads `state`
/// and `tv` under the same lock, which is what makes an observed
/// `After` imply the matching `retval`/`errno_post`/`tv`.
pub struct SyscallRecord {
    inner: Mutex<RecordData>,
}

impl SyscallRecord {
    const fn new() -> Self {
        Self {
            inner: Mutex::new(RecordData::new()),
        }
    }

    /// Locks the record.
    pub fn lock(&self) -> spin::MutexGuard<'_, RecordData> {
        self.inner.lock()
    }

    /// Copies the record out under the lock.
    pub fn snapshot(&self) -> RecordData {
        *self.inner.lock()
    }

    /// Reads the hang-scan pair under the lock.
    pub fn state_and_stamp(&self) -> (RecState, Timeval) {
        let rec = self.inner.lock();
        (rec.state, rec.tv)
    }

    /// Breaks the lock of a dead owner.
    ///
    /// # Safety
    ///
    /// Only sound once the owning child has been reaped: a live owner
    /// could still be inside its critical section.
    pub unsafe fn force_unlock(&self) {
        // SAFETY: deferred to the caller contract above.
        unsafe { self.inner.force_unlock() };
    }
}

/// One child's corner of the region: the in-flight record plus the
/// snapshot of its most recent completed call.
pub struct ChildSlot {
    /// The record the child is currently driving.
    pub record: SyscallRecord,
    /// Last completed call, kept for post-mortem readability.
    pub previous: SyscallRecord,
}

impl ChildSlot {
    const fn new() -> Self {
        Self {
            record: SyscallRecord::new(),
            previous: SyscallRecord::new(),
        }
    }
}

/// Global call counters. Relaxed on purpose.
#[derive(Debug)]
pub struct Stats {
    total_syscalls_done: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

impl Stats {
    const fn new() -> Self {
        Self {
            total_syscalls_done: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Counts one completed trap, success or not.
    pub fn add_total(&self) {
        self.total_syscalls_done.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one successful return.
    pub fn add_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts one failed return.
    pub fn add_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Total traps performed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_syscalls_done.load(Ordering::Relaxed)
    }

    /// Successful returns.
    #[must_use]
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Failed returns.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Layout of the shared region.
pub struct Shm {
    /// Global call counters.
    pub stats: Stats,
    /// Serializes deactivation's decrement-then-check step.
    pub table_lock: Mutex<()>,
    /// Per-entry, per-ABI activation counters.
    pub active: ActiveSet,
    /// Per-child slots.
    pub children: [ChildSlot; MAX_CHILDREN],
}

impl Shm {
    /// A fully initialized, all-idle region image.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stats: Stats::new(),
            table_lock: Mutex::new(()),
            active: ActiveSet::new(),
            children: [const { ChildSlot::new() }; MAX_CHILDREN],
        }
    }
}

impl Default for Shm {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner of the anonymous shared mapping holding the [`Shm`].
///
/// Created once in the supervisor before forking; children inherit the
/// mapping and borrow the same `&Shm`.
pub struct SharedRegion {
    ptr: core::ptr::NonNull<Shm>,
    len: usize,
}

impl SharedRegion {
    /// Maps and initializes the region.
    ///
    /// # Errors
    ///
    /// Propagates the mmap errno when the kernel refuses the mapping.
    pub fn create() -> Result<Self, Errno> {
        let len = size_of::<Shm>().next_multiple_of(PAGE_SIZE as usize);
        let raw = calls::mmap_shared_anon(len)?;
        let ptr = raw.cast::<Shm>();
        // SAFETY: the mapping is fresh, read-write, page-aligned (so
        // aligned for Shm), and at least size_of::<Shm>() long.
        unsafe { ptr.write(Shm::new()) };
        let ptr = core::ptr::NonNull::new(ptr).ok_or(Errno(muon_sys::errno::ENOMEM))?;
        Ok(Self { ptr, len })
    }

    /// The region contents.
    #[must_use]
    pub fn shm(&self) -> &Shm {
        // SAFETY: the mapping stays valid for the life of self, and the
        // pointee was initialized in create().
        unsafe { self.ptr.as_ref() }
    }
}

// SAFETY: the region is designed for cross-process sharing; every field
// reachable through &Shm is an atomic or lock-protected.
unsafe impl Send for SharedRegion {}
// SAFETY: as above.
unsafe impl Sync for SharedRegion {}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        // SAFETY: self owned the mapping and no borrow of it can
        // outlive self.
        let _ = unsafe { calls::munmap(self.ptr.as_ptr().cast(), self.len) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_add_up() {
        let stats = Stats::new();
        assert_eq!(stats.total(), 0);
        stats.add_total();
        stats.add_total();
        stats.add_success();
        stats.add_failure();
        assert_eq!(stats.total(), 2);
        assert_eq!(stats.successes() + stats.failures(), 2);
    }

    #[test]
    fn record_snapshot_matches_written_fields() {
        let slot = ChildSlot::new();
        {
            let mut rec = slot.record.lock();
            rec.nr = 12;
            rec.retval = 0xFEED;
            rec.state = RecState::After;
        }
        let snap = slot.record.snapshot();
        assert_eq!(snap.nr, 12);
        assert_eq!(snap.retval, 0xFEED);
        assert_eq!(snap.state, RecState::After);
    }

    #[test]
    fn state_and_stamp_reads_consistently() {
        let slot = ChildSlot::new();
        {
            let mut rec = slot.record.lock();
            rec.state = RecState::Before;
            rec.tv = Timeval { tv_sec: 100, tv_usec: 5 };
        }
        let (state, tv) = slot.record.state_and_stamp();
        assert_eq!(state, RecState::Before);
        assert_eq!(tv.tv_sec, 100);
    }

    #[test]
    fn boxed_region_image_is_usable_in_process() {
        let shm = Box::new(Shm::new());
        assert_eq!(shm.stats.total(), 0);
        let _guard = shm.table_lock.lock();
        assert_eq!(
            shm.children[0].record.snapshot().state,
            RecState::Unused
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn mapped_region_initializes() {
        let region = SharedRegion::create().unwrap();
        let shm = region.shm();
        assert_eq!(shm.stats.total(), 0);
        shm.stats.add_total();
        assert_eq!(shm.stats.total(), 1);
    }
}
