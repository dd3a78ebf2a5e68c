//! Child-private resource pools backing the argument generators.
//!
//! Pools are owned by exactly one child and mutated without locking.
//! Descriptors and path buffers live for the child's whole life; scratch
//! buffers live for one iteration and are released unconditionally at
//! iteration end, whether or not the call went through.

use muon_rand::Rng;
use muon_sys::consts::{AF_UNIX, O_RDONLY, O_RDWR, PAGE_SIZE, SOCK_DGRAM};
use muon_sys::{Errno, calls};

/// Upper bound on pooled descriptors; post hooks stop caching beyond it.
const MAX_POOL_FDS: usize = 32;

/// Open descriptors available to the `Fd` argument kind.
pub struct FdPool {
    fds: Vec<i32>,
}

impl FdPool {
    /// An empty pool; the generator falls back to small random numbers.
    #[must_use]
    pub const fn empty() -> Self {
        Self { fds: Vec::new() }
    }

    /// Opens the standard seed set: the null and zero devices, a pipe
    /// pair, and a unix datagram socket. Individual failures are logged
    /// and skipped; fuzzing proceeds with whatever opened.
    #[must_use]
    pub fn populate() -> Self {
        let mut pool = Self::empty();
        let mut note = |what: &str, err: Errno| {
            log::warn!("fd pool: {what} unavailable: {err}");
        };

        match calls::open(b"/dev/null\0", O_RDWR) {
            Ok(fd) => pool.fds.push(fd),
            Err(e) => note("/dev/null", e),
        }
        match calls::open(b"/dev/zero\0", O_RDONLY) {
            Ok(fd) => pool.fds.push(fd),
            Err(e) => note("/dev/zero", e),
        }
        match calls::pipe2(0) {
            Ok([r, w]) => {
                pool.fds.push(r);
                pool.fds.push(w);
            }
            Err(e) => note("pipe", e),
        }
        match calls::socket(AF_UNIX, SOCK_DGRAM, 0) {
            Ok(fd) => pool.fds.push(fd),
            Err(e) => note("unix socket", e),
        }
        pool
    }

    /// Picks one pooled descriptor. An empty pool yields a small random
    /// number instead, which fuzzes the descriptor table blindly.
    pub fn pick(&self, rng: &mut Rng) -> u64 {
        if self.fds.is_empty() {
            return rng.below(1024);
        }
        let idx = rng.below(self.fds.len() as u64) as usize;
        self.fds[idx] as u64
    }

    /// Caches a descriptor produced by a fuzzed call, up to the cap.
    pub fn cache(&mut self, fd: i32) {
        if self.fds.len() < MAX_POOL_FDS {
            self.fds.push(fd);
        }
    }

    /// Number of pooled descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fds.len()
    }

    /// `true` when nothing opened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }
}

impl Drop for FdPool {
    fn drop(&mut self) {
        for &fd in &self.fds {
            calls::close(fd);
        }
    }
}

/// Pre-built NUL-terminated path buffers for the `Pathname` kind.
///
/// The mix is deliberate: paths that exist, paths that cannot, an
/// overlong one, the empty string, and dot-relative traversals.
pub struct PathPool {
    paths: Vec<Box<[u8]>>,
}

impl PathPool {
    /// Builds the fixed path set. No descriptors are opened.
    #[must_use]
    pub fn new() -> Self {
        let mut paths: Vec<Box<[u8]>> = vec![
            Box::from(*b"/dev/null\0"),
            Box::from(*b"/dev/zero\0"),
            Box::from(*b"/proc/self/status\0"),
            Box::from(*b"/tmp\0"),
            Box::from(*b".\0"),
            Box::from(*b"..\0"),
            Box::from(*b"\0"),
            Box::from(*b"muon-nonexistent\0"),
            Box::from(*b"../../../../../../etc/hostname\0"),
        ];
        // One path well past NAME_MAX.
        let mut long = vec![b'x'; 300];
        long.push(0);
        paths.push(long.into_boxed_slice());
        Self { paths }
    }

    /// Returns a pointer to one pooled path, as a trap-ready word.
    pub fn pick(&self, rng: &mut Rng) -> u64 {
        let idx = rng.below(self.paths.len() as u64) as usize;
        self.paths[idx].as_ptr() as u64
    }
}

impl Default for PathPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-iteration scratch allocations for the `Address` kind.
///
/// Everything allocated here is released by [`Scratch::clear`] at the
/// end of the iteration, including on the skip and failure paths.
#[derive(Default)]
pub struct Scratch {
    live: Vec<Box<[u8]>>,
}

impl Scratch {
    /// An empty scratch list.
    #[must_use]
    pub const fn new() -> Self {
        Self { live: Vec::new() }
    }

    /// Allocates a zeroed buffer and returns its address as a word. The
    /// buffer stays live until [`Scratch::clear`].
    pub fn alloc(&mut self, len: usize) -> u64 {
        let buf = vec![0u8; len].into_boxed_slice();
        let ptr = buf.as_ptr() as u64;
        self.live.push(buf);
        ptr
    }

    /// Allocates one writable page.
    pub fn page(&mut self) -> u64 {
        self.alloc(PAGE_SIZE as usize)
    }

    /// Releases every allocation made this iteration.
    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Number of live allocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// `true` when nothing is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// Everything a generator or hook may draw on: the child's random
/// stream and its private pools.
pub struct GenCtx {
    /// The child's random source.
    pub rng: Rng,
    /// Open-descriptor pool.
    pub fds: FdPool,
    /// Path-buffer pool.
    pub paths: PathPool,
    /// Per-iteration scratch allocations.
    pub scratch: Scratch,
}

impl GenCtx {
    /// Builds the full context for a fuzzing child: divergent random
    /// stream, populated descriptor pool, path pool.
    #[must_use]
    pub fn for_child(run_seed: u64, childno: usize) -> Self {
        Self {
            rng: Rng::for_child(run_seed, childno),
            fds: FdPool::populate(),
            paths: PathPool::new(),
            scratch: Scratch::new(),
        }
    }

    /// A context with an unpopulated descriptor pool. Used where opening
    /// descriptors is unwanted: hook unit tests and throwaway children.
    #[must_use]
    pub fn bare(rng: Rng) -> Self {
        Self {
            rng,
            fds: FdPool::empty(),
            paths: PathPool::new(),
            scratch: Scratch::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fd_pool_yields_small_numbers() {
        let pool = FdPool::empty();
        let mut rng = Rng::with_seed(1);
        for _ in 0..100 {
            assert!(pool.pick(&mut rng) < 1024);
        }
    }

    #[test]
    fn fd_cache_respects_cap() {
        let mut pool = FdPool::empty();
        for fd in 0..100 {
            pool.cache(fd);
        }
        assert_eq!(pool.len(), MAX_POOL_FDS);
        // Avoid closing random descriptors on drop.
        std::mem::forget(pool);
    }

    #[test]
    fn path_pool_pointers_are_nul_terminated() {
        let pool = PathPool::new();
        let mut rng = Rng::with_seed(2);
        for _ in 0..50 {
            let ptr = pool.pick(&mut rng) as *const u8;
            assert!(!ptr.is_null());
            // SAFETY: the pointer came from a pool buffer that is alive
            // and NUL-terminated by construction; walk to the NUL.
            unsafe {
                let mut p = ptr;
                let mut steps = 0;
                while p.read() != 0 {
                    p = p.add(1);
                    steps += 1;
                    assert!(steps <= 300);
                }
            }
        }
    }

    #[test]
    fn scratch_clears_unconditionally() {
        let mut scratch = Scratch::new();
        let a = scratch.page();
        let b = scratch.alloc(16);
        assert_ne!(a, 0);
        assert_ne!(b, 0);
        assert_eq!(scratch.len(), 2);
        scratch.clear();
        assert!(scratch.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn populated_pool_has_descriptors() {
        let pool = FdPool::populate();
        assert!(!pool.is_empty());
        let mut rng = Rng::with_seed(3);
        let fd = pool.pick(&mut rng);
        assert!(fd < 4096);
    }
}
