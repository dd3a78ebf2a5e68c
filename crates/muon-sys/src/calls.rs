//! Thin wrappers for the calls the fuzzer itself depends on.
//!
//! These are plumbing, not fuzzing targets: region setup, child
//! management, timestamps, and the descriptors backing the generator
//! pools. Each wrapper owns the pointer validity its call needs, so the
//! layers above stay free of raw traps.

use crate::errno::{Errno, check};
use crate::nr;
use crate::raw;

/// Wall-clock timestamp, `gettimeofday(2)` layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Timeval {
    /// Seconds since the epoch.
    pub tv_sec: i64,
    /// Microseconds within the current second.
    pub tv_usec: i64,
}

#[derive(Clone, Copy, Debug, Default)]
#[repr(C)]
struct Timespec {
    tv_sec: i64,
    tv_nsec: i64,
}

/// Result of a successful [`fork`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForkResult {
    /// Running in the new child.
    Child,
    /// Running in the parent; carries the child's pid.
    Parent(i32),
}

/// Reads the wall clock.
///
/// # Errors
///
/// Propagates the kernel errno; practically only `EFAULT` is possible
/// and the pointer here is always valid.
pub fn gettimeofday() -> Result<Timeval, Errno> {
    let mut tv = Timeval::default();
    // SAFETY: the output pointer is a live, correctly sized Timeval; the
    // timezone argument is NULL as documented.
    let raw = unsafe {
        raw::syscall2(
            nr::SYS_GETTIMEOFDAY,
            core::ptr::from_mut(&mut tv) as u64,
            0,
        )
    };
    check(raw).map(|_| tv)
}

/// Arms (or with `0`, cancels) the process alarm. Returns the seconds
/// remaining on any previously armed alarm.
pub fn alarm(seconds: u32) -> u32 {
    // SAFETY: alarm takes a plain integer and cannot fault.
    let raw = unsafe { raw::syscall1(nr::SYS_ALARM, u64::from(seconds)) };
    raw as u32
}

/// Returns the calling process id.
#[must_use]
pub fn getpid() -> i32 {
    // SAFETY: getpid has no arguments and always succeeds.
    (unsafe { raw::syscall0(nr::SYS_GETPID) }) as i32
}

/// Returns the real uid of the calling process.
#[must_use]
pub fn getuid() -> u32 {
    // SAFETY: getuid has no arguments and always succeeds.
    (unsafe { raw::syscall0(nr::SYS_GETUID) }) as u32
}

/// Sets the real uid of the calling process.
///
/// # Errors
///
/// `EPERM` when the process lacks the privilege to switch back.
pub fn setuid(uid: u32) -> Result<(), Errno> {
    // SAFETY: setuid takes a plain integer.
    let raw = unsafe { raw::syscall1(nr::SYS_SETUID, u64::from(uid)) };
    check(raw).map(|_| ())
}

/// Forks the calling process.
///
/// # Errors
///
/// `EAGAIN`/`ENOMEM` when the kernel refuses another process.
pub fn fork() -> Result<ForkResult, Errno> {
    // SAFETY: fork has no arguments; both return paths are handled.
    let raw = unsafe { raw::syscall0(nr::SYS_FORK) };
    check(raw).map(|pid| {
        if pid == 0 {
            ForkResult::Child
        } else {
            ForkResult::Parent(pid as i32)
        }
    })
}

/// Non-standard exit that bypasses libc teardown, for throwaway children
/// that must not run atexit handlers or flush inherited buffers.
pub fn exit_now(code: i32) -> ! {
    loop {
        // SAFETY: exit takes a plain integer and does not return.
        unsafe {
            raw::syscall1(nr::SYS_EXIT, code as u64);
        }
    }
}

/// Waits for a child. With `nohang` the call returns `Ok(None)` when no
/// child has changed state yet.
///
/// # Errors
///
/// `ECHILD` when there is no such child to wait for.
pub fn wait4(pid: i32, nohang: bool) -> Result<Option<(i32, i32)>, Errno> {
    const WNOHANG: u64 = 1;
    let mut status: i32 = 0;
    let options = if nohang { WNOHANG } else { 0 };
    // SAFETY: the status pointer is a live i32; rusage is NULL.
    let raw = unsafe {
        raw::syscall4(
            nr::SYS_WAIT4,
            pid as u64,
            core::ptr::from_mut(&mut status) as u64,
            options,
            0,
        )
    };
    check(raw).map(|reaped| {
        if reaped == 0 {
            None
        } else {
            Some((reaped as i32, status))
        }
    })
}

/// Sends a signal to a process.
///
/// # Errors
///
/// `ESRCH` when the target is already gone.
pub fn kill(pid: i32, sig: u64) -> Result<(), Errno> {
    // SAFETY: kill takes two plain integers.
    let raw = unsafe { raw::syscall2(nr::SYS_KILL, pid as u64, sig) };
    check(raw).map(|_| ())
}

/// Sleeps for the given duration. An `EINTR` wakeup is reported as `Ok`;
/// callers here use the sleep as a bound, not a guarantee.
///
/// # Errors
///
/// Propagates any errno other than `EINTR`.
pub fn sleep_ms(ms: u64) -> Result<(), Errno> {
    let req = Timespec {
        tv_sec: (ms / 1000) as i64,
        tv_nsec: ((ms % 1000) * 1_000_000) as i64,
    };
    // SAFETY: the request pointer is a live Timespec; remainder is NULL.
    let raw = unsafe {
        raw::syscall2(
            nr::SYS_NANOSLEEP,
            core::ptr::from_ref(&req) as u64,
            0,
        )
    };
    match check(raw) {
        Ok(_) => Ok(()),
        Err(Errno(crate::errno::EINTR)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Opens a path with the given flags. `path` must be NUL-terminated.
///
/// # Errors
///
/// Propagates the kernel errno.
///
/// # Panics
///
/// Panics when `path` is not NUL-terminated; pool paths are built that
/// way by construction.
pub fn open(path: &[u8], flags: u64) -> Result<i32, Errno> {
    assert_eq!(path.last(), Some(&0), "open() path must be NUL-terminated");
    // SAFETY: the path pointer is live and NUL-terminated for the whole
    // call; mode 0 is ignored without O_CREAT.
    let raw = unsafe { raw::syscall3(nr::SYS_OPEN, path.as_ptr() as u64, flags, 0) };
    check(raw).map(|fd| fd as i32)
}

/// Closes a descriptor. Errors are ignored; the pool drops descriptors
/// on a best-effort basis.
pub fn close(fd: i32) {
    // SAFETY: close takes a plain integer.
    let _ = unsafe { raw::syscall1(nr::SYS_CLOSE, fd as u64) };
}

/// Creates a pipe pair.
///
/// # Errors
///
/// `EMFILE`/`ENFILE` when descriptors are exhausted.
pub fn pipe2(flags: u64) -> Result<[i32; 2], Errno> {
    let mut fds = [0i32; 2];
    // SAFETY: the output pointer covers two i32 slots.
    let raw = unsafe { raw::syscall2(nr::SYS_PIPE2, fds.as_mut_ptr() as u64, flags) };
    check(raw).map(|_| fds)
}

/// Creates a socket.
///
/// # Errors
///
/// Propagates the kernel errno (commonly `EAFNOSUPPORT`).
pub fn socket(family: u64, ty: u64, protocol: u64) -> Result<i32, Errno> {
    // SAFETY: socket takes three plain integers.
    let raw = unsafe { raw::syscall3(nr::SYS_SOCKET, family, ty, protocol) };
    check(raw).map(|fd| fd as i32)
}

/// Maps `len` bytes of anonymous memory shared across fork.
///
/// # Errors
///
/// `ENOMEM` when the mapping cannot be established.
pub fn mmap_shared_anon(len: usize) -> Result<*mut u8, Errno> {
    use crate::consts::{MAP_ANONYMOUS, MAP_SHARED, PROT_READ, PROT_WRITE};
    // SAFETY: NULL hint, anonymous mapping; the fd and offset are
    // ignored for MAP_ANONYMOUS.
    let raw = unsafe {
        raw::syscall6(
            nr::SYS_MMAP,
            0,
            len as u64,
            PROT_READ | PROT_WRITE,
            MAP_SHARED | MAP_ANONYMOUS,
            u64::MAX,
            0,
        )
    };
    check(raw).map(|addr| addr as *mut u8)
}

/// Unmaps a region previously returned by [`mmap_shared_anon`].
///
/// # Safety
///
/// The region must not be referenced after this call, in this process or
/// any forked child still sharing it.
pub unsafe fn munmap(ptr: *mut u8, len: usize) -> Result<(), Errno> {
    // SAFETY: deferred to the caller contract above.
    let raw = unsafe { raw::syscall2(nr::SYS_MUNMAP, ptr as u64, len as u64) };
    check(raw).map(|_| ())
}

#[cfg(all(test, target_arch = "x86_64", target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn gettimeofday_advances() {
        let a = gettimeofday().unwrap();
        assert!(a.tv_sec > 0);
        let b = gettimeofday().unwrap();
        assert!((b.tv_sec, b.tv_usec) >= (a.tv_sec, a.tv_usec));
    }

    #[test]
    fn open_close_dev_null() {
        let fd = open(b"/dev/null\0", crate::consts::O_RDWR).unwrap();
        assert!(fd >= 0);
        close(fd);
    }

    #[test]
    fn pipe_pair_is_distinct() {
        let fds = pipe2(0).unwrap();
        assert_ne!(fds[0], fds[1]);
        close(fds[0]);
        close(fds[1]);
    }

    #[test]
    fn shared_mapping_roundtrip() {
        let len = 4096;
        let ptr = mmap_shared_anon(len).unwrap();
        assert!(!ptr.is_null());
        // SAFETY: freshly mapped, correctly sized, then released.
        unsafe {
            ptr.write(0x5A);
            assert_eq!(ptr.read(), 0x5A);
            munmap(ptr, len).unwrap();
        }
    }

    #[test]
    fn uid_is_stable_across_reads() {
        assert_eq!(getuid(), getuid());
    }
}
