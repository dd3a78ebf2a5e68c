//! Errno constants and decoding of the raw syscall return convention.
//!
//! Raw stubs return the kernel's value unmodified: a result in
//! `[-4095, -1]` is a negated errno, anything else is a success value.
//! [`decode`] normalizes that into the `(retval, errno)` pair the rest of
//! the fuzzer works with, where the all-ones word is the error sentinel.

// ── Errno values (asm-generic) ───────────────────────────────────────

/// Operation not permitted.
pub const EPERM: u32 = 1;
/// No such file or directory.
pub const ENOENT: u32 = 2;
/// Interrupted system call.
pub const EINTR: u32 = 4;
/// I/O error.
pub const EIO: u32 = 5;
/// Bad file descriptor.
pub const EBADF: u32 = 9;
/// Out of memory.
pub const ENOMEM: u32 = 12;
/// Permission denied.
pub const EACCES: u32 = 13;
/// Bad address.
pub const EFAULT: u32 = 14;
/// Device or resource busy.
pub const EBUSY: u32 = 16;
/// Invalid argument.
pub const EINVAL: u32 = 22;
/// Function not implemented. The no-such-call sentinel.
pub const ENOSYS: u32 = 38;

/// Highest errno value encodable in a raw return.
const MAX_ERRNO: u64 = 4095;

/// A kernel errno wrapped for error reporting from the plumbing wrappers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Errno(pub u32);

impl Errno {
    fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            EPERM => "EPERM",
            ENOENT => "ENOENT",
            EINTR => "EINTR",
            EIO => "EIO",
            EBADF => "EBADF",
            ENOMEM => "ENOMEM",
            EACCES => "EACCES",
            EFAULT => "EFAULT",
            EBUSY => "EBUSY",
            EINVAL => "EINVAL",
            ENOSYS => "ENOSYS",
            _ => return None,
        })
    }
}

impl core::fmt::Display for Errno {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "errno {}", self.0),
        }
    }
}

impl core::error::Error for Errno {}

/// Result of one kernel trap, normalized from the raw return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// The trap return. On failure this is the all-ones error sentinel.
    pub retval: u64,
    /// The errno channel. Zero on success.
    pub errno: u32,
}

impl CallOutcome {
    /// `true` when the call reported failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.retval == u64::MAX
    }

    /// `true` when the kernel reported the no-such-call sentinel.
    #[must_use]
    pub const fn is_enosys(&self) -> bool {
        self.is_error() && self.errno == ENOSYS
    }
}

/// Normalizes a raw syscall return into a [`CallOutcome`].
#[must_use]
pub fn decode(raw: isize) -> CallOutcome {
    let raw = raw as u64;
    if raw > u64::MAX - MAX_ERRNO {
        CallOutcome {
            retval: u64::MAX,
            errno: (raw.wrapping_neg()) as u32,
        }
    } else {
        CallOutcome { retval: raw, errno: 0 }
    }
}

/// Converts a raw return into a `Result` for the plumbing wrappers.
///
/// # Errors
///
/// Returns the decoded [`Errno`] when the raw value is in the error band.
pub fn check(raw: isize) -> Result<u64, Errno> {
    let outcome = decode(raw);
    if outcome.is_error() {
        Err(Errno(outcome.errno))
    } else {
        Ok(outcome.retval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_success() {
        let out = decode(3);
        assert_eq!(out.retval, 3);
        assert_eq!(out.errno, 0);
        assert!(!out.is_error());
    }

    #[test]
    fn decode_failure() {
        let out = decode(-(ENOSYS as isize));
        assert_eq!(out.retval, u64::MAX);
        assert_eq!(out.errno, ENOSYS);
        assert!(out.is_error());
        assert!(out.is_enosys());
    }

    #[test]
    fn decode_edge_of_error_band() {
        assert!(decode(-4095).is_error());
        // Addresses near the top of the range are valid success values.
        let high = decode(-4096);
        assert!(!high.is_error());
    }

    #[test]
    fn decode_large_success_value() {
        // mmap returns pointers; they must not read as errors.
        let out = decode(0x7F00_0000_0000u64 as isize);
        assert!(!out.is_error());
        assert_eq!(out.retval, 0x7F00_0000_0000);
    }

    #[test]
    fn check_maps_to_result() {
        assert_eq!(check(7), Ok(7));
        assert_eq!(check(-(EINVAL as isize)), Err(Errno(EINVAL)));
    }

    #[test]
    fn errno_display() {
        assert_eq!(Errno(ENOSYS).to_string(), "ENOSYS");
        assert_eq!(Errno(999).to_string(), "errno 999");
    }
}
