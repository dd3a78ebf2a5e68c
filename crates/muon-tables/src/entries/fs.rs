//! File and descriptor call entries.

use muon_sys::consts::{
    O_APPEND, O_ASYNC, O_CLOEXEC, O_CREAT, O_DIRECT, O_DIRECTORY, O_DSYNC, O_EXCL, O_LARGEFILE,
    O_NOATIME, O_NOCTTY, O_NOFOLLOW, O_NONBLOCK, O_PATH, O_RDONLY, O_RDWR, O_SYNC, O_TMPFILE,
    O_TRUNC, O_WRONLY,
};
use muon_sys::{CallOutcome, SyscallArgs};

use crate::entry::{EntryFlags, SyscallEntry};
use crate::generate::or_flags;
use crate::kinds::{ArgKind, ArgSpec};
use crate::pools::GenCtx;

/// Access modes for the `flags` argument of `open`.
static OPEN_MODES: [u64; 4] = [O_RDONLY, O_WRONLY, O_RDWR, O_CREAT];

/// Extra flags OR'd over the chosen access mode.
static O_EXTRAS: [u64; 16] = [
    O_EXCL, O_NOCTTY, O_TRUNC, O_APPEND, O_NONBLOCK, O_SYNC, O_ASYNC, O_DIRECTORY, O_NOFOLLOW,
    O_CLOEXEC, O_DIRECT, O_NOATIME, O_PATH, O_DSYNC, O_LARGEFILE, O_TMPFILE,
];

/// `lseek` whence values, `SEEK_SET` through `SEEK_HOLE`.
static SEEK_WHENCE: [u64; 5] = [0, 1, 2, 3, 4];

/// `access` mode bits: F_OK plus the X/W/R probes.
static ACCESS_MODES: [u64; 4] = [0, 1, 2, 4];

/// ORs a random pile of extra open flags over the access mode in `a2`,
/// preserving whatever the mode draw put in the low bits.
pub fn sanitise_open(ctx: &mut GenCtx, args: &mut SyscallArgs) {
    args[1] |= or_flags(&mut ctx.rng, &O_EXTRAS);
}

/// Caches a descriptor the kernel actually handed back, so later calls
/// fuzz real files too.
fn post_open(ctx: &mut GenCtx, outcome: &CallOutcome) {
    if !outcome.is_error() {
        ctx.fds.cache(outcome.retval as i32);
    }
}

/// `read(2)`: blocks on quiet pipes, so alarm-bounded.
pub static READ: SyscallEntry = SyscallEntry {
    name: "read",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("buf", ArgKind::Address),
        ArgSpec::new("count", ArgKind::Len),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `write(2)`.
pub static WRITE: SyscallEntry = SyscallEntry {
    name: "write",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("buf", ArgKind::Address),
        ArgSpec::new("count", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `open(2)`.
pub static OPEN: SyscallEntry = SyscallEntry {
    name: "open",
    args: &[
        ArgSpec::new("filename", ArgKind::Pathname),
        ArgSpec::new("flags", ArgKind::Op(&OPEN_MODES)),
        ArgSpec::new("mode", ArgKind::Mode),
    ],
    flags: EntryFlags::empty(),
    sanitise: Some(sanitise_open),
    post: Some(post_open),
};

/// `close(2)`.
pub static CLOSE: SyscallEntry = SyscallEntry {
    name: "close",
    args: &[ArgSpec::new("fd", ArgKind::Fd)],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `stat(2)`.
pub static STAT: SyscallEntry = SyscallEntry {
    name: "stat",
    args: &[
        ArgSpec::new("filename", ArgKind::Pathname),
        ArgSpec::new("statbuf", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `fstat(2)`.
pub static FSTAT: SyscallEntry = SyscallEntry {
    name: "fstat",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("statbuf", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `lstat(2)`.
pub static LSTAT: SyscallEntry = SyscallEntry {
    name: "lstat",
    args: &[
        ArgSpec::new("filename", ArgKind::Pathname),
        ArgSpec::new("statbuf", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `poll(2)`.
pub static POLL: SyscallEntry = SyscallEntry {
    name: "poll",
    args: &[
        ArgSpec::new("ufds", ArgKind::Address),
        ArgSpec::new("nfds", ArgKind::Len),
        ArgSpec::new("timeout_msecs", ArgKind::Range { min: 0, max: 3000 }),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `lseek(2)`.
pub static LSEEK: SyscallEntry = SyscallEntry {
    name: "lseek",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("offset", ArgKind::RandomInt),
        ArgSpec::new("whence", ArgKind::Op(&SEEK_WHENCE)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `ioctl(2)`: the request space is opaque on purpose. Several drivers
/// answer unknown requests with `ENOSYS` instead of `ENOTTY`, so that
/// errno must not retire the entry.
pub static IOCTL: SyscallEntry = SyscallEntry {
    name: "ioctl",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("cmd", ArgKind::RandomInt),
        ArgSpec::new("arg", ArgKind::Address),
    ],
    flags: EntryFlags::IGNORE_ENOSYS,
    sanitise: None,
    post: None,
};

/// `pread64(2)`.
pub static PREAD64: SyscallEntry = SyscallEntry {
    name: "pread64",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("buf", ArgKind::Address),
        ArgSpec::new("count", ArgKind::Len),
        ArgSpec::new("pos", ArgKind::RandomInt),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `pwrite64(2)`.
pub static PWRITE64: SyscallEntry = SyscallEntry {
    name: "pwrite64",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("buf", ArgKind::Address),
        ArgSpec::new("count", ArgKind::Len),
        ArgSpec::new("pos", ArgKind::RandomInt),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `readv(2)`.
pub static READV: SyscallEntry = SyscallEntry {
    name: "readv",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("vec", ArgKind::Address),
        ArgSpec::new("vlen", ArgKind::Len),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `writev(2)`.
pub static WRITEV: SyscallEntry = SyscallEntry {
    name: "writev",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("vec", ArgKind::Address),
        ArgSpec::new("vlen", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `access(2)`.
pub static ACCESS: SyscallEntry = SyscallEntry {
    name: "access",
    args: &[
        ArgSpec::new("filename", ArgKind::Pathname),
        ArgSpec::new("mode", ArgKind::Flags(&ACCESS_MODES)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `pipe(2)`.
pub static PIPE: SyscallEntry = SyscallEntry {
    name: "pipe",
    args: &[ArgSpec::new("fildes", ArgKind::Address)],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `select(2)`.
pub static SELECT: SyscallEntry = SyscallEntry {
    name: "select",
    args: &[
        ArgSpec::new("n", ArgKind::Len),
        ArgSpec::new("inp", ArgKind::Address),
        ArgSpec::new("outp", ArgKind::Address),
        ArgSpec::new("exp", ArgKind::Address),
        ArgSpec::new("tvp", ArgKind::Address),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `dup(2)`.
pub static DUP: SyscallEntry = SyscallEntry {
    name: "dup",
    args: &[ArgSpec::new("fildes", ArgKind::Fd)],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `dup2(2)`.
pub static DUP2: SyscallEntry = SyscallEntry {
    name: "dup2",
    args: &[
        ArgSpec::new("oldfd", ArgKind::Fd),
        ArgSpec::new("newfd", ArgKind::Fd),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `sendfile(2)`.
pub static SENDFILE: SyscallEntry = SyscallEntry {
    name: "sendfile",
    args: &[
        ArgSpec::new("out_fd", ArgKind::Fd),
        ArgSpec::new("in_fd", ArgKind::Fd),
        ArgSpec::new("offset", ArgKind::Address),
        ArgSpec::new("count", ArgKind::Len),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use muon_rand::Rng;

    #[test]
    fn open_sanitiser_preserves_access_mode_bits() {
        let union: u64 = O_EXTRAS.iter().fold(0, |acc, &v| acc | v);
        let mut ctx = GenCtx::bare(Rng::with_seed(0x0F1A));
        for _ in 0..1000 {
            let mut args = SyscallArgs::zeroed();
            args[1] = O_WRONLY;
            sanitise_open(&mut ctx, &mut args);
            assert_eq!(args[1] & 0b11, O_WRONLY, "access mode clobbered");
            let added = args[1] & !O_WRONLY;
            assert_eq!(added & !union, 0, "bit outside the declared list");
        }
    }

    #[test]
    fn open_declares_the_four_access_modes() {
        assert_eq!(OPEN_MODES, [O_RDONLY, O_WRONLY, O_RDWR, O_CREAT]);
        match OPEN.args[1].kind {
            ArgKind::Op(list) => assert_eq!(list.len(), 4),
            _ => panic!("open flags arg must be an op list"),
        }
    }

    #[test]
    fn post_open_caches_only_successes() {
        let mut ctx = GenCtx::bare(Rng::with_seed(0x0F1B));
        post_open(
            &mut ctx,
            &CallOutcome {
                retval: u64::MAX,
                errno: muon_sys::errno::EBADF,
            },
        );
        assert!(ctx.fds.is_empty());
        post_open(&mut ctx, &CallOutcome { retval: 7, errno: 0 });
        assert_eq!(ctx.fds.len(), 1);
        // The cached value is not a real descriptor in this test.
        std::mem::forget(ctx.fds);
    }
}
