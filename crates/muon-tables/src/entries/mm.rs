//! Memory-management call entries.

use muon_sys::SyscallArgs;
use muon_sys::consts::{
    IPC_INFO, IPC_RMID, IPC_SET, IPC_STAT, MADV_DONTDUMP, MADV_DONTNEED, MADV_FREE,
    MADV_HUGEPAGE, MADV_NORMAL, MADV_RANDOM, MADV_SEQUENTIAL, MADV_WILLNEED, MAP_ANONYMOUS,
    MAP_FIXED, MAP_GROWSDOWN, MAP_LOCKED, MAP_NORESERVE, MAP_POPULATE, MAP_PRIVATE, MAP_SHARED,
    PAGE_SIZE, PROT_EXEC, PROT_NONE, PROT_READ, PROT_WRITE,
};

use crate::entry::{EntryFlags, SyscallEntry};
use crate::kinds::{ArgKind, ArgSpec};
use crate::pools::GenCtx;

static PROT_BITS: [u64; 4] = [PROT_NONE, PROT_READ, PROT_WRITE, PROT_EXEC];

static MAP_BITS: [u64; 8] = [
    MAP_SHARED,
    MAP_PRIVATE,
    MAP_FIXED,
    MAP_ANONYMOUS,
    MAP_GROWSDOWN,
    MAP_LOCKED,
    MAP_NORESERVE,
    MAP_POPULATE,
];

/// `mremap` flags: MAYMOVE, FIXED, DONTUNMAP.
static MREMAP_BITS: [u64; 3] = [1, 2, 4];

/// `msync` flags: MS_ASYNC, MS_INVALIDATE, MS_SYNC.
static MSYNC_BITS: [u64; 3] = [1, 2, 4];

static MADVISE_ADVICE: [u64; 8] = [
    MADV_NORMAL,
    MADV_RANDOM,
    MADV_SEQUENTIAL,
    MADV_WILLNEED,
    MADV_DONTNEED,
    MADV_FREE,
    MADV_HUGEPAGE,
    MADV_DONTDUMP,
];

/// `shmget` flags: IPC_CREAT, IPC_EXCL, SHM_HUGETLB.
static SHMGET_BITS: [u64; 3] = [0o1000, 0o2000, 0o4000];

/// `shmat` flags: SHM_RDONLY, SHM_RND, SHM_REMAP.
static SHMAT_BITS: [u64; 3] = [0o10000, 0o20000, 0o40000];

static SHMCTL_CMDS: [u64; 4] = [IPC_RMID, IPC_SET, IPC_STAT, IPC_INFO];

/// The kernel rejects a flags word naming neither mapping visibility, so
/// a pure random draw wastes most iterations. Force one of the two in,
/// and keep the file offset page-aligned often enough to get past the
/// trivial `EINVAL` check.
pub fn sanitise_mmap(ctx: &mut GenCtx, args: &mut SyscallArgs) {
    let visibility = if ctx.rng.one_in(2) { MAP_SHARED } else { MAP_PRIVATE };
    args[3] = (args[3] & !(MAP_SHARED | MAP_PRIVATE)) | visibility;
    if !ctx.rng.one_in(4) {
        args[5] &= !(PAGE_SIZE - 1);
    }
}

/// `mmap(2)`.
pub static MMAP: SyscallEntry = SyscallEntry {
    name: "mmap",
    args: &[
        ArgSpec::new("addr", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
        ArgSpec::new("prot", ArgKind::Flags(&PROT_BITS)),
        ArgSpec::new("flags", ArgKind::Flags(&MAP_BITS)),
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("off", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: Some(sanitise_mmap),
    post: None,
};

/// `mprotect(2)`.
pub static MPROTECT: SyscallEntry = SyscallEntry {
    name: "mprotect",
    args: &[
        ArgSpec::new("start", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
        ArgSpec::new("prot", ArgKind::Flags(&PROT_BITS)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `munmap(2)`: may well unmap the child's own mappings; the supervisor
/// treats the resulting crash as a finding about the child, not a bug.
pub static MUNMAP: SyscallEntry = SyscallEntry {
    name: "munmap",
    args: &[
        ArgSpec::new("addr", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `brk(2)`.
pub static BRK: SyscallEntry = SyscallEntry {
    name: "brk",
    args: &[ArgSpec::new("brk", ArgKind::Address)],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `mremap(2)`.
pub static MREMAP: SyscallEntry = SyscallEntry {
    name: "mremap",
    args: &[
        ArgSpec::new("addr", ArgKind::Address),
        ArgSpec::new("old_len", ArgKind::Len),
        ArgSpec::new("new_len", ArgKind::Len),
        ArgSpec::new("flags", ArgKind::Flags(&MREMAP_BITS)),
        ArgSpec::new("new_addr", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `msync(2)`.
pub static MSYNC: SyscallEntry = SyscallEntry {
    name: "msync",
    args: &[
        ArgSpec::new("start", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
        ArgSpec::new("flags", ArgKind::Flags(&MSYNC_BITS)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `mincore(2)`.
pub static MINCORE: SyscallEntry = SyscallEntry {
    name: "mincore",
    args: &[
        ArgSpec::new("start", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
        ArgSpec::new("vec", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `madvise(2)`.
pub static MADVISE: SyscallEntry = SyscallEntry {
    name: "madvise",
    args: &[
        ArgSpec::new("start", ArgKind::Address),
        ArgSpec::new("len_in", ArgKind::Len),
        ArgSpec::new("advice", ArgKind::Op(&MADVISE_ADVICE)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `shmget(2)`.
pub static SHMGET: SyscallEntry = SyscallEntry {
    name: "shmget",
    args: &[
        ArgSpec::new("key", ArgKind::RandomInt),
        ArgSpec::new("size", ArgKind::Len),
        ArgSpec::new("shmflg", ArgKind::Flags(&SHMGET_BITS)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `shmat(2)`.
pub static SHMAT: SyscallEntry = SyscallEntry {
    name: "shmat",
    args: &[
        ArgSpec::new("shmid", ArgKind::RandomInt),
        ArgSpec::new("shmaddr", ArgKind::Address),
        ArgSpec::new("shmflg", ArgKind::Flags(&SHMAT_BITS)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `shmctl(2)`.
pub static SHMCTL: SyscallEntry = SyscallEntry {
    name: "shmctl",
    args: &[
        ArgSpec::new("shmid", ArgKind::RandomInt),
        ArgSpec::new("cmd", ArgKind::Op(&SHMCTL_CMDS)),
        ArgSpec::new("buf", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use muon_rand::Rng;

    #[test]
    fn mmap_sanitiser_forces_a_visibility_bit() {
        let mut ctx = GenCtx::bare(Rng::with_seed(0x33));
        for _ in 0..500 {
            let mut args = SyscallArgs([0, 0, 0, ctx.rng.next_u64(), 0, ctx.rng.next_u64()]);
            sanitise_mmap(&mut ctx, &mut args);
            let vis = args[3] & (MAP_SHARED | MAP_PRIVATE);
            assert!(vis == MAP_SHARED || vis == MAP_PRIVATE);
        }
    }

    #[test]
    fn mmap_sanitiser_mostly_aligns_the_offset() {
        let mut ctx = GenCtx::bare(Rng::with_seed(0x34));
        let aligned = (0..1000)
            .filter(|_| {
                let mut args = SyscallArgs([0, 0, 0, 0, 0, 0x1234_5678]);
                sanitise_mmap(&mut ctx, &mut args);
                args[5] % PAGE_SIZE == 0
            })
            .count();
        assert!(aligned > 600, "only {aligned} aligned offsets");
    }
}
