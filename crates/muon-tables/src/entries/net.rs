//! Socket call entries, including the per-protocol sockopt selection.

use muon_rand::Rng;
use muon_sys::consts::{
    AF_INET, AF_INET6, AF_NETLINK, AF_PACKET, AF_UNIX, AF_UNSPEC, SCTP_OPTS, SHUT_RD, SHUT_RDWR,
    SHUT_WR, SOCK_DGRAM, SOCK_RAW, SOCK_SEQPACKET, SOCK_STREAM, SOL_IP, SOL_SCTP, SOL_SOCKET,
    SOL_TCP,
};
use muon_sys::{CallOutcome, SyscallArgs};

use crate::entry::{EntryFlags, SyscallEntry};
use crate::generate::pick_one;
use crate::kinds::{ArgKind, ArgSpec};
use crate::pools::GenCtx;

static FAMILIES: [u64; 6] = [AF_UNSPEC, AF_UNIX, AF_INET, AF_INET6, AF_NETLINK, AF_PACKET];

static SOCK_TYPES: [u64; 4] = [SOCK_STREAM, SOCK_DGRAM, SOCK_RAW, SOCK_SEQPACKET];

static SHUTDOWN_HOW: [u64; 3] = [SHUT_RD, SHUT_WR, SHUT_RDWR];

/// `send`/`recv` flag bits: OOB, DONTROUTE, DONTWAIT, EOR, WAITALL,
/// CONFIRM, NOSIGNAL, MORE.
static MSG_BITS: [u64; 8] = [0x1, 0x4, 0x40, 0x80, 0x100, 0x800, 0x4000, 0x8000];

/// A sockopt selection under refinement: level/name plus the value
/// buffer the call will read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sockopt {
    /// Option namespace.
    pub level: u64,
    /// Option name within the namespace.
    pub optname: u64,
    /// Pointer to the option value.
    pub optval: u64,
    /// Length of the option value.
    pub optlen: u64,
}

/// Fills an SCTP selection: the fixed level and one of the 41 options,
/// uniformly.
pub fn sctp_setsockopt(rng: &mut Rng, so: &mut Sockopt) {
    so.level = SOL_SCTP;
    so.optname = pick_one(rng, &SCTP_OPTS);
}

/// Fills a selection from the common levels with an opaque name; the
/// point is the level-dispatch paths, not any one option.
fn generic_setsockopt(rng: &mut Rng, so: &mut Sockopt) {
    so.level = pick_one(rng, &[SOL_SOCKET, SOL_IP, SOL_TCP]);
    so.optname = rng.below(256);
}

/// Picks a protocol family's sockopt refinement and rewrites the level,
/// name, value, and length words accordingly.
pub fn sanitise_setsockopt(ctx: &mut GenCtx, args: &mut SyscallArgs) {
    let mut so = Sockopt {
        level: args[1],
        optname: args[2],
        optval: args[3],
        optlen: args[4],
    };
    if ctx.rng.one_in(4) {
        sctp_setsockopt(&mut ctx.rng, &mut so);
    } else {
        generic_setsockopt(&mut ctx.rng, &mut so);
    }
    so.optval = ctx.scratch.page();
    so.optlen = ctx.rng.below(256);
    args[1] = so.level;
    args[2] = so.optname;
    args[3] = so.optval;
    args[4] = so.optlen;
}

/// Caches sockets the kernel actually created.
fn post_socket(ctx: &mut GenCtx, outcome: &CallOutcome) {
    if !outcome.is_error() {
        ctx.fds.cache(outcome.retval as i32);
    }
}

/// `socket(2)`.
pub static SOCKET: SyscallEntry = SyscallEntry {
    name: "socket",
    args: &[
        ArgSpec::new("family", ArgKind::Op(&FAMILIES)),
        ArgSpec::new("type", ArgKind::Op(&SOCK_TYPES)),
        ArgSpec::new("protocol", ArgKind::Range { min: 0, max: 255 }),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: Some(post_socket),
};

/// `connect(2)`.
pub static CONNECT: SyscallEntry = SyscallEntry {
    name: "connect",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("uservaddr", ArgKind::Address),
        ArgSpec::new("addrlen", ArgKind::Len),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `accept(2)`.
pub static ACCEPT: SyscallEntry = SyscallEntry {
    name: "accept",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("upeer_sockaddr", ArgKind::Address),
        ArgSpec::new("upeer_addrlen", ArgKind::Address),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `sendto(2)`.
pub static SENDTO: SyscallEntry = SyscallEntry {
    name: "sendto",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("buff", ArgKind::Address),
        ArgSpec::new("len", ArgKind::Len),
        ArgSpec::new("flags", ArgKind::Flags(&MSG_BITS)),
        ArgSpec::new("addr", ArgKind::Address),
        ArgSpec::new("addr_len", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `recvfrom(2)`.
pub static RECVFROM: SyscallEntry = SyscallEntry {
    name: "recvfrom",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("ubuf", ArgKind::Address),
        ArgSpec::new("size", ArgKind::Len),
        ArgSpec::new("flags", ArgKind::Flags(&MSG_BITS)),
        ArgSpec::new("addr", ArgKind::Address),
        ArgSpec::new("addr_len", ArgKind::Address),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `sendmsg(2)`.
pub static SENDMSG: SyscallEntry = SyscallEntry {
    name: "sendmsg",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("msg", ArgKind::Address),
        ArgSpec::new("flags", ArgKind::Flags(&MSG_BITS)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `recvmsg(2)`.
pub static RECVMSG: SyscallEntry = SyscallEntry {
    name: "recvmsg",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("msg", ArgKind::Address),
        ArgSpec::new("flags", ArgKind::Flags(&MSG_BITS)),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `shutdown(2)`.
pub static SHUTDOWN: SyscallEntry = SyscallEntry {
    name: "shutdown",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("how", ArgKind::Op(&SHUTDOWN_HOW)),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `bind(2)`.
pub static BIND: SyscallEntry = SyscallEntry {
    name: "bind",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("umyaddr", ArgKind::Address),
        ArgSpec::new("addrlen", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `listen(2)`.
pub static LISTEN: SyscallEntry = SyscallEntry {
    name: "listen",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("backlog", ArgKind::Range { min: 0, max: 1024 }),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `getsockname(2)`.
pub static GETSOCKNAME: SyscallEntry = SyscallEntry {
    name: "getsockname",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("usockaddr", ArgKind::Address),
        ArgSpec::new("usockaddr_len", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `getpeername(2)`.
pub static GETPEERNAME: SyscallEntry = SyscallEntry {
    name: "getpeername",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("usockaddr", ArgKind::Address),
        ArgSpec::new("usockaddr_len", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `socketpair(2)`.
pub static SOCKETPAIR: SyscallEntry = SyscallEntry {
    name: "socketpair",
    args: &[
        ArgSpec::new("family", ArgKind::Op(&FAMILIES)),
        ArgSpec::new("type", ArgKind::Op(&SOCK_TYPES)),
        ArgSpec::new("protocol", ArgKind::Range { min: 0, max: 255 }),
        ArgSpec::new("usockvec", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `setsockopt(2)`.
pub static SETSOCKOPT: SyscallEntry = SyscallEntry {
    name: "setsockopt",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("level", ArgKind::RandomInt),
        ArgSpec::new("optname", ArgKind::RandomInt),
        ArgSpec::new("optval", ArgKind::Address),
        ArgSpec::new("optlen", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: Some(sanitise_setsockopt),
    post: None,
};

/// `getsockopt(2)`.
pub static GETSOCKOPT: SyscallEntry = SyscallEntry {
    name: "getsockopt",
    args: &[
        ArgSpec::new("fd", ArgKind::Fd),
        ArgSpec::new("level", ArgKind::RandomInt),
        ArgSpec::new("optname", ArgKind::RandomInt),
        ArgSpec::new("optval", ArgKind::Address),
        ArgSpec::new("optlen", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};
