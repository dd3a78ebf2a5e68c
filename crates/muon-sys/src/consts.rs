//! Flag and option constants for the sanitizer value lists.
//!
//! Grouped by subsystem. These are the kernel UAPI values for x86_64;
//! value lists for the table entries are assembled from them.

// ── open(2) flags ────────────────────────────────────────────────────

/// Read only.
pub const O_RDONLY: u64 = 0o0;
/// Write only.
pub const O_WRONLY: u64 = 0o1;
/// Read and write.
pub const O_RDWR: u64 = 0o2;
/// Create if absent.
pub const O_CREAT: u64 = 0o100;
/// Fail if the file exists.
pub const O_EXCL: u64 = 0o200;
/// Do not make this the controlling terminal.
pub const O_NOCTTY: u64 = 0o400;
/// Truncate to zero length.
pub const O_TRUNC: u64 = 0o1000;
/// Append on each write.
pub const O_APPEND: u64 = 0o2000;
/// Non-blocking I/O.
pub const O_NONBLOCK: u64 = 0o4000;
/// Synchronized data integrity writes.
pub const O_DSYNC: u64 = 0o10000;
/// Signal-driven I/O.
pub const O_ASYNC: u64 = 0o20000;
/// Bypass the page cache.
pub const O_DIRECT: u64 = 0o40000;
/// Large file support.
pub const O_LARGEFILE: u64 = 0o100000;
/// Fail unless the path is a directory.
pub const O_DIRECTORY: u64 = 0o200000;
/// Do not follow a trailing symlink.
pub const O_NOFOLLOW: u64 = 0o400000;
/// Do not update the access time.
pub const O_NOATIME: u64 = 0o1000000;
/// Close on exec.
pub const O_CLOEXEC: u64 = 0o2000000;
/// Synchronized file integrity writes.
pub const O_SYNC: u64 = 0o4010000;
/// Obtain a path-only descriptor.
pub const O_PATH: u64 = 0o10000000;
/// Unnamed temporary file.
pub const O_TMPFILE: u64 = 0o20200000;

// ── mmap(2) protections and flags ────────────────────────────────────

/// No access.
pub const PROT_NONE: u64 = 0x0;
/// Readable.
pub const PROT_READ: u64 = 0x1;
/// Writable.
pub const PROT_WRITE: u64 = 0x2;
/// Executable.
pub const PROT_EXEC: u64 = 0x4;

/// Shared mapping.
pub const MAP_SHARED: u64 = 0x01;
/// Private copy-on-write mapping.
pub const MAP_PRIVATE: u64 = 0x02;
/// Place the mapping exactly at the hint.
pub const MAP_FIXED: u64 = 0x10;
/// Not backed by any file.
pub const MAP_ANONYMOUS: u64 = 0x20;
/// Stack-style downward growth.
pub const MAP_GROWSDOWN: u64 = 0x100;
/// Lock pages into memory.
pub const MAP_LOCKED: u64 = 0x2000;
/// Do not reserve swap.
pub const MAP_NORESERVE: u64 = 0x4000;
/// Prefault the mapping.
pub const MAP_POPULATE: u64 = 0x8000;

// ── madvise(2) advice ────────────────────────────────────────────────

/// Default treatment.
pub const MADV_NORMAL: u64 = 0;
/// Expect random access.
pub const MADV_RANDOM: u64 = 1;
/// Expect sequential access.
pub const MADV_SEQUENTIAL: u64 = 2;
/// Expect access soon.
pub const MADV_WILLNEED: u64 = 3;
/// Do not expect access soon.
pub const MADV_DONTNEED: u64 = 4;
/// Free the range lazily.
pub const MADV_FREE: u64 = 8;
/// Exclude from core dumps.
pub const MADV_DONTDUMP: u64 = 16;
/// Enable transparent hugepages.
pub const MADV_HUGEPAGE: u64 = 14;

// ── Sockets ──────────────────────────────────────────────────────────

/// Unspecified family.
pub const AF_UNSPEC: u64 = 0;
/// Unix domain.
pub const AF_UNIX: u64 = 1;
/// IPv4.
pub const AF_INET: u64 = 2;
/// IPv6.
pub const AF_INET6: u64 = 10;
/// Kernel netlink.
pub const AF_NETLINK: u64 = 16;
/// Raw packet access.
pub const AF_PACKET: u64 = 17;

/// Stream socket.
pub const SOCK_STREAM: u64 = 1;
/// Datagram socket.
pub const SOCK_DGRAM: u64 = 2;
/// Raw socket.
pub const SOCK_RAW: u64 = 3;
/// Sequenced packet socket.
pub const SOCK_SEQPACKET: u64 = 5;

/// Socket-level option namespace.
pub const SOL_SOCKET: u64 = 1;
/// IP-level option namespace.
pub const SOL_IP: u64 = 0;
/// TCP-level option namespace.
pub const SOL_TCP: u64 = 6;
/// SCTP-level option namespace.
pub const SOL_SCTP: u64 = 132;

/// SCTP socket options eligible for `setsockopt` fuzzing.
///
/// The fixed 41-entry selection list: the declared-UAPI options plus the
/// `SCTP_SOCKOPT_*` control range.
pub const SCTP_OPTS: [u64; 41] = [
    0,   // SCTP_RTOINFO
    1,   // SCTP_ASSOCINFO
    2,   // SCTP_INITMSG
    3,   // SCTP_NODELAY
    4,   // SCTP_AUTOCLOSE
    5,   // SCTP_SET_PEER_PRIMARY_ADDR
    6,   // SCTP_PRIMARY_ADDR
    7,   // SCTP_ADAPTATION_LAYER
    8,   // SCTP_DISABLE_FRAGMENTS
    9,   // SCTP_PEER_ADDR_PARAMS
    10,  // SCTP_DEFAULT_SEND_PARAM
    11,  // SCTP_EVENTS
    12,  // SCTP_I_WANT_MAPPED_V4_ADDR
    13,  // SCTP_MAXSEG
    14,  // SCTP_STATUS
    15,  // SCTP_GET_PEER_ADDR_INFO
    16,  // SCTP_DELAYED_ACK_TIME
    17,  // SCTP_CONTEXT
    18,  // SCTP_FRAGMENT_INTERLEAVE
    19,  // SCTP_PARTIAL_DELIVERY_POINT
    20,  // SCTP_MAX_BURST
    21,  // SCTP_AUTH_CHUNK
    22,  // SCTP_HMAC_IDENT
    23,  // SCTP_AUTH_KEY
    24,  // SCTP_AUTH_ACTIVE_KEY
    25,  // SCTP_AUTH_DELETE_KEY
    26,  // SCTP_PEER_AUTH_CHUNKS
    27,  // SCTP_LOCAL_AUTH_CHUNKS
    28,  // SCTP_GET_ASSOC_NUMBER
    29,  // SCTP_GET_ASSOC_ID_LIST
    30,  // SCTP_AUTO_ASCONF
    31,  // SCTP_PEER_ADDR_THLDS
    100, // SCTP_SOCKOPT_BINDX_ADD
    101, // SCTP_SOCKOPT_BINDX_REM
    102, // SCTP_SOCKOPT_PEELOFF
    107, // SCTP_SOCKOPT_CONNECTX_OLD
    108, // SCTP_GET_PEER_ADDRS
    109, // SCTP_GET_LOCAL_ADDRS
    110, // SCTP_SOCKOPT_CONNECTX
    111, // SCTP_SOCKOPT_CONNECTX3
    112, // SCTP_GET_ASSOC_STATS
];

// ── Signals ──────────────────────────────────────────────────────────

/// Kill, uncatchable.
pub const SIGKILL: u64 = 9;
/// Alarm clock.
pub const SIGALRM: u64 = 14;
/// Termination request.
pub const SIGTERM: u64 = 15;

// ── System V IPC and misc ────────────────────────────────────────────

/// Remove an IPC object.
pub const IPC_RMID: u64 = 0;
/// Set IPC object options.
pub const IPC_SET: u64 = 1;
/// Query IPC object state.
pub const IPC_STAT: u64 = 2;
/// Query IPC limits.
pub const IPC_INFO: u64 = 3;

/// Shutdown read side.
pub const SHUT_RD: u64 = 0;
/// Shutdown write side.
pub const SHUT_WR: u64 = 1;
/// Shutdown both sides.
pub const SHUT_RDWR: u64 = 2;

/// Page size assumed by the argument generators.
pub const PAGE_SIZE: u64 = 4096;
