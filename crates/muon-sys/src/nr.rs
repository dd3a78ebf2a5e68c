//! x86_64 syscall numbers.
//!
//! Only the numbers the fuzzer's own plumbing dials directly are named
//! here. Fuzzed calls are reached through the table index instead, so the
//! bulk of the number space never needs constants.

// ── Fuzzed window (dense table coverage) ─────────────────────────────

/// First call number covered by the dense table.
pub const TABLE_BASE: usize = 0;

// ── Plumbing: files and pipes ────────────────────────────────────────

/// `open(2)`.
pub const SYS_OPEN: usize = 2;
/// `close(2)`.
pub const SYS_CLOSE: usize = 3;
/// `mmap(2)`.
pub const SYS_MMAP: usize = 9;
/// `munmap(2)`.
pub const SYS_MUNMAP: usize = 11;
/// `pipe2(2)`.
pub const SYS_PIPE2: usize = 293;

// ── Plumbing: processes and signals ──────────────────────────────────

/// `nanosleep(2)`.
pub const SYS_NANOSLEEP: usize = 35;
/// `alarm(2)`.
pub const SYS_ALARM: usize = 37;
/// `getpid(2)`.
pub const SYS_GETPID: usize = 39;
/// `fork(2)`.
pub const SYS_FORK: usize = 57;
/// `exit(2)`.
pub const SYS_EXIT: usize = 60;
/// `wait4(2)`.
pub const SYS_WAIT4: usize = 61;
/// `kill(2)`.
pub const SYS_KILL: usize = 62;

// ── Plumbing: identity and time ──────────────────────────────────────

/// `gettimeofday(2)`.
pub const SYS_GETTIMEOFDAY: usize = 96;
/// `getuid(2)`.
pub const SYS_GETUID: usize = 102;
/// `setuid(2)`.
pub const SYS_SETUID: usize = 105;

// ── Plumbing: sockets ────────────────────────────────────────────────

/// `socket(2)`.
pub const SYS_SOCKET: usize = 41;
