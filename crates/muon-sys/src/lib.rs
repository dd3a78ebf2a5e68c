//! Linux ABI surface: the only crate that talks to the kernel directly.
//!
//! Everything above this layer manipulates plain words. This crate owns:
//!
//! - the raw indirect-syscall stubs for the native and the 32-bit compat
//!   entry conventions ([`raw`]),
//! - the six-word argument carrier and ABI selector ([`args`]),
//! - errno decoding for the raw return convention ([`errno`]),
//! - syscall numbers and flag/option constant tables ([`nr`], [`consts`]),
//! - thin wrappers for the handful of calls the fuzzer needs for its own
//!   plumbing rather than as fuzzing targets ([`calls`]).

pub mod args;
pub mod calls;
pub mod consts;
pub mod errno;
pub mod nr;
pub mod raw;

pub use args::{Abi, SyscallArgs, compat_available};
pub use calls::Timeval;
pub use errno::{CallOutcome, Errno};
