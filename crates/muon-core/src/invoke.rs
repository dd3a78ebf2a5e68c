//! The invoke capability: the one seam where words become a trap.
//!
//! Everything else in the loop treats a call as data. Putting the trap
//! behind a trait keeps the state machine drivable by scripted kernels
//! in tests, and keeps the biarch split in exactly one place.

use muon_sys::{Abi, CallOutcome, SyscallArgs, errno, raw};

/// Performs one kernel trap with six word-sized arguments.
pub trait Invoke {
    /// Traps with `call` and `args` under the given entry convention
    /// and returns the normalized outcome.
    fn invoke(&self, call: usize, args: &SyscallArgs, abi: Abi) -> CallOutcome;
}

/// The real kernel.
pub struct KernelInvoke;

impl Invoke for KernelInvoke {
    fn invoke(&self, call: usize, args: &SyscallArgs, abi: Abi) -> CallOutcome {
        // SAFETY: passing arbitrary words into the kernel is this
        // program's entire purpose; the process accepts any outcome up
        // to and including its own death, and the supervisor treats
        // that as data.
        let ret = unsafe {
            match abi {
                Abi::Native => raw::syscall6(
                    call, args[0], args[1], args[2], args[3], args[4], args[5],
                ),
                Abi::Compat => raw::syscall6_compat(
                    call, args[0], args[1], args[2], args[3], args[4], args[5],
                ),
            }
        };
        errno::decode(ret)
    }
}
