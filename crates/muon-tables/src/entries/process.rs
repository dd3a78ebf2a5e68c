//! Process, signal, and time call entries.

use muon_sys::SyscallArgs;

use crate::entry::{EntryFlags, SyscallEntry};
use crate::kinds::{ArgKind, ArgSpec};
use crate::pools::GenCtx;

/// `rt_sigprocmask` how values: SIG_BLOCK, SIG_UNBLOCK, SIG_SETMASK.
static SIGMASK_HOW: [u64; 3] = [0, 1, 2];

/// Interval timer selectors: ITIMER_REAL, ITIMER_VIRTUAL, ITIMER_PROF.
static ITIMER_WHICH: [u64; 3] = [0, 1, 2];

/// `wait4` option bits: WNOHANG, WUNTRACED, WCONTINUED.
static WAIT_OPTIONS: [u64; 3] = [1, 2, 8];

/// Steers the target pid away from anything this run owns. Huge pids
/// exercise the lookup paths and miss the fuzzer's own process group.
pub fn sanitise_kill(ctx: &mut GenCtx, args: &mut SyscallArgs) {
    args[0] = ctx.rng.range(0x10_0000, 0x3FFF_FFFF);
}

/// `rt_sigaction(2)`.
pub static RT_SIGACTION: SyscallEntry = SyscallEntry {
    name: "rt_sigaction",
    args: &[
        ArgSpec::new("sig", ArgKind::Range { min: 0, max: 64 }),
        ArgSpec::new("act", ArgKind::Address),
        ArgSpec::new("oact", ArgKind::Address),
        ArgSpec::new("sigsetsize", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `rt_sigprocmask(2)`.
pub static RT_SIGPROCMASK: SyscallEntry = SyscallEntry {
    name: "rt_sigprocmask",
    args: &[
        ArgSpec::new("how", ArgKind::Op(&SIGMASK_HOW)),
        ArgSpec::new("nset", ArgKind::Address),
        ArgSpec::new("oset", ArgKind::Address),
        ArgSpec::new("sigsetsize", ArgKind::Len),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `rt_sigreturn(2)`: restores a signal frame that does not exist;
/// guaranteed to corrupt the caller.
pub static RT_SIGRETURN: SyscallEntry = SyscallEntry {
    name: "rt_sigreturn",
    args: &[],
    flags: EntryFlags::AVOID,
    sanitise: None,
    post: None,
};

/// `sched_yield(2)`.
pub static SCHED_YIELD: SyscallEntry = SyscallEntry {
    name: "sched_yield",
    args: &[],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `pause(2)`: blocks until a signal; the alarm is the signal.
pub static PAUSE: SyscallEntry = SyscallEntry {
    name: "pause",
    args: &[],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `nanosleep(2)`.
pub static NANOSLEEP: SyscallEntry = SyscallEntry {
    name: "nanosleep",
    args: &[
        ArgSpec::new("rqtp", ArgKind::Address),
        ArgSpec::new("rmtp", ArgKind::Address),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `getitimer(2)`.
pub static GETITIMER: SyscallEntry = SyscallEntry {
    name: "getitimer",
    args: &[
        ArgSpec::new("which", ArgKind::Op(&ITIMER_WHICH)),
        ArgSpec::new("value", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `alarm(2)`: short ranges only, or the fuzzed alarm outlives the
/// per-call one and kills the child mid-iteration.
pub static ALARM: SyscallEntry = SyscallEntry {
    name: "alarm",
    args: &[ArgSpec::new("seconds", ArgKind::Range { min: 0, max: 2 })],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `setitimer(2)`.
pub static SETITIMER: SyscallEntry = SyscallEntry {
    name: "setitimer",
    args: &[
        ArgSpec::new("which", ArgKind::Op(&ITIMER_WHICH)),
        ArgSpec::new("value", ArgKind::Address),
        ArgSpec::new("ovalue", ArgKind::Address),
    ],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `getpid(2)`.
pub static GETPID: SyscallEntry = SyscallEntry {
    name: "getpid",
    args: &[],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

/// `clone(2)`: would fill the box with unsupervised children.
pub static CLONE: SyscallEntry = SyscallEntry {
    name: "clone",
    args: &[
        ArgSpec::new("clone_flags", ArgKind::RandomInt),
        ArgSpec::new("newsp", ArgKind::Address),
        ArgSpec::new("parent_tid", ArgKind::Address),
        ArgSpec::new("child_tid", ArgKind::Address),
        ArgSpec::new("tls", ArgKind::RandomInt),
    ],
    flags: EntryFlags::AVOID,
    sanitise: None,
    post: None,
};

/// `fork(2)`: same reason as `clone`.
pub static FORK: SyscallEntry = SyscallEntry {
    name: "fork",
    args: &[],
    flags: EntryFlags::AVOID,
    sanitise: None,
    post: None,
};

/// `vfork(2)`: same reason as `clone`, plus the suspended parent.
pub static VFORK: SyscallEntry = SyscallEntry {
    name: "vfork",
    args: &[],
    flags: EntryFlags::AVOID,
    sanitise: None,
    post: None,
};

/// `execve(2)`: replaces the caller's image, so it runs in a throwaway
/// process.
pub static EXECVE: SyscallEntry = SyscallEntry {
    name: "execve",
    args: &[
        ArgSpec::new("name", ArgKind::Pathname),
        ArgSpec::new("argv", ArgKind::Address),
        ArgSpec::new("envp", ArgKind::Address),
    ],
    flags: EntryFlags::EXTRA_FORK,
    sanitise: None,
    post: None,
};

/// `exit(2)`: a successful call is just a dead child.
pub static EXIT: SyscallEntry = SyscallEntry {
    name: "exit",
    args: &[ArgSpec::new("error_code", ArgKind::RandomInt)],
    flags: EntryFlags::AVOID,
    sanitise: None,
    post: None,
};

/// `wait4(2)`: pid steered high so it cannot reap the supervisor's
/// children out from under it.
pub static WAIT4: SyscallEntry = SyscallEntry {
    name: "wait4",
    args: &[
        ArgSpec::new("upid", ArgKind::Range { min: 0x10_0000, max: 0x3FFF_FFFF }),
        ArgSpec::new("stat_addr", ArgKind::Address),
        ArgSpec::new("options", ArgKind::Flags(&WAIT_OPTIONS)),
        ArgSpec::new("ru", ArgKind::Address),
    ],
    flags: EntryFlags::NEED_ALARM,
    sanitise: None,
    post: None,
};

/// `kill(2)`.
pub static KILL: SyscallEntry = SyscallEntry {
    name: "kill",
    args: &[
        ArgSpec::new("pid", ArgKind::RandomInt),
        ArgSpec::new("sig", ArgKind::Range { min: 0, max: 64 }),
    ],
    flags: EntryFlags::empty(),
    sanitise: Some(sanitise_kill),
    post: None,
};

/// `uname(2)`.
pub static UNAME: SyscallEntry = SyscallEntry {
    name: "uname",
    args: &[ArgSpec::new("name", ArgKind::Address)],
    flags: EntryFlags::empty(),
    sanitise: None,
    post: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use muon_rand::Rng;

    #[test]
    fn kill_sanitiser_avoids_low_pids() {
        let mut ctx = GenCtx::bare(Rng::with_seed(0xC4));
        for _ in 0..1000 {
            let mut args = SyscallArgs([1, 9, 0, 0, 0, 0]);
            sanitise_kill(&mut ctx, &mut args);
            assert!(args[0] >= 0x10_0000);
            assert!(args[0] <= 0x3FFF_FFFF);
        }
    }

    #[test]
    fn destructive_entries_are_flagged_avoid() {
        for entry in [&RT_SIGRETURN, &CLONE, &FORK, &VFORK, &EXIT] {
            assert!(entry.flags.contains(EntryFlags::AVOID), "{}", entry.name);
        }
    }

    #[test]
    fn execve_runs_in_a_throwaway() {
        assert!(EXECVE.flags.contains(EntryFlags::EXTRA_FORK));
        assert!(!EXECVE.flags.contains(EntryFlags::AVOID));
    }
}
