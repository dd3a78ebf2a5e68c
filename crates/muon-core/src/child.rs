//! The per-child execution loop.
//!
//! One [`Child`] drives one slot of the shared region through the record
//! state machine, one call per iteration:
//!
//! 1. pick an active entry for the chosen ABI;
//! 2. under the record lock: `Prep`, six random words, generic then
//!    per-entry sanitizer;
//! 3. emit the prefix, go `Before`, trap;
//! 4. back from the kernel: stamp, account, `After`;
//! 5. classify, emit the postfix, apply the deactivation policy, run the
//!    post hook, snapshot into `previous`, check uid drift, release the
//!    iteration's transients, `Done`.
//!
//! The boolean verdict only says whether this child may keep going; it
//! is never an error channel. Call failures are data.

use muon_sys::consts::SIGKILL;
use muon_sys::{Abi, CallOutcome, SyscallArgs, calls};
use muon_tables::{EntryFlags, GenCtx, SyscallEntry, SyscallTable, sanitise};

use crate::invoke::Invoke;
use crate::output;
use crate::shm::{ChildSlot, RecState, RecordData, Shm};

/// One fuzzing child bound to its slot in the shared region.
pub struct Child<'a, I: Invoke> {
    shm: &'a Shm,
    table: &'static SyscallTable,
    childno: usize,
    ctx: GenCtx,
    invoker: I,
    /// Denominator for compat-ABI selection; 0 disables it.
    compat_every: u64,
    orig_uid: u32,
}

impl<'a, I: Invoke> Child<'a, I> {
    /// Binds a child to `childno`'s slot.
    ///
    /// `compat_every` of 0 keeps every call on the native ABI; `n`
    /// routes roughly one call in `n` through the secondary one.
    pub fn new(
        shm: &'a Shm,
        table: &'static SyscallTable,
        childno: usize,
        ctx: GenCtx,
        invoker: I,
        compat_every: u64,
    ) -> Self {
        Self {
            shm,
            table,
            childno,
            ctx,
            invoker,
            compat_every,
            orig_uid: calls::getuid(),
        }
    }

    fn slot(&self) -> &'a ChildSlot {
        &self.shm.children[self.childno]
    }

    /// Runs iterations until the shared total reaches `max_total` or an
    /// iteration reports that this child must stop.
    pub fn run(&mut self, max_total: u64) {
        while self.shm.stats.total() < max_total {
            if !self.mkcall() {
                break;
            }
        }
    }

    /// Generates, invokes, and accounts one call. Returns whether this
    /// child may keep making calls.
    pub fn mkcall(&mut self) -> bool {
        let abi = if self.compat_every > 0 && self.ctx.rng.one_in(self.compat_every) {
            Abi::Compat
        } else {
            Abi::Native
        };

        let Some(nr) = self.shm.active.pick(&mut self.ctx.rng, self.table.count(), abi) else {
            log::info!("child{}: no active calls left for this ABI", self.childno);
            return false;
        };
        let entry = self.table.entry(nr);
        let call = self.table.call_nr(nr);

        // Prep: fill and sanitize under the record lock, then copy the
        // finished record out so rendering and the trap need no lock.
        let prepared = {
            let mut rec = self.slot().record.lock();
            rec.state = RecState::Prep;
            rec.nr = nr;
            rec.abi = abi;
            for i in 0..SyscallArgs::LEN {
                rec.args[i] = self.ctx.rng.next_u64();
            }
            sanitise::sanitise(&mut self.ctx, entry, &mut rec.args);
            *rec
        };

        log::info!("{}", output::prefix(self.childno, entry, call, &prepared));

        if entry.flags.contains(EntryFlags::EXTRA_FORK) {
            return self.call_in_throwaway(entry, call, &prepared.args, abi);
        }

        self.slot().record.lock().state = RecState::Before;
        let outcome = self.trap(entry, call, &prepared.args, abi);
        self.finish(nr, entry, call, abi, outcome)
    }

    /// The `Before → After` leg: alarm, trap, stamp, account.
    fn trap(&mut self, entry: &SyscallEntry, call: usize, args: &SyscallArgs, abi: Abi) -> CallOutcome {
        let needalarm = entry.flags.contains(EntryFlags::NEED_ALARM);
        if needalarm {
            calls::alarm(1);
        }

        let outcome = self.invoker.invoke(call, args, abi);

        // We returned.
        self.shm.stats.add_total();
        {
            let mut rec = self.slot().record.lock();
            rec.tv = calls::gettimeofday().unwrap_or(rec.tv);
            rec.op_nr += 1;
            rec.errno_post = outcome.errno;
            rec.retval = outcome.retval;
            rec.state = RecState::After;
        }

        if needalarm {
            calls::alarm(0);
        }
        outcome
    }

    /// The `After → Done` leg. Returns the continue verdict.
    fn finish(
        &mut self,
        nr: usize,
        entry: &SyscallEntry,
        call: usize,
        abi: Abi,
        outcome: CallOutcome,
    ) -> bool {
        if outcome.is_error() {
            self.shm.stats.add_failure();
        } else {
            self.shm.stats.add_success();
        }

        log::info!("{}", output::postfix(&outcome));

        // A call that does not exist is not worth dialing again, except
        // for entries that use the sentinel as an ordinary errno.
        if outcome.is_enosys() && !entry.flags.contains(EntryFlags::IGNORE_ENOSYS) {
            let _table = self.shm.table_lock.lock();
            // Another child may have won the race since our return.
            if self.shm.active.active_number(nr, abi) > 0 {
                log::warn!("{}", output::deactivation(entry.name, call, abi));
                self.shm.active.deactivate(nr, abi);
            }
        }

        if let Some(post) = entry.post {
            post(&mut self.ctx, &outcome);
        }

        let completed: RecordData = self.slot().record.snapshot();
        *self.slot().previous.lock() = completed;

        let verdict = self.check_uid_drift();

        self.ctx.scratch.clear();
        self.slot().record.lock().state = RecState::Done;
        verdict
    }

    /// Runs a call that could replace this process's image inside a
    /// throwaway child, bounded by a 1-second kill. The generation is
    /// abandoned either way; the main child keeps going.
    fn call_in_throwaway(
        &mut self,
        entry: &SyscallEntry,
        call: usize,
        args: &SyscallArgs,
        abi: Abi,
    ) -> bool {
        match calls::fork() {
            Ok(calls::ForkResult::Child) => {
                self.slot().record.lock().state = RecState::Before;
                let _ = self.trap(entry, call, args, abi);
                // Only reached when the image survived the call: mark
                // the planned disappearance so the supervisor can tell
                // it from a crash.
                self.slot().record.lock().state = RecState::GoingAway;
                calls::exit_now(0);
            }
            Ok(calls::ForkResult::Parent(pid)) => {
                let _ = calls::sleep_ms(1000);
                let _ = calls::kill(pid, SIGKILL);
                let _ = calls::wait4(pid, false);
                self.ctx.scratch.clear();
                true
            }
            Err(err) => {
                // Could not get a throwaway; skip this generation.
                log::warn!("child{}: throwaway fork failed: {err}", self.childno);
                self.ctx.scratch.clear();
                true
            }
        }
    }

    /// A fuzzed call can strip privileges out from under us. Put the
    /// uid back; a child that cannot is done.
    fn check_uid_drift(&self) -> bool {
        let uid = calls::getuid();
        if uid == self.orig_uid {
            return true;
        }
        log::warn!(
            "child{}: uid drifted {} -> {uid}, resetting",
            self.childno,
            self.orig_uid
        );
        match calls::setuid(self.orig_uid) {
            Ok(()) => true,
            Err(err) => {
                log::error!(
                    "child{}: cannot regain uid {}: {err}; stopping",
                    self.childno,
                    self.orig_uid
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use muon_rand::Rng;
    use muon_sys::errno::{EBADF, ENOSYS};
    use muon_tables::table;

    /// Scripted kernel: answers every trap from a fixed playbook and
    /// remembers what it was asked.
    struct Scripted {
        outcome: CallOutcome,
        calls: Cell<u64>,
        last: Cell<Option<(usize, Abi)>>,
    }

    impl Scripted {
        fn returning(outcome: CallOutcome) -> Self {
            Self {
                outcome,
                calls: Cell::new(0),
                last: Cell::new(None),
            }
        }

        fn ok() -> Self {
            Self::returning(CallOutcome { retval: 0, errno: 0 })
        }

        fn enosys() -> Self {
            Self::returning(CallOutcome { retval: u64::MAX, errno: ENOSYS })
        }
    }

    impl Invoke for Scripted {
        fn invoke(&self, call: usize, _args: &SyscallArgs, abi: Abi) -> CallOutcome {
            self.calls.set(self.calls.get() + 1);
            self.last.set(Some((call, abi)));
            self.outcome
        }
    }

    fn child_for<'a>(
        shm: &'a Shm,
        victim: &str,
        abi: Abi,
        invoker: Scripted,
        compat_every: u64,
    ) -> Child<'a, Scripted> {
        let t = table();
        t.activate_only(&shm.active, victim, abi).unwrap();
        let ctx = GenCtx::bare(Rng::with_seed(0xC0FFEE));
        Child::new(shm, t, 0, ctx, invoker, compat_every)
    }

    #[test]
    fn one_iteration_walks_to_done() {
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "getpid", Abi::Native, Scripted::ok(), 0);
        assert!(child.mkcall());

        let rec = shm.children[0].record.snapshot();
        assert_eq!(rec.state, RecState::Done);
        assert_eq!(rec.op_nr, 1);
        assert_eq!(rec.retval, 0);
        assert_eq!(rec.errno_post, 0);
        assert_eq!(rec.nr, table().lookup("getpid").unwrap());
    }

    #[test]
    fn counters_balance_over_mixed_outcomes() {
        let shm = Box::new(Shm::new());
        {
            let mut ok_child = child_for(&shm, "getpid", Abi::Native, Scripted::ok(), 0);
            for _ in 0..10 {
                assert!(ok_child.mkcall());
            }
        }
        {
            let t = table();
            let ctx = GenCtx::bare(Rng::with_seed(2));
            let failing = Scripted::returning(CallOutcome { retval: u64::MAX, errno: EBADF });
            let mut bad_child = Child::new(&shm, t, 1, ctx, failing, 0);
            for _ in 0..5 {
                assert!(bad_child.mkcall());
            }
        }
        assert_eq!(shm.stats.total(), 15);
        assert_eq!(shm.stats.successes(), 10);
        assert_eq!(shm.stats.failures(), 5);
        assert_eq!(shm.stats.successes() + shm.stats.failures(), shm.stats.total());
    }

    #[test]
    fn op_nr_advances_monotonically() {
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "getpid", Abi::Native, Scripted::ok(), 0);
        let mut last = 0;
        for _ in 0..50 {
            assert!(child.mkcall());
            let rec = shm.children[0].record.snapshot();
            assert_eq!(rec.state, RecState::Done);
            assert!(rec.op_nr > last);
            last = rec.op_nr;
        }
    }

    #[test]
    fn enosys_retires_the_entry_within_one_iteration() {
        let shm = Box::new(Shm::new());
        let nr = table().lookup("getpid").unwrap();
        let mut child = child_for(&shm, "getpid", Abi::Native, Scripted::enosys(), 0);

        assert!(child.mkcall());
        assert_eq!(shm.active.active_number(nr, Abi::Native), 0);
        let mut rng = Rng::with_seed(1);
        assert_eq!(shm.active.pick(&mut rng, table().count(), Abi::Native), None);

        // The attempt itself still counted.
        assert_eq!(shm.stats.total(), 1);
        assert_eq!(shm.stats.failures(), 1);

        // With the table exhausted the next iteration reports stop.
        assert!(!child.mkcall());
    }

    #[test]
    fn ignore_enosys_entries_survive_the_sentinel() {
        let shm = Box::new(Shm::new());
        let nr = table().lookup("ioctl").unwrap();
        let mut child = child_for(&shm, "ioctl", Abi::Native, Scripted::enosys(), 0);
        for _ in 0..100 {
            assert!(child.mkcall());
        }
        assert_eq!(shm.active.active_number(nr, Abi::Native), 1);
        assert_eq!(shm.stats.total(), 100);
    }

    #[test]
    fn previous_holds_the_completed_record() {
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "uname", Abi::Native, Scripted::ok(), 0);
        assert!(child.mkcall());
        let prev = shm.children[0].previous.snapshot();
        assert_eq!(prev.nr, table().lookup("uname").unwrap());
        assert_eq!(prev.op_nr, 1);
        assert_eq!(prev.state, RecState::After);
    }

    #[test]
    fn absent_compat_abi_still_advances_everything() {
        // The constant-zero compat stub shows up here as a scripted
        // (0, 0) outcome; state and counters must advance regardless.
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "getpid", Abi::Compat, Scripted::ok(), 1);
        assert!(child.mkcall());

        let used = child.invoker.last.get().unwrap();
        assert_eq!(used.1, Abi::Compat);
        assert_eq!(shm.stats.total(), 1);
        assert_eq!(shm.stats.successes(), 1);
        let rec = shm.children[0].record.snapshot();
        assert_eq!(rec.state, RecState::Done);
        assert_eq!(rec.abi, Abi::Compat);
        assert_eq!(rec.op_nr, 1);
    }

    #[test]
    fn compat_deactivation_leaves_the_native_half_alone() {
        let shm = Box::new(Shm::new());
        let t = table();
        let nr = t.lookup("uname").unwrap();
        t.activate_only(&shm.active, "uname", Abi::Native).unwrap();
        let mut child = child_for(&shm, "uname", Abi::Compat, Scripted::enosys(), 1);
        assert!(child.mkcall());
        assert_eq!(shm.active.active_number(nr, Abi::Compat), 0);
        assert_eq!(shm.active.active_number(nr, Abi::Native), 1);
    }

    #[test]
    fn run_stops_at_the_shared_budget() {
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "getpid", Abi::Native, Scripted::ok(), 0);
        child.run(25);
        assert_eq!(shm.stats.total(), 25);
        assert_eq!(child.invoker.calls.get(), 25);
    }

    #[test]
    fn trap_passes_the_table_call_number() {
        let shm = Box::new(Shm::new());
        let mut child = child_for(&shm, "uname", Abi::Native, Scripted::ok(), 0);
        assert!(child.mkcall());
        let (call, abi) = child.invoker.last.get().unwrap();
        assert_eq!(call, table().lookup("uname").unwrap() + muon_tables::SYSCALL_OFFSET);
        assert_eq!(abi, Abi::Native);
    }
}
