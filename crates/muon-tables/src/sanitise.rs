//! The pre-call sanitizer pass.
//!
//! Runs under the record lock, between the raw random fill and release:
//! first the generic per-kind rewrite, then the entry's own hook if it
//! declares one. Both see the same six-word carrier.

use muon_sys::SyscallArgs;

use crate::entry::SyscallEntry;
use crate::generate;
use crate::pools::GenCtx;

/// Rewrites the six random words to fit the entry's declared kinds,
/// then applies the entry's own pre-call hook.
///
/// Slots beyond the declared argument count keep their random draw; the
/// kernel ignores them, and a buggy kernel that does not is exactly the
/// kind of find this tool exists for.
pub fn sanitise(ctx: &mut GenCtx, entry: &SyscallEntry, args: &mut SyscallArgs) {
    for (i, spec) in entry.args.iter().enumerate() {
        args[i] = generate::for_kind(ctx, spec.kind, args[i]);
    }
    if let Some(hook) = entry.sanitise {
        hook(ctx, args);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryFlags, SyscallEntry};
    use crate::kinds::{ArgKind, ArgSpec};
    use muon_rand::Rng;

    static LIST: [u64; 3] = [0x10, 0x20, 0x40];

    fn stamp_junk(_ctx: &mut GenCtx, args: &mut SyscallArgs) {
        args[2] = 0x5555;
    }

    static PROBE: SyscallEntry = SyscallEntry {
        name: "probe",
        args: &[
            ArgSpec::new("op", ArgKind::Op(&LIST)),
            ArgSpec::new("mode", ArgKind::Mode),
            ArgSpec::new("junk", ArgKind::RandomInt),
        ],
        flags: EntryFlags::empty(),
        sanitise: Some(stamp_junk),
        post: None,
    };

    #[test]
    fn generic_pass_rewrites_declared_slots() {
        let mut ctx = GenCtx::bare(Rng::with_seed(77));
        let mut args = SyscallArgs([u64::MAX; 6]);
        sanitise(&mut ctx, &PROBE, &mut args);
        assert!(LIST.contains(&args[0]));
        assert!(args[1] < (1 << 12));
    }

    #[test]
    fn entry_hook_runs_after_generic_pass() {
        let mut ctx = GenCtx::bare(Rng::with_seed(78));
        let mut args = SyscallArgs::zeroed();
        sanitise(&mut ctx, &PROBE, &mut args);
        assert_eq!(args[2], 0x5555);
    }

    #[test]
    fn undeclared_slots_keep_their_draw() {
        let mut ctx = GenCtx::bare(Rng::with_seed(79));
        let mut args = SyscallArgs([1, 2, 3, 0xAAAA, 0xBBBB, 0xCCCC]);
        sanitise(&mut ctx, &PROBE, &mut args);
        assert_eq!(args[3], 0xAAAA);
        assert_eq!(args[4], 0xBBBB);
        assert_eq!(args[5], 0xCCCC);
    }
}
