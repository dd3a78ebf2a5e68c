//! The per-call entry: immutable metadata plus optional hooks.

use muon_sys::{CallOutcome, SyscallArgs};

use crate::kinds::ArgSpec;
use crate::pools::GenCtx;

bitflags::bitflags! {
    /// Per-entry behavior flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntryFlags: u32 {
        /// Arm a 1-second process alarm around the trap; the call is
        /// expected to block on quiet descriptors.
        const NEED_ALARM = 1 << 0;
        /// Do not retire the entry on an `ENOSYS` return; the call uses
        /// that errno for specific arguments while being implemented.
        const IGNORE_ENOSYS = 1 << 1;
        /// Invoke from a throwaway process; the call may replace or
        /// destroy the caller's image.
        const EXTRA_FORK = 1 << 2;
        /// Never activate: present to keep the table dense, but the call
        /// would take down the child or the run in an uninteresting way.
        const AVOID = 1 << 3;
    }
}

/// Per-entry pre-call hook: refines the six words after the generic
/// sanitizer pass, still under the record lock.
pub type SanitiseFn = fn(&mut GenCtx, &mut SyscallArgs);

/// Per-entry post-call hook: reacts to the outcome, e.g. by caching a
/// freshly created descriptor into the child's pool.
pub type PostFn = fn(&mut GenCtx, &CallOutcome);

/// Immutable descriptor of one system call.
///
/// Created at program start, never destroyed. The mutable activation
/// counters live in [`crate::active::ActiveSet`], not here, so the entry
/// itself can stay a plain `'static`.
pub struct SyscallEntry {
    /// Stable textual name.
    pub name: &'static str,
    /// Declared argument slots, outermost six at most.
    pub args: &'static [ArgSpec],
    /// Behavior flags.
    pub flags: EntryFlags,
    /// Optional pre-call hook.
    pub sanitise: Option<SanitiseFn>,
    /// Optional post-call hook.
    pub post: Option<PostFn>,
}

impl SyscallEntry {
    /// Declares an entry with no flags and no hooks.
    #[must_use]
    pub const fn plain(name: &'static str, args: &'static [ArgSpec]) -> Self {
        Self {
            name,
            args,
            flags: EntryFlags::empty(),
            sanitise: None,
            post: None,
        }
    }

    /// Number of declared arguments.
    #[must_use]
    pub const fn num_args(&self) -> usize {
        self.args.len()
    }
}

impl core::fmt::Debug for SyscallEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SyscallEntry")
            .field("name", &self.name)
            .field("num_args", &self.num_args())
            .field("flags", &self.flags)
            .field("sanitise", &self.sanitise.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}
