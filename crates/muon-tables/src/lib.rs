//! The syscall-table model: per-call metadata, argument generation, and
//! activation bookkeeping.
//!
//! One [`entry::SyscallEntry`] per covered call number, assembled into a
//! dense [`table::SyscallTable`] whose index *is* the call number (plus
//! the architecture offset). Entries are immutable for the life of the
//! run; the only mutable state is the per-entry, per-ABI activation
//! counters in [`active::ActiveSet`], which live inside the shared
//! region so a call retired by one child stays retired for all of them.
//!
//! Argument generation is split the same way the execution loop uses it:
//! a declared [`kinds::ArgKind`] per slot, a generic pass that rewrites
//! the initial random words to fit those kinds ([`sanitise`]), and
//! optional per-entry hooks for call-specific refinement.

pub mod active;
pub mod entries;
pub mod entry;
pub mod generate;
pub mod kinds;
pub mod pools;
pub mod sanitise;
pub mod table;

pub use active::{ActiveSet, MAX_SYSCALLS};
pub use entry::{EntryFlags, PostFn, SanitiseFn, SyscallEntry};
pub use kinds::{ArgKind, ArgSpec};
pub use pools::GenCtx;
pub use table::{SYSCALL_OFFSET, SyscallTable, table};
