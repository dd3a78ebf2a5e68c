//! The dense, append-only syscall table.
//!
//! The table index is the internal number: the trap number is the index
//! plus [`SYSCALL_OFFSET`]. Entries are declared per subsystem in
//! [`crate::entries`] and assembled here in number order once, before
//! any child runs.

use muon_sys::Abi;

use crate::active::ActiveSet;
use crate::entries;
use crate::entry::{EntryFlags, SyscallEntry};

/// Architecture base of the covered number space. Zero here; nonzero on
/// architectures whose Linux numbers start above other ABIs.
pub const SYSCALL_OFFSET: usize = 0;

/// An ordered, immutable registry of syscall entries.
pub struct SyscallTable {
    entries: &'static [&'static SyscallEntry],
}

impl SyscallTable {
    /// Number of entries.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.entries.len()
    }

    /// The entry at internal index `idx`.
    #[must_use]
    pub fn entry(&self, idx: usize) -> &'static SyscallEntry {
        self.entries[idx]
    }

    /// The trap number for internal index `idx`.
    #[must_use]
    pub fn call_nr(&self, idx: usize) -> usize {
        idx + SYSCALL_OFFSET
    }

    /// Compares `name` against every entry and returns the index of the
    /// match, if any.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Activates every eligible entry on `abi`: everything not flagged
    /// `AVOID`. Called once during setup, before forking.
    pub fn activate_all(&self, active: &ActiveSet, abi: Abi) {
        for (idx, entry) in self.entries.iter().enumerate() {
            if !entry.flags.contains(EntryFlags::AVOID) {
                active.activate(idx, abi);
            }
        }
    }

    /// Activates exactly one entry by name on `abi`, for single-victim
    /// runs. Returns the index, or `None` for an unknown name.
    pub fn activate_only(&self, active: &ActiveSet, name: &str, abi: Abi) -> Option<usize> {
        let idx = self.lookup(name)?;
        active.activate(idx, abi);
        Some(idx)
    }
}

/// The process-wide table.
#[must_use]
pub fn table() -> &'static SyscallTable {
    static TABLE: SyscallTable = SyscallTable {
        entries: &entries::SYSCALLS,
    };
    &TABLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use muon_rand::Rng;

    #[test]
    fn index_is_the_call_number() {
        let t = table();
        assert_eq!(t.call_nr(0), SYSCALL_OFFSET);
        assert_eq!(t.call_nr(t.count() - 1), t.count() - 1 + SYSCALL_OFFSET);
    }

    #[test]
    fn lookup_matches_known_numbers() {
        let t = table();
        assert_eq!(t.lookup("read"), Some(0));
        assert_eq!(t.lookup("open"), Some(2));
        assert_eq!(t.lookup("mmap"), Some(9));
        assert_eq!(t.lookup("setsockopt"), Some(54));
        assert_eq!(t.lookup("uname"), Some(63));
        assert_eq!(t.lookup("no-such-call"), None);
    }

    #[test]
    fn avoid_entries_stay_inactive_after_activate_all() {
        let t = table();
        let active = ActiveSet::new();
        t.activate_all(&active, Abi::Native);
        for idx in 0..t.count() {
            let expected = !t.entry(idx).flags.contains(EntryFlags::AVOID);
            assert_eq!(
                active.active_number(idx, Abi::Native) > 0,
                expected,
                "entry {} ({})",
                idx,
                t.entry(idx).name
            );
        }
    }

    #[test]
    fn activate_only_selects_one_victim() {
        let t = table();
        let active = ActiveSet::new();
        let idx = t.activate_only(&active, "open", Abi::Native).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(active.remaining(Abi::Native), 1);
        let mut rng = Rng::with_seed(5);
        assert_eq!(active.pick(&mut rng, t.count(), Abi::Native), Some(2));
    }

    #[test]
    fn selector_never_returns_an_inactive_entry() {
        let t = table();
        let active = ActiveSet::new();
        t.activate_all(&active, Abi::Native);
        let mut rng = Rng::with_seed(6);
        for _ in 0..2000 {
            let idx = active.pick(&mut rng, t.count(), Abi::Native).unwrap();
            assert!(active.active_number(idx, Abi::Native) > 0);
        }
    }
}
