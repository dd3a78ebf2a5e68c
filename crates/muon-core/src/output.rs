//! Per-call output rendering.
//!
//! One prefix line before the trap, one postfix line after, and the
//! deactivation notice. Rendering uses the entry's declared kinds so a
//! descriptor prints as a small decimal and a pointer as hex, which is
//! what makes the stream readable during triage.

use muon_sys::{Abi, CallOutcome, Errno};
use muon_tables::{ArgKind, SyscallEntry};

use crate::shm::RecordData;

use std::fmt::Write;

fn render_arg(kind: ArgKind, value: u64) -> String {
    match kind {
        ArgKind::Fd => format!("{value}"),
        ArgKind::Mode => format!("0o{value:o}"),
        ArgKind::Len | ArgKind::Range { .. } => {
            if value < 0x10000 {
                format!("{value}")
            } else {
                format!("0x{value:x}")
            }
        }
        _ => format!("0x{value:x}"),
    }
}

/// Renders the structured prefix for one prepared call.
#[must_use]
pub fn prefix(childno: usize, entry: &SyscallEntry, call_nr: usize, rec: &RecordData) -> String {
    let mut line = format!("[child{childno}:{}] {}(", rec.op_nr, entry.name);
    for (i, spec) in entry.args.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        let _ = write!(line, "{}={}", spec.name, render_arg(spec.kind, rec.args[i]));
    }
    let _ = write!(line, ") nr={call_nr}{}", rec.abi.tag());
    line
}

/// Renders the structured postfix for one completed call.
#[must_use]
pub fn postfix(outcome: &CallOutcome) -> String {
    if outcome.is_error() {
        format!("= -1 ({})", Errno(outcome.errno))
    } else {
        format!("= 0x{:x}", outcome.retval)
    }
}

/// Renders the notice emitted when an entry is retired.
#[must_use]
pub fn deactivation(name: &str, call_nr: usize, abi: Abi) -> String {
    format!(
        "{name} ({call_nr}{}) returned ENOSYS, marking as inactive.",
        abi.tag()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use muon_sys::errno::ENOSYS;
    use muon_tables::table;

    fn record_for(nr: usize, args: [u64; 6], abi: Abi) -> RecordData {
        let mut rec = RecordData::new();
        rec.nr = nr;
        rec.args = muon_sys::SyscallArgs(args);
        rec.abi = abi;
        rec
    }

    #[test]
    fn prefix_renders_by_kind() {
        let t = table();
        let nr = t.lookup("open").unwrap();
        let rec = record_for(nr, [0x7F001000, 0o102, 0o644, 0, 0, 0], Abi::Native);
        let line = prefix(0, t.entry(nr), t.call_nr(nr), &rec);
        assert!(line.starts_with("[child0:0] open("));
        assert!(line.contains("filename=0x7f001000"));
        assert!(line.contains("mode=0o644"));
        assert!(line.contains("nr=2"));
        assert!(!line.contains("32BIT"));
    }

    #[test]
    fn prefix_tags_compat_calls() {
        let t = table();
        let nr = t.lookup("getpid").unwrap();
        let rec = record_for(nr, [0; 6], Abi::Compat);
        let line = prefix(3, t.entry(nr), t.call_nr(nr), &rec);
        assert!(line.ends_with(":[32BIT]"));
    }

    #[test]
    fn postfix_distinguishes_outcomes() {
        assert_eq!(postfix(&CallOutcome { retval: 3, errno: 0 }), "= 0x3");
        assert_eq!(
            postfix(&CallOutcome { retval: u64::MAX, errno: ENOSYS }),
            "= -1 (ENOSYS)"
        );
    }

    #[test]
    fn deactivation_notice_carries_name_number_and_tag() {
        let notice = deactivation("uname", 63, Abi::Compat);
        assert_eq!(
            notice,
            "uname (63:[32BIT]) returned ENOSYS, marking as inactive."
        );
    }
}
