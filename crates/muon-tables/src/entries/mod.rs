//! Entry definitions, one module per subsystem, assembled here into the
//! dense number-ordered table.
//!
//! The array position is the call number on x86_64. Numbers past the
//! covered window are simply absent from the table; widening the window
//! means appending entries here, never reordering.

pub mod fs;
pub mod mm;
pub mod net;
pub mod process;

use crate::entry::SyscallEntry;

/// Every covered entry, indexed by call number.
pub static SYSCALLS: [&SyscallEntry; 64] = [
    &fs::READ,                // 0
    &fs::WRITE,               // 1
    &fs::OPEN,                // 2
    &fs::CLOSE,               // 3
    &fs::STAT,                // 4
    &fs::FSTAT,               // 5
    &fs::LSTAT,               // 6
    &fs::POLL,                // 7
    &fs::LSEEK,               // 8
    &mm::MMAP,                // 9
    &mm::MPROTECT,            // 10
    &mm::MUNMAP,              // 11
    &mm::BRK,                 // 12
    &process::RT_SIGACTION,   // 13
    &process::RT_SIGPROCMASK, // 14
    &process::RT_SIGRETURN,   // 15
    &fs::IOCTL,               // 16
    &fs::PREAD64,             // 17
    &fs::PWRITE64,            // 18
    &fs::READV,               // 19
    &fs::WRITEV,              // 20
    &fs::ACCESS,              // 21
    &fs::PIPE,                // 22
    &fs::SELECT,              // 23
    &process::SCHED_YIELD,    // 24
    &mm::MREMAP,              // 25
    &mm::MSYNC,               // 26
    &mm::MINCORE,             // 27
    &mm::MADVISE,             // 28
    &mm::SHMGET,              // 29
    &mm::SHMAT,               // 30
    &mm::SHMCTL,              // 31
    &fs::DUP,                 // 32
    &fs::DUP2,                // 33
    &process::PAUSE,          // 34
    &process::NANOSLEEP,      // 35
    &process::GETITIMER,      // 36
    &process::ALARM,          // 37
    &process::SETITIMER,      // 38
    &process::GETPID,         // 39
    &fs::SENDFILE,            // 40
    &net::SOCKET,             // 41
    &net::CONNECT,            // 42
    &net::ACCEPT,             // 43
    &net::SENDTO,             // 44
    &net::RECVFROM,           // 45
    &net::SENDMSG,            // 46
    &net::RECVMSG,            // 47
    &net::SHUTDOWN,           // 48
    &net::BIND,               // 49
    &net::LISTEN,             // 50
    &net::GETSOCKNAME,        // 51
    &net::GETPEERNAME,        // 52
    &net::SOCKETPAIR,         // 53
    &net::SETSOCKOPT,         // 54
    &net::GETSOCKOPT,         // 55
    &process::CLONE,          // 56
    &process::FORK,           // 57
    &process::VFORK,          // 58
    &process::EXECVE,         // 59
    &process::EXIT,           // 60
    &process::WAIT4,          // 61
    &process::KILL,           // 62
    &process::UNAME,          // 63
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_fits_the_carrier() {
        for entry in SYSCALLS {
            assert!(entry.num_args() <= 6, "{} declares too many args", entry.name);
        }
    }

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for entry in SYSCALLS {
            assert!(seen.insert(entry.name), "duplicate entry {}", entry.name);
        }
    }

    #[test]
    fn spot_check_well_known_numbers() {
        assert_eq!(SYSCALLS[0].name, "read");
        assert_eq!(SYSCALLS[2].name, "open");
        assert_eq!(SYSCALLS[9].name, "mmap");
        assert_eq!(SYSCALLS[39].name, "getpid");
        assert_eq!(SYSCALLS[41].name, "socket");
        assert_eq!(SYSCALLS[54].name, "setsockopt");
        assert_eq!(SYSCALLS[59].name, "execve");
        assert_eq!(SYSCALLS[63].name, "uname");
    }

    #[test]
    fn argument_names_are_nonempty() {
        for entry in SYSCALLS {
            for spec in entry.args {
                assert!(!spec.name.is_empty(), "{} has an unnamed arg", entry.name);
            }
        }
    }
}
