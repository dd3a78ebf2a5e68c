//! The fuzzing core: shared bookkeeping, the invoke capability, and the
//! per-child execution loop.
//!
//! One [`shm::SharedRegion`] is created before any child forks. Each
//! child owns one slot in it and drives the record state machine
//! `Unused → Prep → Before → After → Done` for every call it makes,
//! while the supervisor watches `state` and the timestamp from outside
//! to catch hangs. The kernel itself is only ever reached through the
//! [`invoke::Invoke`] capability, which keeps the loop testable against
//! scripted kernels.

pub mod child;
pub mod invoke;
pub mod output;
pub mod shm;

pub use child::Child;
pub use invoke::{Invoke, KernelInvoke};
pub use shm::{MAX_CHILDREN, RecState, SharedRegion, Shm};
