//! Declared argument kinds.
//!
//! A kind is metadata *about* one slot of the six-word argument carrier,
//! never the type of the slot itself: every slot stays a plain `u64` all
//! the way to the trap. The generic sanitizer reads the kind to decide
//! how to rewrite the slot's initial random draw.

/// How one argument slot should be generated.
#[derive(Clone, Copy, Debug)]
pub enum ArgKind {
    /// Not consumed by the call; the random draw is left untouched.
    Ignored,
    /// Any 64-bit value; the random draw is the value.
    RandomInt,
    /// Pointer into the child's pool of pre-built path buffers.
    Pathname,
    /// Index into the child's open-descriptor pool.
    Fd,
    /// OR of up to `len` values drawn with replacement from the list.
    Flags(&'static [u64]),
    /// Exactly one value from the list.
    Op(&'static [u64]),
    /// Random value within the 12-bit permission space.
    Mode,
    /// Pointer-shaped value: NULL, a scratch buffer, a misaligned
    /// scratch pointer, a kernel-half constant, or raw noise.
    Address,
    /// Length-shaped value, biased toward a few pages.
    Len,
    /// Uniform draw from an inclusive range.
    Range {
        /// Lower bound, inclusive.
        min: u64,
        /// Upper bound, inclusive.
        max: u64,
    },
}

/// One declared argument slot: a display name plus its kind.
#[derive(Clone, Copy, Debug)]
pub struct ArgSpec {
    /// Name used when rendering the call.
    pub name: &'static str,
    /// Generation kind for this slot.
    pub kind: ArgKind,
}

impl ArgSpec {
    /// Declares one argument slot.
    #[must_use]
    pub const fn new(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind }
    }
}
