//! Per-kind argument generators.
//!
//! Each generator yields one 64-bit word constrained to its kind's
//! domain. The entry point is [`for_kind`], which the generic sanitizer
//! applies slot by slot.

use muon_rand::Rng;
use muon_sys::consts::PAGE_SIZE;

use crate::kinds::ArgKind;
use crate::pools::GenCtx;

/// A kernel-half address; deliberately not mapped in any process.
const KERNEL_ADDR: u64 = 0xFFFF_8000_0000_0000;

/// Picks exactly one value from the list.
pub fn pick_one(rng: &mut Rng, list: &[u64]) -> u64 {
    debug_assert!(!list.is_empty());
    list[rng.below(list.len() as u64) as usize]
}

/// ORs together `k` values drawn with replacement from the list, with
/// `k` uniform in `[0, len]` *inclusive*; `k = 0` yields 0.
///
/// Replacement is intentional: repeated draws of the same bit make the
/// hotter combinations more likely by birthday.
pub fn or_flags(rng: &mut Rng, list: &[u64]) -> u64 {
    let num = list.len() as u64;
    let bits = rng.below(num + 1);
    let mut mask = 0;
    for _ in 0..bits {
        mask |= list[rng.below(num) as usize];
    }
    mask
}

/// Random value within the 12-bit permission space.
pub fn mode_bits(rng: &mut Rng) -> u64 {
    rng.below(1 << 12)
}

/// Length-shaped value: usually within a couple of pages, occasionally
/// exact page multiples or wild 64-bit noise.
pub fn length(rng: &mut Rng) -> u64 {
    match rng.below(8) {
        0 => rng.next_u64(),
        1 => PAGE_SIZE * rng.below(4),
        2 => rng.below(16),
        _ => rng.below(2 * PAGE_SIZE + 1),
    }
}

/// Pointer-shaped value. Scratch-backed variants register their buffer
/// with the iteration's transient list; the rest point nowhere useful
/// on purpose.
pub fn address(ctx: &mut GenCtx) -> u64 {
    match ctx.rng.below(5) {
        0 => 0,
        1 => ctx.scratch.page(),
        2 => ctx.scratch.page() + 1,
        3 => KERNEL_ADDR | (ctx.rng.next_u64() & 0xFFFF_FFFF),
        _ => ctx.rng.next_u64(),
    }
}

/// Applies the kind's generator to one slot, given the slot's initial
/// random draw. Kinds that keep full entropy return `current` as is.
pub fn for_kind(ctx: &mut GenCtx, kind: ArgKind, current: u64) -> u64 {
    match kind {
        ArgKind::Ignored | ArgKind::RandomInt => current,
        ArgKind::Pathname => ctx.paths.pick(&mut ctx.rng),
        ArgKind::Fd => ctx.fds.pick(&mut ctx.rng),
        ArgKind::Flags(list) => or_flags(&mut ctx.rng, list),
        ArgKind::Op(list) => pick_one(&mut ctx.rng, list),
        ArgKind::Mode => mode_bits(&mut ctx.rng),
        ArgKind::Address => address(ctx),
        ArgKind::Len => length(&mut ctx.rng),
        ArgKind::Range { min, max } => ctx.rng.range(min, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muon_rand::Rng;

    #[test]
    fn pick_one_stays_in_list() {
        let list = [3u64, 5, 9];
        let mut rng = Rng::with_seed(11);
        for _ in 0..1000 {
            assert!(list.contains(&pick_one(&mut rng, &list)));
        }
    }

    #[test]
    fn or_flags_zero_probability_matches_inclusive_draw() {
        // With list length N the count is uniform over N+1 choices, so
        // a zero mask from k = 0 alone happens with probability
        // 1/(N+1). The OR can also produce 0 only when the list holds a
        // zero value, which this list does not.
        let list = [1u64 << 0, 1 << 1, 1 << 2, 1 << 3];
        let mut rng = Rng::with_seed(0xFEED);
        let draws = 200_000;
        let zeros = (0..draws)
            .filter(|_| or_flags(&mut rng, &list) == 0)
            .count();
        let expected = f64::from(draws) / (list.len() + 1) as f64;
        let deviation = (zeros as f64 - expected).abs() / expected;
        assert!(deviation < 0.05, "zero rate off by {deviation}");
    }

    #[test]
    fn or_flags_is_subset_of_list_union() {
        let list = [0x1u64, 0x8, 0x40, 0x200];
        let union: u64 = list.iter().fold(0, |acc, &v| acc | v);
        let mut rng = Rng::with_seed(21);
        for _ in 0..5000 {
            assert_eq!(or_flags(&mut rng, &list) & !union, 0);
        }
    }

    #[test]
    fn mode_fits_twelve_bits() {
        let mut rng = Rng::with_seed(31);
        for _ in 0..5000 {
            assert!(mode_bits(&mut rng) < (1 << 12));
        }
    }

    #[test]
    fn address_null_and_scratch_variants_appear() {
        let mut ctx = GenCtx::bare(Rng::with_seed(41));
        let mut saw_null = false;
        let mut saw_scratch = false;
        for _ in 0..500 {
            let addr = address(&mut ctx);
            saw_null |= addr == 0;
            saw_scratch |= !ctx.scratch.is_empty();
            ctx.scratch.clear();
        }
        assert!(saw_null && saw_scratch);
    }

    #[test]
    fn range_kind_respects_bounds() {
        let mut ctx = GenCtx::bare(Rng::with_seed(51));
        for _ in 0..1000 {
            let v = for_kind(&mut ctx, ArgKind::Range { min: 5, max: 9 }, 0xDEAD);
            assert!((5..=9).contains(&v));
        }
    }

    #[test]
    fn entropy_preserving_kinds_keep_the_draw() {
        let mut ctx = GenCtx::bare(Rng::with_seed(61));
        assert_eq!(for_kind(&mut ctx, ArgKind::RandomInt, 0xABCD), 0xABCD);
        assert_eq!(for_kind(&mut ctx, ArgKind::Ignored, 0x1234), 0x1234);
    }
}
