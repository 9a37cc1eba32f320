// Copyright 2026 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer rounding to a multiple, in three safety grades.
//!
//! Texture and tile sizing round pixel counts up or down to a multiple of
//! some alignment. Near the ends of the integer range that rounding can
//! overflow, so each operation comes in three forms:
//!
//! - `unchecked_*` — wraps silently on overflow.
//! - `checked_*` — panics when the rounded value is unrepresentable.
//! - `verify_*` — predicate for callers that want to test first.
//!
//! `multiple` must be positive for all of them.

macro_rules! round_impl {
    ($t:ty, $up:ident, $down:ident, $checked_up:ident, $checked_down:ident,
     $verify_up:ident, $verify_down:ident) => {
        /// Rounds `n` up to the nearest multiple of `multiple`, wrapping on
        /// overflow.
        #[must_use]
        pub const fn $up(n: $t, multiple: $t) -> $t {
            debug_assert!(multiple > 0, "multiple must be positive");
            if n > 0 {
                ((n - 1) / multiple + 1).wrapping_mul(multiple)
            } else {
                (n / multiple) * multiple
            }
        }

        /// Rounds `n` down to the nearest multiple of `multiple`, wrapping on
        /// overflow.
        #[must_use]
        pub const fn $down(n: $t, multiple: $t) -> $t {
            debug_assert!(multiple > 0, "multiple must be positive");
            if n >= 0 {
                (n / multiple) * multiple
            } else if n == (n / multiple) * multiple {
                n
            } else {
                ((n / multiple) - 1).wrapping_mul(multiple)
            }
        }

        /// Can `n` be rounded up to a multiple of `multiple` without
        /// overflow?
        #[must_use]
        pub const fn $verify_up(n: $t, multiple: $t) -> bool {
            multiple > 0 && n <= <$t>::MAX - <$t>::MAX % multiple
        }

        /// Can `n` be rounded down to a multiple of `multiple` without
        /// overflow?
        #[must_use]
        pub const fn $verify_down(n: $t, multiple: $t) -> bool {
            multiple > 0 && n >= <$t>::MIN - <$t>::MIN % multiple
        }

        /// Rounds `n` up to the nearest multiple of `multiple`.
        ///
        /// # Panics
        ///
        /// Panics if the rounded value is unrepresentable.
        #[must_use]
        pub const fn $checked_up(n: $t, multiple: $t) -> $t {
            assert!($verify_up(n, multiple), "round-up overflows");
            $up(n, multiple)
        }

        /// Rounds `n` down to the nearest multiple of `multiple`.
        ///
        /// # Panics
        ///
        /// Panics if the rounded value is unrepresentable.
        #[must_use]
        pub const fn $checked_down(n: $t, multiple: $t) -> $t {
            assert!($verify_down(n, multiple), "round-down overflows");
            $down(n, multiple)
        }
    };
}

round_impl!(
    i32,
    unchecked_round_up_i32,
    unchecked_round_down_i32,
    checked_round_up_i32,
    checked_round_down_i32,
    verify_round_up_i32,
    verify_round_down_i32
);

round_impl!(
    i64,
    unchecked_round_up_i64,
    unchecked_round_down_i64,
    checked_round_up_i64,
    checked_round_down_i64,
    verify_round_up_i64,
    verify_round_down_i64
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_basics() {
        assert_eq!(unchecked_round_up_i32(0, 10), 0);
        assert_eq!(unchecked_round_up_i32(1, 10), 10);
        assert_eq!(unchecked_round_up_i32(10, 10), 10);
        assert_eq!(unchecked_round_up_i32(11, 10), 20);
        assert_eq!(unchecked_round_up_i32(-1, 10), 0);
        assert_eq!(unchecked_round_up_i32(-10, 10), -10);
        assert_eq!(unchecked_round_up_i32(-11, 10), -10);
    }

    #[test]
    fn round_down_basics() {
        assert_eq!(unchecked_round_down_i32(0, 10), 0);
        assert_eq!(unchecked_round_down_i32(9, 10), 0);
        assert_eq!(unchecked_round_down_i32(10, 10), 10);
        assert_eq!(unchecked_round_down_i32(-1, 10), -10);
        assert_eq!(unchecked_round_down_i32(-10, 10), -10);
        assert_eq!(unchecked_round_down_i32(-11, 10), -20);
    }

    #[test]
    fn verify_matches_overflow_boundary() {
        assert!(verify_round_up_i32(i32::MAX - i32::MAX % 10, 10));
        assert!(!verify_round_up_i32(i32::MAX - i32::MAX % 10 + 1, 10));
        assert!(verify_round_down_i32(i32::MIN - i32::MIN % 10, 10));
        assert!(!verify_round_down_i32(i32::MIN - i32::MIN % 10 - 1, 10));
        assert!(!verify_round_up_i32(5, 0));
    }

    #[test]
    fn checked_round_in_range() {
        assert_eq!(checked_round_up_i64(123, 50), 150);
        assert_eq!(checked_round_down_i64(-123, 50), -150);
    }

    #[test]
    #[should_panic(expected = "round-up overflows")]
    fn checked_round_up_panics_on_overflow() {
        let _ = checked_round_up_i32(i32::MAX, 10);
    }

    #[test]
    #[should_panic(expected = "round-down overflows")]
    fn checked_round_down_panics_on_overflow() {
        let _ = checked_round_down_i32(i32::MIN + 1, 10);
    }
}
