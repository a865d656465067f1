// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Companion-note window for triplet groups.

/// Steps a triplet companion may move away from the lead note
pub const TRIPLET_REACH: usize = 2;

/// Window of range indices a triplet companion may be drawn from.
///
/// `range_low` and `range_high` are the inclusive bounds of the range
/// holding `base`. Returns `(shift, count)`: the window starts at
/// `base + shift` (`shift <= 0`) and holds `count` consecutive indices,
/// at most [`TRIPLET_REACH`] on either side of `base` and never outside
/// the range.
pub fn triplet_window(base: usize, range_low: usize, range_high: usize) -> (isize, usize) {
    debug_assert!(range_low <= base && base <= range_high);
    let low = base.saturating_sub(TRIPLET_REACH).max(range_low);
    let high = (base + TRIPLET_REACH).min(range_high);
    (low as isize - base as isize, high - low + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_inside_range() {
        assert_eq!(triplet_window(5, 0, 10), (-2, 5));
    }

    #[test]
    fn test_window_at_range_start() {
        assert_eq!(triplet_window(0, 0, 10), (0, 3));
        assert_eq!(triplet_window(1, 0, 10), (-1, 4));
        assert_eq!(triplet_window(9, 9, 20), (0, 3));
    }

    #[test]
    fn test_window_at_range_end() {
        assert_eq!(triplet_window(10, 0, 10), (-2, 3));
        assert_eq!(triplet_window(9, 0, 10), (-2, 4));
        // last entry of a primary range must not reach the secondary one
        assert_eq!(triplet_window(8, 0, 8), (-2, 3));
    }

    #[test]
    fn test_single_entry_range() {
        assert_eq!(triplet_window(4, 4, 4), (0, 1));
    }

    #[test]
    fn test_window_never_leaves_range() {
        for low in 0..4 {
            for high in low..low + 6 {
                for base in low..=high {
                    let (shift, count) = triplet_window(base, low, high);
                    let start = base as isize + shift;
                    let end = start + count as isize - 1;
                    assert!(start >= low as isize);
                    assert!(end <= high as isize);
                    assert!(start <= base as isize && base as isize <= end);
                    assert!(base as isize - start <= 2 && end - base as isize <= 2);
                }
            }
        }
    }
}
