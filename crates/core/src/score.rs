//! Scoring formula and frame timing tables.

/// Bonus for the n-th step of a chain (index = chain step, 1-based).
pub const CHAIN_BONUS: [usize; 20] = [
    0, 0, 8, 16, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 480, 512,
];

/// Bonus for the number of distinct colors erased in one step.
pub const COLOR_BONUS: [usize; 6] = [0, 0, 3, 6, 12, 24];

/// Frames the vanish animation holds the field still.
pub const FRAMES_VANISH_ANIMATION: usize = 50;
/// Frames a puyo spends settling after it lands.
pub const FRAMES_GROUNDING: usize = 10;
/// Frames per one-column shift of a falling piece.
pub const FRAMES_HORIZONTAL_MOVE: usize = 2;
/// Frames of free fall after a vanish, indexed by rows fallen.
pub const FRAMES_TO_DROP: [usize; 15] = [0, 19, 24, 28, 31, 34, 37, 40, 42, 44, 46, 48, 50, 52, 54];
/// Frames of a soft-dropped piece, indexed by rows fallen.
pub const FRAMES_TO_DROP_FAST: [usize; 15] = [0, 2, 4, 6, 8, 10, 12, 14, 16, 18, 20, 22, 24, 26, 28];

#[inline]
pub fn chain_bonus(chain: usize) -> usize {
    if chain < CHAIN_BONUS.len() {
        CHAIN_BONUS[chain]
    } else {
        CHAIN_BONUS[CHAIN_BONUS.len() - 1]
    }
}

#[inline]
pub fn color_bonus(num_colors: usize) -> usize {
    COLOR_BONUS[num_colors.min(COLOR_BONUS.len() - 1)]
}

/// Bonus for one vanishing group of `size` puyos.
#[inline]
pub fn long_bonus(size: usize) -> usize {
    match size {
        0..=4 => 0,
        5..=10 => size - 3,
        _ => 10,
    }
}

/// Score for one chain step: `10 * erased * clamp(bonus, 1, 999)`.
pub fn step_score(chain: usize, num_erased: usize, num_colors: usize, sum_long_bonus: usize) -> usize {
    let bonus = chain_bonus(chain) + color_bonus(num_colors) + sum_long_bonus;
    10 * num_erased * bonus.clamp(1, 999)
}

#[inline]
pub fn frames_to_drop(rows: usize) -> usize {
    FRAMES_TO_DROP[rows.min(FRAMES_TO_DROP.len() - 1)]
}

#[inline]
pub fn frames_to_drop_fast(rows: usize) -> usize {
    FRAMES_TO_DROP_FAST[rows.min(FRAMES_TO_DROP_FAST.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_group_of_four() {
        // 40 points: bonus clamps up to 1
        assert_eq!(step_score(1, 4, 1, long_bonus(4)), 40);
    }

    #[test]
    fn test_second_step_bonus() {
        assert_eq!(step_score(2, 4, 1, 0), 320);
    }

    #[test]
    fn test_long_and_color_bonus() {
        assert_eq!(long_bonus(5), 2);
        assert_eq!(long_bonus(10), 7);
        assert_eq!(long_bonus(11), 10);
        assert_eq!(long_bonus(30), 10);
        // two colors, groups of 4 and 5
        assert_eq!(step_score(1, 9, 2, long_bonus(4) + long_bonus(5)), 450);
    }

    #[test]
    fn test_bonus_is_capped() {
        assert_eq!(step_score(19, 4, 5, 10), 10 * 4 * 546);
        assert_eq!(step_score(19, 40, 5, 500), 10 * 40 * 999);
        assert_eq!(step_score(1, 4, 1, 0), 10 * 4);
    }

    #[test]
    fn test_tables_saturate() {
        assert_eq!(chain_bonus(40), 512);
        assert_eq!(frames_to_drop(99), 54);
        assert_eq!(frames_to_drop_fast(0), 0);
    }
}
