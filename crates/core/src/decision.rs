//! Where and how a two-cell piece locks.

use serde::{Deserialize, Serialize};

use crate::kumipuyo::Kumipuyo;

/// Axis column (1..=6) plus rotation: 0 child above, 1 child right,
/// 2 child below, 3 child left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Decision {
    x: u8,
    r: u8,
}

/// Fixed placement catalog. The first 11 entries already cover every
/// distinct outcome when both cells share a color.
pub const DECISIONS: [Decision; 22] = [
    Decision::new(2, 3),
    Decision::new(3, 3),
    Decision::new(3, 1),
    Decision::new(4, 1),
    Decision::new(5, 1),
    Decision::new(1, 2),
    Decision::new(2, 2),
    Decision::new(3, 2),
    Decision::new(4, 2),
    Decision::new(5, 2),
    Decision::new(6, 2),
    Decision::new(1, 1),
    Decision::new(2, 1),
    Decision::new(4, 3),
    Decision::new(5, 3),
    Decision::new(6, 3),
    Decision::new(1, 0),
    Decision::new(2, 0),
    Decision::new(3, 0),
    Decision::new(4, 0),
    Decision::new(5, 0),
    Decision::new(6, 0),
];

const NUM_REP_DECISIONS: usize = 11;

/// Catalog slice to enumerate for a given piece.
#[inline]
pub fn decisions_for(kumipuyo: &Kumipuyo) -> &'static [Decision] {
    if kumipuyo.is_rep() {
        &DECISIONS[..NUM_REP_DECISIONS]
    } else {
        &DECISIONS
    }
}

impl Decision {
    #[inline(always)]
    pub const fn new(x: usize, r: usize) -> Self {
        Self {
            x: x as u8,
            r: r as u8,
        }
    }

    #[inline(always)]
    pub const fn x(self) -> usize {
        self.x as usize
    }

    #[inline(always)]
    pub const fn r(self) -> usize {
        self.r as usize
    }

    #[inline(always)]
    pub const fn axis_x(self) -> usize {
        self.x as usize
    }

    /// Column the child cell ends up in. Zero for an invalid left rotation
    /// at column 1, which `is_valid` rejects.
    #[inline(always)]
    pub const fn child_x(self) -> usize {
        match self.r {
            1 => self.x as usize + 1,
            3 => (self.x as usize).saturating_sub(1),
            _ => self.x as usize,
        }
    }

    #[inline(always)]
    pub const fn is_vertical(self) -> bool {
        self.r == 0 || self.r == 2
    }

    pub const fn is_valid(self) -> bool {
        if self.x < 1 || self.x > 6 || self.r > 3 {
            return false;
        }
        !(self.x == 1 && self.r == 3) && !(self.x == 6 && self.r == 1)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.r)
    }
}
