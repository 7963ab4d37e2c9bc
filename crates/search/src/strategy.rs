//! Detector configuration: which generator to run and how far it may go.

use serde::{Deserialize, Serialize};

use puyo_core::{FIELD_HEIGHT, FIELD_WIDTH};

/// Candidate generator used by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionMode {
    /// Stack one color on top of a column.
    Drop,
    /// Place a run of one color beside an existing puyo, above the column top.
    Float,
    /// Grow an existing group cell by cell until it vanishes.
    Extend,
}

/// Which candidates reach the callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionPurpose {
    /// Only additions that start a chain.
    Fire,
    /// Also the non-firing intermediate additions, for further composition.
    Key,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RensaDetectorStrategy {
    pub mode: DetectionMode,
    /// Upper bound on colored puyos added per candidate.
    pub max_complement_puyos: usize,
    /// No added puyo may sit above this row.
    pub max_height: usize,
    /// Float may prop its puyos up with garbage placeholders.
    pub allows_garbage: bool,
}

impl RensaDetectorStrategy {
    pub const fn new(
        mode: DetectionMode,
        max_complement_puyos: usize,
        max_height: usize,
        allows_garbage: bool,
    ) -> Self {
        Self {
            mode,
            max_complement_puyos,
            max_height,
            allows_garbage,
        }
    }

    pub const fn default_drop_strategy() -> Self {
        Self::new(DetectionMode::Drop, 3, FIELD_HEIGHT, false)
    }

    pub const fn default_float_strategy() -> Self {
        Self::new(DetectionMode::Float, 3, FIELD_HEIGHT, true)
    }

    pub const fn default_extend_strategy() -> Self {
        Self::new(DetectionMode::Extend, 3, FIELD_HEIGHT, false)
    }

    /// Highest row an added puyo may occupy.
    #[inline]
    pub(crate) fn ceiling(&self) -> usize {
        self.max_height.min(FIELD_HEIGHT)
    }
}

impl Default for RensaDetectorStrategy {
    fn default() -> Self {
        Self::default_drop_strategy()
    }
}

/// One bit per playable column (bit x for column x).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnMask(u8);

impl ColumnMask {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(0b0111_1110)
    }

    pub const fn only(x: usize) -> Self {
        Self::empty().with(x)
    }

    /// Adds column `x`; anything outside 1..=6 is ignored.
    #[must_use]
    pub const fn with(self, x: usize) -> Self {
        if x >= 1 && x <= FIELD_WIDTH {
            Self(self.0 | (1 << x))
        } else {
            self
        }
    }

    #[must_use]
    pub const fn without(self, x: usize) -> Self {
        if x >= 1 && x <= FIELD_WIDTH {
            Self(self.0 & !(1 << x))
        } else {
            self
        }
    }

    #[inline]
    pub const fn contains(self, x: usize) -> bool {
        x >= 1 && x <= FIELD_WIDTH && self.0 & (1 << x) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn columns(self) -> impl Iterator<Item = usize> {
        (1..=FIELD_WIDTH).filter(move |&x| self.contains(x))
    }
}

impl FromIterator<usize> for ColumnMask {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
