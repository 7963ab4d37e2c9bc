use serde::{Deserialize, Serialize};

use puyo_core::{ColumnPuyoList, RensaResult, RensaTrackResult};

/// A chain the field could fire once `necessary_puyo_set` is added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleRensaInfo {
    pub rensa_result: RensaResult,
    pub necessary_puyo_set: ColumnPuyoList,
}

impl PossibleRensaInfo {
    pub fn new(rensa_result: RensaResult, necessary_puyo_set: ColumnPuyoList) -> Self {
        Self {
            rensa_result,
            necessary_puyo_set,
        }
    }
}

impl std::fmt::Display for PossibleRensaInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.rensa_result, self.necessary_puyo_set)
    }
}

/// A possible chain together with the step that erased each cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedPossibleRensaInfo {
    pub rensa_result: RensaResult,
    pub necessary_puyo_set: ColumnPuyoList,
    pub track_result: RensaTrackResult,
}

impl TrackedPossibleRensaInfo {
    pub fn new(
        rensa_result: RensaResult,
        necessary_puyo_set: ColumnPuyoList,
        track_result: RensaTrackResult,
    ) -> Self {
        Self {
            rensa_result,
            necessary_puyo_set,
            track_result,
        }
    }
}

/// A chain the given pieces can actually fire, and how long it takes to
/// start it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeasibleRensaInfo {
    pub rensa_result: RensaResult,
    pub initiating_frames: usize,
}

impl FeasibleRensaInfo {
    pub fn new(rensa_result: RensaResult, initiating_frames: usize) -> Self {
        Self {
            rensa_result,
            initiating_frames,
        }
    }

    /// Frames until the chain is over, counted from now.
    pub fn total_frames(&self) -> usize {
        self.initiating_frames + self.rensa_result.frames
    }
}
