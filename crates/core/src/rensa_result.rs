use serde::{Deserialize, Serialize};

use crate::field::{MAP_HEIGHT, MAP_WIDTH};

/// Outcome of one full cascade simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RensaResult {
    pub chains: usize,
    pub score: usize,
    pub frames: usize,
    /// The last step left nothing to fall, so the next piece appears sooner.
    pub quick: bool,
}

impl RensaResult {
    pub const fn new(chains: usize, score: usize, frames: usize, quick: bool) -> Self {
        Self {
            chains,
            score,
            frames,
            quick,
        }
    }
}

impl std::fmt::Display for RensaResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chains={} score={} frames={}{}",
            self.chains,
            self.score,
            self.frames,
            if self.quick { " quick" } else { "" }
        )
    }
}

/// Chain step in which each cell of the starting field vanished (0 = never).
/// Indexed by the cell's position before the cascade began.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RensaTrackResult {
    erased_at: [[u8; MAP_HEIGHT]; MAP_WIDTH],
}

impl Default for RensaTrackResult {
    fn default() -> Self {
        Self {
            erased_at: [[0; MAP_HEIGHT]; MAP_WIDTH],
        }
    }
}

impl RensaTrackResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn erased_at(&self, x: usize, y: usize) -> usize {
        self.erased_at
            .get(x)
            .and_then(|col| col.get(y))
            .map_or(0, |&n| n as usize)
    }

    #[inline]
    pub fn set_erased_at(&mut self, x: usize, y: usize, chain: usize) {
        if x < MAP_WIDTH && y < MAP_HEIGHT {
            self.erased_at[x][y] = chain as u8;
        }
    }

    /// Cells that vanished in step `chain`.
    pub fn count_erased_in(&self, chain: usize) -> usize {
        self.erased_at
            .iter()
            .flatten()
            .filter(|&&n| n as usize == chain && chain != 0)
            .count()
    }
}
