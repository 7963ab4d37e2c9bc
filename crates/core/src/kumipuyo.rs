//! Falling two-cell pieces and upcoming-piece sequences.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::PuyoColor;
use crate::error::ParseError;

/// A falling piece: the axis cell and the child cell that rotates around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Kumipuyo {
    pub axis: PuyoColor,
    pub child: PuyoColor,
}

impl Kumipuyo {
    /// Every distinct color pairing up to swapping axis and child.
    pub const ALL_KINDS: [Kumipuyo; 10] = [
        Kumipuyo::new(PuyoColor::Red, PuyoColor::Red),
        Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue),
        Kumipuyo::new(PuyoColor::Red, PuyoColor::Yellow),
        Kumipuyo::new(PuyoColor::Red, PuyoColor::Green),
        Kumipuyo::new(PuyoColor::Blue, PuyoColor::Blue),
        Kumipuyo::new(PuyoColor::Blue, PuyoColor::Yellow),
        Kumipuyo::new(PuyoColor::Blue, PuyoColor::Green),
        Kumipuyo::new(PuyoColor::Yellow, PuyoColor::Yellow),
        Kumipuyo::new(PuyoColor::Yellow, PuyoColor::Green),
        Kumipuyo::new(PuyoColor::Green, PuyoColor::Green),
    ];

    pub const fn new(axis: PuyoColor, child: PuyoColor) -> Self {
        Self { axis, child }
    }

    /// Both cells share a color, so half the rotations are redundant.
    #[inline(always)]
    pub fn is_rep(&self) -> bool {
        self.axis == self.child
    }
}

impl std::fmt::Display for Kumipuyo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.axis.to_char(), self.child.to_char())
    }
}

/// Known upcoming pieces, nearest first.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KumipuyoSeq {
    seq: Vec<Kumipuyo>,
}

impl KumipuyoSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_kumipuyos(seq: Vec<Kumipuyo>) -> Self {
        Self { seq }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Kumipuyo> {
        self.seq.get(index)
    }

    pub fn push(&mut self, kumipuyo: Kumipuyo) {
        self.seq.push(kumipuyo);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Kumipuyo> {
        self.seq.iter()
    }

    /// Drop the nearest piece, as after it has been placed.
    pub fn advance(&mut self) {
        if !self.seq.is_empty() {
            self.seq.remove(0);
        }
    }
}

/// `"RRBG"` reads as two pieces: RR then BG.
impl FromStr for KumipuyoSeq {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() % 2 != 0 {
            return Err(ParseError::OddSequence(chars.len()));
        }
        let mut seq = Vec::with_capacity(chars.len() / 2);
        for pair in chars.chunks(2) {
            let axis = PuyoColor::from_char(pair[0])?;
            let child = PuyoColor::from_char(pair[1])?;
            for (c, ch) in [(axis, pair[0]), (child, pair[1])] {
                if !c.is_normal() {
                    return Err(ParseError::NotPieceColor(ch));
                }
            }
            seq.push(Kumipuyo::new(axis, child));
        }
        Ok(Self { seq })
    }
}

impl std::fmt::Display for KumipuyoSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for k in &self.seq {
            write!(f, "{}", k)?;
        }
        Ok(())
    }
}
