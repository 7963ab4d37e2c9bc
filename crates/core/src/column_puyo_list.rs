//! Hypothetical column-wise additions to a field.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::color::PuyoColor;
use crate::error::ParseError;
use crate::field::{FIELD_HEIGHT_WITH_STAGING, FIELD_WIDTH};

/// One puyo dropped on top of column `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnPuyo {
    pub x: usize,
    pub color: PuyoColor,
}

impl ColumnPuyo {
    pub const fn new(x: usize, color: PuyoColor) -> Self {
        Self { x, color }
    }
}

/// Ordered list of column drops. Equality is order-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ColumnPuyoList {
    puyos: SmallVec<[ColumnPuyo; 16]>,
}

impl ColumnPuyoList {
    /// Every playable cell, counting both staging rows.
    pub const MAX_SIZE: usize = FIELD_WIDTH * FIELD_HEIGHT_WITH_STAGING;

    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.puyos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.puyos.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnPuyo> {
        self.puyos.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnPuyo> {
        self.puyos.get(index)
    }

    /// Returns false when full or when `x` is not a playable column.
    pub fn add(&mut self, x: usize, color: PuyoColor) -> bool {
        if !(1..=FIELD_WIDTH).contains(&x) || self.puyos.len() >= Self::MAX_SIZE {
            return false;
        }
        self.puyos.push(ColumnPuyo::new(x, color));
        true
    }

    /// Adds `n` copies, or nothing at all if they would not fit.
    pub fn add_n(&mut self, x: usize, color: PuyoColor, n: usize) -> bool {
        if !(1..=FIELD_WIDTH).contains(&x) || self.puyos.len() + n > Self::MAX_SIZE {
            return false;
        }
        for _ in 0..n {
            self.puyos.push(ColumnPuyo::new(x, color));
        }
        true
    }

    /// Appends all of `other`, or nothing at all if it would not fit.
    pub fn merge(&mut self, other: &ColumnPuyoList) -> bool {
        if self.puyos.len() + other.len() > Self::MAX_SIZE {
            return false;
        }
        self.puyos.extend_from_slice(&other.puyos);
        true
    }

    pub fn truncate(&mut self, len: usize) {
        self.puyos.truncate(len);
    }

    pub fn pop(&mut self) -> Option<ColumnPuyo> {
        self.puyos.pop()
    }

    pub fn clear(&mut self) {
        self.puyos.clear();
    }

    /// Number of entries that land on column `x`.
    pub fn size_on(&self, x: usize) -> usize {
        self.puyos.iter().filter(|p| p.x == x).count()
    }

    /// Color multiset, ignoring where the puyos go.
    pub fn to_puyo_set(&self) -> PuyoSet {
        let mut set = PuyoSet::default();
        for p in &self.puyos {
            set.add(p.color);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ColumnPuyoList {
    type Item = &'a ColumnPuyo;
    type IntoIter = std::slice::Iter<'a, ColumnPuyo>;

    fn into_iter(self) -> Self::IntoIter {
        self.puyos.iter()
    }
}

/// `(x,C)` per entry, e.g. `(1,R)(3,B)`.
impl std::fmt::Display for ColumnPuyoList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for p in &self.puyos {
            write!(f, "({},{})", p.x, p.color.to_char())?;
        }
        Ok(())
    }
}

impl FromStr for ColumnPuyoList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = ColumnPuyoList::new();
        let mut rest = s.trim();
        while !rest.is_empty() {
            let end = rest
                .find(')')
                .ok_or_else(|| ParseError::MalformedColumnPuyo(rest.to_string()))?;
            let entry = &rest[..=end];
            let body = entry
                .strip_prefix('(')
                .and_then(|e| e.strip_suffix(')'))
                .ok_or_else(|| ParseError::MalformedColumnPuyo(entry.to_string()))?;
            let (x, c) = body
                .split_once(',')
                .ok_or_else(|| ParseError::MalformedColumnPuyo(entry.to_string()))?;
            let x: usize = x
                .trim()
                .parse()
                .map_err(|_| ParseError::MalformedColumnPuyo(entry.to_string()))?;
            let mut chars = c.trim().chars();
            let color = match (chars.next(), chars.next()) {
                (Some(ch), None) => PuyoColor::from_char(ch)?,
                _ => return Err(ParseError::MalformedColumnPuyo(entry.to_string())),
            };
            if !(1..=FIELD_WIDTH).contains(&x) {
                return Err(ParseError::ColumnOutOfRange(x));
            }
            if !list.add(x, color) {
                return Err(ParseError::ListOverflow(Self::MAX_SIZE));
            }
            rest = rest[end + 1..].trim_start();
        }
        Ok(list)
    }
}

/// Count of each normal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PuyoSet {
    pub red: usize,
    pub blue: usize,
    pub yellow: usize,
    pub green: usize,
}

impl PuyoSet {
    pub fn add(&mut self, color: PuyoColor) {
        self.add_n(color, 1);
    }

    /// Non-normal colors are ignored.
    pub fn add_n(&mut self, color: PuyoColor, n: usize) {
        match color {
            PuyoColor::Red => self.red += n,
            PuyoColor::Blue => self.blue += n,
            PuyoColor::Yellow => self.yellow += n,
            PuyoColor::Green => self.green += n,
            _ => {}
        }
    }

    pub fn count(&self, color: PuyoColor) -> usize {
        match color {
            PuyoColor::Red => self.red,
            PuyoColor::Blue => self.blue,
            PuyoColor::Yellow => self.yellow,
            PuyoColor::Green => self.green,
            _ => 0,
        }
    }

    pub fn size(&self) -> usize {
        self.red + self.blue + self.yellow + self.green
    }
}
