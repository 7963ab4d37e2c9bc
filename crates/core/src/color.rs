//! Cell colors and their single-character text form.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Contents of one field cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PuyoColor {
    #[default]
    Empty = 0,
    Wall = 1,
    Garbage = 2,
    Red = 4,
    Blue = 5,
    Yellow = 6,
    Green = 7,
}

/// Colors that can form vanishing groups, in palette order.
pub const NORMAL_COLORS: [PuyoColor; 4] = [
    PuyoColor::Red,
    PuyoColor::Blue,
    PuyoColor::Yellow,
    PuyoColor::Green,
];

impl PuyoColor {
    pub const COUNT: usize = 8;

    #[inline(always)]
    pub const fn is_normal(self) -> bool {
        (self as u8) >= 4
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn to_char(self) -> char {
        match self {
            PuyoColor::Empty => '.',
            PuyoColor::Wall => '#',
            PuyoColor::Garbage => 'O',
            PuyoColor::Red => 'R',
            PuyoColor::Blue => 'B',
            PuyoColor::Yellow => 'Y',
            PuyoColor::Green => 'G',
        }
    }

    /// Parse one field character. Space and `.` both mean an empty cell.
    pub fn from_char(c: char) -> Result<Self, ParseError> {
        match c {
            ' ' | '.' => Ok(PuyoColor::Empty),
            '#' => Ok(PuyoColor::Wall),
            'O' | 'o' => Ok(PuyoColor::Garbage),
            'R' | 'r' => Ok(PuyoColor::Red),
            'B' | 'b' => Ok(PuyoColor::Blue),
            'Y' | 'y' => Ok(PuyoColor::Yellow),
            'G' | 'g' => Ok(PuyoColor::Green),
            _ => Err(ParseError::InvalidChar(c)),
        }
    }
}

impl std::fmt::Display for PuyoColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
