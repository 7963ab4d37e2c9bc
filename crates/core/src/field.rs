//! Field representation - column-major grid with a sentinel wall border.
//! Column 0 and 7 are walls, row 0 is the floor, row 15 the ceiling, so
//! neighbor lookups from any playable cell stay in bounds.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::color::PuyoColor;
use crate::column_puyo_list::ColumnPuyoList;
use crate::decision::Decision;
use crate::error::ParseError;
use crate::kumipuyo::Kumipuyo;
use crate::rensa_result::{RensaResult, RensaTrackResult};
use crate::score::{
    frames_to_drop, frames_to_drop_fast, long_bonus, step_score, FRAMES_GROUNDING,
    FRAMES_HORIZONTAL_MOVE, FRAMES_VANISH_ANIMATION,
};

pub const FIELD_WIDTH: usize = 6;
/// Visible rows. Only these take part in connectivity.
pub const FIELD_HEIGHT: usize = 12;
/// Visible rows plus the two hidden staging rows.
pub const FIELD_HEIGHT_WITH_STAGING: usize = 14;
pub const MAP_WIDTH: usize = FIELD_WIDTH + 2;
pub const MAP_HEIGHT: usize = FIELD_HEIGHT_WITH_STAGING + 2;

/// Cell whose occupation ends the game.
pub const NECK_X: usize = 3;
pub const NECK_Y: usize = 12;

/// Spawn column of a falling piece's axis cell.
pub const SPAWN_X: usize = 3;

type Mask = [[bool; MAP_HEIGHT]; MAP_WIDTH];
type Group = SmallVec<[(usize, usize); 96]>;

/// ZOBRIST_TABLE[x][y][color], from a fixed xorshift64 seed.
const ZOBRIST_TABLE: [[[u64; PuyoColor::COUNT]; MAP_HEIGHT]; MAP_WIDTH] = {
    let mut table = [[[0u64; PuyoColor::COUNT]; MAP_HEIGHT]; MAP_WIDTH];
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut x = 0;
    while x < MAP_WIDTH {
        let mut y = 0;
        while y < MAP_HEIGHT {
            let mut c = 0;
            while c < PuyoColor::COUNT {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                table[x][y][c] = state;
                c += 1;
            }
            y += 1;
        }
        x += 1;
    }
    table
};

/// 6x12 play field with two staging rows. Column heights are cached.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Field {
    cells: [[PuyoColor; MAP_HEIGHT]; MAP_WIDTH],
    heights: [u8; MAP_WIDTH],
}

impl Default for Field {
    fn default() -> Self {
        let mut cells = [[PuyoColor::Empty; MAP_HEIGHT]; MAP_WIDTH];
        for col in cells.iter_mut() {
            col[0] = PuyoColor::Wall;
            col[MAP_HEIGHT - 1] = PuyoColor::Wall;
        }
        cells[0] = [PuyoColor::Wall; MAP_HEIGHT];
        cells[MAP_WIDTH - 1] = [PuyoColor::Wall; MAP_HEIGHT];
        Self {
            cells,
            heights: [0; MAP_WIDTH],
        }
    }
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn is_playable(x: usize, y: usize) -> bool {
        (1..=FIELD_WIDTH).contains(&x) && (1..=FIELD_HEIGHT_WITH_STAGING).contains(&y)
    }

    /// Out-of-range coordinates read as wall.
    #[inline(always)]
    pub fn color(&self, x: usize, y: usize) -> PuyoColor {
        self.cells
            .get(x)
            .and_then(|col| col.get(y))
            .copied()
            .unwrap_or(PuyoColor::Wall)
    }

    #[inline(always)]
    pub fn is_color(&self, x: usize, y: usize, c: PuyoColor) -> bool {
        self.color(x, y) == c
    }

    #[inline(always)]
    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.is_color(x, y, PuyoColor::Empty)
    }

    /// Writes a playable cell; writes outside the playable area are ignored.
    /// Does not apply gravity.
    pub fn set_color(&mut self, x: usize, y: usize, c: PuyoColor) {
        if !Self::is_playable(x, y) {
            return;
        }
        self.cells[x][y] = c;
        self.recompute_height(x);
    }

    /// Row of the topmost puyo in column `x`, 0 for an empty column.
    #[inline(always)]
    pub fn height(&self, x: usize) -> usize {
        self.heights.get(x).map_or(0, |&h| h as usize)
    }

    #[inline]
    fn recompute_height(&mut self, x: usize) {
        let col = &self.cells[x];
        self.heights[x] = (1..=FIELD_HEIGHT_WITH_STAGING)
            .rev()
            .find(|&y| col[y] != PuyoColor::Empty)
            .unwrap_or(0) as u8;
    }

    fn recompute_heights(&mut self) {
        for x in 1..=FIELD_WIDTH {
            self.recompute_height(x);
        }
    }

    pub fn count_puyos(&self) -> usize {
        (1..=FIELD_WIDTH)
            .map(|x| {
                (1..=FIELD_HEIGHT_WITH_STAGING)
                    .filter(|&y| self.cells[x][y] != PuyoColor::Empty)
                    .count()
            })
            .sum()
    }

    pub fn count_color(&self, c: PuyoColor) -> usize {
        (1..=FIELD_WIDTH)
            .map(|x| {
                (1..=FIELD_HEIGHT_WITH_STAGING)
                    .filter(|&y| self.cells[x][y] == c)
                    .count()
            })
            .sum()
    }

    /// All clear. The top staging row does not count.
    pub fn is_zenkeshi(&self) -> bool {
        (1..=FIELD_WIDTH).all(|x| (1..FIELD_HEIGHT_WITH_STAGING).all(|y| self.cells[x][y] == PuyoColor::Empty))
    }

    pub fn is_connected_puyo(&self, x: usize, y: usize) -> bool {
        let c = self.color(x, y);
        self.color(x, y.wrapping_sub(1)) == c
            || self.color(x, y + 1) == c
            || self.color(x.wrapping_sub(1), y) == c
            || self.color(x + 1, y) == c
    }

    pub fn has_empty_neighbor(&self, x: usize, y: usize) -> bool {
        self.is_empty(x, y + 1)
            || self.is_empty(x, y.wrapping_sub(1))
            || self.is_empty(x + 1, y)
            || self.is_empty(x.wrapping_sub(1), y)
    }

    /// Size of the same-color group containing (x, y). Staging rows never connect.
    pub fn count_connected_puyos(&self, x: usize, y: usize) -> usize {
        self.count_connected_with_limit(x, y, usize::MAX)
    }

    /// Like `count_connected_puyos`, but may stop at any value >= 4.
    pub fn count_connected_puyos_max4(&self, x: usize, y: usize) -> usize {
        self.count_connected_with_limit(x, y, 4)
    }

    fn count_connected_with_limit(&self, x: usize, y: usize, limit: usize) -> usize {
        if !(1..=FIELD_WIDTH).contains(&x) || !(1..=FIELD_HEIGHT).contains(&y) {
            return 0;
        }
        let c = self.cells[x][y];
        if c == PuyoColor::Empty || c == PuyoColor::Wall {
            return 0;
        }

        let mut checked: Mask = [[false; MAP_HEIGHT]; MAP_WIDTH];
        let mut stack: Group = SmallVec::new();
        checked[x][y] = true;
        stack.push((x, y));
        let mut count = 0;
        while let Some((cx, cy)) = stack.pop() {
            count += 1;
            if count >= limit {
                return count;
            }
            for (nx, ny) in [(cx + 1, cy), (cx - 1, cy), (cx, cy + 1), (cx, cy - 1)] {
                if ny > FIELD_HEIGHT || checked[nx][ny] || self.cells[nx][ny] != c {
                    continue;
                }
                checked[nx][ny] = true;
                stack.push((nx, ny));
            }
        }
        count
    }

    /// Cells of the same-color group containing (x, y), visible rows only.
    pub fn connected_positions(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        if !(1..=FIELD_WIDTH).contains(&x) || !(1..=FIELD_HEIGHT).contains(&y) {
            return Vec::new();
        }
        let c = self.cells[x][y];
        if c == PuyoColor::Empty || c == PuyoColor::Wall {
            return Vec::new();
        }
        let mut checked: Mask = [[false; MAP_HEIGHT]; MAP_WIDTH];
        let mut group: Group = SmallVec::new();
        self.fill_same_color(x, y, c, &mut checked, &mut group);
        group.into_vec()
    }

    /// Collects the group of color `c` containing (x, y) into `group`.
    fn fill_same_color(&self, x: usize, y: usize, c: PuyoColor, checked: &mut Mask, group: &mut Group) {
        checked[x][y] = true;
        group.push((x, y));
        let mut head = 0;
        while head < group.len() {
            let (cx, cy) = group[head];
            head += 1;
            for (nx, ny) in [(cx + 1, cy), (cx - 1, cy), (cx, cy + 1), (cx, cy - 1)] {
                if ny > FIELD_HEIGHT || checked[nx][ny] || self.cells[nx][ny] != c {
                    continue;
                }
                checked[nx][ny] = true;
                group.push((nx, ny));
            }
        }
    }

    /// Compacts every column downward. The top staging row never moves.
    /// Returns the longest distance any puyo fell.
    pub fn drop(&mut self) -> usize {
        self.drop_tracked(None)
    }

    fn drop_tracked(&mut self, mut origin: Option<&mut [[u8; MAP_HEIGHT]; MAP_WIDTH]>) -> usize {
        let mut max_fall = 0;
        for x in 1..=FIELD_WIDTH {
            let mut write = 1;
            for y in 1..FIELD_HEIGHT_WITH_STAGING {
                let c = self.cells[x][y];
                if c == PuyoColor::Empty {
                    continue;
                }
                if y != write {
                    self.cells[x][write] = c;
                    self.cells[x][y] = PuyoColor::Empty;
                    if let Some(o) = origin.as_deref_mut() {
                        o[x][write] = o[x][y];
                        o[x][y] = 0;
                    }
                    max_fall = max_fall.max(y - write);
                }
                write += 1;
            }
            self.recompute_height(x);
        }
        max_fall
    }

    /// Removes every normal-color group of 4 or more, plus garbage touching
    /// them, and returns the step score (0 when nothing vanished).
    pub fn vanish(&mut self, current_chain: usize) -> usize {
        let mut erased: Mask = [[false; MAP_HEIGHT]; MAP_WIDTH];
        self.vanish_marking(current_chain, &mut erased)
    }

    fn vanish_marking(&mut self, current_chain: usize, erased: &mut Mask) -> usize {
        let mut checked: Mask = [[false; MAP_HEIGHT]; MAP_WIDTH];
        let mut group: Group = SmallVec::new();
        let mut num_erased = 0;
        let mut sum_long_bonus = 0;
        let mut color_bits = 0u8;

        for x in 1..=FIELD_WIDTH {
            for y in 1..=self.height(x).min(FIELD_HEIGHT) {
                let c = self.cells[x][y];
                if !c.is_normal() || checked[x][y] {
                    continue;
                }
                group.clear();
                self.fill_same_color(x, y, c, &mut checked, &mut group);
                if group.len() < 4 {
                    continue;
                }
                num_erased += group.len();
                sum_long_bonus += long_bonus(group.len());
                color_bits |= 1 << c.index();
                for &(gx, gy) in &group {
                    erased[gx][gy] = true;
                }
            }
        }

        if num_erased == 0 {
            return 0;
        }

        for x in 1..=FIELD_WIDTH {
            for y in 1..=FIELD_HEIGHT {
                if !erased[x][y] || !self.cells[x][y].is_normal() {
                    continue;
                }
                for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
                    if ny <= FIELD_HEIGHT && self.cells[nx][ny] == PuyoColor::Garbage {
                        erased[nx][ny] = true;
                    }
                }
            }
        }

        for x in 1..=FIELD_WIDTH {
            for y in 1..=FIELD_HEIGHT {
                if erased[x][y] {
                    self.cells[x][y] = PuyoColor::Empty;
                }
            }
            self.recompute_height(x);
        }

        step_score(current_chain, num_erased, color_bits.count_ones() as usize, sum_long_bonus)
    }

    /// Runs the whole cascade: drop, then vanish and drop until nothing vanishes.
    pub fn simulate(&mut self) -> RensaResult {
        self.simulate_internal(None)
    }

    /// Same as `simulate`, also recording when each starting cell vanished.
    pub fn simulate_with_tracker(&mut self, tracker: &mut RensaTrackResult) -> RensaResult {
        self.simulate_internal(Some(tracker))
    }

    fn simulate_internal(&mut self, mut tracker: Option<&mut RensaTrackResult>) -> RensaResult {
        let tracking = tracker.is_some();
        let mut origin = [[0u8; MAP_HEIGHT]; MAP_WIDTH];
        if tracking {
            for x in 1..=FIELD_WIDTH {
                for y in 1..=FIELD_HEIGHT_WITH_STAGING {
                    if self.cells[x][y] != PuyoColor::Empty {
                        origin[x][y] = y as u8;
                    }
                }
            }
        }

        self.drop_tracked(if tracking { Some(&mut origin) } else { None });

        let mut result = RensaResult::default();
        let mut chain = 1;
        loop {
            let mut erased: Mask = [[false; MAP_HEIGHT]; MAP_WIDTH];
            let score = self.vanish_marking(chain, &mut erased);
            if score == 0 {
                break;
            }

            if let Some(t) = tracker.as_deref_mut() {
                for x in 1..=FIELD_WIDTH {
                    for y in 1..=FIELD_HEIGHT {
                        if erased[x][y] && origin[x][y] != 0 {
                            t.set_erased_at(x, origin[x][y] as usize, chain);
                            origin[x][y] = 0;
                        }
                    }
                }
            }

            result.score += score;
            result.frames += FRAMES_VANISH_ANIMATION;
            let fall = self.drop_tracked(if tracking { Some(&mut origin) } else { None });
            if fall > 0 {
                result.frames += frames_to_drop(fall) + FRAMES_GROUNDING;
                result.quick = false;
            } else {
                result.quick = true;
            }
            chain += 1;
        }
        result.chains = chain - 1;
        result
    }

    #[inline]
    fn place(&mut self, x: usize, c: PuyoColor) {
        let y = self.heights[x] as usize + 1;
        self.cells[x][y] = c;
        self.heights[x] = y as u8;
    }

    /// Locks a piece per `decision`. Each cell falls onto its column; a
    /// horizontal piece over uneven columns splits. Fails, leaving the field
    /// untouched, when a cell would land above the top staging row.
    pub fn drop_kumipuyo(&mut self, decision: Decision, kumipuyo: &Kumipuyo) -> bool {
        if !decision.is_valid() {
            return false;
        }
        let x1 = decision.axis_x();
        let x2 = decision.child_x();
        match decision.r() {
            0 => {
                if self.height(x1) + 2 > FIELD_HEIGHT_WITH_STAGING {
                    return false;
                }
                self.place(x1, kumipuyo.axis);
                self.place(x1, kumipuyo.child);
            }
            2 => {
                if self.height(x1) + 2 > FIELD_HEIGHT_WITH_STAGING {
                    return false;
                }
                self.place(x1, kumipuyo.child);
                self.place(x1, kumipuyo.axis);
            }
            _ => {
                if self.height(x1) >= FIELD_HEIGHT_WITH_STAGING
                    || self.height(x2) >= FIELD_HEIGHT_WITH_STAGING
                {
                    return false;
                }
                self.place(x1, kumipuyo.axis);
                self.place(x2, kumipuyo.child);
            }
        }
        true
    }

    /// Removes the two cells placed by the matching `drop_kumipuyo`.
    /// Only meaningful when no vanish has happened since.
    pub fn undo_kumipuyo(&mut self, decision: Decision) {
        let x1 = decision.axis_x();
        let x2 = decision.child_x();
        if decision.is_vertical() {
            self.remove_top_puyo_from(x1);
            self.remove_top_puyo_from(x1);
        } else {
            self.remove_top_puyo_from(x1);
            self.remove_top_puyo_from(x2);
        }
    }

    /// Stacks one puyo on column `x`. Fails on a full or non-playable column.
    pub fn drop_puyo_on(&mut self, x: usize, c: PuyoColor) -> bool {
        if !(1..=FIELD_WIDTH).contains(&x) || self.height(x) >= FIELD_HEIGHT_WITH_STAGING {
            return false;
        }
        self.place(x, c);
        true
    }

    pub fn remove_top_puyo_from(&mut self, x: usize) -> Option<PuyoColor> {
        let h = self.height(x);
        if !(1..=FIELD_WIDTH).contains(&x) || h == 0 {
            return None;
        }
        let c = self.cells[x][h];
        self.cells[x][h] = PuyoColor::Empty;
        self.recompute_height(x);
        Some(c)
    }

    /// Applies every entry in order. Fails without touching the field when
    /// some column would overflow.
    pub fn drop_puyo_list(&mut self, list: &ColumnPuyoList) -> bool {
        for x in 1..=FIELD_WIDTH {
            if self.height(x) + list.size_on(x) > FIELD_HEIGHT_WITH_STAGING {
                return false;
            }
        }
        for p in list {
            self.place(p.x, p.color);
        }
        true
    }

    /// The two cells would come to rest at different heights.
    pub fn is_chigiri_decision(&self, decision: Decision) -> bool {
        !decision.is_vertical() && self.height(decision.axis_x()) != self.height(decision.child_x())
    }

    /// Frames from spawn until the piece placed by `decision` settles.
    pub fn frames_to_drop_next(&self, decision: Decision) -> usize {
        let x1 = decision.axis_x();
        let x2 = decision.child_x();
        let mut frames = FRAMES_HORIZONTAL_MOVE * x1.abs_diff(SPAWN_X);

        if decision.is_vertical() {
            // The lower cell starts at row 12 (child up) or 11 (child down).
            let start = if decision.r() == 0 { NECK_Y } else { NECK_Y - 1 };
            let fall = start.saturating_sub(self.height(x1) + 1);
            frames += frames_to_drop_fast(fall) + FRAMES_GROUNDING;
            return frames;
        }

        let h1 = self.height(x1);
        let h2 = self.height(x2);
        let fall = NECK_Y.saturating_sub(h1.max(h2) + 1);
        frames += frames_to_drop_fast(fall) + FRAMES_GROUNDING;
        if h1 != h2 {
            frames += frames_to_drop(h1.abs_diff(h2)) + FRAMES_GROUNDING;
        }
        frames
    }

    /// Cheap check, right after `drop_kumipuyo`, whether either new cell
    /// belongs to a vanishing group.
    pub fn rensa_will_occur_when_last_decision_is(&self, decision: Decision) -> bool {
        let x1 = decision.axis_x();
        if decision.is_vertical() {
            let h = self.height(x1);
            return self.count_connected_puyos_max4(x1, h) >= 4
                || self.count_connected_puyos_max4(x1, h.saturating_sub(1)) >= 4;
        }
        let x2 = decision.child_x();
        self.count_connected_puyos_max4(x1, self.height(x1)) >= 4
            || self.count_connected_puyos_max4(x2, self.height(x2)) >= 4
    }

    /// Any cell in the visible rows would vanish right now.
    pub fn rensa_will_occur(&self) -> bool {
        (1..=FIELD_WIDTH).any(|x| {
            (1..=self.height(x).min(FIELD_HEIGHT))
                .any(|y| self.cells[x][y].is_normal() && self.count_connected_puyos_max4(x, y) >= 4)
        })
    }

    /// Zobrist hash over every playable cell.
    pub fn zobrist_hash(&self) -> u64 {
        let mut hash = 0u64;
        for x in 1..=FIELD_WIDTH {
            for y in 1..=self.height(x) {
                let c = self.cells[x][y];
                if c != PuyoColor::Empty {
                    hash ^= ZOBRIST_TABLE[x][y][c.index()];
                }
            }
        }
        hash
    }
}

/// Rows are listed top to bottom, six cells each; the last row is row 1.
/// Newlines are ignored, so `".RGYG.RGYGB."` and two lines are equivalent.
impl FromStr for Field {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|&c| c != '\n' && c != '\r').collect();
        if chars.len() % FIELD_WIDTH != 0 {
            return Err(ParseError::RaggedField(chars.len()));
        }
        let rows = chars.len() / FIELD_WIDTH;
        if rows > FIELD_HEIGHT_WITH_STAGING {
            return Err(ParseError::TooTall(rows));
        }

        let mut field = Field::new();
        for (i, row) in chars.chunks(FIELD_WIDTH).rev().enumerate() {
            for (j, &ch) in row.iter().enumerate() {
                let c = PuyoColor::from_char(ch)?;
                if c == PuyoColor::Wall {
                    return Err(ParseError::InvalidChar(ch));
                }
                field.cells[j + 1][i + 1] = c;
            }
        }
        field.recompute_heights();
        Ok(field)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let top = (1..=FIELD_WIDTH).map(|x| self.height(x)).max().unwrap_or(0);
        for y in (1..=top).rev() {
            for x in 1..=FIELD_WIDTH {
                write!(f, "{}", self.cells[x][y].to_char())?;
            }
            if y > 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Field {{")?;
        writeln!(f, "{}", self)?;
        write!(f, "}}")
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(s: &str) -> Field {
        s.parse().expect("valid field")
    }

    #[test]
    fn test_parse_bottom_row_is_row_one() {
        let f = field("R.....\n..BY..");
        assert_eq!(f.color(1, 2), PuyoColor::Red);
        assert_eq!(f.color(3, 1), PuyoColor::Blue);
        assert_eq!(f.color(4, 1), PuyoColor::Yellow);
        assert_eq!(f.height(1), 2);
        assert_eq!(f.height(3), 1);
        assert_eq!(f.height(2), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("RRR".parse::<Field>(), Err(ParseError::RaggedField(3)));
        assert_eq!("RRRRRX".parse::<Field>(), Err(ParseError::InvalidChar('X')));
        assert_eq!(
            "......".repeat(15).parse::<Field>(),
            Err(ParseError::TooTall(15))
        );
    }

    #[test]
    fn test_out_of_range_is_wall() {
        let f = Field::new();
        assert_eq!(f.color(0, 1), PuyoColor::Wall);
        assert_eq!(f.color(7, 1), PuyoColor::Wall);
        assert_eq!(f.color(3, 0), PuyoColor::Wall);
        assert_eq!(f.color(3, 15), PuyoColor::Wall);
        assert_eq!(f.color(100, 100), PuyoColor::Wall);
        assert!(f.is_empty(3, 14));
    }

    #[test]
    fn test_display_round_trip() {
        let text = "..B...\nOOR...\nRRGGYY";
        let f = field(text);
        assert_eq!(f.to_string(), text);
        assert_eq!(Field::new().to_string(), "");
    }

    #[test]
    fn test_count_connected() {
        let f = field(
            "RR....\
             RBBB..\
             RRRGGG",
        );
        assert_eq!(f.count_connected_puyos(1, 1), 6);
        assert_eq!(f.count_connected_puyos(2, 2), 3);
        assert_eq!(f.count_connected_puyos(4, 1), 3);
        assert!(f.count_connected_puyos_max4(1, 1) >= 4);
        assert_eq!(f.count_connected_puyos_max4(2, 2), 3);
        assert_eq!(f.count_connected_puyos(5, 3), 0);

        let mut group = f.connected_positions(2, 2);
        group.sort();
        assert_eq!(group, vec![(2, 2), (3, 2), (4, 2)]);
        assert!(f.connected_positions(6, 3).is_empty());
    }

    #[test]
    fn test_staging_rows_do_not_connect() {
        let mut f = Field::new();
        for y in 1..=11 {
            f.set_color(1, y, if y % 2 == 0 { PuyoColor::Blue } else { PuyoColor::Green });
        }
        f.set_color(1, 12, PuyoColor::Red);
        f.set_color(1, 13, PuyoColor::Red);
        f.set_color(2, 12, PuyoColor::Red);
        f.set_color(2, 13, PuyoColor::Red);
        f.set_color(2, 11, PuyoColor::Blue);
        assert_eq!(f.count_connected_puyos(1, 12), 2);
        assert_eq!(f.count_connected_puyos(1, 13), 0);
    }

    #[test]
    fn test_group_spanning_whole_field() {
        let mut f = Field::new();
        for x in 1..=FIELD_WIDTH {
            for _ in 0..FIELD_HEIGHT {
                f.drop_puyo_on(x, PuyoColor::Red);
            }
        }
        assert_eq!(f.count_connected_puyos(3, 5), FIELD_WIDTH * FIELD_HEIGHT);
        assert_eq!(f.count_connected_puyos_max4(3, 5), 4);
        assert_eq!(f.connected_positions(1, 1).len(), FIELD_WIDTH * FIELD_HEIGHT);

        let mut after = f.clone();
        let result = after.simulate();
        assert_eq!(result.chains, 1);
        assert!(after.is_zenkeshi());
    }

    #[test]
    fn test_drop_compacts_and_reports_fall() {
        let mut f = Field::new();
        f.set_color(2, 5, PuyoColor::Red);
        f.set_color(2, 2, PuyoColor::Blue);
        assert_eq!(f.drop(), 3);
        assert_eq!(f.color(2, 1), PuyoColor::Blue);
        assert_eq!(f.color(2, 2), PuyoColor::Red);
        assert_eq!(f.height(2), 2);
    }

    #[test]
    fn test_drop_keeps_top_staging_row() {
        let mut f = Field::new();
        f.set_color(4, 14, PuyoColor::Yellow);
        f.set_color(4, 13, PuyoColor::Red);
        f.drop();
        assert_eq!(f.color(4, 1), PuyoColor::Red);
        assert_eq!(f.color(4, 14), PuyoColor::Yellow);
    }

    #[test]
    fn test_vanish_removes_adjacent_garbage() {
        let mut f = field(
            "O.....\
             RRRRO.\
             OOOOOO",
        );
        let score = f.vanish(1);
        assert_eq!(score, 40);
        assert!(f.is_empty(1, 3));
        assert!(f.is_empty(5, 2));
        assert_eq!(f.count_color(PuyoColor::Garbage), 2);
        assert!(f.is_empty(1, 1) && f.is_empty(4, 1));
        assert_eq!(f.color(5, 1), PuyoColor::Garbage);
    }

    #[test]
    fn test_simulate_two_chain() {
        let mut f = field(
            "B.....\
             RBBB..\
             RRRRGG",
        );
        let result = f.simulate();
        assert_eq!(result.chains, 2);
        // five reds with a group bonus of 2, then four blues at chain bonus 8
        assert_eq!(result.score, 100 + 320);
        assert_eq!(f.to_string(), "....GG");
        assert!(result.frames > 2 * FRAMES_VANISH_ANIMATION);
    }

    #[test]
    fn test_simulate_no_chain_only_compacts() {
        let mut f = Field::new();
        f.set_color(1, 3, PuyoColor::Red);
        f.set_color(2, 1, PuyoColor::Blue);
        let result = f.simulate();
        assert_eq!(result, RensaResult::default());
        assert_eq!(f.to_string(), "RB....");
    }

    #[test]
    fn test_simulate_with_tracker() {
        let mut f = field(
            "B.....\
             RBBB..\
             RRRRGG",
        );
        let mut tracker = RensaTrackResult::new();
        let result = f.simulate_with_tracker(&mut tracker);
        assert_eq!(result.chains, 2);
        assert_eq!(tracker.erased_at(1, 1), 1);
        assert_eq!(tracker.erased_at(1, 2), 1);
        assert_eq!(tracker.erased_at(1, 3), 2);
        assert_eq!(tracker.erased_at(2, 2), 2);
        assert_eq!(tracker.erased_at(5, 1), 0);
        assert_eq!(tracker.count_erased_in(1), 5);
        assert_eq!(tracker.count_erased_in(2), 4);
    }

    #[test]
    fn test_drop_kumipuyo_each_rotation() {
        let k = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);

        let mut f = Field::new();
        assert!(f.drop_kumipuyo(Decision::new(3, 0), &k));
        assert_eq!(f.color(3, 1), PuyoColor::Red);
        assert_eq!(f.color(3, 2), PuyoColor::Blue);

        let mut f = Field::new();
        assert!(f.drop_kumipuyo(Decision::new(3, 2), &k));
        assert_eq!(f.color(3, 1), PuyoColor::Blue);
        assert_eq!(f.color(3, 2), PuyoColor::Red);

        let mut f = Field::new();
        assert!(f.drop_kumipuyo(Decision::new(3, 1), &k));
        assert_eq!(f.color(3, 1), PuyoColor::Red);
        assert_eq!(f.color(4, 1), PuyoColor::Blue);

        let mut f = Field::new();
        assert!(f.drop_kumipuyo(Decision::new(3, 3), &k));
        assert_eq!(f.color(2, 1), PuyoColor::Blue);
    }

    #[test]
    fn test_drop_kumipuyo_split() {
        let mut f = field("..O...\n..O...");
        let k = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);
        let d = Decision::new(3, 1);
        assert!(f.is_chigiri_decision(d));
        assert!(f.drop_kumipuyo(d, &k));
        assert_eq!(f.color(3, 3), PuyoColor::Red);
        assert_eq!(f.color(4, 1), PuyoColor::Blue);
    }

    #[test]
    fn test_drop_kumipuyo_full_column_leaves_field_untouched() {
        let mut f = Field::new();
        for _ in 0..13 {
            assert!(f.drop_puyo_on(2, PuyoColor::Garbage));
        }
        let before = f.clone();
        let k = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);
        assert!(!f.drop_kumipuyo(Decision::new(2, 0), &k));
        assert_eq!(f, before);
        assert!(f.drop_puyo_on(2, PuyoColor::Garbage));
        assert!(!f.drop_kumipuyo(Decision::new(1, 1), &k));
        assert!(!f.drop_kumipuyo(Decision::new(3, 3), &k));
        assert_eq!(f.height(1), 0);
        assert_eq!(f.height(3), 0);
    }

    #[test]
    fn test_undo_kumipuyo() {
        let original = field("..RB..\nYGRBOO");
        let k = Kumipuyo::new(PuyoColor::Green, PuyoColor::Yellow);
        for d in crate::decision::DECISIONS {
            let mut f = original.clone();
            assert!(f.drop_kumipuyo(d, &k));
            f.undo_kumipuyo(d);
            assert_eq!(f, original, "decision {}", d);
        }
    }

    #[test]
    fn test_drop_puyo_list() {
        let mut f = field("...RRR");
        let list: ColumnPuyoList = "(3,R)(3,B)(1,G)".parse().expect("valid list");
        assert!(f.drop_puyo_list(&list));
        assert_eq!(f.to_string(), "..B...\nG.RRRR");

        let mut tall = Field::new();
        for _ in 0..13 {
            tall.drop_puyo_on(1, PuyoColor::Garbage);
        }
        let before = tall.clone();
        let list: ColumnPuyoList = "(2,R)(1,R)(1,R)".parse().expect("valid list");
        assert!(!tall.drop_puyo_list(&list));
        assert_eq!(tall, before);
    }

    #[test]
    fn test_rensa_will_occur_when_last_decision_is() {
        let mut f = field("RRR...");
        let k = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);
        let d = Decision::new(4, 1);
        assert!(f.drop_kumipuyo(d, &k));
        assert!(f.rensa_will_occur_when_last_decision_is(d));
        assert!(f.rensa_will_occur());

        let mut f = field("RRR...");
        let d = Decision::new(5, 1);
        assert!(f.drop_kumipuyo(d, &k));
        assert!(!f.rensa_will_occur_when_last_decision_is(d));
        assert!(!f.rensa_will_occur());
    }

    #[test]
    fn test_frames_to_drop_next() {
        let f = Field::new();
        let straight = f.frames_to_drop_next(Decision::new(3, 0));
        let moved = f.frames_to_drop_next(Decision::new(6, 0));
        assert_eq!(moved, straight + 3 * FRAMES_HORIZONTAL_MOVE);

        let uneven = field("..O...\n..O...");
        assert_eq!(
            uneven.frames_to_drop_next(Decision::new(3, 1)),
            frames_to_drop_fast(9) + FRAMES_GROUNDING + frames_to_drop(2) + FRAMES_GROUNDING
        );
    }

    #[test]
    fn test_zenkeshi() {
        let mut f = Field::new();
        assert!(f.is_zenkeshi());
        f.set_color(6, 14, PuyoColor::Red);
        assert!(f.is_zenkeshi());
        f.set_color(6, 13, PuyoColor::Red);
        assert!(!f.is_zenkeshi());
    }

    #[test]
    fn test_zobrist_hash() {
        let a = field("..RB..");
        let b = field("..BR..");
        assert_ne!(a.zobrist_hash(), b.zobrist_hash());
        assert_eq!(a.zobrist_hash(), a.clone().zobrist_hash());
        assert_eq!(Field::new().zobrist_hash(), 0);
    }

    #[test]
    fn test_serde_as_text() {
        let f = field("..RB..\nOOGY..");
        let json = serde_json::to_string(&f).expect("serialize");
        assert_eq!(json, "\"..RB..\\nOOGY..\"");
        let back: Field = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, f);
    }
}
