//! Reachable placements for a single falling piece.

use std::collections::VecDeque;

use crate::movement::{can_place, landing_pose, try_drop, try_move, try_rotate, Pose};
use puyo_core::{Decision, Field, FIELD_HEIGHT, FIELD_WIDTH, MAP_HEIGHT, NECK_Y, SPAWN_X};

/// Spawn pose: axis at (3, 12), child above it.
pub const SPAWN_POSE: Pose = Pose::new(SPAWN_X as i8, NECK_Y as i8, 0);

/// A reachable resting placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    pub decision: Decision,
    /// Row the axis cell rests on before any split.
    pub landing_row: usize,
}

/// Set of reachable decisions, one bit per (rotation, column).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReachableSet(u32);

impl ReachableSet {
    #[inline(always)]
    fn bit(x: usize, r: usize) -> u32 {
        1 << (r * 8 + x)
    }

    #[inline]
    pub fn insert(&mut self, decision: Decision) {
        self.0 |= Self::bit(decision.x(), decision.r());
    }

    #[inline]
    pub fn contains(&self, decision: Decision) -> bool {
        decision.is_valid() && self.0 & Self::bit(decision.x(), decision.r()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Reachable decisions for `field`, with a shortcut when every column
    /// is low enough that nothing can block the piece.
    pub fn of(field: &Field) -> Self {
        if (1..=FIELD_WIDTH).all(|x| field.height(x) < FIELD_HEIGHT) {
            let mut set = ReachableSet::default();
            for d in puyo_core::DECISIONS {
                set.insert(d);
            }
            return set;
        }
        let mut set = ReachableSet::default();
        for p in generate_placements(field) {
            set.insert(p.decision);
        }
        set
    }
}

/// BFS over shift, rotation and soft drop from the spawn pose, keyed by the
/// full (column, row, rotation) state so a piece can slip under floating
/// puyos. Each (column, rotation) rests from the highest row it was reached
/// at. Returns placements sorted by decision.
pub fn generate_placements(field: &Field) -> Vec<Placement> {
    let mut placements = Vec::new();
    if !can_place(field, SPAWN_POSE) {
        return placements;
    }

    // best_row[r][x]: highest row this (x, r) has been visited at, 0 = never
    let mut best_row = [[0i8; FIELD_WIDTH + 2]; 4];
    let mut visited: Visited = [[[false; MAP_HEIGHT]; FIELD_WIDTH + 2]; 4];
    let mut queue = VecDeque::new();
    visit_state(&mut visited, &mut best_row, &mut queue, SPAWN_POSE);

    while let Some(pose) = queue.pop_front() {
        let successors = [
            try_move(field, pose, -1),
            try_move(field, pose, 1),
            try_rotate(field, pose, true),
            try_rotate(field, pose, false),
            try_drop(field, pose),
        ];
        for next in successors.into_iter().flatten() {
            visit_state(&mut visited, &mut best_row, &mut queue, next);
        }
    }

    for (r, rows) in best_row.iter().enumerate() {
        for (x, &y) in rows.iter().enumerate() {
            if y == 0 {
                continue;
            }
            let rest = landing_pose(field, Pose::new(x as i8, y, r as u8));
            placements.push(Placement {
                decision: Decision::new(x, r),
                landing_row: rest.y as usize,
            });
        }
    }

    placements.sort();
    placements.dedup();
    placements
}

type Visited = [[[bool; MAP_HEIGHT]; FIELD_WIDTH + 2]; 4];

fn visit_state(
    visited: &mut Visited,
    best_row: &mut [[i8; FIELD_WIDTH + 2]; 4],
    queue: &mut VecDeque<Pose>,
    pose: Pose,
) {
    let (x, y, r) = (pose.x as usize, pose.y as usize, pose.r as usize);
    if visited[r][x][y] {
        return;
    }
    visited[r][x][y] = true;
    let best = &mut best_row[r][x];
    *best = (*best).max(pose.y);
    queue.push_back(pose);
}

/// Whether the piece can be brought to `decision` from the spawn pose.
pub fn is_reachable(field: &Field, decision: Decision) -> bool {
    if !decision.is_valid() {
        return false;
    }
    let lo = SPAWN_X.min(decision.axis_x()).min(decision.child_x());
    let hi = SPAWN_X.max(decision.axis_x()).max(decision.child_x());
    if (lo..=hi).all(|x| field.height(x) < FIELD_HEIGHT) {
        return true;
    }
    generate_placements(field)
        .iter()
        .any(|p| p.decision == decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puyo_core::{PuyoColor, DECISIONS};

    fn wall_column(field: &mut Field, x: usize, height: usize) {
        for _ in 0..height {
            field.drop_puyo_on(x, PuyoColor::Garbage);
        }
    }

    #[test]
    fn test_empty_field_reaches_every_decision() {
        let f = Field::new();
        let placements = generate_placements(&f);
        assert_eq!(placements.len(), 22);
        for d in DECISIONS {
            assert!(is_reachable(&f, d));
            assert!(placements.iter().any(|p| p.decision == d));
        }
        let p = placements
            .iter()
            .find(|p| p.decision == Decision::new(4, 2))
            .expect("reachable");
        assert_eq!(p.landing_row, 2);
    }

    #[test]
    fn test_blocked_spawn_reaches_nothing() {
        let mut f = Field::new();
        wall_column(&mut f, 3, 12);
        assert!(generate_placements(&f).is_empty());
        assert!(ReachableSet::of(&f).is_empty());
        assert!(!is_reachable(&f, Decision::new(3, 0)));
    }

    #[test]
    fn test_tall_column_blocks_the_far_side() {
        let mut f = Field::new();
        wall_column(&mut f, 2, 12);
        assert!(!is_reachable(&f, Decision::new(1, 0)));
        assert!(!is_reachable(&f, Decision::new(1, 1)));
        assert!(is_reachable(&f, Decision::new(6, 0)));
        assert!(!is_reachable(&f, Decision::new(3, 3)));

        let set = ReachableSet::of(&f);
        assert!(!set.contains(Decision::new(1, 2)));
        assert!(set.contains(Decision::new(4, 1)));
    }

    #[test]
    fn test_climb_over_twelve_row_column() {
        // column 3 at 11 lets the axis lift to row 13, which clears column 4
        let mut f = Field::new();
        wall_column(&mut f, 3, 11);
        wall_column(&mut f, 4, 12);
        assert!(is_reachable(&f, Decision::new(3, 0)));
        assert!(is_reachable(&f, Decision::new(5, 0)));

        // a thirteen-row column cannot be climbed
        f.drop_puyo_on(4, PuyoColor::Garbage);
        assert!(is_reachable(&f, Decision::new(2, 0)));
        assert!(!is_reachable(&f, Decision::new(5, 0)));
        assert!(!is_reachable(&f, Decision::new(6, 2)));
    }

    #[test]
    fn test_soft_drop_slips_under_floating_puyos() {
        // column 4 is blocked from row 5 up but open underneath
        let mut f = Field::new();
        for y in 5..=13 {
            f.set_color(4, y, PuyoColor::Garbage);
        }
        assert_eq!(f.height(4), 13);
        let placements = generate_placements(&f);
        for d in [Decision::new(4, 0), Decision::new(5, 0), Decision::new(6, 2)] {
            assert!(is_reachable(&f, d), "decision {}", d);
        }
        let p = placements
            .iter()
            .find(|p| p.decision == Decision::new(5, 0))
            .expect("reachable");
        assert_eq!(p.landing_row, 1);
    }

    #[test]
    fn test_reachable_set_matches_bfs() {
        let mut f = Field::new();
        wall_column(&mut f, 5, 12);
        wall_column(&mut f, 1, 7);
        let set = ReachableSet::of(&f);
        let placements = generate_placements(&f);
        assert_eq!(set.len(), placements.len());
        for d in DECISIONS {
            assert_eq!(set.contains(d), is_reachable(&f, d), "decision {}", d);
        }
    }
}
