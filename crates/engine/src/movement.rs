//! Shift and rotation of a falling piece, with kick application.

use puyo_core::{Field, FIELD_WIDTH};

/// Pose of a falling piece: axis cell position plus rotation
/// (0 child up, 1 child right, 2 child down, 3 child left).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pose {
    pub x: i8,
    pub y: i8,
    pub r: u8,
}

const CHILD_OFFSET: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

impl Pose {
    pub const fn new(x: i8, y: i8, r: u8) -> Self {
        Self { x, y, r }
    }

    #[inline(always)]
    pub const fn child(self) -> (i8, i8) {
        let (dx, dy) = CHILD_OFFSET[(self.r & 3) as usize];
        (self.x + dx, self.y + dy)
    }
}

#[inline(always)]
fn free(field: &Field, x: i8, y: i8) -> bool {
    x >= 1 && y >= 1 && field.is_empty(x as usize, y as usize)
}

/// Both cells of the pose sit on empty cells.
#[inline]
pub fn can_place(field: &Field, pose: Pose) -> bool {
    let (cx, cy) = pose.child();
    free(field, pose.x, pose.y) && free(field, cx, cy)
}

/// Shift one column. Returns None if either destination cell is occupied.
pub fn try_move(field: &Field, pose: Pose, dx: i8) -> Option<Pose> {
    let moved = Pose::new(pose.x + dx, pose.y, pose.r);
    if moved.x < 1 || moved.x > FIELD_WIDTH as i8 {
        return None;
    }
    can_place(field, moved).then_some(moved)
}

/// Soft drop one row.
pub fn try_drop(field: &Field, pose: Pose) -> Option<Pose> {
    let dropped = Pose::new(pose.x, pose.y - 1, pose.r);
    can_place(field, dropped).then_some(dropped)
}

/// Rests the piece on whatever is below it.
pub fn landing_pose(field: &Field, pose: Pose) -> Pose {
    let mut current = pose;
    while let Some(next) = try_drop(field, current) {
        current = next;
    }
    current
}

/// Rotate a quarter turn. When the direct rotation is blocked, try the
/// kick for that transition: a horizontal push off a wall or stack when
/// the child swings sideways, a lift when it swings under the axis. A
/// sideways turn with both sides blocked falls back to a half turn
/// (axis and child swap), as the double-press quick turn does.
pub fn try_rotate(field: &Field, pose: Pose, clockwise: bool) -> Option<Pose> {
    let to = if clockwise { (pose.r + 1) & 3 } else { (pose.r + 3) & 3 };
    let direct = Pose::new(pose.x, pose.y, to);
    if can_place(field, direct) {
        return Some(direct);
    }

    match to {
        1 | 3 => {
            // Child swings right (1) or left (3): push the axis the other way.
            let push = if to == 1 { -1 } else { 1 };
            let kicked = Pose::new(pose.x + push, pose.y, to);
            if can_place(field, kicked) {
                return Some(kicked);
            }
            try_quick_turn(field, pose)
        }
        2 => {
            let lifted = Pose::new(pose.x, pose.y + 1, to);
            can_place(field, lifted).then_some(lifted)
        }
        _ => None,
    }
}

/// Half turn in place: the axis takes the child's cell and vice versa.
/// Only vertical poses can do this.
pub fn try_quick_turn(field: &Field, pose: Pose) -> Option<Pose> {
    let turned = match pose.r {
        0 => Pose::new(pose.x, pose.y + 1, 2),
        2 => Pose::new(pose.x, pose.y - 1, 0),
        _ => return None,
    };
    can_place(field, turned).then_some(turned)
}
