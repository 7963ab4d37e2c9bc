//! puyo-engine - piece movement, reachability and plan enumeration.

pub mod movegen;
pub mod movement;
pub mod plan;

pub use movegen::{generate_placements, is_reachable, Placement, ReachableSet, SPAWN_POSE};
pub use movement::{can_place, landing_pose, try_drop, try_move, try_quick_turn, try_rotate, Pose};
pub use plan::{collect_plans, collect_plans_parallel, iterate_available_plans, Plan, RefPlan};
