//! Chain detection: hypothetical puyo additions that start or extend a
//! chain, layered detection, and key-puyo complements.

mod complement;
mod detector;
mod info;
mod iterative;
mod possible;
mod strategy;

pub use complement::{complement_key_puyos, complement_key_puyos_on_13th_row};
pub use detector::detect;
pub use info::{FeasibleRensaInfo, PossibleRensaInfo, TrackedPossibleRensaInfo};
pub use iterative::{detect_iteratively, iterate_possible_rensas_iteratively};
pub use possible::{
    find_feasible_rensas, find_possible_rensas, find_possible_rensas_with_key_puyos,
    find_tracked_possible_rensas, iterate_possible_rensas, iterate_side_chain,
};
pub use strategy::{ColumnMask, DetectionMode, DetectionPurpose, RensaDetectorStrategy};
