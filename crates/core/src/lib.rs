//! puyo-core - field model and value types for the puyo AI.

mod color;
mod column_puyo_list;
mod decision;
mod error;
mod field;
mod kumipuyo;
mod rensa_result;
pub mod score;

pub use color::{PuyoColor, NORMAL_COLORS};
pub use column_puyo_list::{ColumnPuyo, ColumnPuyoList, PuyoSet};
pub use decision::{decisions_for, Decision, DECISIONS};
pub use error::ParseError;
pub use field::{
    Field, FIELD_HEIGHT, FIELD_HEIGHT_WITH_STAGING, FIELD_WIDTH, MAP_HEIGHT, MAP_WIDTH, NECK_X,
    NECK_Y, SPAWN_X,
};
pub use kumipuyo::{Kumipuyo, KumipuyoSeq};
pub use rensa_result::{RensaResult, RensaTrackResult};
