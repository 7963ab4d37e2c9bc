//! Chains a field could fire: detector candidates, simulated.

use std::ops::ControlFlow;

use tracing::debug;

use crate::complement::complement_key_puyos_with_limit;
use crate::detector::detect;
use crate::info::{FeasibleRensaInfo, PossibleRensaInfo, TrackedPossibleRensaInfo};
use crate::iterative::iterate_possible_rensas_iteratively;
use crate::strategy::{ColumnMask, DetectionPurpose, RensaDetectorStrategy};
use puyo_core::{
    ColumnPuyoList, Field, KumipuyoSeq, PuyoColor, RensaResult, FIELD_HEIGHT, FIELD_WIDTH,
};
use puyo_engine::iterate_available_plans;

/// Runs fire detection after every key-puyo complement of at most
/// `max_key_puyos` puyos, and simulates each candidate. `callback` gets the
/// field after the chain, its result, and the key puyos followed by the
/// firing puyos.
pub fn iterate_possible_rensas<F>(
    field: &Field,
    max_key_puyos: usize,
    strategy: &RensaDetectorStrategy,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &RensaResult, &ColumnPuyoList) -> ControlFlow<()>,
{
    let mut found = 0usize;
    let flow = complement_key_puyos_with_limit(
        field,
        strategy,
        ColumnMask::empty(),
        max_key_puyos,
        max_key_puyos,
        max_key_puyos,
        |keyed, keys| {
            fire_and_report(keyed, keys, strategy, ColumnMask::empty(), &mut |after, result, list| {
                found += 1;
                callback(after, result, list)
            })
        },
    );
    debug!(max_key_puyos, found, "possible rensa iteration finished");
    flow
}

/// Looks for chains started from a side column: for every column, one or
/// two more of a color already in it are stacked on top as keys, then the
/// trigger is searched everywhere except that column.
pub fn iterate_side_chain<F>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &RensaResult, &ColumnPuyoList) -> ControlFlow<()>,
{
    let ceiling = strategy.ceiling();
    for x in 1..=FIELD_WIDTH {
        let mut colors: Vec<PuyoColor> = (1..=field.height(x).min(FIELD_HEIGHT))
            .map(|y| field.color(x, y))
            .filter(|c| c.is_normal())
            .collect();
        colors.sort();
        colors.dedup();

        for c in colors {
            let mut keyed = field.clone();
            let mut keys = ColumnPuyoList::new();
            for _ in 0..2 {
                if keyed.height(x) >= ceiling || !keyed.drop_puyo_on(x, c) {
                    break;
                }
                keys.add(x, c);
                if keyed.count_connected_puyos_max4(x, keyed.height(x)) >= 4 {
                    break;
                }
                fire_and_report(&keyed, &keys, strategy, ColumnMask::only(x), &mut callback)?;
            }
        }
    }
    ControlFlow::Continue(())
}

fn fire_and_report<F>(
    keyed: &Field,
    keys: &ColumnPuyoList,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    callback: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &RensaResult, &ColumnPuyoList) -> ControlFlow<()>,
{
    detect(keyed, strategy, prohibits, DetectionPurpose::Fire, |fired, trigger| {
        let mut list = keys.clone();
        if !list.merge(trigger) {
            return ControlFlow::Continue(());
        }
        let mut after = fired.clone();
        let result = after.simulate();
        if result.chains == 0 {
            return ControlFlow::Continue(());
        }
        callback(&after, &result, &list)
    })
}

/// Every chain a single fire candidate starts.
pub fn find_possible_rensas(
    field: &Field,
    strategy: &RensaDetectorStrategy,
) -> Vec<PossibleRensaInfo> {
    find_possible_rensas_with_key_puyos(field, 0, strategy)
}

pub fn find_possible_rensas_with_key_puyos(
    field: &Field,
    max_key_puyos: usize,
    strategy: &RensaDetectorStrategy,
) -> Vec<PossibleRensaInfo> {
    let mut infos = Vec::new();
    let _ = iterate_possible_rensas(field, max_key_puyos, strategy, |_, result, list| {
        infos.push(PossibleRensaInfo::new(*result, list.clone()));
        ControlFlow::Continue(())
    });
    infos
}

/// Chains found by layered detection, with per-cell erase tracking.
pub fn find_tracked_possible_rensas(
    field: &Field,
    max_iteration: usize,
    strategy: &RensaDetectorStrategy,
) -> Vec<TrackedPossibleRensaInfo> {
    let mut infos = Vec::new();
    let _ = iterate_possible_rensas_iteratively(
        field,
        max_iteration,
        strategy,
        |_, result, list, track| {
            infos.push(TrackedPossibleRensaInfo::new(*result, list.clone(), track.clone()));
            ControlFlow::Continue(())
        },
    );
    infos
}

/// Chains the known pieces can fire within `max_depth` placements.
pub fn find_feasible_rensas(
    field: &Field,
    seq: &KumipuyoSeq,
    max_depth: usize,
) -> Vec<FeasibleRensaInfo> {
    let mut infos = Vec::new();
    let _ = iterate_available_plans(field, seq, max_depth, |plan| {
        if plan.is_rensa_plan() {
            infos.push(FeasibleRensaInfo::new(
                *plan.rensa_result(),
                plan.frames_to_initiate() + plan.last_drop_frames(),
            ));
        }
        ControlFlow::Continue(())
    });
    infos
}
