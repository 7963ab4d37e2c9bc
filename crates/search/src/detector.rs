//! Single-step candidate generators.
//!
//! Every generator works on private copies of the input field and hands the
//! callback a complemented field that has not been simulated yet. The
//! dispatcher drops candidates whose field it has already reported.

use std::ops::ControlFlow;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::strategy::{ColumnMask, DetectionMode, DetectionPurpose, RensaDetectorStrategy};
use puyo_core::{ColumnPuyoList, Field, PuyoColor, FIELD_HEIGHT, FIELD_WIDTH, NORMAL_COLORS};

/// Runs the generator selected by `strategy.mode` over `field`, skipping
/// columns in `prohibits`. Each distinct complemented field reaches
/// `callback` once, with the list of puyos that produced it.
pub fn detect<F>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    purpose: DetectionPurpose,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let mut seen = FxHashSet::default();
    let mut emit = |complemented: &Field, list: &ColumnPuyoList| {
        if !seen.insert(complemented.zobrist_hash()) {
            return ControlFlow::Continue(());
        }
        trace!(mode = ?strategy.mode, list = %list, "candidate");
        callback(complemented, list)
    };

    match strategy.mode {
        DetectionMode::Drop => detect_by_drop(field, strategy, prohibits, purpose, &mut emit),
        DetectionMode::Float => detect_by_float(field, strategy, prohibits, purpose, &mut emit),
        DetectionMode::Extend => {
            let mut extender = Extender {
                ceiling: strategy.ceiling(),
                prohibits,
                purpose,
                emit: &mut emit,
            };
            extender.run(field, strategy.max_complement_puyos)
        }
    }
}

/// Stacks 1..=max puyos of one color on a column and stops at the first
/// count that fires.
fn detect_by_drop<E>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    purpose: DetectionPurpose,
    emit: &mut E,
) -> ControlFlow<()>
where
    E: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let ceiling = strategy.ceiling();
    for x in 1..=FIELD_WIDTH {
        if prohibits.contains(x) {
            continue;
        }
        for c in NORMAL_COLORS {
            let mut complemented = field.clone();
            let mut list = ColumnPuyoList::new();
            for _ in 0..strategy.max_complement_puyos {
                if complemented.height(x) >= ceiling || !complemented.drop_puyo_on(x, c) {
                    break;
                }
                list.add(x, c);
                if complemented.count_connected_puyos_max4(x, complemented.height(x)) >= 4 {
                    emit(&complemented, &list)?;
                    break;
                }
                if purpose == DetectionPurpose::Key {
                    emit(&complemented, &list)?;
                }
            }
        }
    }
    ControlFlow::Continue(())
}

/// Places a vertical run of one color in the column beside an existing
/// puyo, topped at that puyo's row. Whatever the run leaves open below it
/// is filled with garbage, when the strategy allows that at all.
fn detect_by_float<E>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    purpose: DetectionPurpose,
    emit: &mut E,
) -> ControlFlow<()>
where
    E: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let ceiling = strategy.ceiling();
    for x in 1..=FIELD_WIDTH {
        for y in 1..=field.height(x).min(ceiling) {
            let c = field.color(x, y);
            if !c.is_normal() {
                continue;
            }
            for nx in [x - 1, x + 1] {
                if !(1..=FIELD_WIDTH).contains(&nx) || prohibits.contains(nx) {
                    continue;
                }
                let h = field.height(nx);
                if h >= y {
                    continue;
                }
                for k in 1..=strategy.max_complement_puyos.min(y - h) {
                    let gap = y - k - h;
                    if gap > 0 && !strategy.allows_garbage {
                        continue;
                    }
                    let mut list = ColumnPuyoList::new();
                    if !list.add_n(nx, PuyoColor::Garbage, gap) || !list.add_n(nx, c, k) {
                        break;
                    }
                    let mut complemented = field.clone();
                    if !complemented.drop_puyo_list(&list) {
                        break;
                    }
                    if complemented.count_connected_puyos_max4(nx, y) >= 4 {
                        emit(&complemented, &list)?;
                        break;
                    }
                    if purpose == DetectionPurpose::Key {
                        emit(&complemented, &list)?;
                    }
                }
            }
        }
    }
    ControlFlow::Continue(())
}

/// Grows each group of one to three puyos one adjacent cell at a time. A
/// cell above its column's top costs the puyos needed to fill up to it.
struct Extender<'a, E> {
    ceiling: usize,
    prohibits: ColumnMask,
    purpose: DetectionPurpose,
    emit: &'a mut E,
}

impl<E> Extender<'_, E>
where
    E: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    fn run(&mut self, field: &Field, budget: usize) -> ControlFlow<()> {
        let mut visited = [[false; FIELD_HEIGHT + 1]; FIELD_WIDTH + 1];
        let mut list = ColumnPuyoList::new();
        for x in 1..=FIELD_WIDTH {
            for y in 1..=field.height(x).min(FIELD_HEIGHT) {
                let c = field.color(x, y);
                if visited[x][y] || !c.is_normal() {
                    continue;
                }
                let group = field.connected_positions(x, y);
                for &(gx, gy) in &group {
                    visited[gx][gy] = true;
                }
                if group.len() >= 4 {
                    continue;
                }
                self.grow(field, &group, c, budget, &mut list)?;
            }
        }
        ControlFlow::Continue(())
    }

    fn grow(
        &mut self,
        field: &Field,
        group: &[(usize, usize)],
        c: PuyoColor,
        budget: usize,
        list: &mut ColumnPuyoList,
    ) -> ControlFlow<()> {
        let mut targets: Vec<(usize, usize)> = Vec::new();
        for &(gx, gy) in group {
            for (nx, ny) in [(gx - 1, gy), (gx + 1, gy), (gx, gy + 1), (gx, gy - 1)] {
                if !(1..=FIELD_WIDTH).contains(&nx)
                    || ny == 0
                    || ny > self.ceiling
                    || self.prohibits.contains(nx)
                    || !field.is_empty(nx, ny)
                    || targets.contains(&(nx, ny))
                {
                    continue;
                }
                targets.push((nx, ny));
            }
        }

        for (nx, ny) in targets {
            // cells under a floating puyo cannot be filled by dropping
            let cost = match ny.checked_sub(field.height(nx)) {
                Some(cost) if cost > 0 => cost,
                _ => continue,
            };
            let mark = list.len();
            if cost > budget || !list.add_n(nx, c, cost) {
                continue;
            }
            let mut grown = field.clone();
            for _ in 0..cost {
                grown.drop_puyo_on(nx, c);
            }
            let members = grown.connected_positions(nx, ny);
            if members.len() >= 4 {
                (self.emit)(&grown, &*list)?;
            } else {
                if self.purpose == DetectionPurpose::Key {
                    (self.emit)(&grown, &*list)?;
                }
                self.grow(&grown, &members, c, budget - cost, list)?;
            }
            list.truncate(mark);
        }
        ControlFlow::Continue(())
    }
}
