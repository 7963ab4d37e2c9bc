//! Exhaustive key-puyo enumeration over columns.

use std::ops::ControlFlow;

use tracing::trace;

use crate::strategy::{ColumnMask, RensaDetectorStrategy};
use puyo_core::{ColumnPuyoList, Field, FIELD_HEIGHT, FIELD_WIDTH, NORMAL_COLORS};

struct Complement<'a, F> {
    field: &'a Field,
    ceiling: usize,
    prohibits: ColumnMask,
    per_column: usize,
    callback: F,
}

impl<F> Complement<'_, F>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    fn column(
        &mut self,
        x: usize,
        columns_left: usize,
        puyos_left: usize,
        list: &mut ColumnPuyoList,
    ) -> ControlFlow<()> {
        if x > FIELD_WIDTH {
            return self.finish(list);
        }
        self.column(x + 1, columns_left, puyos_left, list)?;
        if columns_left == 0 || self.prohibits.contains(x) {
            return ControlFlow::Continue(());
        }

        let room = self.ceiling.saturating_sub(self.field.height(x));
        let most = self.per_column.min(puyos_left).min(room);
        for c in NORMAL_COLORS {
            for n in 1..=most {
                let mark = list.len();
                if !list.add_n(x, c, n) {
                    break;
                }
                let flow = self.column(x + 1, columns_left - 1, puyos_left - n, list);
                list.truncate(mark);
                flow?;
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(&mut self, list: &ColumnPuyoList) -> ControlFlow<()> {
        let mut complemented = self.field.clone();
        if !complemented.drop_puyo_list(list) {
            return ControlFlow::Continue(());
        }
        // A key puyo that already fires is a trigger, not a key.
        let fires = (1..=FIELD_WIDTH).any(|x| {
            list.size_on(x) > 0
                && complemented.count_connected_puyos_max4(x, complemented.height(x)) >= 4
        });
        if fires {
            return ControlFlow::Continue(());
        }
        (self.callback)(&complemented, list)
    }
}

/// Every way to stack key puyos on at most `max_columns` columns, one color
/// and up to `max_puyos_per_column` puyos per column, that does not set off
/// a chain by itself. The empty addition is always reported first.
pub fn complement_key_puyos<F>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    max_columns: usize,
    max_puyos_per_column: usize,
    callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    complement_key_puyos_with_limit(
        field,
        strategy,
        prohibits,
        max_columns,
        max_puyos_per_column,
        usize::MAX,
        callback,
    )
}

/// Like `complement_key_puyos`, with a cap on the total number of puyos.
pub(crate) fn complement_key_puyos_with_limit<F>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    prohibits: ColumnMask,
    max_columns: usize,
    max_puyos_per_column: usize,
    max_puyos: usize,
    callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let mut complement = Complement {
        field,
        ceiling: strategy.ceiling(),
        prohibits,
        per_column: max_puyos_per_column,
        callback,
    };
    complement.column(1, max_columns, max_puyos, &mut ColumnPuyoList::new())
}

/// Fills the hidden 13th row of every allowed column whose visible part is
/// exactly full, with nothing or one of the four colors each. With no such
/// column the callback still runs once, with an empty list.
pub fn complement_key_puyos_on_13th_row<F>(
    field: &Field,
    allowed: ColumnMask,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let columns: Vec<usize> = allowed
        .columns()
        .filter(|&x| field.height(x) == FIELD_HEIGHT)
        .collect();
    trace!(columns = columns.len(), "13th row complement");
    thirteenth_row(field, &columns, &mut ColumnPuyoList::new(), &mut callback)
}

fn thirteenth_row<F>(
    field: &Field,
    columns: &[usize],
    list: &mut ColumnPuyoList,
    callback: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &ColumnPuyoList) -> ControlFlow<()>,
{
    let Some((&x, rest)) = columns.split_first() else {
        let mut complemented = field.clone();
        if !complemented.drop_puyo_list(list) {
            return ControlFlow::Continue(());
        }
        return callback(&complemented, &*list);
    };

    thirteenth_row(field, rest, list, callback)?;
    for c in NORMAL_COLORS {
        list.add(x, c);
        let flow = thirteenth_row(field, rest, list, callback);
        list.pop();
        flow?;
    }
    ControlFlow::Continue(())
}
