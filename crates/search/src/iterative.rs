//! Layered detection: fire candidates composed on top of the chains they
//! extend.
//!
//! A level runs the base generator on the field left after the previous
//! level's chain. Column drops always land on top, so the new puyos can be
//! applied to the untouched input field together with everything added so
//! far.

use std::ops::ControlFlow;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::detector::detect;
use crate::strategy::{ColumnMask, DetectionPurpose, RensaDetectorStrategy};
use puyo_core::{ColumnPuyoList, Field, RensaResult, RensaTrackResult};

struct IterativeDetection<'a, F> {
    original: &'a Field,
    strategy: &'a RensaDetectorStrategy,
    seen: FxHashSet<u64>,
    callback: F,
}

impl<F> IterativeDetection<'_, F>
where
    F: FnMut(Field, &ColumnPuyoList) -> ControlFlow<(), RensaResult>,
{
    fn level(
        &mut self,
        current: &Field,
        accumulated: &ColumnPuyoList,
        previous_chains: usize,
        rest: usize,
    ) -> ControlFlow<()> {
        let mut candidates = Vec::new();
        let _ = detect(
            current,
            self.strategy,
            ColumnMask::empty(),
            DetectionPurpose::Fire,
            |_, list| {
                candidates.push(list.clone());
                ControlFlow::Continue(())
            },
        );

        for list in candidates {
            let mut combined = accumulated.clone();
            if !combined.merge(&list) {
                continue;
            }
            let mut composed = self.original.clone();
            if !composed.drop_puyo_list(&combined) {
                continue;
            }
            if !self.seen.insert(composed.zobrist_hash()) {
                continue;
            }

            let keep = (rest > 1).then(|| composed.clone());
            let result = (self.callback)(composed, &combined)?;
            trace!(depth = rest, list = %combined, chains = result.chains, "composed");

            if let Some(mut after) = keep {
                if result.chains > previous_chains {
                    after.simulate();
                    self.level(&after, &combined, result.chains, rest - 1)?;
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Composes fire candidates up to `max_iteration` levels deep. `callback`
/// receives each composed field, unsimulated, with the full list of added
/// puyos, and must report the chain that field produces. A level is
/// extended only when its chain is longer than the one below it.
pub fn detect_iteratively<F>(
    field: &Field,
    strategy: &RensaDetectorStrategy,
    max_iteration: usize,
    callback: F,
) -> ControlFlow<()>
where
    F: FnMut(Field, &ColumnPuyoList) -> ControlFlow<(), RensaResult>,
{
    if max_iteration == 0 {
        return ControlFlow::Continue(());
    }
    let mut detection = IterativeDetection {
        original: field,
        strategy,
        seen: FxHashSet::default(),
        callback,
    };
    let flow = detection.level(field, &ColumnPuyoList::new(), 0, max_iteration);
    debug!(
        max_iteration,
        composed = detection.seen.len(),
        stopped = flow.is_break(),
        "iterative detection finished"
    );
    flow
}

/// Simulates every composed field from `detect_iteratively`, tracking which
/// chain step erased each cell. `callback` sees the field after the chain.
pub fn iterate_possible_rensas_iteratively<F>(
    field: &Field,
    max_iteration: usize,
    strategy: &RensaDetectorStrategy,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&Field, &RensaResult, &ColumnPuyoList, &RensaTrackResult) -> ControlFlow<()>,
{
    detect_iteratively(field, strategy, max_iteration, |mut composed, list| {
        let mut tracker = RensaTrackResult::new();
        let result = composed.simulate_with_tracker(&mut tracker);
        callback(&composed, &result, list, &tracker)?;
        ControlFlow::Continue(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_zero_iterations_report_nothing() {
        let f: Field = "...RRR".parse().expect("valid field");
        let strategy = RensaDetectorStrategy::default_drop_strategy();
        let mut calls = 0;
        let _ = detect_iteratively(&f, &strategy, 0, |mut composed, _| {
            calls += 1;
            ControlFlow::Continue(composed.simulate())
        });
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_single_level_matches_fire_detection() {
        let f: Field = "...RRR".parse().expect("valid field");
        let strategy = RensaDetectorStrategy::default_drop_strategy();
        let mut lists = Vec::new();
        let _ = detect_iteratively(&f, &strategy, 1, |mut composed, list| {
            lists.push(list.to_string());
            ControlFlow::Continue(composed.simulate())
        });
        lists.sort();
        assert_eq!(lists, vec!["(3,R)", "(4,R)", "(5,R)", "(6,R)"]);
    }

    #[test]
    fn test_break_from_callback_stops() {
        let f: Field = "...RRR".parse().expect("valid field");
        let strategy = RensaDetectorStrategy::default_drop_strategy();
        let mut calls = 0;
        let flow = iterate_possible_rensas_iteratively(&f, 3, &strategy, |_, _, _, _| {
            calls += 1;
            ControlFlow::Break(())
        });
        assert!(flow.is_break());
        assert_eq!(calls, 1);
    }

    #[test]
    #[traced_test]
    fn test_logs_summary() {
        let f: Field = "...RRR".parse().expect("valid field");
        let strategy = RensaDetectorStrategy::default_drop_strategy();
        let _ = detect_iteratively(&f, &strategy, 2, |mut composed, _| {
            ControlFlow::Continue(composed.simulate())
        });
        assert!(logs_contain("iterative detection finished"));
    }
}
