//! Depth-bounded enumeration of placement sequences.
//!
//! The search keeps one working field per node and undoes each placement
//! after exploring it. A placement that sets off a chain cannot be undone,
//! so the working field is recopied from the parent before the next sibling.

use std::ops::ControlFlow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::movegen::ReachableSet;
use puyo_core::{
    decisions_for, Decision, Field, Kumipuyo, KumipuyoSeq, RensaResult, NECK_X, NECK_Y,
};

/// A terminal branch of the search, owning its field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    field: Field,
    decisions: Vec<Decision>,
    rensa_result: RensaResult,
    num_chigiri: usize,
    frames_to_initiate: usize,
    last_drop_frames: usize,
}

/// Borrowed view of a plan, valid for one callback invocation.
#[derive(Clone, Copy, Debug)]
pub struct RefPlan<'a> {
    field: &'a Field,
    decisions: &'a [Decision],
    rensa_result: RensaResult,
    num_chigiri: usize,
    frames_to_initiate: usize,
    last_drop_frames: usize,
}

fn decision_text(decisions: &[Decision]) -> String {
    decisions
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

impl Plan {
    pub fn new(
        field: Field,
        decisions: Vec<Decision>,
        rensa_result: RensaResult,
        num_chigiri: usize,
        frames_to_initiate: usize,
        last_drop_frames: usize,
    ) -> Self {
        Self {
            field,
            decisions,
            rensa_result,
            num_chigiri,
            frames_to_initiate,
            last_drop_frames,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn first_decision(&self) -> Option<Decision> {
        self.decisions.first().copied()
    }

    pub fn rensa_result(&self) -> &RensaResult {
        &self.rensa_result
    }

    pub fn chains(&self) -> usize {
        self.rensa_result.chains
    }

    pub fn score(&self) -> usize {
        self.rensa_result.score
    }

    pub fn num_chigiri(&self) -> usize {
        self.num_chigiri
    }

    /// Frames spent placing every piece before the last one.
    pub fn frames_to_initiate(&self) -> usize {
        self.frames_to_initiate
    }

    pub fn last_drop_frames(&self) -> usize {
        self.last_drop_frames
    }

    /// Placement frames plus the chain's own frames.
    pub fn total_frames(&self) -> usize {
        self.frames_to_initiate + self.last_drop_frames + self.rensa_result.frames
    }

    pub fn is_rensa_plan(&self) -> bool {
        self.rensa_result.chains > 0
    }

    /// Decisions as `(x,r)` joined with `-`.
    pub fn decision_text(&self) -> String {
        decision_text(&self.decisions)
    }
}

impl<'a> RefPlan<'a> {
    pub fn new(
        field: &'a Field,
        decisions: &'a [Decision],
        rensa_result: RensaResult,
        num_chigiri: usize,
        frames_to_initiate: usize,
        last_drop_frames: usize,
    ) -> Self {
        Self {
            field,
            decisions,
            rensa_result,
            num_chigiri,
            frames_to_initiate,
            last_drop_frames,
        }
    }

    pub fn field(&self) -> &'a Field {
        self.field
    }

    pub fn decisions(&self) -> &'a [Decision] {
        self.decisions
    }

    pub fn first_decision(&self) -> Option<Decision> {
        self.decisions.first().copied()
    }

    pub fn rensa_result(&self) -> &RensaResult {
        &self.rensa_result
    }

    pub fn chains(&self) -> usize {
        self.rensa_result.chains
    }

    pub fn score(&self) -> usize {
        self.rensa_result.score
    }

    pub fn num_chigiri(&self) -> usize {
        self.num_chigiri
    }

    pub fn frames_to_initiate(&self) -> usize {
        self.frames_to_initiate
    }

    pub fn last_drop_frames(&self) -> usize {
        self.last_drop_frames
    }

    pub fn total_frames(&self) -> usize {
        self.frames_to_initiate + self.last_drop_frames + self.rensa_result.frames
    }

    pub fn is_rensa_plan(&self) -> bool {
        self.rensa_result.chains > 0
    }

    pub fn decision_text(&self) -> String {
        decision_text(self.decisions)
    }

    pub fn to_plan(&self) -> Plan {
        Plan::new(
            self.field.clone(),
            self.decisions.to_vec(),
            self.rensa_result,
            self.num_chigiri,
            self.frames_to_initiate,
            self.last_drop_frames,
        )
    }
}

/// Piece kinds to try at `depth`: the known piece, or every kind.
fn kinds_at(seq: &KumipuyoSeq, depth: usize) -> &[Kumipuyo] {
    match seq.get(depth) {
        Some(k) => std::slice::from_ref(k),
        None => &Kumipuyo::ALL_KINDS,
    }
}

struct PlanSearch<'s, F> {
    seq: &'s KumipuyoSeq,
    max_depth: usize,
    decisions: Vec<Decision>,
    callback: F,
}

impl<'s, F> PlanSearch<'s, F>
where
    F: FnMut(&RefPlan<'_>) -> ControlFlow<()>,
{
    fn new(seq: &'s KumipuyoSeq, max_depth: usize, callback: F) -> Self {
        Self {
            seq,
            max_depth,
            decisions: Vec::with_capacity(max_depth),
            callback,
        }
    }

    fn node(
        &mut self,
        field: &Field,
        depth: usize,
        num_chigiri: usize,
        total_frames: usize,
    ) -> ControlFlow<()> {
        let reachable = ReachableSet::of(field);
        let mut next = field.clone();
        let mut needs_refresh = false;

        let seq = self.seq;
        for kumipuyo in kinds_at(seq, depth) {
            for &decision in decisions_for(kumipuyo) {
                if !reachable.contains(decision) {
                    continue;
                }
                if needs_refresh {
                    next.clone_from(field);
                }
                needs_refresh =
                    self.child(&mut next, kumipuyo, decision, depth, num_chigiri, total_frames)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Places one piece on `next` and explores below it. Yields whether a
    /// chain fired, in which case `next` no longer matches its parent.
    fn child(
        &mut self,
        next: &mut Field,
        kumipuyo: &Kumipuyo,
        decision: Decision,
        depth: usize,
        num_chigiri: usize,
        total_frames: usize,
    ) -> ControlFlow<(), bool> {
        let is_chigiri = next.is_chigiri_decision(decision);
        let drop_frames = next.frames_to_drop_next(decision);
        if !next.drop_kumipuyo(decision, kumipuyo) {
            return ControlFlow::Continue(false);
        }

        let rensa_result = if next.rensa_will_occur_when_last_decision_is(decision) {
            next.simulate()
        } else {
            RensaResult::default()
        };
        let fired = rensa_result.chains > 0;

        if !next.is_empty(NECK_X, NECK_Y) {
            if !fired {
                next.undo_kumipuyo(decision);
            }
            return ControlFlow::Continue(fired);
        }

        self.decisions.push(decision);
        let num_chigiri = num_chigiri + usize::from(is_chigiri);
        let flow = if depth + 1 == self.max_depth || fired {
            (self.callback)(&RefPlan::new(
                next,
                &self.decisions,
                rensa_result,
                num_chigiri,
                total_frames,
                drop_frames,
            ))
        } else {
            self.node(next, depth + 1, num_chigiri, total_frames + drop_frames)
        };
        self.decisions.pop();

        if !fired {
            next.undo_kumipuyo(decision);
        }
        flow?;
        ControlFlow::Continue(fired)
    }
}

/// Enumerates every legal decision sequence up to `max_depth` pieces.
/// Positions past the end of `seq` try all ten piece kinds. A branch ends
/// at `max_depth` or at the first placement that starts a chain; each end
/// is handed to `callback`, which may break to stop the whole search.
pub fn iterate_available_plans<F>(
    field: &Field,
    seq: &KumipuyoSeq,
    max_depth: usize,
    mut callback: F,
) -> ControlFlow<()>
where
    F: FnMut(&RefPlan<'_>) -> ControlFlow<()>,
{
    if max_depth == 0 {
        return ControlFlow::Continue(());
    }

    let mut emitted = 0usize;
    let mut search = PlanSearch::new(seq, max_depth, |plan: &RefPlan<'_>| {
        emitted += 1;
        trace!(decisions = %plan.decision_text(), chains = plan.chains(), "plan");
        callback(plan)
    });
    let flow = search.node(field, 0, 0, 0);
    drop(search);

    debug!(
        max_depth,
        known_pieces = seq.len(),
        emitted,
        stopped = flow.is_break(),
        "plan enumeration finished"
    );
    flow
}

/// Collects every plan `iterate_available_plans` would emit.
pub fn collect_plans(field: &Field, seq: &KumipuyoSeq, max_depth: usize) -> Vec<Plan> {
    let mut plans = Vec::new();
    let _ = iterate_available_plans(field, seq, max_depth, |plan| {
        plans.push(plan.to_plan());
        ControlFlow::Continue(())
    });
    plans
}

/// Same plans in the same order as `collect_plans`, with first-level
/// placements split across the rayon pool. Each worker owns its own field.
pub fn collect_plans_parallel(field: &Field, seq: &KumipuyoSeq, max_depth: usize) -> Vec<Plan> {
    if max_depth == 0 {
        return Vec::new();
    }

    let reachable = ReachableSet::of(field);
    let roots: Vec<(Kumipuyo, Decision)> = kinds_at(seq, 0)
        .iter()
        .flat_map(|k| {
            decisions_for(k)
                .iter()
                .filter(|&&d| reachable.contains(d))
                .map(move |&d| (*k, d))
        })
        .collect();

    let plans: Vec<Plan> = roots
        .par_iter()
        .map(|(kumipuyo, decision)| {
            let mut plans = Vec::new();
            let mut local_field = field.clone();
            let mut search = PlanSearch::new(seq, max_depth, |plan: &RefPlan<'_>| {
                plans.push(plan.to_plan());
                ControlFlow::Continue(())
            });
            let _ = search.child(&mut local_field, kumipuyo, *decision, 0, 0, 0);
            drop(search);
            plans
        })
        .flatten()
        .collect();

    debug!(max_depth, roots = roots.len(), plans = plans.len(), "parallel plan collection finished");
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use puyo_core::PuyoColor;

    fn field(s: &str) -> Field {
        s.parse().expect("valid field")
    }

    fn seq(s: &str) -> KumipuyoSeq {
        s.parse().expect("valid sequence")
    }

    #[test]
    fn test_depth_one_on_empty_field() {
        let f = Field::new();
        let plans = collect_plans(&f, &seq("RB"), 1);
        assert_eq!(plans.len(), 22);
        let rep = collect_plans(&f, &seq("RR"), 1);
        assert_eq!(rep.len(), 11);
        assert!(plans.iter().all(|p| p.decisions().len() == 1 && !p.is_rensa_plan()));
    }

    #[test]
    fn test_unknown_pieces_expand_all_kinds() {
        let f = Field::new();
        let plans = collect_plans(&f, &KumipuyoSeq::new(), 1);
        // 4 same-color kinds x 11 + 6 mixed kinds x 22
        assert_eq!(plans.len(), 4 * 11 + 6 * 22);
    }

    #[test]
    fn test_depth_two_counts() {
        let f = Field::new();
        let plans = collect_plans(&f, &seq("RBYG"), 2);
        assert_eq!(plans.len(), 22 * 22);
        assert!(plans.iter().all(|p| p.decisions().len() == 2));
    }

    #[test]
    fn test_chain_ends_branch_early() {
        let f = field("RRR...");
        let plans = collect_plans(&f, &seq("RBYG"), 2);
        let fired: Vec<&Plan> = plans.iter().filter(|p| p.is_rensa_plan()).collect();
        assert!(!fired.is_empty());
        for p in &fired {
            assert_eq!(p.decisions().len(), 1);
            assert_eq!(p.chains(), 1);
        }
        let p = fired
            .iter()
            .find(|p| p.first_decision() == Some(Decision::new(4, 0)))
            .expect("placing red next to the reds fires");
        assert_eq!(p.field().count_color(PuyoColor::Red), 0);
        // the blue child falls into the gap
        assert_eq!(p.field().color(4, 1), PuyoColor::Blue);
    }

    #[test]
    fn test_siblings_after_chain_see_original_field() {
        let f = field("RRR...");
        let mut seen = Vec::new();
        let _ = iterate_available_plans(&f, &seq("RB"), 1, |plan| {
            seen.push((plan.first_decision(), plan.field().clone()));
            ControlFlow::Continue(())
        });
        for (decision, after) in &seen {
            let decision = decision.expect("one decision");
            let mut expected = f.clone();
            let k = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);
            assert!(expected.drop_kumipuyo(decision, &k));
            expected.simulate();
            assert_eq!(after, &expected, "decision {}", decision);
        }
    }

    #[test]
    fn test_neck_overflow_is_skipped() {
        let mut f = Field::new();
        for _ in 0..10 {
            f.drop_puyo_on(3, PuyoColor::Garbage);
        }
        let plans = collect_plans(&f, &seq("RB"), 1);
        assert!(plans
            .iter()
            .all(|p| p.field().is_empty(NECK_X, NECK_Y)));
        assert!(!plans.iter().any(|p| p.first_decision() == Some(Decision::new(3, 0))));
        assert!(plans.iter().any(|p| p.first_decision() == Some(Decision::new(3, 1))));
    }

    #[test]
    fn test_break_stops_search() {
        let f = Field::new();
        let mut calls = 0;
        let flow = iterate_available_plans(&f, &seq("RBYG"), 2, |_| {
            calls += 1;
            if calls == 5 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(flow.is_break());
        assert_eq!(calls, 5);
    }

    #[test]
    fn test_plan_bookkeeping() {
        let f = field("..O...\n..O...");
        let plans = collect_plans(&f, &seq("RBYG"), 2);
        let p = plans
            .iter()
            .find(|p| p.decisions() == [Decision::new(3, 1), Decision::new(1, 0)])
            .expect("both placements are legal");
        assert_eq!(p.num_chigiri(), 1);
        assert_eq!(p.decision_text(), "(3,1)-(1,0)");
        assert_eq!(p.frames_to_initiate(), f.frames_to_drop_next(Decision::new(3, 1)));
        assert!(p.last_drop_frames() > 0);
        assert_eq!(p.total_frames(), p.frames_to_initiate() + p.last_drop_frames());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let f = field("..Y...\nRRBB..\nGGYB..");
        let s = seq("RBGY");
        assert_eq!(collect_plans_parallel(&f, &s, 2), collect_plans(&f, &s, 2));
    }

    #[test]
    fn test_zero_depth() {
        let f = Field::new();
        assert!(collect_plans(&f, &seq("RB"), 0).is_empty());
        assert!(collect_plans_parallel(&f, &seq("RB"), 0).is_empty());
    }
}
