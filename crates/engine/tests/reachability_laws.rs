use proptest::prelude::*;
use puyo_core::{Field, Kumipuyo, PuyoColor, DECISIONS, FIELD_WIDTH};
use puyo_engine::{generate_placements, is_reachable, ReachableSet};

/// Garbage columns of arbitrary height, up into the first staging row.
fn skyline_strategy() -> impl Strategy<Value = Field> {
    prop::collection::vec(0usize..=13, FIELD_WIDTH).prop_map(|heights| {
        let mut field = Field::new();
        for (i, &h) in heights.iter().enumerate() {
            for _ in 0..h {
                field.drop_puyo_on(i + 1, PuyoColor::Garbage);
            }
        }
        field
    })
}

proptest! {
    #[test]
    fn reachable_set_agrees_with_single_queries(field in skyline_strategy()) {
        let set = ReachableSet::of(&field);
        for d in DECISIONS {
            prop_assert_eq!(set.contains(d), is_reachable(&field, d), "decision {}", d);
        }
    }

    #[test]
    fn reachable_placements_always_drop(field in skyline_strategy()) {
        let kumipuyo = Kumipuyo::new(PuyoColor::Red, PuyoColor::Blue);
        for p in generate_placements(&field) {
            let mut next = field.clone();
            prop_assert!(next.drop_kumipuyo(p.decision, &kumipuyo), "decision {}", p.decision);
            prop_assert_eq!(next.count_puyos(), field.count_puyos() + 2);
        }
    }
}
