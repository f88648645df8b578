use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use frame_lens_core::paginate::resolve;
use frame_lens_core::{
    apply, page_count, Dataset, NavAction, Operator, PageState, Predicate, PredicateSet,
};
use proptest::prelude::*;
use std::sync::Arc;

fn dataset(rows: &[(Option<i64>, String)]) -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("n", DataType::Int64, true),
        Field::new("s", DataType::Utf8, false),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>())),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.1.as_str()).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();
    Dataset::from_batch(batch)
}

fn arb_rows() -> impl Strategy<Value = Vec<(Option<i64>, String)>> {
    prop::collection::vec((prop::option::of(-50i64..50), "[a-cA-C]{0,4}"), 0..40)
}

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        (prop::sample::select(vec![Operator::Gt, Operator::Ge, Operator::Eq, Operator::Le, Operator::Lt]), -50i64..50)
            .prop_map(|(op, v)| Predicate::new("n", op, v.to_string())),
        "[a-cA-C]{1,2}".prop_map(|lit| Predicate::new("s", Operator::Contains, lit)),
        Just(Predicate::blank()),
        Just(Predicate::new("missing", Operator::Eq, "1")),
    ]
}

proptest! {
    #[test]
    fn prop_filtered_rows_are_ordered_subset(rows in arb_rows(), preds in prop::collection::vec(arb_predicate(), 0..4)) {
        let ds = dataset(&rows);
        let mut set = PredicateSet::new();
        for p in preds {
            set.add_with(p);
        }
        let view = apply(&set, &ds).unwrap().view;
        let src = view.source_rows();
        prop_assert!(src.iter().all(|&r| r < ds.num_rows()));
        prop_assert!(src.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(src.len(), view.num_rows());
    }

    #[test]
    fn prop_add_then_remove_restores_view(rows in arb_rows(), base in prop::collection::vec(arb_predicate(), 0..3), extra in arb_predicate()) {
        let ds = dataset(&rows);
        let mut set = PredicateSet::new();
        for p in base {
            set.add_with(p);
        }
        let before = apply(&set, &ds).unwrap().view.source_rows().to_vec();
        let key = set.add_with(extra);
        set.remove(key);
        let after = apply(&set, &ds).unwrap().view.source_rows().to_vec();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_pages_partition_rows(rows in 0usize..200, size in 1i64..30) {
        let count = page_count(rows, size as usize);
        prop_assert_eq!(count, std::cmp::max(1, rows.div_ceil(size as usize)));
        let mut covered = 0;
        for i in 0..count {
            let (index, range) = resolve(rows, size, 0, NavAction::Goto(i as i64)).unwrap();
            prop_assert_eq!(index, i);
            prop_assert_eq!(range.start, covered);
            covered = range.end;
        }
        prop_assert_eq!(covered, rows);
    }

    #[test]
    fn prop_index_always_clamped(rows in 0usize..200, size in 1i64..30, moves in prop::collection::vec(-3i64..40, 0..10)) {
        let mut state = PageState::new(size).unwrap();
        let max = page_count(rows, size as usize) - 1;
        for m in moves {
            let action = match m {
                -3 => NavAction::First,
                -2 => NavAction::Previous,
                -1 => NavAction::Next,
                0 => NavAction::Last,
                n => NavAction::Goto(n),
            };
            let index = state.navigate(action, rows);
            prop_assert!(index <= max);
        }
        prop_assert_eq!(state.navigate(NavAction::Last, rows), max);
        prop_assert_eq!(state.navigate(NavAction::Next, rows), max);
        prop_assert_eq!(state.navigate(NavAction::First, rows), 0);
        prop_assert_eq!(state.navigate(NavAction::Previous, rows), 0);
    }
}
