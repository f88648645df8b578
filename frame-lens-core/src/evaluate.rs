//! AND-combination of a predicate set into one row mask, and the filtered
//! view materialized from it.

use crate::dataset::Dataset;
use crate::predicate::FilterError;
use crate::predicate_set::{PredicateKey, PredicateSet};
use arrow::array::{Array, BooleanArray};
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;
use frame_lens_common::Result;
use std::ops::Range;

/// Outcome of mask building. `NoFilter` is kept distinct from an all-true
/// mask so the empty-set case never goes through a filter kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum RowMask {
    NoFilter,
    Mask(BooleanArray),
}

impl RowMask {
    fn and(self, other: BooleanArray) -> std::result::Result<Self, FilterError> {
        match self {
            RowMask::NoFilter => Ok(RowMask::Mask(other)),
            RowMask::Mask(m) => arrow::compute::and(&m, &other)
                .map(RowMask::Mask)
                .map_err(|e| FilterError::Kernel(e.to_string())),
        }
    }

    pub fn selected_count(&self, total_rows: usize) -> usize {
        match self {
            RowMask::NoFilter => total_rows,
            RowMask::Mask(m) => m.true_count(),
        }
    }
}

/// A predicate that was excluded from the mask, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDiagnostic {
    pub key: PredicateKey,
    pub error: FilterError,
}

/// Builds the combined mask. Failing predicates are skipped and reported;
/// they never blank the view.
pub fn build_mask(set: &PredicateSet, dataset: &Dataset) -> (RowMask, Vec<FilterDiagnostic>) {
    let mut mask = RowMask::NoFilter;
    let mut diagnostics = Vec::new();
    for (key, predicate) in set.active() {
        let combined = predicate
            .evaluate(dataset)
            .and_then(|m| match m {
                Some(m) => mask.clone().and(m),
                None => Ok(mask.clone()),
            });
        match combined {
            Ok(m) => mask = m,
            Err(error) => {
                tracing::warn!(key = %key, predicate = %predicate, %error, "excluding filter");
                diagnostics.push(FilterDiagnostic { key, error });
            }
        }
    }
    (mask, diagnostics)
}

/// Rows of the dataset satisfying every active predicate, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView {
    batch: RecordBatch,
    source_rows: Vec<usize>,
}

impl FilteredView {
    pub fn full(dataset: &Dataset) -> Self {
        Self {
            batch: dataset.batch().clone(),
            source_rows: (0..dataset.num_rows()).collect(),
        }
    }

    pub fn from_mask(dataset: &Dataset, mask: &RowMask) -> Result<Self> {
        match mask {
            RowMask::NoFilter => Ok(Self::full(dataset)),
            RowMask::Mask(m) => {
                let batch = filter_record_batch(dataset.batch(), m)?;
                let source_rows = m
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| (v == Some(true)).then_some(i))
                    .collect();
                Ok(Self { batch, source_rows })
            }
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Dataset row index of each view row.
    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    /// Zero-copy slice; `rows` must lie within the view.
    pub fn slice(&self, rows: Range<usize>) -> RecordBatch {
        self.batch.slice(rows.start, rows.len())
    }
}

pub struct FilterOutcome {
    pub view: FilteredView,
    pub diagnostics: Vec<FilterDiagnostic>,
}

pub fn apply(set: &PredicateSet, dataset: &Dataset) -> Result<FilterOutcome> {
    let (mask, diagnostics) = build_mask(set, dataset);
    let view = FilteredView::from_mask(dataset, &mask)?;
    tracing::debug!(
        predicates = set.len(),
        excluded = diagnostics.len(),
        rows = view.num_rows(),
        total = dataset.num_rows(),
        "recomputed filtered view"
    );
    Ok(FilterOutcome { view, diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{Operator, Predicate};
    use crate::testing::countries;

    #[test]
    fn empty_set_is_no_filter() {
        let ds = countries();
        let (mask, diags) = build_mask(&PredicateSet::new(), &ds);
        assert_eq!(mask, RowMask::NoFilter);
        assert!(diags.is_empty());
        let view = apply(&PredicateSet::new(), &ds).unwrap().view;
        assert_eq!(view.num_rows(), ds.num_rows());
        assert_eq!(view.source_rows(), (0..ds.num_rows()).collect::<Vec<_>>().as_slice());
    }

    #[test]
    fn all_inert_set_returns_full_dataset() {
        let ds = countries();
        let mut set = PredicateSet::new();
        set.add();
        set.add_with(Predicate::new("country", Operator::Contains, ""));
        let outcome = apply(&set, &ds).unwrap();
        assert_eq!(outcome.view.num_rows(), ds.num_rows());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn predicates_are_anded() {
        let ds = countries();
        let mut set = PredicateSet::new();
        set.add_with(Predicate::new("continent", Operator::Eq, "Africa"));
        set.add_with(Predicate::new("population", Operator::Gt, "5000"));
        let view = apply(&set, &ds).unwrap().view;
        assert_eq!(view.source_rows(), &[3, 6]);
    }

    #[test]
    fn bad_predicate_is_excluded_not_fatal() {
        let ds = countries();
        let mut set = PredicateSet::new();
        let good = set.add_with(Predicate::new("continent", Operator::Eq, "Europe"));
        let bad = set.add_with(Predicate::new("population", Operator::Gt, "many"));
        let mismatch = set.add_with(Predicate::new("population", Operator::Contains, "1"));
        let unknown = set.add_with(Predicate::new("nope", Operator::Eq, "x"));
        let outcome = apply(&set, &ds).unwrap();
        assert_eq!(outcome.view.source_rows(), &[0, 1, 7]);
        let keys: Vec<_> = outcome.diagnostics.iter().map(|d| d.key).collect();
        assert_eq!(keys, vec![bad, mismatch, unknown]);
        assert!(!keys.contains(&good));
        assert!(matches!(outcome.diagnostics[0].error, FilterError::InvalidLiteral { .. }));
        assert!(matches!(outcome.diagnostics[1].error, FilterError::TypeMismatch { .. }));
        assert!(matches!(outcome.diagnostics[2].error, FilterError::UnknownColumn(_)));
    }

    #[test]
    fn no_match_yields_empty_view() {
        let ds = countries();
        let mut set = PredicateSet::new();
        set.add_with(Predicate::new("population", Operator::Gt, "1e12"));
        let view = apply(&set, &ds).unwrap().view;
        assert!(view.is_empty());
        assert_eq!(view.batch().num_columns(), ds.num_columns());
    }
}
