use crate::dataset::Dataset;
use crate::evaluate::{apply, FilterDiagnostic, FilteredView};
use crate::paginate::{NavAction, PageError, PageState};
use crate::predicate::Predicate;
use crate::predicate_set::{PredicateKey, PredicateSet, PredicateUpdate};
use crate::projection::{project, Record};
use frame_lens_common::Result;
use serde::Serialize;
use std::sync::Arc;

/// What the presentation layer needs to draw one page.
#[derive(Debug, Clone, Serialize)]
pub struct PageOutput {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub page_index: usize,
    pub page_count: usize,
    pub filtered_rows: usize,
    pub total_rows: usize,
}

/// Per-user explorer state over a shared, read-only dataset.
///
/// Every predicate mutation recomputes the filtered view from scratch and then
/// re-clamps the page index, which is otherwise left where it was.
#[derive(Debug, Clone)]
pub struct ExplorerSession {
    dataset: Arc<Dataset>,
    predicates: PredicateSet,
    view: FilteredView,
    diagnostics: Vec<FilterDiagnostic>,
    page: PageState,
    selection: Vec<String>,
}

impl ExplorerSession {
    pub fn new(dataset: Arc<Dataset>, page_size: i64) -> std::result::Result<Self, PageError> {
        let page = PageState::new(page_size)?;
        let view = FilteredView::full(&dataset);
        let selection = dataset.default_selection();
        Ok(Self {
            dataset,
            predicates: PredicateSet::new(),
            view,
            diagnostics: Vec::new(),
            page,
            selection,
        })
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// Predicates excluded from the last recomputation.
    pub fn diagnostics(&self) -> &[FilterDiagnostic] {
        &self.diagnostics
    }

    pub fn filtered(&self) -> &FilteredView {
        &self.view
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Evaluates `candidate` and commits it together with its view and
    /// diagnostics. On error the session keeps its previous predicates.
    fn commit(&mut self, candidate: PredicateSet) -> Result<()> {
        let outcome = apply(&candidate, &self.dataset)?;
        self.predicates = candidate;
        self.view = outcome.view;
        self.diagnostics = outcome.diagnostics;
        let before = self.page.page_index();
        let after = self.page.clamp(self.view.num_rows());
        if before != after {
            tracing::debug!(before, after, "page index clamped after refilter");
        }
        Ok(())
    }

    /// Adds a blank filter row. It stays inert until completed.
    pub fn add_predicate(&mut self) -> Result<PredicateKey> {
        self.add_predicate_with(Predicate::blank())
    }

    pub fn add_predicate_with(&mut self, predicate: Predicate) -> Result<PredicateKey> {
        let mut candidate = self.predicates.clone();
        let key = candidate.add_with(predicate);
        self.commit(candidate)?;
        Ok(key)
    }

    /// Returns false when the key was not present.
    pub fn remove_predicate(&mut self, key: PredicateKey) -> Result<bool> {
        let mut candidate = self.predicates.clone();
        if candidate.remove(key).is_none() {
            return Ok(false);
        }
        self.commit(candidate)?;
        Ok(true)
    }

    pub fn update_predicate(&mut self, key: PredicateKey, update: PredicateUpdate) -> Result<bool> {
        let mut candidate = self.predicates.clone();
        if !candidate.update(key, update) {
            return Ok(false);
        }
        self.commit(candidate)?;
        Ok(true)
    }

    pub fn navigate(&mut self, action: NavAction) -> usize {
        self.page.navigate(action, self.view.num_rows())
    }

    /// On error nothing changes.
    pub fn set_page_size(&mut self, page_size: i64) -> std::result::Result<(), PageError> {
        self.page.set_page_size(page_size, self.view.num_rows())
    }

    /// Keeps only names present in the dataset, in the given order.
    pub fn select_columns(&mut self, columns: Vec<String>) {
        let (known, unknown): (Vec<String>, Vec<String>) =
            columns.into_iter().partition(|c| self.dataset.has_column(c));
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "ignoring unknown columns in selection");
        }
        let mut selection: Vec<String> = Vec::with_capacity(known.len());
        for c in known {
            if !selection.contains(&c) {
                selection.push(c);
            }
        }
        self.selection = selection;
    }

    pub fn page_count(&self) -> usize {
        self.page.page_count(self.view.num_rows())
    }

    pub fn current_page(&self) -> PageOutput {
        let rows = self.page.bounds(self.view.num_rows());
        let slice = self.view.slice(rows);
        let records = project(&slice, &self.selection);
        PageOutput {
            columns: self.selection.clone(),
            records,
            page_index: self.page.page_index(),
            page_count: self.page_count(),
            filtered_rows: self.view.num_rows(),
            total_rows: self.dataset.num_rows(),
        }
    }
}
