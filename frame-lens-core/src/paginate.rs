//! Page cursor over a filtered view.
//!
//! The page index is always clamped into `[0, page_count - 1]`; an empty
//! view still has one (empty) page. Invalid page sizes are rejected without
//! touching the current state.

use crate::evaluate::FilteredView;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page size must be a positive integer, got {0}")]
    InvalidPageSize(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavAction {
    First,
    Previous,
    Next,
    Last,
    Goto(i64),
    /// Back to page 0; used when the page size changes.
    Default,
}

pub fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size.max(1)).max(1)
}

pub fn max_page_index(rows: usize, page_size: usize) -> usize {
    page_count(rows, page_size) - 1
}

fn validate_size(page_size: i64) -> Result<usize, PageError> {
    if page_size <= 0 {
        return Err(PageError::InvalidPageSize(page_size));
    }
    usize::try_from(page_size).map_err(|_| PageError::InvalidPageSize(page_size))
}

fn clamp_index(requested: i64, rows: usize, page_size: usize) -> usize {
    let max = max_page_index(rows, page_size);
    if requested <= 0 {
        0
    } else {
        usize::try_from(requested).map_or(max, |r| r.min(max))
    }
}

fn row_bounds(index: usize, rows: usize, page_size: usize) -> Range<usize> {
    let start = index.saturating_mul(page_size).min(rows);
    let end = start.saturating_add(page_size).min(rows);
    start..end
}

/// Applies `action` to the `current` index and clamps the result.
/// Returns the clamped index and its row range within the view.
pub fn resolve(
    rows: usize,
    page_size: i64,
    current: i64,
    action: NavAction,
) -> Result<(usize, Range<usize>), PageError> {
    let size = validate_size(page_size)?;
    let requested = match action {
        NavAction::First | NavAction::Default => 0,
        NavAction::Previous => current.saturating_sub(1),
        NavAction::Next => current.saturating_add(1),
        NavAction::Last => max_page_index(rows, size) as i64,
        NavAction::Goto(n) => n,
    };
    let index = clamp_index(requested, rows, size);
    Ok((index, row_bounds(index, rows, size)))
}

/// One page of a filtered view.
#[derive(Debug, Clone)]
pub struct Page {
    pub index: usize,
    pub page_count: usize,
    pub rows: Range<usize>,
    pub batch: RecordBatch,
}

pub fn page(
    view: &FilteredView,
    page_size: i64,
    requested_index: i64,
    action: NavAction,
) -> Result<Page, PageError> {
    let (index, rows) = resolve(view.num_rows(), page_size, requested_index, action)?;
    let size = validate_size(page_size)?;
    Ok(Page {
        index,
        page_count: page_count(view.num_rows(), size),
        batch: view.slice(rows.clone()),
        rows,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    page_size: usize,
    page_index: usize,
}

impl PageState {
    pub fn new(page_size: i64) -> Result<Self, PageError> {
        Ok(Self {
            page_size: validate_size(page_size)?,
            page_index: 0,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self, rows: usize) -> usize {
        page_count(rows, self.page_size)
    }

    pub fn navigate(&mut self, action: NavAction, rows: usize) -> usize {
        // page_size was validated on the way in, so resolve cannot fail here
        let (index, _) = resolve(rows, self.page_size as i64, self.page_index as i64, action)
            .unwrap_or((0, 0..0));
        self.page_index = index;
        index
    }

    /// Rejects non-positive sizes and leaves the state untouched; otherwise
    /// stores the size and returns to page 0.
    pub fn set_page_size(&mut self, page_size: i64, rows: usize) -> Result<(), PageError> {
        self.page_size = validate_size(page_size)?;
        self.navigate(NavAction::Default, rows);
        Ok(())
    }

    /// Re-clamps after the view changed size.
    pub fn clamp(&mut self, rows: usize) -> usize {
        self.page_index = clamp_index(self.page_index as i64, rows, self.page_size);
        self.page_index
    }

    pub fn bounds(&self, rows: usize) -> Range<usize> {
        row_bounds(self.page_index, rows, self.page_size)
    }
}
