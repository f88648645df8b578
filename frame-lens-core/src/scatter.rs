//! Scatter figure data over a filtered view.
//!
//! Points are grouped into one series per colour value, in order of first
//! appearance. The figure carries data only; drawing is up to the caller.

use crate::evaluate::FilteredView;
use crate::projection::{cell_value, CellValue};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use frame_lens_common::FigureConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FigureError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("column '{0}' cannot be plotted as a number")]
    NotNumeric(String),
}

/// Column bindings for one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSpec {
    pub x: String,
    pub y: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub label: Option<String>,
    pub log_x: bool,
}

impl From<&FigureConfig> for ScatterSpec {
    fn from(cfg: &FigureConfig) -> Self {
        Self {
            x: cfg.x.clone(),
            y: cfg.y.clone(),
            size: cfg.size.clone(),
            color: cfg.color.clone(),
            label: cfg.label.clone(),
            log_x: cfg.log_x,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub size: Option<f64>,
    pub label: Option<String>,
    /// Row index in the dataset.
    pub source_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSeries {
    /// Colour value, or `None` when the figure is not coloured.
    pub name: Option<String>,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterFigure {
    pub spec: ScatterSpec,
    pub series: Vec<ScatterSeries>,
    pub skipped_rows: usize,
}

impl ScatterFigure {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    /// `[min, max]` over plotted x and y, or `None` when nothing is plotted.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let first = points.next()?;
        let mut xb = [first.x, first.x];
        let mut yb = [first.y, first.y];
        for p in points {
            xb = [xb[0].min(p.x), xb[1].max(p.x)];
            yb = [yb[0].min(p.y), yb[1].max(p.y)];
        }
        Some((xb, yb))
    }
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef, FigureError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| FigureError::UnknownColumn(name.to_string()))
}

fn numeric(batch: &RecordBatch, name: &str) -> Result<ArrayRef, FigureError> {
    let col = column(batch, name)?;
    cast(col.as_ref(), &DataType::Float64).map_err(|_| FigureError::NotNumeric(name.to_string()))
}

fn text(array: &dyn Array, row: usize) -> Option<String> {
    match cell_value(array, row) {
        CellValue::Null => None,
        v => Some(v.to_string()),
    }
}

pub fn build_scatter(view: &FilteredView, spec: &ScatterSpec) -> Result<ScatterFigure, FigureError> {
    let batch = view.batch();
    let xs = numeric(batch, &spec.x)?;
    let ys = numeric(batch, &spec.y)?;
    let sizes = spec.size.as_deref().map(|c| numeric(batch, c)).transpose()?;
    let colors = spec.color.as_deref().map(|c| column(batch, c)).transpose()?;
    let labels = spec.label.as_deref().map(|c| column(batch, c)).transpose()?;

    let xs = xs.as_primitive::<Float64Type>();
    let ys = ys.as_primitive::<Float64Type>();
    let sizes = sizes.as_ref().map(|s| s.as_primitive::<Float64Type>());

    let mut series: Vec<ScatterSeries> = Vec::new();
    let mut by_name: HashMap<Option<String>, usize> = HashMap::new();
    let mut skipped = 0usize;

    for row in 0..batch.num_rows() {
        if xs.is_null(row) || ys.is_null(row) {
            skipped += 1;
            continue;
        }
        let (mut x, y) = (xs.value(row), ys.value(row));
        if !x.is_finite() || !y.is_finite() {
            skipped += 1;
            continue;
        }
        if spec.log_x {
            if x <= 0.0 {
                skipped += 1;
                continue;
            }
            x = x.log10();
        }
        let point = ScatterPoint {
            x,
            y,
            size: sizes.and_then(|s| (!s.is_null(row)).then(|| s.value(row))),
            label: labels.and_then(|l| text(l.as_ref(), row)),
            source_row: view.source_rows()[row],
        };
        let name = colors.and_then(|c| text(c.as_ref(), row));
        let slot = *by_name.entry(name.clone()).or_insert_with(|| {
            series.push(ScatterSeries { name, points: Vec::new() });
            series.len() - 1
        });
        series[slot].points.push(point);
    }

    if skipped > 0 {
        tracing::debug!(skipped, x = %spec.x, y = %spec.y, "rows left out of scatter");
    }
    Ok(ScatterFigure {
        spec: spec.clone(),
        series,
        skipped_rows: skipped,
    })
}
