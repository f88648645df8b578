//! Immutable in-memory table the explorer filters and pages over.
//!
//! A [`Dataset`] is loaded once and never mutated afterwards; sessions share
//! it through an `Arc` without locking.

use arrow::array::ArrayRef;
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use frame_lens_common::{FrameLensError, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Scalar type of a column as seen by predicate coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    Boolean,
    Other,
}

impl ColumnKind {
    pub fn from_data_type(dt: &DataType) -> Self {
        match dt {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnKind::Integer,
            DataType::Float16 | DataType::Float32 | DataType::Float64 => ColumnKind::Float,
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnKind::Text,
            DataType::Boolean => ColumnKind::Boolean,
            _ => ColumnKind::Other,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenates reader output into a single batch.
    pub fn from_batches(schema: SchemaRef, batches: &[RecordBatch]) -> Result<Self> {
        let batch = concat_batches(&schema, batches)?;
        Ok(Self { batch })
    }

    /// Loads a CSV file with a header row. Column types are inferred from every
    /// record, so a late float widens an integer-looking column.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let format = arrow::csv::reader::Format::default().with_header(true);
        let (schema, _) = format.infer_schema(file, None)?;
        let schema = Arc::new(schema);
        let file = File::open(path)?;
        let reader = arrow::csv::ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(file)?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let dataset = Self::from_batches(schema, &batches)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "loaded CSV dataset"
        );
        Ok(dataset)
    }

    pub fn load_parquet(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let schema = builder.schema().clone();
        let reader = builder.build()?;
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        let dataset = Self::from_batches(schema, &batches)?;
        tracing::info!(
            path = %path.display(),
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "loaded Parquet dataset"
        );
        Ok(dataset)
    }

    /// Dispatches on file extension.
    pub fn open(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Self::load_csv(path),
            "parquet" | "pq" => Self::load_parquet(path),
            _ => Err(FrameLensError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema().index_of(name).ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.column_index(name).map(|i| self.batch.column(i))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let schema = self.batch.schema();
        schema
            .field_with_name(name)
            .ok()
            .map(|f| ColumnKind::from_data_type(f.data_type()))
    }

    pub fn columns(&self) -> Vec<ColumnInfo> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| ColumnInfo {
                name: f.name().clone(),
                kind: ColumnKind::from_data_type(f.data_type()),
                data_type: f.data_type().to_string(),
                nullable: f.is_nullable(),
            })
            .collect()
    }

    /// Every column but the first, which is usually a row label.
    pub fn default_selection(&self) -> Vec<String> {
        self.column_names().into_iter().skip(1).collect()
    }
}
