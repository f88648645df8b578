//! Column selection and row-record materialization for a page.
//!
//! The default [`project`] drops selected names that are not in the schema;
//! [`project_strict`] reports them instead.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, Schema,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::UInt(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{v}"),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::UInt(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
        }
    }
}

pub fn cell_value(array: &dyn Array, row: usize) -> CellValue {
    if array.is_null(row) {
        return CellValue::Null;
    }
    match array.data_type() {
        DataType::Int8 => CellValue::Int(array.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Int(array.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Int(array.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Int(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Int(array.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Int(array.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Int(array.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => CellValue::UInt(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => CellValue::Float(array.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(array.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => CellValue::Text(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(array.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(array.as_boolean().value(row)),
        _ => CellValue::Text(
            ArrayFormatter::try_new(array, &FormatOptions::default())
                .map(|f| f.value(row).to_string())
                .unwrap_or_default(),
        ),
    }
}

/// One displayed row: `(column, value)` pairs in selection order.
/// Serializes as a JSON object with keys in that order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Schema indices for `selected`, in selection order, without duplicates.
/// Unknown names are dropped.
pub fn resolve_columns(schema: &Schema, selected: &[String]) -> Vec<usize> {
    let mut indices: Vec<usize> = Vec::with_capacity(selected.len());
    for name in selected {
        match schema.index_of(name) {
            Ok(i) if !indices.contains(&i) => indices.push(i),
            Ok(_) => {}
            Err(_) => tracing::debug!(column = %name, "dropping unknown column from projection"),
        }
    }
    indices
}

fn materialize(page: &RecordBatch, indices: &[usize]) -> Vec<Record> {
    let schema = page.schema();
    (0..page.num_rows())
        .map(|row| Record {
            fields: indices
                .iter()
                .map(|&i| {
                    (
                        schema.field(i).name().clone(),
                        cell_value(page.column(i).as_ref(), row),
                    )
                })
                .collect(),
        })
        .collect()
}

pub fn project(page: &RecordBatch, selected: &[String]) -> Vec<Record> {
    let indices = resolve_columns(page.schema().as_ref(), selected);
    materialize(page, &indices)
}

pub fn project_strict(page: &RecordBatch, selected: &[String]) -> Result<Vec<Record>, ProjectionError> {
    let schema = page.schema();
    if let Some(missing) = selected.iter().find(|c| schema.index_of(c).is_err()) {
        return Err(ProjectionError::UnknownColumn(missing.clone()));
    }
    Ok(materialize(page, &resolve_columns(schema.as_ref(), selected)))
}

/// Same selection rules as [`project`], kept columnar for printing and export.
pub fn project_batch(page: &RecordBatch, selected: &[String]) -> Result<RecordBatch, ArrowError> {
    let indices = resolve_columns(page.schema().as_ref(), selected);
    page.project(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::countries;

    fn names(records: &[Record]) -> Vec<Vec<String>> {
        records
            .iter()
            .map(|r| r.fields().iter().map(|(c, _)| c.clone()).collect())
            .collect()
    }

    #[test]
    fn selection_order_is_preserved_and_unknown_dropped() {
        let ds = countries();
        let page = ds.batch().slice(0, 2);
        let sel = vec!["population".to_string(), "ghost".to_string(), "country".to_string()];
        let records = project(&page, &sel);
        assert_eq!(records.len(), 2);
        assert_eq!(names(&records)[0], vec!["population", "country"]);
        assert_eq!(records[0].get("country"), Some(&CellValue::Text("France".into())));
        assert_eq!(records[1].get("population"), Some(&CellValue::Int(8000)));
    }

    #[test]
    fn strict_projection_reports_unknown_column() {
        let ds = countries();
        let err = project_strict(ds.batch(), &["ghost".to_string()]).unwrap_err();
        assert_eq!(err, ProjectionError::UnknownColumn("ghost".into()));
    }

    #[test]
    fn duplicate_names_are_kept_once() {
        let ds = countries();
        let sel = vec!["country".to_string(), "country".to_string()];
        assert_eq!(project_batch(ds.batch(), &sel).unwrap().num_columns(), 1);
    }

    #[test]
    fn nulls_become_null_cells_and_serialize_in_order() {
        let ds = countries();
        let page = ds.batch().slice(9, 1);
        let sel = vec!["gdp per capita".to_string(), "country".to_string()];
        let records = project(&page, &sel);
        assert_eq!(records[0].get("gdp per capita"), Some(&CellValue::Null));
        let json = serde_json::to_string(&records[0]).unwrap();
        assert_eq!(json, r#"{"gdp per capita":null,"country":"Laos"}"#);
    }

    #[test]
    fn empty_selection_yields_empty_records() {
        let ds = countries();
        let records = project(&ds.batch().slice(0, 3), &[]);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(Record::is_empty));
    }
}
