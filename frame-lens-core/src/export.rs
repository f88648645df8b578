use crate::evaluate::FilteredView;
use crate::projection::{cell_value, project_batch, CellValue};
use crate::session::PageOutput;
use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use frame_lens_common::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

// --- split-orientation transport ---

/// Column-major header with row-major data; `index` holds the dataset row
/// of each data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitFrame {
    pub columns: Vec<String>,
    pub index: Vec<usize>,
    pub data: Vec<Vec<CellValue>>,
}

impl SplitFrame {
    pub fn from_view(view: &FilteredView) -> Self {
        let batch = view.batch();
        let columns = batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        let data = (0..batch.num_rows())
            .map(|row| {
                batch
                    .columns()
                    .iter()
                    .map(|col| cell_value(col.as_ref(), row))
                    .collect()
            })
            .collect();
        Self {
            columns,
            index: view.source_rows().to_vec(),
            data,
        }
    }
}

pub fn to_split_json(view: &FilteredView) -> Result<String> {
    Ok(serde_json::to_string(&SplitFrame::from_view(view))?)
}

// --- file export ---

pub fn export_json(output_path: &Path, view: &FilteredView) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &SplitFrame::from_view(view))?;
    file.flush()?;
    tracing::info!(path = %output_path.display(), rows = view.num_rows(), "exported json");
    Ok(())
}

pub fn write_csv<W: Write>(writer: W, batch: &RecordBatch) -> Result<()> {
    let mut w = WriterBuilder::new().with_header(true).build(writer);
    w.write(batch)?;
    Ok(())
}

pub fn export_csv(output_path: &Path, view: &FilteredView) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_csv(file, view.batch())?;
    tracing::info!(path = %output_path.display(), rows = view.num_rows(), "exported csv");
    Ok(())
}

// --- headless output ---

/// Placeholder body when no selected column exists.
pub const NO_COLUMNS: &str = "(no columns selected)";

/// Renders a page restricted to `selected`, using the same column rules as
/// the record projection. An empty projection renders [`NO_COLUMNS`].
pub fn format_page_table(page: &RecordBatch, selected: &[String]) -> Result<String> {
    let projected = project_batch(page, selected)?;
    if projected.num_columns() == 0 {
        return Ok(NO_COLUMNS.to_string());
    }
    Ok(pretty_format_batches(&[projected])?.to_string())
}

pub fn print_summary(out: &PageOutput) {
    println!("{:<10} {} of {}", "Rows:", out.filtered_rows, out.total_rows);
    println!("{:<10} {} of {}", "Page:", out.page_index + 1, out.page_count);
    println!("{:<10} {}", "Columns:", out.columns.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::apply;
    use crate::predicate::{Operator, Predicate};
    use crate::predicate_set::PredicateSet;
    use crate::testing::countries;

    fn asia() -> FilteredView {
        let ds = countries();
        let mut set = PredicateSet::new();
        set.add_with(Predicate::new("continent", Operator::Eq, "Asia"));
        apply(&set, &ds).unwrap().view
    }

    #[test]
    fn split_frame_keeps_source_index() {
        let frame = SplitFrame::from_view(&asia());
        assert_eq!(frame.index, vec![8, 9]);
        assert_eq!(frame.columns[0], "country");
        assert_eq!(frame.data[1][4], CellValue::Null);
        let json = to_split_json(&asia()).unwrap();
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["index"], serde_json::json!([8, 9]));
        assert_eq!(back["data"][0][0], "Japan");
    }

    #[test]
    fn csv_has_header_and_filtered_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, asia().batch()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("country,continent,population"));
        assert!(lines[1].starts_with("Japan,Asia,12000"));
    }

    #[test]
    fn export_files_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("view.json");
        let csv = dir.path().join("view.csv");
        export_json(&json, &asia()).unwrap();
        export_csv(&csv, &asia()).unwrap();
        let frame: SplitFrame =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(frame.data.len(), 2);
        assert!(std::fs::read_to_string(&csv).unwrap().contains("Laos"));
    }

    #[test]
    fn page_table_honours_selection() {
        let view = asia();
        let table = format_page_table(view.batch(), &["country".into(), "population".into()]).unwrap();
        assert!(table.contains("Japan"));
        assert!(table.contains("population"));
        assert!(!table.contains("continent"));
    }

    #[test]
    fn page_table_without_columns_is_placeholder() {
        let view = asia();
        assert_eq!(format_page_table(view.batch(), &[]).unwrap(), NO_COLUMNS);
        assert_eq!(format_page_table(view.batch(), &["ghost".into()]).unwrap(), NO_COLUMNS);
    }

    #[test]
    fn one_column_dataset_prints_with_default_selection() {
        use crate::dataset::Dataset;
        use crate::session::ExplorerSession;
        use arrow::array::StringArray;
        use arrow::datatypes::{DataType, Field, Schema};
        use std::sync::Arc;

        let schema = Arc::new(Schema::new(vec![Field::new("country", DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["France", "Chad"]))]).unwrap();
        let session = ExplorerSession::new(Arc::new(Dataset::from_batch(batch)), 10).unwrap();
        assert!(session.selection().is_empty());
        let page = session.filtered().slice(session.page_state().bounds(session.filtered().num_rows()));
        assert_eq!(format_page_table(&page, session.selection()).unwrap(), NO_COLUMNS);
        assert_eq!(session.current_page().records.len(), 2);
    }
}
