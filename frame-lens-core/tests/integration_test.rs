use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use frame_lens_core::{
    apply, page, CellValue, ColumnKind, Dataset, ExplorerSession, FilterError, NavAction,
    Operator, Predicate, PredicateSet,
};
use parquet::arrow::ArrowWriter;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const COUNTRIES_CSV: &str = "\
country,continent,population,life expectancy,gdp per capita
France,Europe,1000,81.0,30000.0
Germany,Europe,8000,79.0,32000.0
Chad,Africa,1000,50.0,1500.0
Nigeria,Africa,9000,46.0,2000.0
Brazil,Americas,7000,72.0,9000.0
Canada,Americas,3000,80.0,36000.0
Egypt,Africa,6000,71.0,5000.0
Iceland,Europe,300,81.5,36000.0
Japan,Asia,12000,82.0,31000.0
Laos,Asia,600,64.0,
";

fn write_csv_fixture() -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    tmp.write_all(COUNTRIES_CSV.as_bytes()).unwrap();
    tmp.flush().unwrap();
    tmp
}

fn write_parquet_fixture() -> NamedTempFile {
    let tmp = tempfile::Builder::new()
        .suffix(".parquet")
        .tempfile()
        .unwrap();
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("score", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from((0..12).collect::<Vec<i64>>())),
            Arc::new(StringArray::from(
                (0..12)
                    .map(|i| (i % 4 != 3).then(|| format!("row-{i}")))
                    .collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                (0..12).map(|i| i as f64 * 0.5).collect::<Vec<_>>(),
            )),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(tmp.as_file(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    tmp
}

fn countries() -> Arc<Dataset> {
    let tmp = write_csv_fixture();
    Arc::new(Dataset::open(tmp.path()).unwrap())
}

#[test]
fn csv_load_infers_column_kinds() {
    let ds = countries();
    assert_eq!(ds.num_rows(), 10);
    assert_eq!(ds.column_kind("country"), Some(ColumnKind::Text));
    assert_eq!(ds.column_kind("population"), Some(ColumnKind::Integer));
    assert_eq!(ds.column_kind("gdp per capita"), Some(ColumnKind::Float));
    assert_eq!(ds.column_kind("nope"), None);
}

#[test]
fn contains_is_case_insensitive() {
    let ds = countries();
    let mut set = PredicateSet::new();
    set.add_with(Predicate::new("country", Operator::Contains, "fra"));
    let view = apply(&set, &ds).unwrap().view;
    assert_eq!(view.source_rows(), &[0]);
}

#[test]
fn integer_equality_matches_parsed_literal() {
    let ds = countries();
    let mut set = PredicateSet::new();
    set.add_with(Predicate::new("population", Operator::Eq, "1000"));
    let view = apply(&set, &ds).unwrap().view;
    assert_eq!(view.source_rows(), &[0, 2]);
}

#[test]
fn ordering_on_float_column_skips_nulls() {
    let ds = countries();
    let mut set = PredicateSet::new();
    set.add_with(Predicate::new("gdp per capita", Operator::Lt, "1e9"));
    let view = apply(&set, &ds).unwrap().view;
    assert_eq!(view.num_rows(), 9);
    assert!(!view.source_rows().contains(&9));
}

#[test]
fn invalid_literal_is_reported_and_ignored() {
    let ds = countries();
    let mut set = PredicateSet::new();
    set.add_with(Predicate::new("population", Operator::Ge, "lots"));
    let outcome = apply(&set, &ds).unwrap();
    assert_eq!(outcome.view.num_rows(), 10);
    assert_eq!(
        outcome.diagnostics[0].error,
        FilterError::InvalidLiteral {
            field: "population".into(),
            operator: Operator::Ge,
            raw: "lots".into(),
        }
    );
}

#[test]
fn parquet_dataset_pages_twelve_rows_by_five() {
    let tmp = write_parquet_fixture();
    let ds = Dataset::open(tmp.path()).unwrap();
    assert_eq!(ds.num_rows(), 12);
    let view = apply(&PredicateSet::new(), &ds).unwrap().view;
    let p = page(&view, 5, 0, NavAction::Goto(5)).unwrap();
    assert_eq!(p.page_count, 3);
    assert_eq!(p.index, 2);
    assert_eq!(p.rows, 10..12);
    assert_eq!(p.batch.num_rows(), 2);
}

#[test]
fn session_walkthrough() {
    let ds = countries();
    let mut session = ExplorerSession::new(ds, 2).unwrap();
    assert_eq!(session.page_count(), 5);
    session.navigate(NavAction::Goto(4));

    let africa = session
        .add_predicate_with(Predicate::new("continent", Operator::Eq, "Africa"))
        .unwrap();
    // three African rows fit on two pages, so the cursor moves back
    let out = session.current_page();
    assert_eq!(out.page_index, 1);
    assert_eq!(out.page_count, 2);
    assert_eq!(out.filtered_rows, 3);

    session.select_columns(vec!["country".into(), "life expectancy".into()]);
    session.navigate(NavAction::First);
    let out = session.current_page();
    assert_eq!(out.records.len(), 2);
    assert_eq!(out.records[0].get("country"), Some(&CellValue::Text("Chad".into())));
    assert_eq!(out.records[1].get("life expectancy"), Some(&CellValue::Float(46.0)));
    assert!(out.records[0].get("continent").is_none());

    session.remove_predicate(africa).unwrap();
    assert_eq!(session.filtered().num_rows(), 10);
    assert_eq!(session.page_state().page_index(), 0);

    let json = serde_json::to_value(session.current_page()).unwrap();
    assert_eq!(json["records"][0]["country"], "France");
    assert_eq!(json["page_count"], 5);
}

#[test]
fn unknown_extension_is_rejected() {
    let tmp = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
    assert!(Dataset::open(tmp.path()).is_err());
}
