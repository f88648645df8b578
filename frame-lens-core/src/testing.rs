use crate::dataset::Dataset;
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Ten-row fixture shaped like the GDP / life expectancy sample.
pub(crate) fn countries() -> Dataset {
    let schema = Arc::new(Schema::new(vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("continent", DataType::Utf8, false),
        Field::new("population", DataType::Int64, false),
        Field::new("life expectancy", DataType::Float64, false),
        Field::new("gdp per capita", DataType::Float64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![
                "France", "Germany", "Chad", "Nigeria", "Brazil", "Canada", "Egypt", "Iceland",
                "Japan", "Laos",
            ])),
            Arc::new(StringArray::from(vec![
                "Europe", "Europe", "Africa", "Africa", "Americas", "Americas", "Africa",
                "Europe", "Asia", "Asia",
            ])),
            Arc::new(Int64Array::from(vec![
                1000, 8000, 1000, 9000, 7000, 3000, 6000, 300, 12000, 600,
            ])),
            Arc::new(Float64Array::from(vec![
                81.0, 79.0, 50.0, 46.0, 72.0, 80.0, 71.0, 81.5, 82.0, 64.0,
            ])),
            Arc::new(Float64Array::from(vec![
                Some(30000.0),
                Some(32000.0),
                Some(1500.0),
                Some(2000.0),
                Some(9000.0),
                Some(36000.0),
                Some(5000.0),
                Some(36000.0),
                Some(31000.0),
                None,
            ])),
        ],
    )
    .expect("fixture batch");
    Dataset::from_batch(batch)
}
