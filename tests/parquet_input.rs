use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use saint_heatmap::data::loader::load_file;
use saint_heatmap::data::model::CellValue;
use saint_heatmap::{prepare, HeatmapConfig};
use tempfile::TempDir;

#[test]
fn parquet_columns_load_with_nulls() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("merged.parquet");

    let config = HeatmapConfig::default();
    let mut fields = vec![Field::new("PreyGene", DataType::Utf8, true)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(vec![
        Some("VCP"),
        Some("Cont_KRT1"),
        Some("PREY1"),
    ]))];
    for c in &config.conditions {
        let (field, array): (Field, ArrayRef) = match c.column.as_str() {
            "SE_UB_WT_BR_SaintScore" => (
                Field::new(&c.column, DataType::Float64, true),
                Arc::new(Float64Array::from(vec![Some(0.9), Some(1.0), None])),
            ),
            "SE_UB_WT_BR_MG_SaintScore" => (
                Field::new(&c.column, DataType::Float32, true),
                Arc::new(Float32Array::from(vec![None, Some(1.0), Some(0.75)])),
            ),
            _ => (
                Field::new(&c.column, DataType::Int64, true),
                Arc::new(Int64Array::from(vec![Some(0), Some(1), None])),
            ),
        };
        fields.push(field);
        columns.push(array);
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let table = load_file(&path).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.columns[0], "PreyGene");
    assert_eq!(table.rows[2].get("SE_UB_WT_BR_SaintScore"), &CellValue::Null);
    assert_eq!(table.rows[0].get("WT_KO_BR_SaintScore"), &CellValue::Integer(0));

    let prepared = prepare(&table, &config).unwrap();
    assert_eq!(prepared.matrix.row_labels, vec!["VCP", "PREY1"]);
    assert_eq!(prepared.matrix.get(1, 5), Some(0.75));
}
