use std::path::Path;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use timesheet_core::{CellValue, RawTable, TimesheetError};
use tracing::info;

pub struct ParquetImporter;

impl ParquetImporter {
    /// Read a Parquet upload into a [`RawTable`], keeping each column's
    /// native type where it maps onto a [`CellValue`].
    pub fn import(path: &Path) -> Result<RawTable, TimesheetError> {
        let file = std::fs::File::open(path).map_err(TimesheetError::Io)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| TimesheetError::Parquet(e.to_string()))?;

        let headers = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        let mut table = RawTable::new(headers);

        let reader = builder.build().map_err(|e| TimesheetError::Parquet(e.to_string()))?;

        for batch_result in reader {
            let batch = batch_result.map_err(|e| TimesheetError::Parquet(e.to_string()))?;
            let num_rows = batch.num_rows();

            let columns = batch
                .columns()
                .iter()
                .map(column_cells)
                .collect::<Result<Vec<_>, _>>()?;

            for row_idx in 0..num_rows {
                let row = columns
                    .iter()
                    .map(|col| col.get(row_idx).cloned().unwrap_or(CellValue::Null))
                    .collect();
                table.push_row(row);
            }
        }

        info!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }
}

/// Convert one Arrow column to cells. Timestamps collapse to dates; types
/// without a direct mapping are rendered through a string cast.
fn column_cells(array: &ArrayRef) -> Result<Vec<CellValue>, TimesheetError> {
    let arrow_err = |e: arrow::error::ArrowError| TimesheetError::Parquet(e.to_string());

    let cells = match array.data_type() {
        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array)?;
            cells_from(arr, |i| CellValue::Text(arr.value(i).to_string()))
        }
        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array)?;
            cells_from(arr, |i| CellValue::Integer(arr.value(i)))
        }
        DataType::Int32 => {
            let arr = downcast::<Int32Array>(array)?;
            cells_from(arr, |i| CellValue::Integer(i64::from(arr.value(i))))
        }
        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array)?;
            cells_from(arr, |i| CellValue::Float(arr.value(i)))
        }
        DataType::Float32 => {
            let arr = downcast::<Float32Array>(array)?;
            cells_from(arr, |i| CellValue::Float(f64::from(arr.value(i))))
        }
        DataType::Boolean => {
            let arr = downcast::<BooleanArray>(array)?;
            cells_from(arr, |i| CellValue::Boolean(arr.value(i)))
        }
        DataType::Date32 => {
            let arr = downcast::<Date32Array>(array)?;
            cells_from(arr, |i| {
                arr.value_as_date(i).map(CellValue::Date).unwrap_or(CellValue::Null)
            })
        }
        DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates = cast(array, &DataType::Date32).map_err(arrow_err)?;
            return column_cells(&dates);
        }
        _ => {
            let strings = cast(array, &DataType::Utf8).map_err(arrow_err)?;
            return column_cells(&strings);
        }
    };
    Ok(cells)
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T, TimesheetError> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        TimesheetError::Parquet(format!("unexpected array type for {}", array.data_type()))
    })
}

fn cells_from(array: &dyn Array, value: impl Fn(usize) -> CellValue) -> Vec<CellValue> {
    (0..array.len())
        .map(|i| if array.is_null(i) { CellValue::Null } else { value(i) })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use chrono::NaiveDate;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn typed_columns_become_typed_cells() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Date32, true),
            Field::new("Technician", DataType::Utf8, true),
            Field::new("Time:", DataType::Float64, true),
            Field::new("Month", DataType::Int64, true),
        ]));
        // 19786 days after 1970-01-01 is 2024-03-04.
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Date32Array::from(vec![Some(19786), None])),
                Arc::new(StringArray::from(vec![Some("Ana"), None])),
                Arc::new(Float64Array::from(vec![Some(1.5), Some(2.0)])),
                Arc::new(Int64Array::from(vec![Some(3), Some(4)])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.parquet");
        write_parquet(&path, &batch);

        let table = ParquetImporter::import(&path).unwrap();
        assert_eq!(table.headers, vec!["Date", "Technician", "Time:", "Month"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.cell(0, 0),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );
        assert_eq!(table.cell(0, 1), &CellValue::Text("Ana".into()));
        assert_eq!(table.cell(0, 2), &CellValue::Float(1.5));
        assert_eq!(table.cell(0, 3), &CellValue::Integer(3));
        assert_eq!(table.cell(1, 0), &CellValue::Null);
        assert_eq!(table.cell(1, 1), &CellValue::Null);
    }

    #[test]
    fn timestamps_collapse_to_dates() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "Date",
            DataType::Timestamp(TimeUnit::Millisecond, None),
            true,
        )]));
        // 2024-03-04T15:30:00Z
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(TimestampMillisecondArray::from(vec![Some(1_709_566_200_000)]))],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts.parquet");
        write_parquet(&path, &batch);

        let table = ParquetImporter::import(&path).unwrap();
        assert_eq!(
            table.cell(0, 0),
            &CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );
    }

    #[test]
    fn non_parquet_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.parquet");
        std::fs::write(&path, b"Date,Technician\n").unwrap();

        let err = ParquetImporter::import(&path).unwrap_err();
        assert!(matches!(err, TimesheetError::Parquet(_)));
    }
}
