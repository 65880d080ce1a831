use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use timesheet_core::{CellValue, RawTable, TimesheetError};
use tracing::info;

pub struct XlsxImporter;

impl XlsxImporter {
    /// Read the first worksheet of a workbook into a [`RawTable`].
    ///
    /// The first row holds the headers. Date-formatted cells become
    /// `CellValue::Date`; error cells and empty strings become `Null`.
    pub fn import(path: &Path) -> Result<RawTable, TimesheetError> {
        let workbook_err = |e: calamine::Error| TimesheetError::Workbook(e.to_string());

        let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                TimesheetError::Workbook(format!("{} has no worksheets", path.display()))
            })?
            .map_err(workbook_err)?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|cell| cell_value(cell).to_string()).collect())
            .unwrap_or_default();
        let mut table = RawTable::new(headers);

        for row in rows {
            table.push_row(row.iter().map(cell_value).collect());
        }

        info!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::Text(s.clone())
        }
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Float(dt.as_f64()),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| CellValue::Date(d.date()))
            .unwrap_or_else(|| CellValue::Float(dt.as_f64())),
    }
}
