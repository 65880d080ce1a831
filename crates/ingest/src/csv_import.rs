use std::io::Read;
use std::path::Path;

use timesheet_core::{CellValue, RawTable, TimesheetError};
use tracing::info;

pub struct CsvImporter;

impl CsvImporter {
    /// Read a delimited spreadsheet export into a [`RawTable`].
    ///
    /// Every cell is kept as text; empty cells become `Null`. Ragged rows are
    /// accepted and padded to the header width. Bytes that are not valid
    /// UTF-8 (Latin-1 exports) are replaced rather than failing the upload.
    pub fn import(path: &Path, delimiter: u8) -> Result<RawTable, TimesheetError> {
        let file = std::fs::File::open(path).map_err(TimesheetError::Io)?;
        let table = Self::from_reader(file, delimiter)?;
        info!("Read {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<RawTable, TimesheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .byte_headers()
            .map_err(|e| TimesheetError::Read(e.to_string()))?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim_start_matches('\u{feff}').to_string())
            .collect();
        let mut table = RawTable::new(headers);

        for result in reader.byte_records() {
            let record = result.map_err(|e| TimesheetError::Read(e.to_string()))?;
            let row = record
                .iter()
                .map(|field| {
                    let text = String::from_utf8_lossy(field);
                    if text.trim().is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::Text(text.into_owned())
                    }
                })
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }
}
