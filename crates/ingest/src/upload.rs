use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use timesheet_core::RawTable;

use crate::csv_import::CsvImporter;
use crate::error::IngestError;
use crate::parquet_import::ParquetImporter;
use crate::xlsx_import::XlsxImporter;

/// Container format of an uploaded spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadFormat {
    Csv,
    Tsv,
    Parquet,
    Xlsx,
}

impl UploadFormat {
    /// Infer the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
            .map_err(|_| IngestError::UnsupportedFormat(path.display().to_string()))
    }

    /// Read `path` as this format. `csv_delimiter` only applies to CSV.
    pub fn read(self, path: &Path, csv_delimiter: u8) -> Result<RawTable, IngestError> {
        let table = match self {
            UploadFormat::Csv => CsvImporter::import(path, csv_delimiter)?,
            UploadFormat::Tsv => CsvImporter::import(path, b'\t')?,
            UploadFormat::Parquet => ParquetImporter::import(path)?,
            UploadFormat::Xlsx => XlsxImporter::import(path)?,
        };
        Ok(table)
    }
}

impl FromStr for UploadFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(UploadFormat::Csv),
            "tsv" | "tab" => Ok(UploadFormat::Tsv),
            "parquet" | "pq" => Ok(UploadFormat::Parquet),
            "xlsx" | "xlsm" | "xls" => Ok(UploadFormat::Xlsx),
            other => Err(format!(
                "unknown upload format '{}' (expected csv, tsv, parquet or xlsx)",
                other
            )),
        }
    }
}

impl std::fmt::Display for UploadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadFormat::Csv => write!(f, "csv"),
            UploadFormat::Tsv => write!(f, "tsv"),
            UploadFormat::Parquet => write!(f, "parquet"),
            UploadFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}
