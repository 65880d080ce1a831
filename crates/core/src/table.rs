use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TimesheetError;

/// Loosely typed cell value. Spreadsheet exports mix text, numbers and dates
/// in the same column, so nothing is coerced until the normalizer runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Null,
}

impl CellValue {
    /// True for `Null` and for text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as trimmed free text. Blank cells yield `None`.
    /// Integral floats drop their fractional part so a ticket number read
    /// back as `12345.0` stays `12345`.
    pub fn to_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                format!("{}", *f as i64)
            }
            other => other.to_string(),
        })
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

/// A raw upload: header row plus data rows, exactly as read from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Null` so every row is as wide
    /// as the header.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() < self.headers.len() {
            row.resize(self.headers.len(), CellValue::Null);
        }
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, matched exactly after trimming whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Like [`column_index`](Self::column_index) but a missing column is a
    /// [`TimesheetError::MissingColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize, TimesheetError> {
        self.column_index(name)
            .ok_or_else(|| TimesheetError::MissingColumn(name.to_string()))
    }

    /// Cell at `(row, col)`; out-of-range positions read as `Null`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static NULL: CellValue = CellValue::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL)
    }
}
