use thiserror::Error;
use timesheet_core::TimesheetError;
use timesheet_storage::StorageError;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Core(#[from] TimesheetError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("unsupported upload format: {0}")]
    UnsupportedFormat(String),
}

impl IngestError {
    /// Name of the required column that was absent, if that is what failed.
    pub fn missing_column(&self) -> Option<&str> {
        match self {
            IngestError::Core(TimesheetError::MissingColumn(c)) => Some(c),
            _ => None,
        }
    }
}
