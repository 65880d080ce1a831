use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimesheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is absent from the upload. Fatal for the whole batch.
    #[error("required column '{0}' not found in upload")]
    MissingColumn(String),

    #[error("failed to read upload: {0}")]
    Read(String),

    #[error("Parquet error: {0}")]
    Parquet(String),

    #[error("workbook error: {0}")]
    Workbook(String),
}
