use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
