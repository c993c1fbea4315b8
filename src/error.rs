use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "Station block {block} (line {line_number}): header has {fields} fields, expected 6 or 7: '{line}'"
    )]
    HeaderArity {
        block: u32,
        line_number: usize,
        fields: usize,
        line: String,
    },

    #[error(
        "Station block {block} (line {line_number}): invalid {field} value '{value}' in '{line}'"
    )]
    NumericField {
        block: u32,
        line_number: usize,
        field: &'static str,
        value: String,
        line: String,
    },

    #[error(
        "Station block {block} (line {line_number}): duplicate observation for year {year}: '{line}'"
    )]
    DuplicateYear {
        block: u32,
        line_number: usize,
        year: i32,
        line: String,
    },

    #[error("Archive contains no station blocks")]
    EmptyArchive,

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    /// Station block the error points at, for format errors
    pub fn block(&self) -> Option<u32> {
        match self {
            ProcessingError::HeaderArity { block, .. }
            | ProcessingError::NumericField { block, .. }
            | ProcessingError::DuplicateYear { block, .. } => Some(*block),
            _ => None,
        }
    }

    pub fn is_format_error(&self) -> bool {
        self.block().is_some() || matches!(self, ProcessingError::EmptyArchive)
    }
}
