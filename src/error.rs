use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("CSV must contain columns [\"price\", \"symbol\", \"timestamp\"]; got {found:?}")]
    MissingColumns { found: Vec<String> },

    #[error("unsupported timestamp format: {0:?}")]
    Timestamp(String),

    #[error("row {row}: price {raw:?} is not a finite number")]
    Price { row: usize, raw: String },

    #[error("row {row}: symbol is empty")]
    EmptySymbol { row: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
