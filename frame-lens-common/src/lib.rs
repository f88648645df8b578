pub mod config;
pub use config::{Config, DisplayConfig, ExportConfig, FigureConfig, LoggingConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FrameLensError>;
