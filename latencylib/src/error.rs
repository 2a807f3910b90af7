use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Raised when the measurement file can't be read as three numeric columns
///
/// Rows are numbered from 1, as they are in the file
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("Couldn't open the measurement file at path {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Couldn't memory map the measurement file: {0}")]
    Map(#[source] io::Error),
    #[error("Couldn't read row {row}: {source}")]
    Read { row: u64, source: csv::Error },
    #[error("Row {row} has {found} columns, expected 3")]
    ColumnCount { row: u64, found: usize },
    #[error("Row {row}, column {column}: {value:?} is not a finite number")]
    NotNumeric { row: u64, column: usize, value: String },
}

/// Raised when a cache hierarchy configuration can't be used
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Couldn't open the config file at path {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Couldn't parse the config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid cache size {0:?}, expected a number optionally followed by B, KiB, MiB or GiB")]
    InvalidSize(String),
    #[error("Cache {0} has a core count of zero")]
    ZeroCores(String),
}

/// Raised when the chart can't be drawn
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No measurement has a positive size and latency, nothing can be drawn on a log scale")]
    NoDrawableData,
    #[error("Unsupported image format {0:?}, use svg, png, bmp or jpg")]
    UnsupportedFormat(String),
    #[error("Couldn't draw the chart: {0}")]
    Draw(String),
}
