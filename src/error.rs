use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning the input archive into a [`Table`](crate::data::model::Table).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Zip file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive {} contains no data file", .0.display())]
    EmptyArchive(PathBuf),

    #[error("Unsupported data file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by table operations (column lookup, binning, grouping).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Invalid bin specification: {0}")]
    InvalidBins(String),
}

/// Errors raised while rendering a chart to an image file.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Chart '{0}' has no data to draw")]
    NoData(String),

    #[error("Chart font '{0}' could not be registered")]
    Font(String),

    #[error("Drawing chart '{name}' failed: {message}")]
    Draw { name: String, message: String },

    #[error("Encoding image failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Chart output I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}
