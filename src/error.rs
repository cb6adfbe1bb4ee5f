//! Error types for burn severity computations

use thiserror::Error;

/// Main error type for index calculation and registry operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A calculator received a period combination it cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The calculation context lacks a band mapping or a band role
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Calculator for index '{0}' already exists")]
    AlreadyExists(String),

    #[error("Calculator for index '{0}' doesn't exist. Use add_calculator() instead")]
    NotFound(String),

    #[error("Calculator index name '{found}' doesn't match requested '{expected}'")]
    NameMismatch { expected: String, found: String },

    #[error("Band '{0}' not present in raster")]
    BandNotFound(String),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Failure reported by an asset store collaborator
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Job queue is closed")]
    QueueClosed,
}

/// Result type alias for burn severity operations
pub type Result<T> = std::result::Result<T, Error>;
