//! Error types for the measurement harness.

use mongodb::bson;
use thiserror::Error;

/// Result type used throughout the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Every failure the harness can hit. All of them abort the sweep.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// The storage server could not be reached.
    #[error("failed to connect to storage: {0}")]
    Connection(String),

    /// A document could not be encoded to BSON.
    #[error("failed to calculate document size: {0}")]
    Serialization(#[from] bson::ser::Error),

    /// An insert, update or delete failed.
    #[error("write failed: {0}")]
    Write(String),

    /// A find failed, or a document that should exist was missing.
    #[error("read failed: {0}")]
    Read(String),

    /// Invalid harness configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing result lines failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
