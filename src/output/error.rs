// ABOUTME: Error types for output handling operations
// ABOUTME: Defines specific error types for formatting and writing command results

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Unknown output format '{format}'. Expected text, json or yaml")]
    UnknownFormat { format: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlSerializationError(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OutputError>;
