// ABOUTME: Error types for placeholder scanning and substitution
// ABOUTME: Defines failures for strict rendering, variable parsing, and variables files

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Unresolved placeholders: {}", .names.join(", "))]
    MissingVariables { names: Vec<String> },

    #[error("Invalid variable format '{0}'. Expected 'key=value'")]
    InvalidVariable(String),

    #[error("Variable '{key}' must be a string, number, boolean or null")]
    NonScalarValue { key: String },

    #[error("Variables file must contain a mapping at the top level")]
    NotAMapping,

    #[error("Unsupported variable key: {0}")]
    InvalidKey(String),

    #[error("Unknown placeholder syntax '{0}'. Expected auto, mustache or bracket")]
    UnknownSyntax(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
