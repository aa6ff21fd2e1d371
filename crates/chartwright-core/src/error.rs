//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Template not found: {path}")]
    TemplateNotFound { path: String },

    #[error("Invalid Template.yaml: {message}")]
    InvalidTemplate { message: String },

    #[error("Version not found: {name}")]
    VersionNotFound { name: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Certificate parse error: {message}")]
    CertificateParse { message: String },

    #[error("Values error: {message}")]
    Values { message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
