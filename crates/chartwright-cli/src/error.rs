//! CLI error types with exit code handling
//!
//! Every command failure that should end with a specific exit code is a
//! [`CliError`]; `main` recovers it from the `miette::Report` to pick the code.

use chartwright_core::CoreError;
use chartwright_engine::EngineError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Validation failed (TLS material, integrity checks)
    #[error("Validation failed: {message}")]
    #[diagnostic(code(chartwright::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Rendering failed
    #[error("Render error: {message}")]
    #[diagnostic(code(chartwright::cli::render))]
    Render { message: String },

    /// Template directory or version file could not be loaded
    #[error("Template error: {message}")]
    #[diagnostic(code(chartwright::cli::template))]
    Template {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Invalid combination of arguments
    #[error("{message}")]
    #[diagnostic(code(chartwright::cli::usage))]
    Usage { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartwright::cli::io))]
    Io { message: String },

    /// Anything else
    #[error("{message}")]
    #[diagnostic(code(chartwright::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Render { .. } => exit_codes::RENDER_ERROR,
            CliError::Template { .. } => exit_codes::TEMPLATE_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an IO error, naming what was being accessed
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context, err),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::TemplateNotFound { .. } | CoreError::InvalidTemplate { .. } => {
                CliError::Template {
                    message: err.to_string(),
                    help: Some(
                        "a template directory needs a Template.yaml with apiVersion: chartwright/v1"
                            .to_string(),
                    ),
                }
            }
            CoreError::VersionNotFound { .. } | CoreError::YamlParse(_) => CliError::Template {
                message: err.to_string(),
                help: None,
            },
            CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            CoreError::Values { .. } => CliError::Usage {
                message: err.to_string(),
            },
            other => CliError::Other {
                message: other.to_string(),
            },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Template(te) => CliError::Render {
                message: format!("{:?}", miette::Report::new(te)),
            },
            other => CliError::Render {
                message: other.to_string(),
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
