//! Template error and parameter types

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

/// Named parameters handed to the template engine
pub type Parameters = HashMap<String, String>;

/// Name of the parameter carrying the target value
pub const TARGET_PARAMETER: &str = "target";

/// Template-specific error type
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed template {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Cannot include {path}: {source}")]
    Include {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Include depth exceeded at {0}")]
    IncludeDepth(PathBuf),

    #[error("Undefined argument: {0}")]
    UndefinedArgument(String),

    #[error("Undefined property: {0}")]
    UndefinedProperty(String),

    #[error("Invalid expression: {0}")]
    Expression(String),

    #[error("Unsupported directive: xacro:{0}")]
    UnsupportedDirective(String),

    #[error("Missing attribute '{attribute}' on xacro:{directive}")]
    MissingAttribute {
        directive: String,
        attribute: &'static str,
    },

    #[error("Failed to write document: {0}")]
    Output(String),
}

/// Result type for template operations
pub type RenderResult<T> = Result<T, RenderError>;
