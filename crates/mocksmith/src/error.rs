use std::path::PathBuf;

use thiserror::Error;

use crate::render::RenderError;

/// Everything that can stop a synthesis pass or a declaration load.
///
/// Each variant is a distinct kind so that batch callers can report a
/// failed interface and move on to the next one.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to read declaration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid type expression `{input}` at offset {offset}: {message}")]
    TypeSyntax {
        input: String,
        offset: usize,
        message: String,
    },

    #[error("{}: {source}", path.display())]
    Declaration {
        path: PathBuf,
        source: Box<GenerateError>,
    },

    #[error("Interface not found: {0}")]
    UnknownInterface(String),

    #[error("Generator not set up: no interface was supplied")]
    NotSetup,

    #[error("{contract}.{method}: {source}")]
    Render {
        contract: String,
        method: String,
        source: RenderError,
    },

    #[error(
        "{contract}.{method}: variadic parameter `{param}` must be a slice, found {found}"
    )]
    BadVariadic {
        contract: String,
        method: String,
        param: String,
        found: String,
    },

    #[error("Generated code is invalid: {message}")]
    Finish { message: String, text: String },
}

impl GenerateError {
    /// The raw generated text attached to a finishing failure.
    pub fn generated_text(&self) -> Option<&str> {
        match self {
            Self::Finish { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub severity: Severity,
    pub rule: String,
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        };
        write!(f, "[{prefix}] {}: {}", self.rule, self.message)?;
        if let Some(ref location) = self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}
