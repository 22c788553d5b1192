//! Error types for template resolution.

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while parsing or evaluating a template.
///
/// Errors are cloneable because a session keeps the first one it sees as its
/// terminal error while also rendering it into an inline marker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template: {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("template: function {0:?} not defined")]
    UnknownFunction(String),

    #[error("template: wrong number of args for {name}: want {expected} got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("{0}")]
    Lookup(String),

    #[error("Cyclic reference {0:?}")]
    CyclicReference(String),

    #[error("template: expanding {key:?} exceeds {limit} nested references")]
    ExpansionDepth { key: String, limit: usize },

    #[error("{0}")]
    UploadDisabled(String),

    #[error("upload: {0}")]
    Upload(String),
}

impl TemplateError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Whether the error was raised while parsing, before any function ran.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::UnknownFunction(_) | Self::Arity { .. }
        )
    }

    /// Inline marker written in place of a failed substitution.
    pub fn marker(&self) -> String {
        format!("<ERROR:{}>", self)
    }
}
