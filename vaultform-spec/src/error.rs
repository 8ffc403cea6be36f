use thiserror::Error;

/// Result alias for reconciler operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Canonical error surface for reconcilers and codecs.
///
/// A remote object that does not exist is never an error: transports and
/// reconcilers model absence as `Option::None` so that callers can clear
/// local state instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid value for {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} expects a {expected} value")]
    WrongKind {
        field: &'static str,
        expected: &'static str,
    },
    #[error("error during {op} at {path}: {message}")]
    Transport {
        op: &'static str,
        path: String,
        message: String,
    },
    #[error("malformed response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn transport(op: &'static str, path: impl Into<String>, message: impl ToString) -> Self {
        Error::Transport {
            op,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl ToString) -> Self {
        Error::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error was produced before any remote call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::MissingField { .. } | Error::WrongKind { .. }
        )
    }
}
