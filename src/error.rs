use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Machine-readable category of an action or handler failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidSelector,
    ElementNotFound,
    VerificationFailed,
    UnknownActionType,
    DriverNotInitialized,
    DataFileMissing,
    DataFileInvalid,
    Unhandled,
}

/// A failure reported by the engine. Never propagated as a panic; always
/// carried inside an `ActionResult`, a `BatchResult` or an `Envelope`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct ActionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ActionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_selector() -> Self {
        Self::new(ErrorKind::InvalidSelector, "Invalid selector in action")
    }

    pub fn ambiguous_selector(keys: &[&str]) -> Self {
        Self::new(
            ErrorKind::InvalidSelector,
            format!(
                "Invalid selector in action: multiple selector keys ({})",
                keys.join(", ")
            ),
        )
    }

    pub fn element_not_found() -> Self {
        Self::new(ErrorKind::ElementNotFound, "Element not found")
    }

    pub fn verification_failed() -> Self {
        Self::new(ErrorKind::VerificationFailed, "CDP input verification failed")
    }

    pub fn unknown_action_type() -> Self {
        Self::new(ErrorKind::UnknownActionType, "Unknown action type")
    }

    pub fn driver_not_initialized() -> Self {
        Self::new(
            ErrorKind::DriverNotInitialized,
            "Browser driver is not initialized",
        )
    }

    /// `textdb.json file not found` for the default data file.
    pub fn data_file_missing(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(ErrorKind::DataFileMissing, format!("{name} file not found"))
    }

    pub fn data_file_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataFileInvalid, message)
    }

    pub fn unhandled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unhandled, message)
    }
}

/// Errors raised at the browser driver boundary.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("browser driver is not initialized")]
    NotInitialized,
    #[error("no element matches {0}")]
    NotFound(String),
    #[error("{0}")]
    Protocol(String),
}

impl DriverError {
    pub fn protocol(err: impl std::fmt::Display) -> Self {
        DriverError::Protocol(err.to_string())
    }
}

impl From<DriverError> for ActionError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::NotInitialized => ActionError::driver_not_initialized(),
            DriverError::NotFound(_) => ActionError::element_not_found(),
            DriverError::Protocol(message) => ActionError::unhandled(message),
        }
    }
}
