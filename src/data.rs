use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, ErrorKind as IoErrorKind};
use std::path::Path;
use tracing::error;

use crate::error::ActionError;
use crate::types::ActionSpec;

/// Read a JSON document, distinguishing a missing file from bad contents.
pub fn load_json(path: &Path) -> Result<Value, ActionError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == IoErrorKind::NotFound {
            error!(path = %path.display(), "data file not found");
            ActionError::data_file_missing(path)
        } else {
            ActionError::unhandled(format!("failed to open {}: {e}", path.display()))
        }
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        if e.is_io() {
            ActionError::unhandled(format!("failed to read {}: {e}", path.display()))
        } else {
            error!(path = %path.display(), error = %e, "error parsing data file");
            ActionError::data_file_invalid("Invalid JSON format")
        }
    })
}

/// Load an action list: a JSON array of wire-form actions.
pub fn load_actions(path: &Path) -> Result<Vec<ActionSpec>, ActionError> {
    let value = load_json(path)?;
    serde_json::from_value(value)
        .map_err(|e| ActionError::data_file_invalid(format!("Invalid action list: {e}")))
}
