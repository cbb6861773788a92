use std::time::Duration;
use tracing::{debug, error};

use crate::driver::{Driver, KeyEvent};
use crate::error::{ActionError, DriverError};

/// Type `text` into `element` one key at a time.
///
/// Front-ends on the portal listen for keystrokes and drop values assigned
/// through the DOM, so every character goes out as key-down, char and
/// key-up on the focused element. The result only says whether dispatch
/// went through; whether the field took the text is for the caller to check.
pub fn type_text<D: Driver>(
    driver: &D,
    element: &D::Element<'_>,
    text: &str,
    focus_pause: Duration,
) -> Result<(), ActionError> {
    debug!(chars = text.chars().count(), "typing via key events");

    driver.click(element).map_err(|e| match e {
        DriverError::NotInitialized => ActionError::driver_not_initialized(),
        other => ActionError::unhandled(format!("failed to focus element: {other}")),
    })?;
    if !focus_pause.is_zero() {
        std::thread::sleep(focus_pause);
    }

    for (typed, ch) in text.chars().enumerate() {
        for event in KeyEvent::press(ch) {
            if let Err(e) = driver.dispatch_key_event(&event) {
                error!(typed, error = %e, "key dispatch failed mid-string");
                return Err(match e {
                    DriverError::NotInitialized => ActionError::driver_not_initialized(),
                    other => ActionError::unhandled(format!(
                        "key dispatch failed after {typed} of {} characters: {other}",
                        text.chars().count()
                    )),
                });
            }
        }
    }
    Ok(())
}
