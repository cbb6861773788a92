use std::time::Duration;

use crate::error::DriverError;
use crate::types::Selector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventType {
    KeyDown,
    Char,
    KeyUp,
}

/// One synthetic keyboard event for a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventType,
    pub key: char,
}

impl KeyEvent {
    /// Key-down, char and key-up for `key`, in dispatch order.
    pub fn press(key: char) -> [KeyEvent; 3] {
        [
            KeyEvent {
                kind: KeyEventType::KeyDown,
                key,
            },
            KeyEvent {
                kind: KeyEventType::Char,
                key,
            },
            KeyEvent {
                kind: KeyEventType::KeyUp,
                key,
            },
        ]
    }

    /// Windows virtual key code sent alongside key-down/key-up: the
    /// character's code point, which is what the portal's handlers read.
    pub fn virtual_key_code(&self) -> u32 {
        self.key as u32
    }
}

/// The browser session as seen by the engine.
///
/// Implementations block until each call completes. `find_element` waits at
/// most `timeout` for the element to be present in the document.
pub trait Driver {
    type Element<'a>
    where
        Self: 'a;

    fn find_element<'a>(
        &'a self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Self::Element<'a>, DriverError>;

    fn click(&self, element: &Self::Element<'_>) -> Result<(), DriverError>;

    /// Dispatch to whatever element currently has focus.
    fn dispatch_key_event(&self, event: &KeyEvent) -> Result<(), DriverError>;

    /// Current `value` property of a form control.
    fn read_value(&self, element: &Self::Element<'_>) -> Result<Option<String>, DriverError>;

    /// Native path injection into an `<input type=file>`.
    fn set_input_files(
        &self,
        element: &Self::Element<'_>,
        paths: &[&str],
    ) -> Result<(), DriverError>;
}
