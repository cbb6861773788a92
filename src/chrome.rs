use headless_chrome::browser::ConnectionClosed;
use headless_chrome::protocol::cdp::Input;
use headless_chrome::{Element, Tab};
use std::sync::Arc;
use std::time::Duration;

use crate::driver::{Driver, KeyEvent, KeyEventType};
use crate::error::DriverError;
use crate::types::Selector;

const READ_VALUE_JS: &str = "function() { return this.value; }";

/// `Driver` backed by a Chrome tab over the DevTools protocol.
///
/// A detached driver has no tab yet; every call then fails with
/// `DriverError::NotInitialized`.
#[derive(Clone, Default)]
pub struct ChromeDriver {
    tab: Option<Arc<Tab>>,
}

impl ChromeDriver {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab: Some(tab) }
    }

    pub fn detached() -> Self {
        Self { tab: None }
    }

    fn tab(&self) -> Result<&Arc<Tab>, DriverError> {
        self.tab.as_ref().ok_or(DriverError::NotInitialized)
    }
}

/// A dropped DevTools connection means the session is gone, not that the
/// element is missing; the locator must not retry it.
fn lookup_error(selector: &Selector, err: anyhow::Error) -> DriverError {
    if err.is::<ConnectionClosed>() {
        DriverError::NotInitialized
    } else {
        DriverError::NotFound(format!("{selector} ({err})"))
    }
}

fn call_error(err: anyhow::Error) -> DriverError {
    if err.is::<ConnectionClosed>() {
        DriverError::NotInitialized
    } else {
        DriverError::protocol(err)
    }
}

impl Driver for ChromeDriver {
    type Element<'a> = Element<'a>;

    fn find_element<'a>(
        &'a self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<Element<'a>, DriverError> {
        let tab = self.tab()?;
        let found = match selector.to_css() {
            Some(css) => tab.wait_for_element_with_custom_timeout(&css, timeout),
            None => tab.wait_for_xpath_with_custom_timeout(&selector.value, timeout),
        };
        found.map_err(|e| lookup_error(selector, e))
    }

    fn click(&self, element: &Element<'_>) -> Result<(), DriverError> {
        self.tab()?;
        element.click().map_err(call_error)?;
        Ok(())
    }

    fn dispatch_key_event(&self, event: &KeyEvent) -> Result<(), DriverError> {
        let tab = self.tab()?;
        let key = event.key.to_string();
        let (event_type, text, key, key_code) = match event.kind {
            KeyEventType::KeyDown => (
                Input::DispatchKeyEventTypeOption::KeyDown,
                None,
                Some(key),
                Some(event.virtual_key_code()),
            ),
            KeyEventType::Char => (Input::DispatchKeyEventTypeOption::Char, Some(key), None, None),
            KeyEventType::KeyUp => (
                Input::DispatchKeyEventTypeOption::KeyUp,
                None,
                Some(key),
                Some(event.virtual_key_code()),
            ),
        };

        tab.call_method(Input::DispatchKeyEvent {
            Type: event_type,
            modifiers: None,
            timestamp: None,
            text,
            unmodified_text: None,
            key_identifier: None,
            code: None,
            key,
            windows_virtual_key_code: key_code,
            native_virtual_key_code: None,
            auto_repeat: None,
            is_keypad: None,
            is_system_key: None,
            location: None,
            commands: None,
        })
        .map_err(call_error)?;
        Ok(())
    }

    fn read_value(&self, element: &Element<'_>) -> Result<Option<String>, DriverError> {
        self.tab()?;
        let result = element
            .call_js_fn(READ_VALUE_JS, vec![], false)
            .map_err(call_error)?;
        Ok(result.value.and_then(|v| v.as_str().map(String::from)))
    }

    fn set_input_files(&self, element: &Element<'_>, paths: &[&str]) -> Result<(), DriverError> {
        self.tab()?;
        element
            .set_input_files(paths)
            .map_err(call_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detached_driver_reports_missing_session() {
        let driver = ChromeDriver::detached();
        let found = driver.find_element(&Selector::id("username"), Duration::from_millis(10));
        assert!(matches!(found, Err(DriverError::NotInitialized)));

        let err = driver
            .dispatch_key_event(&KeyEvent::press('a')[0])
            .unwrap_err();
        assert!(matches!(err, DriverError::NotInitialized));
    }

    #[test]
    fn closed_connection_is_a_lost_session() {
        let selector = Selector::id("username");
        let closed = lookup_error(&selector, ConnectionClosed {}.into());
        assert!(matches!(closed, DriverError::NotInitialized));
        assert!(matches!(
            call_error(ConnectionClosed {}.into()),
            DriverError::NotInitialized
        ));

        let missing = lookup_error(&selector, anyhow::anyhow!("timed out"));
        assert!(matches!(missing, DriverError::NotFound(_)));
        assert!(matches!(
            call_error(anyhow::anyhow!("Node is detached")),
            DriverError::Protocol(_)
        ));
    }
}
