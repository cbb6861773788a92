#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use nsws_autofill::{Driver, DriverError, EngineConfig, KeyEvent, KeyEventType, Selector};

/// An element living in the fake page.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub value: String,
    pub click_error: Option<String>,
    pub upload_error: Option<String>,
    /// Characters the page's input handler drops.
    pub swallow: Vec<char>,
    /// Input handler upper-cases what it receives.
    pub uppercase: bool,
    /// Lookups that miss before the element shows up.
    pub absent_for: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CallLog {
    pub lookups: Vec<String>,
    pub clicks: Vec<String>,
    pub keys: Vec<KeyEvent>,
    pub uploads: Vec<(String, Vec<String>)>,
}

/// In-memory page keyed by `Selector`'s display form.
#[derive(Default)]
pub struct FakeDriver {
    detached: bool,
    fail_keys_after: Option<usize>,
    elements: RefCell<HashMap<String, FakeElement>>,
    focused: RefCell<Option<String>>,
    log: RefCell<CallLog>,
    timeouts: Cell<Duration>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub fn with(self, selector: Selector, element: FakeElement) -> Self {
        self.elements
            .borrow_mut()
            .insert(selector.to_string(), element);
        self
    }

    pub fn with_element(self, selector: Selector) -> Self {
        self.with(selector, FakeElement::default())
    }

    /// Key dispatch errors once `n` events have gone through.
    pub fn fail_keys_after(mut self, n: usize) -> Self {
        self.fail_keys_after = Some(n);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.borrow().clone()
    }

    pub fn value(&self, selector: &Selector) -> String {
        self.elements.borrow()[&selector.to_string()].value.clone()
    }

    /// Sum of the timeouts passed to `find_element`.
    pub fn waited(&self) -> Duration {
        self.timeouts.get()
    }

    fn ensure_attached(&self) -> Result<(), DriverError> {
        if self.detached {
            Err(DriverError::NotInitialized)
        } else {
            Ok(())
        }
    }
}

impl Driver for FakeDriver {
    type Element<'a> = String;

    fn find_element<'a>(
        &'a self,
        selector: &Selector,
        timeout: Duration,
    ) -> Result<String, DriverError> {
        let key = selector.to_string();
        self.log.borrow_mut().lookups.push(key.clone());
        self.ensure_attached()?;
        self.timeouts.set(self.timeouts.get() + timeout);

        let mut elements = self.elements.borrow_mut();
        match elements.get_mut(&key) {
            Some(element) if element.absent_for == 0 => Ok(key),
            Some(element) => {
                element.absent_for -= 1;
                Err(DriverError::NotFound(key))
            }
            None => Err(DriverError::NotFound(key)),
        }
    }

    fn click(&self, element: &String) -> Result<(), DriverError> {
        self.ensure_attached()?;
        self.log.borrow_mut().clicks.push(element.clone());
        if let Some(message) = &self.elements.borrow()[element].click_error {
            return Err(DriverError::Protocol(message.clone()));
        }
        *self.focused.borrow_mut() = Some(element.clone());
        Ok(())
    }

    fn dispatch_key_event(&self, event: &KeyEvent) -> Result<(), DriverError> {
        self.ensure_attached()?;
        let sent = self.log.borrow().keys.len();
        if self.fail_keys_after.is_some_and(|n| sent >= n) {
            return Err(DriverError::Protocol("target closed".into()));
        }
        self.log.borrow_mut().keys.push(*event);

        if event.kind == KeyEventType::Char {
            if let Some(focused) = self.focused.borrow().as_ref() {
                let mut elements = self.elements.borrow_mut();
                let element = elements.get_mut(focused).expect("focused element exists");
                if element.uppercase {
                    element.value.extend(event.key.to_uppercase());
                } else if !element.swallow.contains(&event.key) {
                    element.value.push(event.key);
                }
            }
        }
        Ok(())
    }

    fn read_value(&self, element: &String) -> Result<Option<String>, DriverError> {
        self.ensure_attached()?;
        Ok(Some(self.elements.borrow()[element].value.clone()))
    }

    fn set_input_files(&self, element: &String, paths: &[&str]) -> Result<(), DriverError> {
        self.ensure_attached()?;
        self.log.borrow_mut().uploads.push((
            element.clone(),
            paths.iter().map(|p| p.to_string()).collect(),
        ));
        if let Some(message) = &self.elements.borrow()[element].upload_error {
            return Err(DriverError::Protocol(message.clone()));
        }
        Ok(())
    }
}

/// Default engine settings without any real pauses.
pub fn quick_config() -> EngineConfig {
    EngineConfig {
        focus_pause_ms: 0,
        click_settle_ms: 0,
        dropdown_settle_ms: 0,
        ..EngineConfig::default()
    }
}
