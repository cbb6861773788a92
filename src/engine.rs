use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::driver::Driver;
use crate::error::{ActionError, DriverError};
use crate::input::type_text;
use crate::locator::locate;
use crate::logging::log_action;
use crate::types::{Action, ActionKind, ActionResult, ActionSpec, BatchResult, Selector};

/// Executes actions against one browser session.
///
/// The session is borrowed for the engine's lifetime and only read; actions
/// run one after another on the calling thread.
pub struct Engine<'d, D: Driver> {
    driver: &'d D,
    config: EngineConfig,
}

impl<'d, D: Driver> Engine<'d, D> {
    pub fn new(driver: &'d D, config: EngineConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and execute one wire action. Never fails outright; every
    /// problem is folded into the returned `ActionResult`.
    pub fn execute(&self, spec: &ActionSpec) -> ActionResult {
        match spec.resolve(self.config.selector_policy) {
            Ok(action) => self.execute_action(&action),
            Err(e) => {
                error!(action = %spec.action, error = %e, "rejected action");
                ActionResult::failed(e)
            }
        }
    }

    pub fn execute_action(&self, action: &Action) -> ActionResult {
        info!(
            kind = %action.kind,
            selector_kind = action.selector.kind.key(),
            selector = %action.selector.value,
            "Executing action: {} on '{}'",
            action.kind,
            action.selector.value
        );

        let result: ActionResult = self.perform(action).into();
        log_action(action.kind, &action.selector, result.success);
        result
    }

    fn perform(&self, action: &Action) -> Result<(), ActionError> {
        let element = locate(
            self.driver,
            &action.selector,
            self.config.retries,
            self.config.locate_timeout(),
        )?;

        match action.kind {
            ActionKind::SendText => {
                let text = action.payload();
                if let Err(e) =
                    type_text(self.driver, &element, text, self.config.focus_pause())
                {
                    warn!(selector = %action.selector, error = %e, "key dispatch reported a failure");
                }
                let value = self
                    .driver
                    .read_value(&element)
                    .map_err(|e| dispatch_error(&action.selector, e))?;
                if value.as_deref() == Some(text) {
                    debug!(selector = %action.selector, "CDP input verified");
                    Ok(())
                } else {
                    error!(
                        selector = %action.selector,
                        expected_len = text.chars().count(),
                        actual_len = value.as_deref().map_or(0, |v| v.chars().count()),
                        "CDP input failed verification"
                    );
                    Err(ActionError::verification_failed())
                }
            }
            ActionKind::ClickElement => self
                .driver
                .click(&element)
                .map_err(|e| dispatch_error(&action.selector, e)),
            ActionKind::UploadFile => {
                let path = action.payload();
                self.driver
                    .set_input_files(&element, &[path])
                    .map_err(|e| dispatch_error(&action.selector, e))?;
                debug!(selector = %action.selector, path, "file path sent");
                Ok(())
            }
        }
    }

    /// Run `actions` strictly in order, continuing past failures.
    pub fn run_batch(&self, actions: &[ActionSpec]) -> BatchResult {
        info!("Starting execution of {} actions.", actions.len());
        let mut results = BatchResult::default();
        let settle = if actions.len() > 1 {
            self.config.click_settle()
        } else {
            Duration::ZERO
        };

        for (index, spec) in actions.iter().enumerate() {
            let result = self.execute(spec);
            results.record(index, spec, result);

            // Tree selects need a render tick between successive clicks.
            if spec.is_click() && !settle.is_zero() {
                std::thread::sleep(settle);
            }
        }

        results.finish();
        info!("{}", results.summary);
        results
    }

    pub fn run_actions(&self, actions: &[Action]) -> BatchResult {
        let specs: Vec<ActionSpec> = actions.iter().map(ActionSpec::from).collect();
        self.run_batch(&specs)
    }

    /// Wait up to `timeout` for `selector` to appear, without retries.
    pub fn wait_for_presence(&self, selector: &Selector, timeout: Duration) -> bool {
        match self.driver.find_element(selector, timeout) {
            Ok(_) => true,
            Err(e) => {
                debug!(%selector, error = %e, "still absent after wait");
                false
            }
        }
    }
}

fn dispatch_error(selector: &Selector, err: DriverError) -> ActionError {
    error!(%selector, error = %err, "Failed to execute action on '{}'", selector.value);
    err.into()
}
