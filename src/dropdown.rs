//! Multi-select tree dropdown driven by named boolean flags.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info};

use crate::config::DropdownSelectors;
use crate::data::load_json;
use crate::driver::Driver;
use crate::engine::Engine;
use crate::error::{ActionError, ErrorKind};
use crate::logging::log_step;
use crate::types::{Action, BatchResult, Selector};

pub const ACCELERATORS: &str = "accelerators";
/// Only the first four options have stable positional selectors.
pub const POSITIONAL_OPTIONS: usize = 4;

const SECTION: &str = "documentUpload";
const FIELD: &str = "subForm1Dropdown";

/// Option name → selected, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownOptions(Vec<(String, bool)>);

impl DropdownOptions {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Pull `documentUpload.subForm1Dropdown` out of the form data.
    pub fn from_form_data(data: &Value) -> Result<Self, ActionError> {
        let section = data
            .get(SECTION)
            .and_then(|s| s.get(FIELD))
            .ok_or_else(|| {
                ActionError::data_file_invalid(format!("Missing {SECTION}.{FIELD} section"))
            })?;
        let map = section.as_object().ok_or_else(|| {
            ActionError::data_file_invalid(format!("{SECTION}.{FIELD} must be an object"))
        })?;

        let mut entries = Vec::with_capacity(map.len());
        for (name, selected) in map {
            let selected = selected.as_bool().ok_or_else(|| {
                ActionError::data_file_invalid(format!("Option '{name}' must be true or false"))
            })?;
            entries.push((name.clone(), selected));
        }
        Ok(Self(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.iter().any(|(k, v)| k == name && v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    NotOpened,
    Opened,
    Selecting,
    Done,
    Failed,
}

fn advance(state: &mut DropdownState, next: DropdownState) {
    let from = *state;
    debug!(?from, to = ?next, "dropdown state");
    *state = next;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropdownReport {
    Selected(BatchResult),
    NothingSelected,
}

/// Click actions for the selected options: positions 1 to 4 by key order,
/// then the accelerators leaf when that flag is set.
pub fn selection_actions(options: &DropdownOptions, selectors: &DropdownSelectors) -> Vec<Action> {
    let mut actions = Vec::new();
    for (position, (name, selected)) in options.iter().take(POSITIONAL_OPTIONS).enumerate() {
        if selected {
            let position = position + 1;
            info!("Will select option {position}: {name}");
            actions.push(Action::click(Selector::css(selectors.option_css(position))));
        }
    }
    if options.is_selected(ACCELERATORS) {
        info!("Will select accelerators option");
        actions.push(Action::click(Selector::css(selectors.accelerators_css.clone())));
    }
    actions
}

/// Open the dropdown, then click every selected option.
///
/// A failed open click stops here; nothing else is clicked.
pub fn handle_dropdown<D: Driver>(
    engine: &Engine<'_, D>,
    options: &DropdownOptions,
    selectors: &DropdownSelectors,
) -> Result<DropdownReport, ActionError> {
    let mut state = DropdownState::NotOpened;
    log_step("Dropdown selection", &format!("{} options", options.0.len()));

    let open = engine.run_actions(&[Action::click(Selector::css(selectors.open_css.clone()))]);
    if open.executed.is_empty() {
        advance(&mut state, DropdownState::Failed);
        error!("Failed to open dropdown");
        let kind = open
            .failed
            .first()
            .map(|f| f.error.kind)
            .unwrap_or(ErrorKind::Unhandled);
        return Err(ActionError::new(kind, "Failed to open dropdown"));
    }
    advance(&mut state, DropdownState::Opened);

    let settle = engine.config().dropdown_settle();
    if !settle.is_zero() {
        engine.wait_for_presence(&Selector::css(selectors.option_list_css.clone()), settle);
    }

    advance(&mut state, DropdownState::Selecting);
    let actions = selection_actions(options, selectors);
    let report = if actions.is_empty() {
        info!("No dropdown options selected based on data file");
        DropdownReport::NothingSelected
    } else {
        let results = engine.run_actions(&actions);
        info!("Dropdown selection completed: {}", results.summary);
        DropdownReport::Selected(results)
    };
    advance(&mut state, DropdownState::Done);
    Ok(report)
}

/// Structured reply of the dropdown routine, shaped like
/// `{"success": false, "error": "Failed to open dropdown"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<BatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Result<DropdownReport, ActionError>> for Envelope {
    fn from(outcome: Result<DropdownReport, ActionError>) -> Self {
        match outcome {
            Ok(DropdownReport::Selected(results)) => Envelope {
                success: true,
                error_kind: None,
                error: None,
                results: Some(results),
                message: None,
            },
            Ok(DropdownReport::NothingSelected) => Envelope {
                success: true,
                error_kind: None,
                error: None,
                results: None,
                message: Some("No options to select".into()),
            },
            Err(e) => Envelope {
                success: false,
                error_kind: Some(e.kind),
                error: Some(e.message),
                results: None,
                message: None,
            },
        }
    }
}

/// Load options from the data file at `path` and run `handle_dropdown`.
pub fn handle_dropdown_file<D: Driver>(
    engine: &Engine<'_, D>,
    path: &Path,
    selectors: &DropdownSelectors,
) -> Envelope {
    info!("Starting subForm1Dropdown handling");
    let outcome = load_json(path)
        .and_then(|data| DropdownOptions::from_form_data(&data))
        .and_then(|options| {
            debug!(?options, "dropdown options");
            handle_dropdown(engine, &options, selectors)
        });
    if let Err(e) = &outcome {
        error!(kind = ?e.kind, "Error in dropdown handling: {e}");
    }
    outcome.into()
}
