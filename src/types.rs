use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ActionError;

/// What an action does to its target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SendText,
    ClickElement,
    UploadFile,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SendText => "send_text",
            ActionKind::ClickElement => "click_element",
            ActionKind::UploadFile => "upload_file",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send_text" => Ok(ActionKind::SendText),
            "click_element" => Ok(ActionKind::ClickElement),
            "upload_file" => Ok(ActionKind::UploadFile),
            _ => Err(ActionError::unknown_action_type()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    Id,
    Xpath,
    CssSelector,
    ClassName,
    Name,
}

impl SelectorKind {
    /// Resolution order used when several selector keys are accepted.
    pub const PRIORITY: [SelectorKind; 5] = [
        SelectorKind::Id,
        SelectorKind::Xpath,
        SelectorKind::CssSelector,
        SelectorKind::ClassName,
        SelectorKind::Name,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SelectorKind::Id => "id",
            SelectorKind::Xpath => "xpath",
            SelectorKind::CssSelector => "css_selector",
            SelectorKind::ClassName => "class_name",
            SelectorKind::Name => "name",
        }
    }
}

/// How to treat a wire action carrying more than one selector key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorPolicy {
    /// Reject the action as an invalid selector.
    #[default]
    Strict,
    /// Take the first key in `SelectorKind::PRIORITY`.
    Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub kind: SelectorKind,
    pub value: String,
}

impl Selector {
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Xpath, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::CssSelector, value)
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::ClassName, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(SelectorKind::Name, value)
    }

    /// CSS equivalent of the selector, or `None` for XPath.
    ///
    /// Ids and names on the portal contain spaces and punctuation
    /// ("Mobile App", "din/dpin_..."), so they go through attribute
    /// selectors instead of `#id` shorthand.
    pub fn to_css(&self) -> Option<String> {
        let value = &self.value;
        match self.kind {
            SelectorKind::Id => Some(format!("[id=\"{}\"]", escape_attr(value))),
            SelectorKind::CssSelector => Some(value.clone()),
            SelectorKind::ClassName => Some(format!("[class~=\"{}\"]", escape_attr(value))),
            SelectorKind::Name => Some(format!("[name=\"{}\"]", escape_attr(value))),
            SelectorKind::Xpath => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.kind.key(), self.value)
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A typed, validated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub selector: Selector,
    pub payload: Option<String>,
}

impl Action {
    pub fn send_text(selector: Selector, text: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::SendText,
            selector,
            payload: Some(text.into()),
        }
    }

    pub fn click(selector: Selector) -> Self {
        Self {
            kind: ActionKind::ClickElement,
            selector,
            payload: None,
        }
    }

    pub fn upload_file(selector: Selector, path: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::UploadFile,
            selector,
            payload: Some(path.into()),
        }
    }

    /// Payload as text; an absent payload types or uploads the empty string.
    pub fn payload(&self) -> &str {
        self.payload.as_deref().unwrap_or("")
    }

    pub fn to_spec(&self) -> ActionSpec {
        let mut spec = ActionSpec {
            action: self.kind.as_str().to_string(),
            keys: self.payload.clone(),
            ..Default::default()
        };
        *spec.slot_mut(self.selector.kind) = Some(self.selector.value.clone());
        spec
    }
}

/// Wire form of an action as it appears in action-list files:
/// `{"action": "send_text", "id": "username", "keys": "someone@example.com"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "payload", skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
}

impl ActionSpec {
    fn slot(&self, kind: SelectorKind) -> Option<&String> {
        match kind {
            SelectorKind::Id => self.id.as_ref(),
            SelectorKind::Xpath => self.xpath.as_ref(),
            SelectorKind::CssSelector => self.css_selector.as_ref(),
            SelectorKind::ClassName => self.class_name.as_ref(),
            SelectorKind::Name => self.name.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: SelectorKind) -> &mut Option<String> {
        match kind {
            SelectorKind::Id => &mut self.id,
            SelectorKind::Xpath => &mut self.xpath,
            SelectorKind::CssSelector => &mut self.css_selector,
            SelectorKind::ClassName => &mut self.class_name,
            SelectorKind::Name => &mut self.name,
        }
    }

    /// Selector keys present on this record, in priority order.
    pub fn selectors(&self) -> Vec<Selector> {
        SelectorKind::PRIORITY
            .iter()
            .filter_map(|kind| self.slot(*kind).map(|value| Selector::new(*kind, value.clone())))
            .collect()
    }

    pub fn resolve_selector(&self, policy: SelectorPolicy) -> Result<Selector, ActionError> {
        let mut selectors = self.selectors();
        match (selectors.len(), policy) {
            (0, _) => Err(ActionError::invalid_selector()),
            (1, _) | (_, SelectorPolicy::Priority) => Ok(selectors.swap_remove(0)),
            (_, SelectorPolicy::Strict) => {
                let keys: Vec<&str> = selectors.iter().map(|s| s.kind.key()).collect();
                Err(ActionError::ambiguous_selector(&keys))
            }
        }
    }

    /// Validate the record into a typed `Action`. The selector is checked
    /// before the action kind.
    pub fn resolve(&self, policy: SelectorPolicy) -> Result<Action, ActionError> {
        let selector = self.resolve_selector(policy)?;
        let kind = self.action.parse::<ActionKind>()?;
        Ok(Action {
            kind,
            selector,
            payload: self.keys.clone(),
        })
    }

    pub fn is_click(&self) -> bool {
        self.action == ActionKind::ClickElement.as_str()
    }

    /// Copy safe to print: typed text (passwords included) is masked.
    pub fn redacted(&self) -> ActionSpec {
        let mut spec = self.clone();
        if spec.action == ActionKind::SendText.as_str() && spec.keys.is_some() {
            spec.keys = Some(REDACTED.to_string());
        }
        spec
    }
}

pub const REDACTED: &str = "<redacted>";

fn serialize_redacted<S: Serializer>(spec: &ActionSpec, serializer: S) -> Result<S::Ok, S::Error> {
    spec.redacted().serialize(serializer)
}

impl From<&Action> for ActionSpec {
    fn from(action: &Action) -> Self {
        action.to_spec()
    }
}

/// Outcome of one action. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: ActionError) -> Self {
        Self {
            success: false,
            error: Some(error),
        }
    }
}

impl From<Result<(), ActionError>> for ActionResult {
    fn from(result: Result<(), ActionError>) -> Self {
        match result {
            Ok(()) => ActionResult::ok(),
            Err(e) => ActionResult::failed(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutedAction {
    pub index: usize,
    #[serde(serialize_with = "serialize_redacted")]
    pub action: ActionSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAction {
    pub index: usize,
    #[serde(serialize_with = "serialize_redacted")]
    pub action: ActionSpec,
    pub error: ActionError,
}

/// Aggregate of one batch run: `executed.len() + failed.len()` equals the
/// number of input actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub executed: Vec<ExecutedAction>,
    pub failed: Vec<FailedAction>,
    pub summary: String,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.executed.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, index: usize, action: &ActionSpec, result: ActionResult) {
        match result.error {
            None => self.executed.push(ExecutedAction {
                index,
                action: action.clone(),
            }),
            Some(error) => self.failed.push(FailedAction {
                index,
                action: action.clone(),
                error,
            }),
        }
    }

    pub(crate) fn finish(&mut self) {
        self.summary = format!(
            "Execution summary: {}/{} actions succeeded, {} failed.",
            self.executed.len(),
            self.total(),
            self.failed.len()
        );
    }
}
