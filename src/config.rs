//! Portal constants and engine tuning.
//!
//! Defaults reproduce the production portal; a JSON settings file and
//! `NSWS_*` environment variables override them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use crate::types::SelectorPolicy;

pub const DEFAULT_DATA_FILE: &str = "textdb.json";

const LOGIN_URL: &str = "https://www.nsws.gov.in/auth/realms/madhyam/protocol/openid-connect/auth?client_id=portal-prod&redirect_uri=https%3A%2F%2Fwww.nsws.gov.in%2Fportal%2Flogin&response_mode=fragment&response_type=code&scope=openid";

const TREE_LIST: &str =
    "body > div:nth-child(19) > div > div > div > div > div > div.ant-select-tree-list > div > div > div";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{0} not set in environment")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lookup attempts per action.
    pub retries: u32,
    pub locate_timeout_ms: u64,
    /// Pause between focusing a field and the first key event.
    pub focus_pause_ms: u64,
    /// Pause after each click in a multi-action batch.
    pub click_settle_ms: u64,
    /// Upper bound on waiting for an opened dropdown to render.
    pub dropdown_settle_ms: u64,
    pub selector_policy: SelectorPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            locate_timeout_ms: 10_000,
            focus_pause_ms: 100,
            click_settle_ms: 500,
            dropdown_settle_ms: 1_000,
            selector_policy: SelectorPolicy::Strict,
        }
    }
}

impl EngineConfig {
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_millis(self.locate_timeout_ms)
    }

    /// Set the per-attempt lookup timeout from whole seconds, clamping
    /// instead of overflowing.
    pub fn set_locate_timeout_secs(&mut self, secs: u64) {
        self.locate_timeout_ms = secs.saturating_mul(1_000);
    }

    pub fn focus_pause(&self) -> Duration {
        Duration::from_millis(self.focus_pause_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn dropdown_settle(&self) -> Duration {
        Duration::from_millis(self.dropdown_settle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    pub username_id: String,
    pub password_id: String,
    pub login_button_id: String,
    /// Organization tile clicked after login, when the account has several.
    pub organization_xpath: Option<String>,
    pub apply_now_xpath: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username_id: "username".into(),
            password_id: "userPassword".into(),
            login_button_id: "kc-login".into(),
            organization_xpath: None,
            apply_now_xpath: "//button[normalize-space()='Apply Now']".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownSelectors {
    /// Search input that opens the tree select.
    pub open_css: String,
    /// Option row; `{i}` is replaced with the 1-based position.
    pub option_template: String,
    /// Last leaf of the tree, used for the `accelerators` option.
    pub accelerators_css: String,
    /// Present once the option list has rendered.
    pub option_list_css: String,
}

impl Default for DropdownSelectors {
    fn default() -> Self {
        Self {
            open_css: "div.ant-select-selection-overflow .ant-select-selection-search-input".into(),
            option_template: format!("{TREE_LIST} > div:nth-child({{i}})"),
            accelerators_css: format!(
                "{TREE_LIST} > div.ant-select-tree-treenode.ant-select-tree-treenode-switcher-close.ant-select-tree-treenode-leaf-last"
            ),
            option_list_css: "div.ant-select-tree-list".into(),
        }
    }
}

impl DropdownSelectors {
    pub fn option_css(&self, position: usize) -> String {
        self.option_template.replace("{i}", &position.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Waits {
    pub medium_secs: u64,
    pub long_secs: u64,
    pub form_load_secs: u64,
}

impl Default for Waits {
    fn default() -> Self {
        Self {
            medium_secs: 10,
            long_secs: 30,
            form_load_secs: 7,
        }
    }
}

impl Waits {
    pub fn medium(&self) -> Duration {
        Duration::from_secs(self.medium_secs)
    }

    pub fn long(&self) -> Duration {
        Duration::from_secs(self.long_secs)
    }

    pub fn form_load(&self) -> Duration {
        Duration::from_secs(self.form_load_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
    pub data_file: PathBuf,
    pub login: LoginSelectors,
    pub dropdown: DropdownSelectors,
    pub waits: Waits,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.into(),
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            login: LoginSelectors::default(),
            dropdown: DropdownSelectors::default(),
            waits: Waits::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub portal: PortalConfig,
    pub engine: EngineConfig,
}

impl Settings {
    /// Defaults, overlaid with the JSON file at `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `NSWS_LOGIN_URL`, `NSWS_DATA_FILE` and `NSWS_ORGANIZATION_XPATH`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("NSWS_LOGIN_URL") {
            self.portal.login_url = url;
        }
        if let Some(file) = var("NSWS_DATA_FILE") {
            self.portal.data_file = PathBuf::from(file);
        }
        if let Some(xpath) = var("NSWS_ORGANIZATION_XPATH") {
            self.portal.login.organization_xpath = Some(xpath);
        }
    }
}

/// Portal account used by the login actions.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        let email =
            std::env::var("NSWS_EMAIL").map_err(|_| ConfigError::MissingVar("NSWS_EMAIL"))?;
        let password = std::env::var("NSWS_PASSWORD")
            .map_err(|_| ConfigError::MissingVar("NSWS_PASSWORD"))?;
        Ok(Self { email, password })
    }
}
