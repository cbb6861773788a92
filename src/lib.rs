//! Declarative form filling for the NSWS portal.
//!
//! An action list (`[{"action": "send_text", "id": "username", "keys": "..."}]`)
//! runs through [`Engine`] against a [`Driver`]: each action is located with
//! retries, performed, verified where possible, and folded into a
//! [`BatchResult`].

pub mod browser;
pub mod chrome;
pub mod config;
pub mod data;
pub mod driver;
pub mod dropdown;
pub mod engine;
pub mod error;
pub mod form;
pub mod input;
pub mod locator;
pub mod logging;
pub mod types;

pub use chrome::ChromeDriver;
pub use config::{EngineConfig, PortalConfig, Settings};
pub use driver::{Driver, KeyEvent, KeyEventType};
pub use dropdown::{DropdownOptions, DropdownReport, Envelope};
pub use engine::Engine;
pub use error::{ActionError, DriverError, ErrorKind};
pub use types::{
    Action, ActionKind, ActionResult, ActionSpec, BatchResult, Selector, SelectorKind,
    SelectorPolicy,
};
