use crate::config::{Credentials, LoginSelectors};
use crate::types::{Action, Selector};

/// Fill the sign-in page and submit it.
pub fn login_actions(selectors: &LoginSelectors, credentials: &Credentials) -> Vec<Action> {
    vec![
        Action::send_text(
            Selector::id(selectors.username_id.clone()),
            credentials.email.clone(),
        ),
        Action::send_text(
            Selector::id(selectors.password_id.clone()),
            credentials.password.clone(),
        ),
        Action::click(Selector::id(selectors.login_button_id.clone())),
    ]
}

/// After login: pick the organization (if configured) and open the form.
pub fn apply_actions(selectors: &LoginSelectors) -> Vec<Action> {
    let mut actions = Vec::new();
    if let Some(org) = &selectors.organization_xpath {
        actions.push(Action::click(Selector::xpath(org.clone())));
    }
    actions.push(Action::click(Selector::xpath(selectors.apply_now_xpath.clone())));
    actions
}
