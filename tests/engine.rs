mod common;

use common::{FakeDriver, FakeElement, quick_config};
use nsws_autofill::config::{Credentials, LoginSelectors};
use nsws_autofill::{
    Action, ActionSpec, Engine, ErrorKind, KeyEvent, KeyEventType, Selector, SelectorPolicy, form,
};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

fn spec(json: &str) -> ActionSpec {
    serde_json::from_str(json).unwrap()
}

#[test]
fn send_text_dispatches_three_events_per_character_in_order() {
    let field = Selector::id("username");
    let driver = FakeDriver::new().with_element(field.clone());
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field.clone(), "ab"));

    assert!(result.success, "{:?}", result.error);
    let log = driver.log();
    assert_eq!(log.clicks, vec![field.to_string()]);
    let expected: Vec<KeyEvent> = KeyEvent::press('a')
        .into_iter()
        .chain(KeyEvent::press('b'))
        .collect();
    assert_eq!(log.keys, expected);
    assert_eq!(log.keys[1].kind, KeyEventType::Char);
    assert_eq!(driver.value(&field), "ab");
}

#[test]
fn send_text_fails_verification_when_page_drops_keys() {
    let field = Selector::name("mobile_app");
    let driver = FakeDriver::new().with(
        field.clone(),
        FakeElement {
            swallow: vec![' '],
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field, "Mobile App"));

    assert!(!result.success);
    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::VerificationFailed);
    assert_eq!(error.message, "CDP input verification failed");
}

#[test]
fn verification_is_exact_on_existing_content() {
    let field = Selector::id("Website");
    let driver = FakeDriver::new().with(
        field.clone(),
        FakeElement {
            value: "https://".into(),
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field, "example.org"));

    assert_eq!(result.error.unwrap().kind, ErrorKind::VerificationFailed);
}

#[test]
fn verification_is_case_sensitive() {
    let field = Selector::id("companyName");
    let driver = FakeDriver::new().with(
        field.clone(),
        FakeElement {
            uppercase: true,
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field.clone(), "Acme"));

    assert_eq!(result.error.unwrap().kind, ErrorKind::VerificationFailed);
    assert_eq!(driver.value(&field), "ACME");
}

#[test]
fn verification_is_whitespace_sensitive() {
    let field = Selector::id("companyName");
    let driver = FakeDriver::new().with(
        field.clone(),
        FakeElement {
            value: " ".into(),
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field, "Acme"));

    assert_eq!(result.error.unwrap().kind, ErrorKind::VerificationFailed);
}

#[test]
fn verification_decides_even_when_dispatch_reports_failure() {
    // Fails on the final key-up, after both characters reached the field.
    let field = Selector::id("Name");
    let driver = FakeDriver::new().with_element(field.clone()).fail_keys_after(5);
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field.clone(), "Jo"));

    assert!(result.success);
    assert_eq!(driver.value(&field), "Jo");
    assert_eq!(driver.log().keys.len(), 5);
}

#[test]
fn mid_string_dispatch_failure_surfaces_through_verification() {
    let field = Selector::id("Name");
    let driver = FakeDriver::new().with_element(field.clone()).fail_keys_after(3);
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::send_text(field.clone(), "Jo"));

    assert_eq!(result.error.unwrap().kind, ErrorKind::VerificationFailed);
    assert_eq!(driver.value(&field), "J");
}

#[test]
fn click_error_message_is_preserved() {
    let button = Selector::id("kc-login");
    let driver = FakeDriver::new().with(
        button.clone(),
        FakeElement {
            click_error: Some("Element is not clickable at point (10, 20)".into()),
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::click(button));

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Unhandled);
    assert_eq!(error.message, "Element is not clickable at point (10, 20)");
}

#[test]
fn upload_injects_path_without_typing() {
    let input = Selector::css("input[type=file]");
    let driver = FakeDriver::new().with_element(input.clone());
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::upload_file(input.clone(), "/tmp/pitch deck.pdf"));

    assert!(result.success);
    let log = driver.log();
    assert!(log.keys.is_empty());
    assert!(log.clicks.is_empty());
    assert_eq!(
        log.uploads,
        vec![(input.to_string(), vec!["/tmp/pitch deck.pdf".to_string()])]
    );
}

#[test]
fn upload_failure_is_reported() {
    let input = Selector::css("input[type=file]");
    let driver = FakeDriver::new().with(
        input.clone(),
        FakeElement {
            upload_error: Some("Not a file input".into()),
            ..FakeElement::default()
        },
    );
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::upload_file(input, "/tmp/a.pdf"));

    assert_eq!(result.error.unwrap().message, "Not a file input");
}

#[test]
fn missing_element_skips_the_action() {
    let driver = FakeDriver::new();
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::click(Selector::xpath("//button")));

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::ElementNotFound);
    assert_eq!(error.message, "Element not found");
    let log = driver.log();
    assert_eq!(log.lookups.len(), 3);
    assert!(log.clicks.is_empty());
}

#[test]
fn selectorless_action_is_invalid_and_never_looked_up() {
    let driver = FakeDriver::new();
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute(&spec(r#"{"action": "click_element", "keys": "x"}"#));

    assert_eq!(result.error.unwrap().kind, ErrorKind::InvalidSelector);
    assert!(driver.log().lookups.is_empty());
}

#[test]
fn multiple_selectors_follow_the_configured_policy() {
    let raw = spec(r#"{"action": "click_element", "name": "login", "id": "kc-login"}"#);
    let driver = FakeDriver::new().with_element(Selector::id("kc-login"));

    let strict = Engine::new(&driver, quick_config());
    assert_eq!(
        strict.execute(&raw).error.unwrap().kind,
        ErrorKind::InvalidSelector
    );

    let mut config = quick_config();
    config.selector_policy = SelectorPolicy::Priority;
    let priority = Engine::new(&driver, config);
    assert!(priority.execute(&raw).success);
    assert_eq!(driver.log().clicks, vec![Selector::id("kc-login").to_string()]);
}

#[test]
fn unknown_action_kind_is_rejected() {
    let driver = FakeDriver::new().with_element(Selector::id("x"));
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute(&spec(r#"{"action": "double_click", "id": "x"}"#));

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::UnknownActionType);
    assert_eq!(error.message, "Unknown action type");
}

#[test]
fn detached_driver_reports_not_initialized_without_retrying() {
    let driver = FakeDriver::detached();
    let engine = Engine::new(&driver, quick_config());

    let result = engine.execute_action(&Action::click(Selector::id("kc-login")));

    assert_eq!(result.error.unwrap().kind, ErrorKind::DriverNotInitialized);
    assert_eq!(driver.log().lookups.len(), 1);
}

#[test]
fn batch_continues_past_failures_and_counts_every_action() {
    let driver = FakeDriver::new()
        .with_element(Selector::id("username"))
        .with_element(Selector::id("userPassword"))
        .with_element(Selector::id("kc-login"));
    let engine = Engine::new(&driver, quick_config());

    let actions = vec![
        spec(r#"{"action": "send_text", "id": "username", "keys": "ops@example.com"}"#),
        spec(r#"{"action": "click_element", "id": "missing"}"#),
        spec(r#"{"action": "send_text", "id": "userPassword", "keys": "pw"}"#),
        spec(r#"{"action": "click_element"}"#),
        spec(r#"{"action": "click_element", "id": "kc-login"}"#),
    ];
    let results = engine.run_batch(&actions);

    assert_eq!(results.executed.len() + results.failed.len(), actions.len());
    let executed: Vec<usize> = results.executed.iter().map(|e| e.index).collect();
    let failed: Vec<usize> = results.failed.iter().map(|f| f.index).collect();
    assert_eq!(executed, vec![0, 2, 4]);
    assert_eq!(failed, vec![1, 3]);
    assert_eq!(results.failed[0].error.kind, ErrorKind::ElementNotFound);
    assert_eq!(results.failed[1].error.kind, ErrorKind::InvalidSelector);
    assert_eq!(results.failed[1].action, actions[3]);
    assert_eq!(
        results.summary,
        "Execution summary: 3/5 actions succeeded, 2 failed."
    );
}

#[test]
fn empty_batch_has_zero_summary() {
    let driver = FakeDriver::new();
    let engine = Engine::new(&driver, quick_config());

    let results = engine.run_batch(&[]);

    assert_eq!(results.total(), 0);
    assert_eq!(
        results.summary,
        "Execution summary: 0/0 actions succeeded, 0 failed."
    );
}

#[test]
fn batch_result_serializes_with_wire_actions() {
    let driver = FakeDriver::new().with_element(Selector::id("kc-login"));
    let engine = Engine::new(&driver, quick_config());

    let results = engine.run_actions(&[Action::click(Selector::id("kc-login"))]);

    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        serde_json::json!({
            "executed": [{"index": 0, "action": {"action": "click_element", "id": "kc-login"}}],
            "failed": [],
            "summary": "Execution summary: 1/1 actions succeeded, 0 failed."
        })
    );
}

#[test]
fn login_batch_output_masks_the_password() {
    let selectors = LoginSelectors::default();
    let driver = FakeDriver::new()
        .with_element(Selector::id(selectors.username_id.clone()))
        .with(
            Selector::id(selectors.password_id.clone()),
            FakeElement {
                swallow: vec!['2'],
                ..FakeElement::default()
            },
        )
        .with_element(Selector::id(selectors.login_button_id.clone()));
    let engine = Engine::new(&driver, quick_config());
    let credentials = Credentials {
        email: "ops@example.com".into(),
        password: "hunter2-SECRET".into(),
    };

    let results = engine.run_actions(&form::login_actions(&selectors, &credentials));

    // The password field drops a key, so it shows up among the failures too.
    assert_eq!(results.failed.len(), 1);
    let out = serde_json::to_string_pretty(&[&results]).unwrap();
    assert!(!out.contains("hunter2-SECRET"), "{out}");
    assert!(!out.contains("ops@example.com"), "{out}");
    assert!(out.contains("<redacted>"));
    assert_eq!(
        results.failed[0].action.keys.as_deref(),
        Some("hunter2-SECRET")
    );
}

fn click_settle_config(settle_ms: u64) -> nsws_autofill::EngineConfig {
    let mut config = quick_config();
    config.click_settle_ms = settle_ms;
    config
}

#[test]
fn single_click_batch_does_not_settle() {
    let driver = FakeDriver::new().with_element(Selector::id("kc-login"));
    let engine = Engine::new(&driver, click_settle_config(300));

    let started = Instant::now();
    let results = engine.run_actions(&[Action::click(Selector::id("kc-login"))]);

    assert!(results.all_succeeded());
    assert!(started.elapsed() < Duration::from_millis(300));
}

#[test]
fn multi_action_batch_settles_after_each_click() {
    let driver = FakeDriver::new()
        .with_element(Selector::id("username"))
        .with_element(Selector::id("kc-login"));
    let engine = Engine::new(&driver, click_settle_config(200));

    let started = Instant::now();
    let results = engine.run_actions(&[
        Action::click(Selector::id("kc-login")),
        Action::click(Selector::id("kc-login")),
        Action::send_text(Selector::id("username"), "a"),
    ]);

    assert!(results.all_succeeded());
    assert!(started.elapsed() >= Duration::from_millis(400));
}
