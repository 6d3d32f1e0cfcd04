//! Process-wide template registration.
//!
//! These tests share the global scope, so they run serially and reset it
//! before and after use.

use fieldcheck::{Engine, EngineOptions, FieldcheckError, RuleDeclaration, RuleTemplate};
use serde_json::json;
use serial_test::serial;

fn required_template() -> RuleTemplate {
    RuleTemplate::new("required")
        .method("isEmpty")
        .valid_when(false)
        .skip_if_empty(false)
        .message("Required")
}

#[test]
#[serial]
fn global_templates_reach_new_engines() {
    Engine::clear_global_rules();
    Engine::register_global_rules(vec![required_template()]).expect("globals");

    let mut engine = Engine::new(
        vec![RuleDeclaration::named("username", "required")],
        EngineOptions::default(),
    )
    .expect("engine");
    let result = engine.validate(json!({"username": ""})).expect("validate");
    assert_eq!(result.field("username").expect("entry").message, "Required");

    Engine::clear_global_rules();
}

#[test]
#[serial]
fn cleared_globals_no_longer_resolve() {
    Engine::clear_global_rules();
    Engine::register_global_rules(vec![required_template()]).expect("globals");
    Engine::clear_global_rules();

    let err = Engine::new(
        vec![RuleDeclaration::named("username", "required")],
        EngineOptions::default(),
    )
    .err()
    .expect("template gone");
    assert!(matches!(err, FieldcheckError::UnknownTemplate { .. }));
}

#[test]
#[serial]
fn form_templates_do_not_leak_into_global_scope() {
    Engine::clear_global_rules();
    let mut first = Engine::new(Vec::new(), EngineOptions::default()).expect("engine");
    first
        .register_form_rules(vec![required_template()])
        .expect("form");

    let err = Engine::new(
        vec![RuleDeclaration::named("username", "required")],
        EngineOptions::default(),
    )
    .err()
    .expect("form template is private");
    assert!(matches!(err, FieldcheckError::UnknownTemplate { .. }));
}

#[test]
#[serial]
fn re_registering_a_global_name_replaces_it() {
    Engine::clear_global_rules();
    Engine::register_global_rules(vec![required_template()]).expect("globals");
    Engine::register_global_rules(vec![required_template().message("Fill this in")])
        .expect("globals");

    let mut engine = Engine::new(
        vec![RuleDeclaration::named("username", "required")],
        EngineOptions::default(),
    )
    .expect("engine");
    let result = engine.validate(json!({"username": ""})).expect("validate");
    assert_eq!(
        result.field("username").expect("entry").message,
        "Fill this in"
    );

    Engine::clear_global_rules();
}
