//! Multi-pass scenarios driven through the public `Engine` API.
//!
//! Each test feeds a sequence of partial states, the way a form binding
//! would on successive edits, and checks the persisted result after each
//! pass.

use fieldcheck::test_support::{password_pair, required_rule};
use fieldcheck::{
    Engine, EngineOptions, FieldValidationState, Predicate, RuleDeclaration, RuleInput,
    RuleTemplate,
};
use serde_json::{Value, json};

fn engine(declarations: Vec<RuleDeclaration>) -> Engine {
    Engine::new(declarations, EngineOptions::default()).expect("engine")
}

/// Signup form: required username, optional-but-valid email, matching passwords.
///
/// Pass sequence:
/// 1. Nothing typed yet: everything valid, every field present.
/// 2. Username cleared, bad email: both invalid.
/// 3. Username and email fixed, password typed: password invalid (no confirmation).
/// 4. Confirmation typed wrong: both password fields invalid.
/// 5. Confirmation fixed: form valid.
#[test]
fn signup_form_evolves_across_passes() {
    let mut declarations = vec![
        required_rule("username"),
        RuleDeclaration::field("email")
            .method("isEmail")
            .message("Not an email"),
    ];
    declarations.extend(password_pair("password"));
    let mut engine = engine(declarations);

    let result = engine.validate(json!({})).expect("pass 1");
    assert!(result.is_valid);
    for field in ["username", "email", "password", "confirmPassword"] {
        assert_eq!(result.field(field), Some(&FieldValidationState::valid()));
    }

    let result = engine
        .validate(json!({"username": "", "email": "nope"}))
        .expect("pass 2");
    assert_eq!(result.invalid_fields(), vec!["email", "username"]);

    let result = engine
        .validate(json!({"username": "ann", "email": "ann@example.com", "password": "P1"}))
        .expect("pass 3");
    assert_eq!(result.invalid_fields(), vec!["password"]);

    let result = engine
        .validate(json!({"confirmPassword": "Q1"}))
        .expect("pass 4");
    assert_eq!(result.invalid_fields(), vec!["confirmPassword", "password"]);
    assert_eq!(
        result.field("password").expect("entry").group_id.as_deref(),
        Some("password")
    );

    let result = engine
        .validate(json!({"confirmPassword": "P1"}))
        .expect("pass 5");
    assert!(result.is_valid);
    assert!(result.invalid_fields().is_empty());
}

/// Editing an unrelated field never disturbs a settled group verdict.
#[test]
fn unrelated_edits_keep_group_state() {
    let mut declarations = password_pair("pw");
    declarations.push(required_rule("username"));
    let mut engine = engine(declarations);

    engine
        .validate(json!({"password": "P1", "confirmPassword": "Q1"}))
        .expect("validate");
    let result = engine.validate(json!({"username": "ann"})).expect("validate");
    assert!(result.is_field_invalid("password"));
    assert!(result.is_field_invalid("confirmPassword"));
    assert!(!result.is_field_invalid("username"));
}

#[test]
fn named_template_registered_twice_yields_one_rule() {
    let mut engine = engine(Vec::new());
    engine
        .register_form_rules(vec![
            RuleTemplate::new("required")
                .method("isEmpty")
                .valid_when(false)
                .skip_if_empty(false),
        ])
        .expect("templates");
    let decl = RuleDeclaration::named("username", "required");
    engine
        .register_field_rules(vec![decl.clone()])
        .expect("first")
        .register_field_rules(vec![decl])
        .expect("second");
    assert_eq!(engine.rules().len(), 1);
}

#[test]
fn array_indices_address_list_items() {
    let mut engine = engine(vec![
        RuleDeclaration::field("contacts.1.email")
            .method("isEmail")
            .message("Bad contact"),
    ]);
    let result = engine
        .validate(json!({"contacts": [{"email": "a@b.se"}, {"email": "nope"}]}))
        .expect("validate");
    assert_eq!(
        result.field("contacts.1.email").expect("entry").message,
        "Bad contact"
    );
}

#[test]
fn shorthand_inputs_normalize_before_registration() {
    let mut engine = engine(Vec::new());
    engine
        .register_form_rules(vec![
            RuleTemplate::new("required")
                .method("isEmpty")
                .valid_when(false)
                .skip_if_empty(false)
                .message("Required"),
        ])
        .expect("templates");

    let short = Predicate::from_value_fn(|v: &Value| v.as_str().is_some_and(|s| s.len() <= 3));
    let input = RuleInput::from(vec![
        RuleInput::from("required"),
        RuleInput::from(short),
    ]);
    engine
        .register_field_rules(input.into_declarations("code"))
        .expect("register");

    let result = engine.validate(json!({"code": "ABCD"})).expect("validate");
    assert_eq!(result.field("code").expect("entry").message, "Invalid");

    let result = engine.validate(json!({"code": ""})).expect("validate");
    assert_eq!(result.field("code").expect("entry").message, "Required");
}

#[test]
fn result_serializes_for_bindings() {
    let mut engine = engine(vec![required_rule("username")]);
    let result = engine.validate(json!({"username": ""})).expect("validate");
    let value = serde_json::to_value(&result).expect("serialize");
    assert_eq!(
        value,
        json!({
            "is_valid": false,
            "fields": {
                "username": {"is_invalid": true, "message": "Required"}
            }
        })
    );
}
