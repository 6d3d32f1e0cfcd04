//! Predicate values and the named predicate library.
//!
//! A predicate receives a [`PredicateInput`] and answers `true` or `false`.
//! Rules refer to predicates either by name, resolved through a
//! [`PredicateLibrary`], or by handing over a [`Predicate`] directly.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use crate::core::value::{is_empty, text};

/// Everything a predicate may look at for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PredicateInput<'a> {
    /// The field value, already coerced to text when number coercion is on.
    pub value: &'a Value,
    /// Arguments declared on the rule.
    pub args: &'a [Value],
    /// The full merged form state.
    pub state: &'a Value,
    /// Values of the fields sharing the rule's group, keyed by final path segment.
    pub group: &'a Map<String, Value>,
}

type PredicateFn = dyn Fn(&PredicateInput<'_>) -> bool + Send + Sync;

/// A shareable boolean predicate.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PredicateInput<'_>) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Predicate that only looks at the value.
    pub fn from_value_fn<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |input| f(input.value))
    }

    pub fn call(&self, input: &PredicateInput<'_>) -> bool {
        (self.0)(input)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Named predicate lookup consumed by the engine.
pub trait PredicateLibrary: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Predicate>;
}

/// A [`PredicateLibrary`] backed by a name map.
#[derive(Debug, Clone, Default)]
pub struct PredicateSet {
    predicates: HashMap<String, Predicate>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validator-style predicates shipped with the crate.
    pub fn builtin() -> Self {
        let mut set = Self::new();
        set.insert("isEmpty", Predicate::from_value_fn(is_empty));
        set.insert("equals", Predicate::new(equals));
        set.insert("contains", Predicate::new(contains));
        set.insert("matches", Predicate::new(matches));
        set.insert("isEmail", text_regex(&EMAIL_RE));
        set.insert("isURL", text_regex(&URL_RE));
        set.insert("isNumeric", text_regex(&NUMERIC_RE));
        set.insert("isInt", text_regex(&INT_RE));
        set.insert("isFloat", text_regex(&FLOAT_RE));
        set.insert("isAlpha", text_regex(&ALPHA_RE));
        set.insert("isAlphanumeric", text_regex(&ALPHANUMERIC_RE));
        set.insert("isLength", Predicate::new(is_length));
        set.insert("isIn", Predicate::new(is_in));
        set.insert("isBoolean", Predicate::from_value_fn(is_boolean));
        set.insert("groupEquals", Predicate::new(group_equals));
        set
    }

    /// Add or replace a predicate under `name`.
    pub fn insert(&mut self, name: impl Into<String>, predicate: Predicate) -> &mut Self {
        self.predicates.insert(name.into(), predicate);
        self
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }
}

impl PredicateLibrary for PredicateSet {
    fn lookup(&self, name: &str) -> Option<Predicate> {
        self.predicates.get(name).cloned()
    }
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email regex")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(?:https?|ftp)://)?(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("url regex")
});
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("numeric regex"));
static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:0|[1-9][0-9]*)$").expect("int regex"));
static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").expect("float regex")
});
static ALPHA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+$").expect("alpha regex"));
static ALPHANUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("alphanumeric regex"));

fn text_regex(re: &'static LazyLock<Regex>) -> Predicate {
    Predicate::from_value_fn(move |value| text(value).is_some_and(|s| re.is_match(s)))
}

fn first_arg<'a>(input: &PredicateInput<'a>) -> Option<&'a Value> {
    input.args.first()
}

fn equals(input: &PredicateInput<'_>) -> bool {
    match (first_arg(input), input.value) {
        (Some(expected), Value::String(actual)) => match expected {
            Value::String(s) => s == actual,
            other => other.to_string() == *actual,
        },
        (Some(expected), actual) => expected == actual,
        (None, _) => false,
    }
}

fn contains(input: &PredicateInput<'_>) -> bool {
    let Some(needle) = first_arg(input) else {
        return false;
    };
    match input.value {
        Value::String(haystack) => match needle {
            Value::String(s) => haystack.contains(s.as_str()),
            other => haystack.contains(&other.to_string()),
        },
        Value::Array(items) => items.contains(needle),
        _ => false,
    }
}

/// `matches` takes a pattern and an optional flags string; only `i` is honoured.
///
/// Registered rules use [`pattern_predicate`] instead, which compiles once.
fn matches(input: &PredicateInput<'_>) -> bool {
    let (Some(value), Some(Value::String(pattern))) = (text(input.value), first_arg(input)) else {
        return false;
    };
    compile_pattern(pattern, input.args.get(1)).is_ok_and(|re| re.is_match(value))
}

/// A `matches` predicate with `pattern` compiled up front.
pub fn pattern_predicate(
    pattern: &str,
    flags: Option<&Value>,
) -> Result<Predicate, regex::Error> {
    let re = compile_pattern(pattern, flags)?;
    Ok(Predicate::from_value_fn(move |value| {
        text(value).is_some_and(|s| re.is_match(s))
    }))
}

fn compile_pattern(pattern: &str, flags: Option<&Value>) -> Result<Regex, regex::Error> {
    let case_insensitive = flags
        .and_then(Value::as_str)
        .is_some_and(|flags| flags.contains('i'));
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
}

fn is_length(input: &PredicateInput<'_>) -> bool {
    let Some(value) = text(input.value) else {
        return false;
    };
    let len = value.chars().count() as u64;
    let bounds = first_arg(input).and_then(Value::as_object);
    let min = bounds
        .and_then(|b| b.get("min"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let max = bounds.and_then(|b| b.get("max")).and_then(Value::as_u64);
    len >= min && max.is_none_or(|max| len <= max)
}

fn is_in(input: &PredicateInput<'_>) -> bool {
    let Some(Value::Array(options)) = first_arg(input) else {
        return false;
    };
    options.iter().any(|option| match (option, input.value) {
        (Value::String(a), Value::String(b)) => a == b,
        (other, Value::String(b)) => other.to_string() == *b,
        (other, value) => other == value,
    })
}

fn is_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::String(s) => matches!(s.as_str(), "true" | "false" | "1" | "0"),
        _ => false,
    }
}

fn group_equals(input: &PredicateInput<'_>) -> bool {
    input.group.values().all(|other| other == input.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(name: &str, value: Value, args: Vec<Value>) -> bool {
        let group = Map::new();
        let state = json!({});
        let predicate = PredicateSet::builtin().lookup(name).expect("builtin");
        predicate.call(&PredicateInput {
            value: &value,
            args: &args,
            state: &state,
            group: &group,
        })
    }

    #[test]
    fn lookup_misses_unknown_names() {
        assert!(PredicateSet::builtin().lookup("isShiny").is_none());
    }

    #[test]
    fn is_empty_follows_emptiness_rules() {
        assert!(run("isEmpty", json!(""), vec![]));
        assert!(run("isEmpty", json!([]), vec![]));
        assert!(!run("isEmpty", json!("foo@bar.se"), vec![]));
    }

    #[test]
    fn is_email_accepts_plain_addresses() {
        assert!(run("isEmail", json!("foo@bar.se"), vec![]));
        assert!(!run("isEmail", json!("foo@bar"), vec![]));
        assert!(!run("isEmail", json!("not an email"), vec![]));
        assert!(!run("isEmail", json!(5), vec![]));
    }

    #[test]
    fn matches_honours_case_flag() {
        assert!(run("matches", json!("ABC"), vec![json!("^abc$"), json!("i")]));
        assert!(!run("matches", json!("ABC"), vec![json!("^abc$")]));
    }

    #[test]
    fn is_length_checks_bounds() {
        let bounds = json!({"min": 2, "max": 4});
        assert!(run("isLength", json!("abc"), vec![bounds.clone()]));
        assert!(!run("isLength", json!("a"), vec![bounds.clone()]));
        assert!(!run("isLength", json!("abcde"), vec![bounds]));
    }

    #[test]
    fn equals_compares_text_against_numeric_args() {
        assert!(run("equals", json!("5"), vec![json!(5)]));
        assert!(run("equals", json!("abc"), vec![json!("abc")]));
        assert!(!run("equals", json!("abc"), vec![]));
    }

    #[test]
    fn is_in_checks_membership() {
        let options = json!(["red", "green"]);
        assert!(run("isIn", json!("red"), vec![options.clone()]));
        assert!(!run("isIn", json!("blue"), vec![options]));
    }

    #[test]
    fn numeric_family() {
        assert!(run("isNumeric", json!("0042"), vec![]));
        assert!(!run("isInt", json!("0042"), vec![]));
        assert!(run("isInt", json!("-42"), vec![]));
        assert!(run("isFloat", json!("4.2e1"), vec![]));
        assert!(!run("isFloat", json!("four"), vec![]));
    }

    #[test]
    fn group_equals_requires_all_group_values_to_match() {
        let mut group = Map::new();
        group.insert("password".into(), json!("P1"));
        group.insert("confirmPassword".into(), json!("P1"));
        let state = json!({});
        let value = json!("P1");
        let input = PredicateInput {
            value: &value,
            args: &[],
            state: &state,
            group: &group,
        };
        let predicate = PredicateSet::builtin().lookup("groupEquals").expect("builtin");
        assert!(predicate.call(&input));

        group.insert("confirmPassword".into(), json!("Q1"));
        let input = PredicateInput {
            value: &value,
            args: &[],
            state: &state,
            group: &group,
        };
        assert!(!predicate.call(&input));
    }

    #[test]
    fn custom_predicates_can_be_inserted() {
        let mut set = PredicateSet::new();
        set.insert("isAcme", Predicate::from_value_fn(|v| v == "Acme"));
        assert!(set.contains_name("isAcme"));
        assert!(set.lookup("isAcme").is_some());
    }
}
