//! Static, ordered predicate tables keyed by field name.
//!
//! Each field owns an ordered list of independent checks. The engine stops at
//! the first failing check, so a field reports at most one message and the
//! "required" check must come before any format check.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// A single check over a field's submitted value.
#[derive(Clone, Copy)]
pub struct Rule {
    pub test: fn(&Value) -> bool,
    pub message: &'static str,
}

pub const EXPERIENCE_MIN_CHARS: usize = 50;
pub const EXPERIENCE_MESSAGE: &str = "Work experience should be descriptive (about 50+ characters)";

pub const EDUCATION_MIN_CHARS: usize = 5;
pub const EDUCATION_LEVELS: &[&str] = &["primary", "secondary", "tertiary"];

pub const SUMMARY_MIN_CHARS: usize = 50;
pub const SUMMARY_MAX_CHARS: usize = 500;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+()-]{10,}$").expect("phone pattern compiles"));

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([\da-z.-]+)\.([a-z.]{2,6})([/\w .-]*)*/?$")
        .expect("url pattern compiles")
});

const NAME_RULES: &[Rule] = &[Rule {
    test: name_long_enough,
    message: "Name must be at least 2 characters long",
}];

const EMAIL_RULES: &[Rule] = &[
    Rule {
        test: not_blank,
        message: "Email is required",
    },
    Rule {
        test: email_shaped,
        message: "Please enter a valid email address",
    },
];

const PHONE_RULES: &[Rule] = &[
    Rule {
        test: not_blank,
        message: "Phone number is required",
    },
    Rule {
        test: phone_shaped,
        message: "Please enter a valid phone number",
    },
];

const SUMMARY_RULES: &[Rule] = &[
    Rule {
        test: summary_long_enough,
        message: "Professional summary must be at least 50 characters long",
    },
    Rule {
        test: summary_short_enough,
        message: "Professional summary cannot exceed 500 characters",
    },
];

const WEBSITE_RULES: &[Rule] = &[Rule {
    test: optional_url,
    message: "Please enter a valid website URL",
}];

const LINKEDIN_RULES: &[Rule] = &[Rule {
    test: optional_url,
    message: "Please enter a valid LinkedIn profile URL",
}];

const GITHUB_RULES: &[Rule] = &[Rule {
    test: optional_url,
    message: "Please enter a valid GitHub profile URL",
}];

const PHOTO_RULES: &[Rule] = &[Rule {
    test: optional_string,
    message: "Photo must be a valid data URL",
}];

/// The full rule table, in declared order.
pub const RULE_SET: &[(&str, &[Rule])] = &[
    ("name", NAME_RULES),
    ("email", EMAIL_RULES),
    ("phone", PHONE_RULES),
    ("summary", SUMMARY_RULES),
    ("website", WEBSITE_RULES),
    ("linkedin", LINKEDIN_RULES),
    ("github", GITHUB_RULES),
    ("photo", PHOTO_RULES),
];

pub fn rules_for(field: &str) -> Option<&'static [Rule]> {
    RULE_SET
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, rules)| *rules)
}

/// `null`, `false`, `0` and `""` count as "not provided".
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Trimmed character count of a string value; `None` for non-strings.
pub fn trimmed_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.trim().chars().count())
}

fn not_blank(value: &Value) -> bool {
    trimmed_len(value).is_some_and(|n| n > 0)
}

fn name_long_enough(value: &Value) -> bool {
    trimmed_len(value).is_some_and(|n| n >= 2)
}

fn email_shaped(value: &Value) -> bool {
    value.as_str().is_some_and(|s| EMAIL_RE.is_match(s))
}

fn phone_shaped(value: &Value) -> bool {
    value.as_str().is_some_and(|s| PHONE_RE.is_match(s.trim()))
}

fn summary_long_enough(value: &Value) -> bool {
    trimmed_len(value).is_some_and(|n| n >= SUMMARY_MIN_CHARS)
}

fn summary_short_enough(value: &Value) -> bool {
    trimmed_len(value).is_some_and(|n| n <= SUMMARY_MAX_CHARS)
}

fn optional_string(value: &Value) -> bool {
    is_falsy(value) || value.is_string()
}

fn optional_url(value: &Value) -> bool {
    is_falsy(value) || value.as_str().is_some_and(|s| URL_RE.is_match(s))
}
