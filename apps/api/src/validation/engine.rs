use std::collections::BTreeMap;

use serde_json::Value;

use crate::models::draft::Draft;
use crate::validation::rules::{
    is_falsy, rules_for, trimmed_len, EDUCATION_LEVELS, EDUCATION_MIN_CHARS, EXPERIENCE_MESSAGE,
    EXPERIENCE_MIN_CHARS, RULE_SET,
};

/// Field name → the single message currently shown for it.
pub type ErrorMap = BTreeMap<String, String>;

/// Validates one field's candidate value.
///
/// `experience` (as a string) and `education` are special-cased; every other
/// field runs its rule list and reports the first failure. Fields without
/// rules are always valid.
pub fn validate_field(field: &str, value: &Value) -> Option<String> {
    if field == "experience" {
        if let Value::String(text) = value {
            return validate_experience(text);
        }
    }

    if field == "education" {
        return validate_education(value);
    }

    rules_for(field)?
        .iter()
        .find(|rule| !(rule.test)(value))
        .map(|rule| rule.message.to_string())
}

/// Validates every field present in the draft.
///
/// Absent fields are never reported: an empty draft yields an empty map.
pub fn validate_form(draft: &Draft) -> ErrorMap {
    let mut errors = ErrorMap::new();

    for (field, _) in RULE_SET {
        if let Some(value) = draft.field_value(field) {
            if let Some(message) = validate_field(field, &value) {
                errors.insert(field.to_string(), message);
            }
        }
    }

    if let Some(experience) = draft.experience.as_deref().filter(|e| !e.is_empty()) {
        if let Some(message) = validate_experience(experience) {
            errors.insert("experience".to_string(), message);
        }
    }

    if draft.education.as_ref().is_some_and(|e| e.has_any_key()) {
        if let Some(value) = draft.field_value("education") {
            if let Some(message) = validate_education(&value) {
                errors.insert("education".to_string(), message);
            }
        }
    }

    errors
}

fn validate_experience(text: &str) -> Option<String> {
    if text.trim().chars().count() < EXPERIENCE_MIN_CHARS {
        return Some(EXPERIENCE_MESSAGE.to_string());
    }
    None
}

fn validate_education(value: &Value) -> Option<String> {
    let levels = value.as_object()?;

    for level in EDUCATION_LEVELS {
        let Some(entry) = levels.get(*level) else {
            continue;
        };
        if is_falsy(entry) {
            continue;
        }
        let len = trimmed_len(entry).unwrap_or_else(|| entry.to_string().trim().chars().count());
        if len < EDUCATION_MIN_CHARS {
            return Some(format!("{level} education entry is too short"));
        }
    }

    None
}
