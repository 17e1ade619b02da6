use crate::models::draft::Draft;
use crate::validation::ErrorMap;

/// Fields that must be filled in before a résumé can be generated.
pub const REQUIRED_FIELDS: &[&str] = &["name", "email", "phone", "summary", "experience"];

/// Percentage (0–100) of required fields that are filled in and error-free.
pub fn compute_progress(draft: &Draft, errors: &ErrorMap) -> u8 {
    let filled = REQUIRED_FIELDS
        .iter()
        .filter(|field| is_filled(draft, field) && !errors.contains_key(**field))
        .count();
    percent(filled)
}

/// Progress after a blocked submit: required fields without an error count,
/// whether or not they are filled in.
pub fn progress_without_errors(errors: &ErrorMap) -> u8 {
    let valid = REQUIRED_FIELDS
        .iter()
        .filter(|field| !errors.contains_key(**field))
        .count();
    percent(valid)
}

/// Required fields that are absent or blank.
pub fn missing_required(draft: &Draft) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !is_filled(draft, field))
        .collect()
}

fn is_filled(draft: &Draft, field: &str) -> bool {
    let value = match field {
        "name" => draft.name.as_deref(),
        "email" => draft.email.as_deref(),
        "phone" => draft.phone.as_deref(),
        "summary" => draft.summary.as_deref(),
        "experience" => draft.experience.as_deref(),
        _ => None,
    };
    value.is_some_and(|v| !v.trim().is_empty())
}

fn percent(count: usize) -> u8 {
    ((count as f64 / REQUIRED_FIELDS.len() as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_draft_is_zero() {
        assert_eq!(compute_progress(&Draft::default(), &ErrorMap::new()), 0);
    }

    #[test]
    fn test_filled_fields_count_twenty_percent_each() {
        let draft = Draft {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            ..Default::default()
        };
        assert_eq!(compute_progress(&draft, &ErrorMap::new()), 40);
    }

    #[test]
    fn test_blank_and_invalid_fields_do_not_count() {
        let draft = Draft {
            name: Some("   ".into()),
            email: Some("nope".into()),
            phone: Some("+1 555 010 0199".into()),
            ..Default::default()
        };
        let mut errors = ErrorMap::new();
        errors.insert("email".into(), "Please enter a valid email address".into());
        assert_eq!(compute_progress(&draft, &errors), 20);
    }

    #[test]
    fn test_optional_fields_do_not_count() {
        let draft = Draft {
            suffix: Some("Jr.".into()),
            skills: Some(vec!["Rust".into()]),
            ..Default::default()
        };
        assert_eq!(compute_progress(&draft, &ErrorMap::new()), 0);
    }

    #[test]
    fn test_progress_without_errors() {
        let mut errors = ErrorMap::new();
        errors.insert("summary".into(), "too short".into());
        errors.insert("photo".into(), "bad".into());
        assert_eq!(progress_without_errors(&errors), 80);
    }

    #[test]
    fn test_missing_required() {
        let draft = Draft {
            name: Some("Ada".into()),
            summary: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(missing_required(&draft), ["email", "phone", "summary", "experience"]);
    }
}
