use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Field names accepted by [`Draft::set_field`], in form order.
pub const DRAFT_FIELDS: &[&str] = &[
    "name",
    "suffix",
    "email",
    "phone",
    "photo",
    "summary",
    "experience",
    "education",
    "skills",
];

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Unknown draft field '{0}'")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An additional education line item beyond the three fixed levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalEducation {
    pub id: u64,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tertiary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<Vec<AdditionalEducation>>,
}

impl Education {
    /// True when at least one key is set, regardless of its content.
    pub fn has_any_key(&self) -> bool {
        self.primary.is_some()
            || self.secondary.is_some()
            || self.tertiary.is_some()
            || self.additional.is_some()
    }
}

/// The in-progress résumé submission.
///
/// Every field is optional; an absent field is omitted from the serialized
/// record, so "present in the draft" always means `Some`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Encoded image data (a data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }

    /// JSON view of a present field. `None` for absent or unknown fields.
    pub fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "name" => self.name.clone().map(Value::String),
            "suffix" => self.suffix.clone().map(Value::String),
            "email" => self.email.clone().map(Value::String),
            "phone" => self.phone.clone().map(Value::String),
            "photo" => self.photo.clone().map(Value::String),
            "summary" => self.summary.clone().map(Value::String),
            "experience" => self.experience.clone().map(Value::String),
            "education" => self
                .education
                .as_ref()
                .and_then(|e| serde_json::to_value(e).ok()),
            "skills" => self
                .skills
                .as_ref()
                .map(|s| Value::Array(s.iter().cloned().map(Value::String).collect())),
            _ => None,
        }
    }

    /// Replaces one field wholesale. `null` clears it.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<(), DraftError> {
        match field {
            "name" => self.name = decode(field, value)?,
            "suffix" => self.suffix = decode(field, value)?,
            "email" => self.email = decode(field, value)?,
            "phone" => self.phone = decode(field, value)?,
            "photo" => self.photo = decode(field, value)?,
            "summary" => self.summary = decode(field, value)?,
            "experience" => self.experience = decode(field, value)?,
            "education" => self.education = decode(field, value)?,
            "skills" => {
                let skills: Option<Vec<String>> = decode(field, value)?;
                self.skills = skills.map(dedup_preserving_order);
            }
            other => return Err(DraftError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Appends a trimmed skill. Returns false when it was blank or already present.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() {
            return false;
        }
        let skills = self.skills.get_or_insert_with(Vec::new);
        if skills.iter().any(|s| s == skill) {
            return false;
        }
        skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        match self.skills.as_mut() {
            Some(skills) => {
                let before = skills.len();
                skills.retain(|s| s != skill);
                skills.len() != before
            }
            None => false,
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> Result<T, DraftError> {
    serde_json::from_value(value).map_err(|source| DraftError::InvalidValue {
        field: field.to_string(),
        source,
    })
}

fn dedup_preserving_order(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        if !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}
