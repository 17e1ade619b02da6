//! Outbound submission: reshapes a draft into the document generator's
//! request body and names the downloaded file.

use serde::{Deserialize, Serialize};

use crate::models::draft::Draft;

pub mod client;

pub use client::{GeneratorClient, GeneratorError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInformation {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsSection {
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationSection {
    pub institution: String,
    pub completion_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceSection {
    pub experience: String,
}

/// Request body expected by the generator service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResumePayload {
    pub personal_information: PersonalInformation,
    pub skills: SkillsSection,
    pub education: EducationSection,
    pub professional_summary: SummarySection,
    pub experience: ExperienceSection,
}

impl GenerateResumePayload {
    pub fn from_draft(draft: &Draft) -> Self {
        let (first_name, middle_name, last_name) = split_name(draft.name.as_deref().unwrap_or(""));

        Self {
            personal_information: PersonalInformation {
                first_name,
                middle_name,
                last_name,
                email: draft.email.clone().unwrap_or_default(),
                phone: draft.phone.clone().unwrap_or_default(),
                // the form has no address field
                address: String::new(),
            },
            skills: SkillsSection {
                skills: draft
                    .skills
                    .as_ref()
                    .map(|s| s.join(", "))
                    .unwrap_or_default(),
            },
            education: EducationSection {
                institution: draft
                    .education
                    .as_ref()
                    .and_then(|e| e.tertiary.clone())
                    .unwrap_or_default(),
                completion_date: String::new(),
            },
            professional_summary: SummarySection {
                summary: draft.summary.clone().unwrap_or_default(),
            },
            experience: ExperienceSection {
                experience: draft.experience.clone().unwrap_or_default(),
            },
        }
    }
}

/// Splits on single spaces: first word, second word, then the remainder.
fn split_name(name: &str) -> (String, String, String) {
    let mut parts = name.split(' ');
    let first = parts.next().unwrap_or("").to_string();
    let middle = parts.next().unwrap_or("").to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, middle, last)
}

/// `<first name>.pdf`, with whitespace runs replaced by underscores.
pub fn download_filename(payload: &GenerateResumePayload) -> String {
    let stem = payload
        .personal_information
        .first_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    // only characters that are safe inside a quoted header parameter
    if stem.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::draft::Education;
    use serde_json::json;

    #[test]
    fn test_split_name_three_parts() {
        assert_eq!(
            split_name("Mary Ann van der Berg"),
            ("Mary".into(), "Ann".into(), "van der Berg".into())
        );
    }

    #[test]
    fn test_split_name_short() {
        assert_eq!(split_name("Cher"), ("Cher".into(), "".into(), "".into()));
        assert_eq!(split_name("Ada Lovelace"), ("Ada".into(), "Lovelace".into(), "".into()));
        assert_eq!(split_name(""), ("".into(), "".into(), "".into()));
    }

    #[test]
    fn test_payload_shape() {
        let draft = Draft {
            name: Some("Ada King Lovelace".into()),
            email: Some("ada@example.com".into()),
            phone: Some("+44 20 7946 0958".into()),
            summary: Some("Analyst".into()),
            experience: Some("Analytical Engine notes".into()),
            education: Some(Education {
                primary: Some("Home tutoring".into()),
                tertiary: Some("University of London".into()),
                ..Default::default()
            }),
            skills: Some(vec!["Mathematics".into(), "Poetry".into()]),
            ..Default::default()
        };

        let payload = serde_json::to_value(GenerateResumePayload::from_draft(&draft)).unwrap();
        assert_eq!(
            payload,
            json!({
                "personalInformation": {
                    "firstName": "Ada",
                    "middleName": "King",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "phone": "+44 20 7946 0958",
                    "address": ""
                },
                "skills": { "skills": "Mathematics, Poetry" },
                "education": { "institution": "University of London", "completionDate": "" },
                "professionalSummary": { "summary": "Analyst" },
                "experience": { "experience": "Analytical Engine notes" }
            })
        );
    }

    #[test]
    fn test_payload_from_empty_draft_uses_empty_strings() {
        let payload = GenerateResumePayload::from_draft(&Draft::default());
        assert_eq!(payload.skills.skills, "");
        assert_eq!(payload.education.institution, "");
        assert_eq!(payload.personal_information.first_name, "");
    }

    #[test]
    fn test_download_filename() {
        let mut payload = GenerateResumePayload::from_draft(&Draft {
            name: Some("Ada Lovelace".into()),
            ..Default::default()
        });
        assert_eq!(download_filename(&payload), "Ada.pdf");

        payload.personal_information.first_name = String::new();
        assert_eq!(download_filename(&payload), "resume.pdf");
    }

    #[test]
    fn test_download_filename_strips_header_unsafe_characters() {
        let mut payload = GenerateResumePayload::from_draft(&Draft {
            name: Some("Ad\u{1}a Lovelace".into()),
            ..Default::default()
        });
        assert_eq!(download_filename(&payload), "Ada.pdf");

        payload.personal_information.first_name = "\"Ada\"\r\n;x=1".into();
        assert_eq!(download_filename(&payload), "Ada_x1.pdf");

        payload.personal_information.first_name = "Jean\tLuc".into();
        assert_eq!(download_filename(&payload), "Jean_Luc.pdf");

        payload.personal_information.first_name = "\u{7f}\"".into();
        assert_eq!(download_filename(&payload), "resume.pdf");
    }
}
