//! Axum route handlers for the draft form API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::form::controller::{DraftSnapshot, FieldUpdate, SubmitRefused};
use crate::state::AppState;
use crate::submission::download_filename;
use crate::validation::{validate_field, ErrorMap};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FieldValueRequest {
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skill: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateFieldRequest {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct ValidateFieldResponse {
    pub field: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ValidateFormResponse {
    pub valid: bool,
    pub errors: ErrorMap,
    pub progress: u8,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/draft
pub async fn handle_get_draft(State(state): State<AppState>) -> Json<DraftSnapshot> {
    Json(state.form.lock().await.snapshot())
}

/// PATCH /api/v1/draft/fields/:field
pub async fn handle_update_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(req): Json<FieldValueRequest>,
) -> Result<Json<FieldUpdate>, AppError> {
    let update = state.form.lock().await.update(&field, req.value)?;
    Ok(Json(update))
}

/// POST /api/v1/draft/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(req): Json<SkillRequest>,
) -> Result<Json<DraftSnapshot>, AppError> {
    let mut form = state.form.lock().await;
    if form.add_skill(&req.skill)?.is_none() {
        return Err(AppError::Validation(format!(
            "Skill '{}' is blank or already listed",
            req.skill.trim()
        )));
    }
    Ok(Json(form.snapshot()))
}

/// DELETE /api/v1/draft/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
) -> Result<Json<DraftSnapshot>, AppError> {
    let mut form = state.form.lock().await;
    if form.remove_skill(&skill)?.is_none() {
        return Err(AppError::NotFound(format!("Skill '{skill}' not found")));
    }
    Ok(Json(form.snapshot()))
}

/// POST /api/v1/draft/validate
pub async fn handle_validate_form(State(state): State<AppState>) -> Json<ValidateFormResponse> {
    let mut form = state.form.lock().await;
    let errors = form.validate().clone();
    Json(ValidateFormResponse {
        valid: errors.is_empty(),
        errors,
        progress: form.progress(),
    })
}

/// POST /api/v1/validate/field
/// Stateless single-field check; does not touch the draft.
pub async fn handle_validate_field(
    Json(req): Json<ValidateFieldRequest>,
) -> Json<ValidateFieldResponse> {
    let error = validate_field(&req.field, &req.value);
    Json(ValidateFieldResponse {
        field: req.field,
        error,
    })
}

/// DELETE /api/v1/draft
pub async fn handle_clear_draft(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.form.lock().await.reset().await?;
    info!("Draft cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/draft/submit
///
/// The form lock is released while the generator runs, so edits keep
/// flowing; a second submit in that window is refused.
pub async fn handle_submit(State(state): State<AppState>) -> Result<Response, AppError> {
    let payload = match state.form.lock().await.begin_submission() {
        Ok(payload) => payload,
        Err(SubmitRefused::InProgress) => {
            return Err(AppError::Conflict(
                "A submission is already in progress".to_string(),
            ))
        }
        Err(SubmitRefused::Blocked(blocked)) => return Err(AppError::SubmitBlocked(blocked)),
    };

    let result = state.generator.generate(&payload).await;

    let mut form = state.form.lock().await;
    match result {
        Ok(document) => {
            let filename = download_filename(&payload);
            let size = document.len();
            let response = (
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                document,
            )
                .into_response();

            let delivered = response.status().is_success();
            if let Err(e) = form.finish_submission(delivered).await {
                error!("Failed to clear draft after submission: {e}");
            }
            if delivered {
                info!("Generated {filename} ({size} bytes)");
            } else {
                error!("Could not build download response for {filename}");
            }
            Ok(response)
        }
        Err(e) => {
            if let Err(reset_err) = form.finish_submission(false).await {
                error!("Failed to reset submission state: {reset_err}");
            }
            Err(AppError::Generator(e))
        }
    }
}
