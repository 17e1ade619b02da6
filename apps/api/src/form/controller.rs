//! Owner of the in-memory draft and everything derived from it.
//!
//! Every edit goes through [`FormController::update`], which fans out to the
//! validation engine (per-field error), progress, and the debounced autosave.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::draft_store::{Debouncer, DraftStore, StoreError};
use crate::form::progress::{compute_progress, missing_required, progress_without_errors};
use crate::models::draft::{Draft, DraftError, DRAFT_FIELDS};
use crate::submission::GenerateResumePayload;
use crate::validation::{validate_field, validate_form, ErrorMap};

/// Result of a single-field edit.
#[derive(Debug, Clone, Serialize)]
pub struct FieldUpdate {
    pub field: String,
    pub error: Option<String>,
    pub progress: u8,
}

/// Read-only view of the controller state.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSnapshot {
    pub draft: Draft,
    pub errors: ErrorMap,
    pub progress: u8,
    pub autosave_pending: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub submitting: bool,
}

/// Submission was refused by the whole-form check.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitBlocked {
    pub errors: ErrorMap,
    /// The field the user should be taken to first.
    pub first_field: Option<String>,
    pub progress: u8,
}

#[derive(Debug)]
pub enum SubmitRefused {
    InProgress,
    Blocked(SubmitBlocked),
}

pub struct FormController {
    draft: Draft,
    errors: ErrorMap,
    progress: u8,
    submitting: bool,
    /// Bumped on every change to `draft`.
    revision: u64,
    /// `revision` at the time the running submission was started.
    submitted_revision: Option<u64>,
    clear_on_submit: bool,
    store: Arc<dyn DraftStore>,
    autosave: Debouncer<Draft>,
    last_saved_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl FormController {
    pub fn new(store: Arc<dyn DraftStore>, autosave_wait: Duration, clear_on_submit: bool) -> Self {
        let last_saved_at = Arc::new(Mutex::new(None));

        let autosave = {
            let store = Arc::clone(&store);
            let last_saved_at = Arc::clone(&last_saved_at);
            Debouncer::new(autosave_wait, move |draft: Draft| {
                let store = Arc::clone(&store);
                let last_saved_at = Arc::clone(&last_saved_at);
                async move {
                    store.save(&draft).await?;
                    *last_saved_at.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(Utc::now());
                    Ok::<(), StoreError>(())
                }
            })
        };

        Self {
            draft: Draft::default(),
            errors: ErrorMap::new(),
            progress: 0,
            submitting: false,
            revision: 0,
            submitted_revision: None,
            clear_on_submit,
            store,
            autosave,
            last_saved_at,
        }
    }

    /// Seeds the draft from the store. A failed load is logged and leaves
    /// the empty draft in place.
    pub async fn restore(&mut self) {
        match self.store.load().await {
            Ok(Some(draft)) => {
                info!("Restored saved draft");
                self.draft = draft;
                self.revision += 1;
                self.errors.clear();
                self.progress = compute_progress(&self.draft, &self.errors);
            }
            Ok(None) => info!("No saved draft, starting empty"),
            Err(e) => error!("Failed to load saved draft: {e}"),
        }
    }

    /// Applies one field edit and schedules an autosave of the whole draft.
    pub fn update(&mut self, field: &str, value: Value) -> Result<FieldUpdate, DraftError> {
        let field_error = validate_field(field, &value);
        self.draft.set_field(field, value)?;
        self.revision += 1;

        match &field_error {
            Some(message) => {
                self.errors.insert(field.to_string(), message.clone());
            }
            None => {
                self.errors.remove(field);
            }
        }

        self.progress = compute_progress(&self.draft, &self.errors);
        self.autosave.schedule(self.draft.clone());

        Ok(FieldUpdate {
            field: field.to_string(),
            error: field_error,
            progress: self.progress,
        })
    }

    /// Adds a skill. `None` when it was blank or already listed.
    pub fn add_skill(&mut self, skill: &str) -> Result<Option<FieldUpdate>, DraftError> {
        let mut next = self.draft.clone();
        if !next.add_skill(skill) {
            return Ok(None);
        }
        self.update("skills", skills_value(&next)).map(Some)
    }

    /// Removes a skill. `None` when it was not listed.
    pub fn remove_skill(&mut self, skill: &str) -> Result<Option<FieldUpdate>, DraftError> {
        let mut next = self.draft.clone();
        if !next.remove_skill(skill) {
            return Ok(None);
        }
        self.update("skills", skills_value(&next)).map(Some)
    }

    /// Runs the whole-form check and replaces the error map with its result.
    pub fn validate(&mut self) -> &ErrorMap {
        self.errors = validate_form(&self.draft);
        self.progress = compute_progress(&self.draft, &self.errors);
        &self.errors
    }

    /// Gate in front of the generator call.
    ///
    /// Runs the whole-form check, then reports any required field that is
    /// still absent or blank using that field's own first rule message. On
    /// success the controller is marked as submitting until
    /// [`finish_submission`](Self::finish_submission) is called.
    pub fn begin_submission(&mut self) -> Result<GenerateResumePayload, SubmitRefused> {
        if self.submitting {
            return Err(SubmitRefused::InProgress);
        }

        let mut errors = validate_form(&self.draft);
        for field in missing_required(&self.draft) {
            if errors.contains_key(field) {
                continue;
            }
            if let Some(message) = validate_field(field, &Value::String(String::new())) {
                errors.insert(field.to_string(), message);
            }
        }

        if !errors.is_empty() {
            let first_field = first_in_form_order(&errors);
            warn!(
                "Submission blocked by {} field error(s), first: {:?}",
                errors.len(),
                first_field
            );
            self.progress = progress_without_errors(&errors);
            self.errors = errors.clone();
            return Err(SubmitRefused::Blocked(SubmitBlocked {
                errors,
                first_field,
                progress: self.progress,
            }));
        }

        self.errors.clear();
        self.submitting = true;
        self.submitted_revision = Some(self.revision);
        Ok(GenerateResumePayload::from_draft(&self.draft))
    }

    /// Ends a submission started by `begin_submission`.
    ///
    /// After a successful generation the persisted draft is cleared (when
    /// configured), but only if the draft was not edited while the generator
    /// ran. Edits made in that window keep their autosave. The in-memory
    /// draft is kept so the document can be regenerated.
    pub async fn finish_submission(&mut self, succeeded: bool) -> Result<(), StoreError> {
        self.submitting = false;
        let submitted_revision = self.submitted_revision.take();
        if !succeeded || !self.clear_on_submit {
            return Ok(());
        }
        if submitted_revision != Some(self.revision) {
            info!("Draft edited during submission, keeping persisted draft");
            return Ok(());
        }

        self.autosave.cancel_and_wait().await;
        self.store.clear().await?;
        info!("Persisted draft cleared after successful submission");
        Ok(())
    }

    /// Drops the pending autosave, waits out any write already in flight,
    /// deletes the persisted draft and empties the in-memory state.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.autosave.cancel_and_wait().await;
        self.store.clear().await?;
        self.draft = Draft::default();
        self.revision += 1;
        self.errors.clear();
        self.progress = 0;
        Ok(())
    }

    /// Writes any pending autosave immediately.
    pub async fn flush(&self) {
        self.autosave.flush().await;
    }

    #[cfg(test)]
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    #[cfg(test)]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            draft: self.draft.clone(),
            errors: self.errors.clone(),
            progress: self.progress,
            autosave_pending: self.autosave.is_pending(),
            last_saved_at: *self
                .last_saved_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            submitting: self.submitting,
        }
    }
}

fn skills_value(draft: &Draft) -> Value {
    Value::from(draft.skills.clone().unwrap_or_default())
}

fn first_in_form_order(errors: &ErrorMap) -> Option<String> {
    DRAFT_FIELDS
        .iter()
        .find(|field| errors.contains_key(**field))
        .map(|field| field.to_string())
        .or_else(|| errors.keys().next().cloned())
}
