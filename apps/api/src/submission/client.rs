//! Client for the document generation service. Posts a
//! [`GenerateResumePayload`] and returns the rendered document bytes.
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::submission::GenerateResumePayload;

const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Generator returned an empty document")]
    EmptyDocument,
}

#[derive(Debug, Deserialize)]
struct GeneratorErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct GeneratorClient {
    client: Client,
    url: String,
}

impl GeneratorClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, GeneratorError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Requests a document for `payload`.
    /// Retries transport failures, 429 and 5xx with exponential backoff.
    pub async fn generate(&self, payload: &GenerateResumePayload) -> Result<Bytes, GeneratorError> {
        let mut last_error: Option<GeneratorError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Generator attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&self.url).json(payload).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GeneratorError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generator returned {}: {}", status, body);
                last_error = Some(GeneratorError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GeneratorError::Api {
                    status: status.as_u16(),
                    message: error_message(body),
                });
            }

            let document = response.bytes().await?;
            if document.is_empty() {
                return Err(GeneratorError::EmptyDocument);
            }
            debug!("Generator returned {} bytes", document.len());
            return Ok(document);
        }

        Err(last_error.unwrap_or(GeneratorError::Api {
            status: 503,
            message: "generator unavailable".to_string(),
        }))
    }
}

/// Pulls `message` out of a JSON error body, falling back to the raw text.
fn error_message(body: String) -> String {
    serde_json::from_str::<GeneratorErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}
