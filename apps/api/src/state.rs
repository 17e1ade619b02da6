use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::form::FormController;
use crate::submission::GeneratorClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single owner of the in-progress draft. One draft per process.
    pub form: Arc<Mutex<FormController>>,
    pub generator: GeneratorClient,
    pub config: Config,
}
