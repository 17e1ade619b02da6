use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub draft_dir: PathBuf,
    pub draft_store: StoreBackend,
    pub generator_url: String,
    pub generator_timeout: Duration,
    pub autosave_debounce: Duration,
    pub clear_draft_on_submit: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or("RUST_LOG", "info"),
            draft_dir: PathBuf::from(or("DRAFT_DIR", "./data")),
            draft_store: parse_backend(&or("DRAFT_STORE", "file"))?,
            generator_url: or(
                "GENERATOR_URL",
                "http://localhost:8080/api/resumes/generate",
            ),
            generator_timeout: Duration::from_secs(
                or("GENERATOR_TIMEOUT_SECS", "60")
                    .parse()
                    .context("GENERATOR_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            autosave_debounce: Duration::from_millis(
                or("AUTOSAVE_DEBOUNCE_MS", "1000")
                    .parse()
                    .context("AUTOSAVE_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
            clear_draft_on_submit: parse_bool(&or("CLEAR_DRAFT_ON_SUBMIT", "true"))
                .context("CLEAR_DRAFT_ON_SUBMIT must be true or false")?,
        })
    }
}

fn parse_backend(value: &str) -> Result<StoreBackend> {
    match value.to_ascii_lowercase().as_str() {
        "file" => Ok(StoreBackend::File),
        "memory" => Ok(StoreBackend::Memory),
        other => bail!("DRAFT_STORE must be 'file' or 'memory', got '{other}'"),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("not a boolean: '{other}'"),
    }
}
