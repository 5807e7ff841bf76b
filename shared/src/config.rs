//! Configuration management for Lambda functions.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::env;

/// Default Firestore collection for appointment documents.
///
/// Earlier revisions of the system wrote to `pendingAppointments`; the
/// collection is a single configuration value so every handler agrees on one
/// name.
const DEFAULT_COLLECTION: &str = "appointments";

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Application configuration loaded from environment variables.
///
/// Missing credentials do not fail loading: the process starts and serves
/// requests, and the affected client surfaces the problem when it is first
/// used.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Service-account credential as a JSON string, if configured
    pub service_account_key: Option<String>,
    /// Google Cloud project id override (otherwise taken from the credential)
    pub project_id: Option<String>,
    /// Firestore collection holding appointment documents
    pub collection: String,
    /// Firestore emulator `host:port`; switches the store client to plain HTTP
    pub firestore_emulator_host: Option<String>,
    /// Generative Language API key
    pub gemini_api_key: Option<String>,
    /// Generative model name
    pub gemini_model: String,
    /// Generative Language API base URL override
    pub gemini_api_host: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            service_account_key: env::var("GOOGLE_SERVICE_ACCOUNT_KEY")
                .ok()
                .map(|raw| decode_service_account_key(&raw)),
            project_id: env::var("GOOGLE_CLOUD_PROJECT").ok(),
            collection: env::var("APPOINTMENTS_COLLECTION")
                .unwrap_or_else(|_| DEFAULT_COLLECTION.to_string()),
            firestore_emulator_host: env::var("FIRESTORE_EMULATOR_HOST").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_host: env::var("GEMINI_API_HOST").ok(),
        }
    }
}

/// Normalize the service-account credential to a JSON string.
///
/// The credential has been deployed both as raw JSON and as base64-encoded
/// JSON; accept either. A value that is neither is returned as-is and will
/// fail credential parsing later with a useful message.
pub fn decode_service_account_key(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    match BASE64.decode(trimmed) {
        Ok(bytes) => String::from_utf8(bytes).unwrap_or_else(|_| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    }
}
