//! Ingest Lambda - Handles the /ingest endpoint.
//!
//! Accepts raw email content as a multipart `text` field, asks the
//! generative model to extract appointment details, and creates a pending
//! appointment document.

use lambda_http::http::{header::CONTENT_TYPE, Method};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{
    error_response, extract_json_object, extraction_prompt, form_text_field, json_response,
    Appointment, Config, FirestoreClient, GeminiClient, IngestResponse,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    gemini: GeminiClient,
    store: FirestoreClient,
    collection: String,
}

impl AppState {
    fn new(config: &Config) -> Self {
        if config.gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY is not set; extraction requests will fail");
        }

        Self {
            gemini: GeminiClient::new(config),
            store: FirestoreClient::new(config),
            collection: config.collection.clone(),
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    if event.method() != Method::POST {
        return error_response(405, "Method not allowed", None);
    }

    let content_type = event
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let email_text = match form_text_field(content_type, event.body().as_ref(), "text").await {
        Ok(Some(text)) if !text.trim().is_empty() => text,
        Ok(_) => {
            error!("Email text is missing from the form data");
            return error_response(400, "Email text not found in request.", None);
        }
        Err(e) => {
            error!("Failed to parse form data: {}", e);
            return error_response(400, "Email text not found in request.", Some(e.to_string()));
        }
    };

    match process(&state, &email_text).await {
        Ok(document_id) => {
            info!(
                "Successfully processed email and saved appointment with ID: {}",
                document_id
            );
            json_response(
                200,
                &IngestResponse {
                    success: true,
                    document_id,
                },
            )
        }
        Err(e) => {
            error!("Error processing request: {}", e);
            error_response(
                e.status_code(),
                "Failed to process email.",
                Some(e.to_string()),
            )
        }
    }
}

/// Extract appointment details from the email text and persist a pending
/// record. Nothing is written unless extraction succeeds.
async fn process(state: &AppState, email_text: &str) -> shared::Result<String> {
    let prompt = extraction_prompt(email_text);
    let raw_response = state.gemini.generate(&prompt).await?;

    let extracted = extract_json_object(&raw_response)?;
    let appointment = Appointment::pending(extracted);

    state
        .store
        .create_document(&state.collection, &appointment.to_fields())
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let state = Arc::new(AppState::new(&config));

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
