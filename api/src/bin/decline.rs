//! Decline Lambda - Handles the /decline endpoint.
//!
//! Identical in shape to the accept handler; the only difference is the
//! target status written to the document.

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{
    error_response, json_response, AppointmentStatus, Config, DecisionRequest, DecisionResponse,
    FirestoreClient, FirestoreValue,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const TARGET_STATUS: AppointmentStatus = AppointmentStatus::Declined;

/// Application state shared across requests.
struct AppState {
    store: FirestoreClient,
    collection: String,
}

impl AppState {
    fn new(config: &Config) -> Self {
        Self {
            store: FirestoreClient::new(config),
            collection: config.collection.clone(),
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    if event.method() != Method::POST {
        return error_response(405, "Method not allowed", None);
    }

    let id = match serde_json::from_slice::<DecisionRequest>(event.body().as_ref()) {
        Ok(DecisionRequest { id: Some(id) }) if !id.is_empty() => id,
        _ => return error_response(400, "Appointment ID is required.", None),
    };

    match state
        .store
        .update_field(
            &state.collection,
            &id,
            "status",
            FirestoreValue::String(TARGET_STATUS.as_str().to_string()),
        )
        .await
    {
        Ok(()) => {
            info!("Appointment {} status updated to declined", id);
            json_response(200, &DecisionResponse { success: true, id })
        }
        Err(e) => {
            error!("Error declining appointment: {}", e);
            error_response(
                e.status_code(),
                "Failed to decline appointment.",
                Some(e.to_string()),
            )
        }
    }
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
