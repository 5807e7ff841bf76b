//! Accept Lambda - Handles the /accept endpoint.
//!
//! Transitions an appointment document's status to `confirmed`. The update
//! is applied unconditionally against the supplied identifier; there is no
//! read-before-write and concurrent decisions race last-write-wins at the
//! store.

use lambda_http::http::Method;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{
    error_response, json_response, AppointmentStatus, Config, DecisionRequest, DecisionResponse,
    FirestoreClient, FirestoreValue,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const TARGET_STATUS: AppointmentStatus = AppointmentStatus::Confirmed;

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
            info!("Appointment {} status updated to confirmed", id);
            json_response(200, &DecisionResponse { success: true, id })
        }
        Err(e) => {
            error!("Error accepting appointment: {}", e);
            error_response(
                e.status_code(),
                "Failed to accept appointment.",
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

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_http::http::Request as HttpRequest;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(server: &MockServer) -> Arc<AppState> {
        let config = Config {
            firestore_emulator_host: Some(
                server.uri().trim_start_matches("http://").to_string(),
            ),
            project_id: Some("test-project".to_string()),
            collection: "appointments".to_string(),
            ..Config::default()
        };
        Arc::new(AppState::new(&config))
    }

    fn post_json(body: &str) -> Request {
        HttpRequest::builder()
            .method("POST")
            .uri("/accept")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn body_value(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn test_non_post_is_method_not_allowed() {
        let server = MockServer::start().await;
        let request = HttpRequest::builder()
            .method("GET")
            .uri("/accept")
            .body(Body::Empty)
            .unwrap();

        let response = handler(test_state(&server), request).await.unwrap();
        assert_eq!(response.status(), 405);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_id_is_rejected_without_store_access() {
        let server = MockServer::start().await;

        for body in ["{}", r#"{"id":""}"#, "not json"] {
            let response = handler(test_state(&server), post_json(body)).await.unwrap();
            assert_eq!(response.status(), 400);
            assert_eq!(body_value(&response)["error"], "Appointment ID is required.");
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_accept_sets_status_confirmed_and_echoes_id() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(
                "/v1/projects/test-project/databases/(default)/documents/appointments/abc123",
            ))
            .and(query_param("updateMask.fieldPaths", "status"))
            .and(query_param("currentDocument.exists", "true"))
            .and(body_json(serde_json::json!({
                "fields": {"status": {"stringValue": "confirmed"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/test-project/databases/(default)/documents/appointments/abc123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = handler(test_state(&server), post_json(r#"{"id":"abc123"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            body_value(&response),
            serde_json::json!({"success": true, "id": "abc123"})
        );
    }

    #[tokio::test]
    async fn test_accept_of_missing_document_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string("No document to update"),
            )
            .mount(&server)
            .await;

        let response = handler(test_state(&server), post_json(r#"{"id":"ghost"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body = body_value(&response);
        assert_eq!(body["error"], "Failed to accept appointment.");
        assert!(body["details"].as_str().unwrap().contains("No document to update"));
    }
}
