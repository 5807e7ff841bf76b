//! Firestore REST client.
//!
//! The document store behind the appointment records: schemaless documents
//! addressed by collection name and document id, with create and partial
//! update. Authentication uses a service-account credential; against the
//! emulator the client speaks plain HTTP with the fixed `owner` token.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::OnceCell;
use tracing::warn;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{parse_service_account_key, ServiceAccountAuthenticator, ServiceAccountKey};

use crate::config::Config;
use crate::error::{Error, Result};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";
const SCOPES: &[&str] = &["https://www.googleapis.com/auth/datastore"];

/// A Firestore typed value. Appointment records only carry strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FirestoreValue {
    #[serde(rename = "stringValue")]
    String(String),
}

#[derive(Debug, Serialize)]
struct DocumentBody<'a> {
    fields: &'a BTreeMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
}

enum Credentials {
    /// Emulator mode: no real auth, fixed `owner` bearer token
    Emulator,
    ServiceAccount(Box<ServiceAccountKey>),
    /// Credential or project id could not be resolved at startup. The
    /// message is replayed as a store error on every operation.
    Unavailable(String),
}

/// Client for the Firestore REST v1 API.
///
/// Construction never fails: a missing or unparseable credential is logged
/// once and then surfaces as a store error when the first operation is
/// attempted. The OAuth2 authenticator is built lazily, exactly once, even
/// under concurrent first requests.
pub struct FirestoreClient {
    http: Client,
    documents_base: String,
    credentials: Credentials,
    auth: OnceCell<DefaultAuthenticator>,
}

impl FirestoreClient {
    pub fn new(config: &Config) -> Self {
        let (host, credentials, project_id) =
            if let Some(emulator_host) = &config.firestore_emulator_host {
                (
                    format!("http://{}", emulator_host),
                    Credentials::Emulator,
                    config
                        .project_id
                        .clone()
                        .unwrap_or_else(|| "demo-project".to_string()),
                )
            } else {
                match resolve_service_account(config) {
                    Ok((key, project_id)) => (
                        PRODUCTION_HOST.to_string(),
                        Credentials::ServiceAccount(Box::new(key)),
                        project_id,
                    ),
                    Err(message) => {
                        warn!("Firestore initialization failed: {}", message);
                        (
                            PRODUCTION_HOST.to_string(),
                            Credentials::Unavailable(message),
                            String::new(),
                        )
                    }
                }
            };

        Self {
            http: Client::new(),
            documents_base: format!(
                "{}/v1/projects/{}/databases/(default)/documents",
                host, project_id
            ),
            credentials,
            auth: OnceCell::new(),
        }
    }

    /// Create a document in the given collection, letting the store assign
    /// the identifier. Returns the new document id.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: &BTreeMap<String, FirestoreValue>,
    ) -> Result<String> {
        let token = self.token().await?;
        let url = format!("{}/{}", self.documents_base, collection);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&DocumentBody { fields })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "Failed to create document ({}): {}",
                status, body
            )));
        }

        let document: Document = response.json().await?;
        document_id(&document.name)
    }

    /// Partially update a single field of an existing document. The update
    /// carries an existence precondition, so a missing document fails rather
    /// than being created.
    pub async fn update_field(
        &self,
        collection: &str,
        document_id: &str,
        field: &str,
        value: FirestoreValue,
    ) -> Result<()> {
        let token = self.token().await?;
        let url = format!("{}/{}/{}", self.documents_base, collection, document_id);

        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), value);

        let response = self
            .http
            .patch(&url)
            .query(&[
                ("updateMask.fieldPaths", field),
                ("currentDocument.exists", "true"),
            ])
            .bearer_auth(&token)
            .json(&DocumentBody { fields: &fields })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "Failed to update document {} ({}): {}",
                document_id, status, body
            )));
        }

        Ok(())
    }

    async fn token(&self) -> Result<String> {
        let key = match &self.credentials {
            Credentials::Emulator => return Ok("owner".to_string()),
            Credentials::ServiceAccount(key) => key,
            Credentials::Unavailable(message) => {
                return Err(Error::Store(format!(
                    "Document store is not initialized: {}",
                    message
                )));
            }
        };

        let auth = self
            .auth
            .get_or_try_init(|| async {
                ServiceAccountAuthenticator::builder((**key).clone())
                    .build()
                    .await
            })
            .await
            .map_err(|e| Error::Store(format!("Failed to build authenticator: {}", e)))?;

        let token = auth
            .token(SCOPES)
            .await
            .map_err(|e| Error::Store(format!("Failed to obtain access token: {}", e)))?;

        token
            .token()
            .map(str::to_string)
            .ok_or_else(|| Error::Store("No access token available".to_string()))
    }
}

fn resolve_service_account(config: &Config) -> std::result::Result<(ServiceAccountKey, String), String> {
    let raw = config
        .service_account_key
        .as_deref()
        .ok_or_else(|| "GOOGLE_SERVICE_ACCOUNT_KEY is not set".to_string())?;

    let key = parse_service_account_key(raw)
        .map_err(|e| format!("Invalid service-account credential: {}", e))?;

    let project_id = config
        .project_id
        .clone()
        .or_else(|| key.project_id.clone())
        .ok_or_else(|| "No project id in credential or environment".to_string())?;

    Ok((key, project_id))
}

/// The store returns the full resource name
/// (`projects/{p}/databases/(default)/documents/{collection}/{id}`); the id
/// is its last segment.
fn document_id(name: &str) -> Result<String> {
    name.rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Store(format!("Malformed document name: {}", name)))
}
