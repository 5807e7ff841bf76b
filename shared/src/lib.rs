//! Shared library for the appointment inbox Lambda functions.
//!
//! This crate provides common utilities, types, and clients used across all Lambda functions.

pub mod config;
pub mod error;
pub mod extract;
pub mod firestore;
pub mod gemini;
pub mod http;
pub mod models;
pub mod multipart;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::{extract_json_object, extraction_prompt, ExtractedAppointment};
pub use firestore::{FirestoreClient, FirestoreValue};
pub use gemini::GeminiClient;
pub use http::{error_response, json_response, ErrorBody};
pub use models::{
    Appointment, AppointmentStatus, DecisionRequest, DecisionResponse, IngestResponse,
};
pub use multipart::form_text_field;
