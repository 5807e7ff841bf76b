//! Shared data models.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extract::ExtractedAppointment;
use crate::firestore::FirestoreValue;

/// Lifecycle status of an appointment record.
///
/// Records start at `Pending` and are moved to `Confirmed` or `Declined` by
/// the decision handlers. Nothing guards against a second transition; the
/// last write wins at the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Declined,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Declined => "declined",
        }
    }
}

/// The appointment record, the sole persisted entity.
///
/// `description` and `start_time` come out of the model extraction and may be
/// absent; a record with missing fields is still created. `start_time` is
/// intended to be ISO-8601 but is not validated at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: String,
}

impl Appointment {
    /// Build a new pending appointment from extracted fields, stamped with
    /// the current UTC time.
    pub fn pending(extracted: ExtractedAppointment) -> Self {
        Self {
            description: extracted.description,
            start_time: extracted.start_time,
            status: AppointmentStatus::Pending,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Map the record to Firestore typed values. Absent optional fields are
    /// omitted from the document.
    pub fn to_fields(&self) -> BTreeMap<String, FirestoreValue> {
        let mut fields = BTreeMap::new();
        if let Some(description) = &self.description {
            fields.insert(
                "description".to_string(),
                FirestoreValue::String(description.clone()),
            );
        }
        if let Some(start_time) = &self.start_time {
            fields.insert(
                "startTime".to_string(),
                FirestoreValue::String(start_time.clone()),
            );
        }
        fields.insert(
            "status".to_string(),
            FirestoreValue::String(self.status.as_str().to_string()),
        );
        fields.insert(
            "createdAt".to_string(),
            FirestoreValue::String(self.created_at.clone()),
        );
        fields
    }
}

/// Accept/decline request payload.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub id: Option<String>,
}

/// Ingest success payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub success: bool,
    pub document_id: String,
}

/// Accept/decline success payload.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub success: bool,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Pending).unwrap(),
            r#""pending""#
        );
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Confirmed).unwrap(),
            r#""confirmed""#
        );
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Declined).unwrap(),
            r#""declined""#
        );
    }

    #[test]
    fn test_pending_appointment_fields() {
        let appointment = Appointment::pending(ExtractedAppointment {
            description: Some("Dentist".to_string()),
            start_time: Some("2024-05-01T10:00:00Z".to_string()),
        });

        let fields = appointment.to_fields();
        assert_eq!(
            fields.get("description"),
            Some(&FirestoreValue::String("Dentist".to_string()))
        );
        assert_eq!(
            fields.get("startTime"),
            Some(&FirestoreValue::String("2024-05-01T10:00:00Z".to_string()))
        );
        assert_eq!(
            fields.get("status"),
            Some(&FirestoreValue::String("pending".to_string()))
        );
        assert!(fields.contains_key("createdAt"));
    }

    #[test]
    fn test_missing_extracted_fields_are_omitted() {
        let appointment = Appointment::pending(ExtractedAppointment::default());
        let fields = appointment.to_fields();
        assert!(!fields.contains_key("description"));
        assert!(!fields.contains_key("startTime"));
        assert_eq!(
            fields.get("status"),
            Some(&FirestoreValue::String("pending".to_string()))
        );
    }

    #[test]
    fn test_created_at_is_rfc3339() {
        let appointment = Appointment::pending(ExtractedAppointment::default());
        assert!(chrono::DateTime::parse_from_rfc3339(&appointment.created_at).is_ok());
        assert!(appointment.created_at.ends_with('Z'));
    }

    #[test]
    fn test_decision_request_tolerates_missing_id() {
        let request: DecisionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.id.is_none());
    }

    #[test]
    fn test_ingest_response_wire_shape() {
        let response = IngestResponse {
            success: true,
            document_id: "abc123".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"success":true,"documentId":"abc123"}"#
        );
    }
}
