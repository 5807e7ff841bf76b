//! JSON extraction from free-text model output.
//!
//! The generative model is asked for a JSON object but gives no schema
//! guarantee; responses routinely wrap the object in prose or code fences.
//! `extract_json_object` scrapes the object out with a greedy brace-to-brace
//! scan and decodes it.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Appointment fields extracted from the model output.
///
/// Both keys are optional: a response missing `description` or `startTime`
/// still decodes, and the record is created with those fields absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedAppointment {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// Build the extraction prompt, embedding the raw email text verbatim.
pub fn extraction_prompt(email_text: &str) -> String {
    format!(
        "Extract the appointment details from this email body as a JSON object \
         with keys \"description\" and \"startTime\". startTime should be a valid \
         ISO 8601 string. Email Body: \"{}\"",
        email_text
    )
}

/// Locate and decode the JSON object in a free-text model response.
///
/// Takes the substring from the first `{` to the last `}` (greedy; this is
/// the tie-break when the response contains more than one object, and such a
/// response fails to decode). Returns `ExtractionParse` if no such substring
/// exists or it does not decode.
pub fn extract_json_object(text: &str) -> Result<ExtractedAppointment> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::ExtractionParse("No valid JSON object found in model response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| Error::ExtractionParse("No valid JSON object found in model response".to_string()))?;

    serde_json::from_str(&text[start..=end])
        .map_err(|e| Error::ExtractionParse(format!("Model response is not valid JSON: {}", e)))
}
