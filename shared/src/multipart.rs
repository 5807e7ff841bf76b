//! Multipart form data parsing.
//!
//! Inbound email webhooks deliver the message as `multipart/form-data`; the
//! only part this system cares about is the `text` field with the raw email
//! body.

use bytes::Bytes;
use multer::Multipart;
use std::convert::Infallible;

use crate::error::{Error, Result};

/// Extract a named field from a multipart form body.
///
/// Returns `Ok(None)` when the form parses but the field is absent. A
/// missing or non-multipart content type, or a malformed body, is a
/// validation error.
pub async fn form_text_field(
    content_type: Option<&str>,
    body: &[u8],
    field_name: &str,
) -> Result<Option<String>> {
    let content_type = content_type
        .ok_or_else(|| Error::Validation("Expected multipart/form-data content type".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| Error::Validation(format!("Invalid multipart content type: {}", e)))?;

    let chunk = Bytes::copy_from_slice(body);
    let stream = futures::stream::once(async move { Ok::<_, Infallible>(chunk) });
    let mut multipart = Multipart::new(stream, boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed form data: {}", e)))?
    {
        if field.name() == Some(field_name) {
            let value = field
                .text()
                .await
                .map_err(|e| Error::Validation(format!("Malformed form data: {}", e)))?;
            return Ok(Some(value));
        }
    }

    Ok(None)
}
