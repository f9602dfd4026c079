//! Multipart extraction helpers shared by the upload handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::services::upload::FilePart;
use vidhost_core::AppError;

/// Map a multipart read failure to the domain taxonomy. A body cut off by
/// the route's size limit surfaces here as a 413 from the multipart layer
/// and must keep that status; everything else is a malformed request.
fn read_error(e: MultipartError, context: &str) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
    } else {
        AppError::InvalidInput(format!("{}: {}", context, e))
    }
}

/// Pull the single expected file field out of a multipart body. Other
/// fields are ignored; a duplicate of the expected field is rejected.
pub async fn extract_file_field(
    mut multipart: Multipart,
    field_name: &str,
) -> Result<FilePart, AppError> {
    let mut part: Option<FilePart> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| read_error(e, "Failed to read multipart body"))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        if part.is_some() {
            return Err(AppError::InvalidInput(format!(
                "Multiple '{}' fields are not allowed; send exactly one",
                field_name
            )));
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| read_error(e, "Failed to read file data"))?;

        part = Some(FilePart {
            content_type,
            data: data.to_vec(),
        });
    }

    part.ok_or_else(|| {
        AppError::InvalidInput(format!("Missing multipart field '{}'", field_name))
    })
}
