// handlers/mod.rs - HTTP bindings, one module per resource
//
// Handlers only parse the request (path id, query, JSON or multipart body)
// and hand off to the matching service; rejections become `AppError`s.

pub mod categories;
pub mod divisions;
pub mod health;
pub mod ticket_attachments;
pub mod ticket_resolutions;
pub mod tickets;
pub mod users;

use std::collections::HashMap;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};

use crate::error::AppError;
use crate::uploads::UploadedFile;

fn invalid_multipart(err: MultipartError) -> AppError {
    tracing::debug!(error = %err, "rejected multipart body");
    AppError::bad_request("Invalid multipart form data")
}

/// Text fields plus the single file found under `file_field`
pub(crate) async fn read_multipart(
    multipart: Result<Multipart, MultipartRejection>,
    file_field: &str,
) -> Result<(HashMap<String, String>, Option<UploadedFile>), AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected multipart request");
        AppError::bad_request("Request must be multipart/form-data")
    })?;

    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == file_field {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(invalid_multipart)?;
            file = Some(UploadedFile {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(invalid_multipart)?;
            fields.insert(name, value);
        }
    }

    Ok((fields, file))
}
