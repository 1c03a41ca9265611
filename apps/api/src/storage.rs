//! Object storage for uploaded resumes and company logos.

use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use axum::extract::Multipart;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const RESUME_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const IMAGE_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/svg+xml"];

/// A single file pulled out of a multipart body.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl Upload {
    /// File extension, lowercased, without the dot.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
    }
}

/// Reads the first part named `field` from a multipart body.
pub async fn read_file_field(multipart: &mut Multipart, field: &str) -> Result<Upload, AppError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().unwrap_or("upload").to_string();
        let content_type = part
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = part
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        return Ok(Upload {
            file_name,
            content_type,
            data,
        });
    }
    Err(AppError::Validation(format!("Missing '{field}' file field")))
}

pub fn validate_upload(upload: &Upload, allowed: &[&str]) -> Result<(), AppError> {
    if upload.data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".into()));
    }
    if upload.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "File exceeds the {} MiB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    if !allowed.contains(&upload.content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported file type '{}'",
            upload.content_type
        )));
    }
    Ok(())
}

/// `{prefix}/{owner}/{timestamp}.{ext}`
pub fn object_key(prefix: &str, owner: uuid::Uuid, extension: Option<&str>) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    match extension {
        Some(ext) => format!("{prefix}/{owner}/{stamp}.{ext}"),
        None => format!("{prefix}/{owner}/{stamp}"),
    }
}

pub async fn upload_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    let size = data.len();
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("upload of {key} failed: {e}")))?;

    info!("Uploaded {size} bytes to s3://{bucket}/{key}");
    Ok(())
}
