//! Disk storage for avatars and ticket attachments.
//!
//! Files live under `<root>/<subdir>/<uuid><ext>` and are addressed by the
//! URL path `/uploads/<subdir>/<uuid><ext>`, which the router serves
//! statically. Callers order writes around the database row:
//! save, write row, then delete whatever the row no longer points at.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::models::FileType;
use crate::error::AppError;

pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
/// Width of the `file_name` column
pub const MAX_FILE_NAME_LENGTH: usize = 255;

pub const URL_PREFIX: &str = "/uploads";
pub const AVATAR_DIR: &str = "image/avatar";
pub const TICKET_IMAGE_DIR: &str = "image/ticket";
pub const FILE_DIR: &str = "file";

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
pub const DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "xls", "xlsx", "txt"];

/// A file received from a multipart body, before it is stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    TooLarge(String),

    #[error("{0}")]
    InvalidType(String),

    #[error("upload storage failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge(msg) | UploadError::InvalidType(msg) => AppError::bad_request(msg),
            UploadError::Io(e) => {
                tracing::error!(error = %e, "failed to store upload");
                AppError::internal("Failed to store uploaded file")
            }
        }
    }
}

/// Lowercased extension without the dot
fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Attachment kind for a file name, by extension
pub fn classify(file_name: &str) -> Option<FileType> {
    let ext = extension(file_name)?;
    if IMAGE_EXTENSIONS.iter().any(|e| *e == ext) {
        Some(FileType::Image)
    } else if DOCUMENT_EXTENSIONS.iter().any(|e| *e == ext) {
        Some(FileType::Document)
    } else {
        None
    }
}

pub fn validate_image(file_name: &str, size: usize) -> Result<(), UploadError> {
    if size > MAX_IMAGE_SIZE {
        return Err(UploadError::TooLarge(
            "Image size exceeds maximum limit of 5MB".to_string(),
        ));
    }
    if classify(file_name) != Some(FileType::Image) {
        return Err(UploadError::InvalidType(
            "Invalid image type. Only jpg, jpeg, png, and webp are allowed".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_document(file_name: &str, size: usize) -> Result<(), UploadError> {
    if size > MAX_FILE_SIZE {
        return Err(UploadError::TooLarge(
            "File size exceeds maximum limit of 10MB".to_string(),
        ));
    }
    if classify(file_name) != Some(FileType::Document) {
        return Err(UploadError::InvalidType(
            "Invalid file type. Only pdf, doc, docx, xls, xlsx, and txt are allowed".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dirs(&self) -> Result<(), UploadError> {
        for dir in [AVATAR_DIR, TICKET_IMAGE_DIR, FILE_DIR] {
            tokio::fs::create_dir_all(self.root.join(dir)).await?;
        }
        Ok(())
    }

    pub async fn save_avatar_image(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        validate_image(file_name, bytes.len())?;
        self.save(AVATAR_DIR, file_name, bytes).await
    }

    pub async fn save_ticket_image(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        validate_image(file_name, bytes.len())?;
        self.save(TICKET_IMAGE_DIR, file_name, bytes).await
    }

    pub async fn save_document(&self, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        validate_document(file_name, bytes.len())?;
        self.save(FILE_DIR, file_name, bytes).await
    }

    async fn save(&self, subdir: &str, file_name: &str, bytes: &[u8]) -> Result<String, UploadError> {
        let dir = self.root.join(subdir);
        tokio::fs::create_dir_all(&dir).await?;

        let stored = match extension(file_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(dir.join(&stored), bytes).await?;

        let url = format!("{}/{}/{}", URL_PREFIX, subdir, stored);
        debug!(url = %url, size = bytes.len(), "stored upload");
        Ok(url)
    }

    /// Disk path for an `/uploads/...` URL; `None` for anything outside the store
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(URL_PREFIX)?.trim_start_matches('/');
        let relative = Path::new(relative);
        if relative.as_os_str().is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }

    /// A missing file, an empty URL, or a URL outside the store is not an error.
    pub async fn delete_file(&self, url: &str) -> Result<(), UploadError> {
        let Some(path) = self.resolve(url) else {
            if !url.is_empty() {
                warn!(url = %url, "refusing to delete file outside upload store");
            }
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete_files(&self, urls: &[String]) -> Vec<UploadError> {
        let mut errors = Vec::new();
        for url in urls {
            if let Err(e) = self.delete_file(url).await {
                errors.push(e);
            }
        }
        errors
    }
}
