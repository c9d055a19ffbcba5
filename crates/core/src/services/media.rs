//! Report image uploads.

use satya_common::{
    AppError, AppResult, MAX_UPLOAD_BYTES, SharedStorage, UploadResponse, generate_storage_key,
};

/// Content type used when the client does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stores images attached to reports.
#[derive(Clone)]
pub struct MediaService {
    storage: SharedStorage,
    max_bytes: usize,
}

impl MediaService {
    /// Create a media service writing to `storage`.
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }

    /// Override the upload size limit.
    #[must_use]
    pub const fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Store an uploaded image and return its public URL and storage key.
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<UploadResponse> {
        if data.is_empty() {
            return Err(AppError::BadRequest("file is empty".to_string()));
        }
        if data.len() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "file exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let key = generate_storage_key(file_name);
        let content_type = content_type
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let uploaded = self.storage.upload(&key, data, content_type).await?;
        tracing::info!(
            key = %uploaded.key,
            size = uploaded.size,
            content_type = %uploaded.content_type,
            md5 = %uploaded.md5,
            "Stored report image"
        );

        Ok(UploadResponse {
            url: uploaded.url,
            path: uploaded.key,
        })
    }
}
