//! Object storage abstraction for report media.
//!
//! Supports both local filesystem and S3-compatible object storage.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::{AppError, AppResult};

/// Directory (or key prefix) that holds user uploads.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Maximum accepted upload size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Local {
        /// Base path for stored files.
        #[serde(default = "default_base_path")]
        base_path: PathBuf,
        /// Base URL for serving files.
        #[serde(default = "default_base_url")]
        base_url: String,
        /// Route the server mounts the files under.
        #[serde(default = "default_mount_path")]
        mount_path: String,
    },
    /// S3-compatible object storage.
    S3 {
        /// S3 endpoint URL (e.g., "<https://s3.amazonaws.com>" or `MinIO` URL).
        endpoint: String,
        /// S3 bucket name.
        #[serde(default = "default_bucket")]
        bucket: String,
        /// AWS region.
        region: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Public URL prefix for serving files.
        #[serde(default)]
        public_url: Option<String>,
        /// Path prefix within the bucket.
        #[serde(default)]
        prefix: Option<String>,
    },
}

fn default_base_path() -> PathBuf {
    PathBuf::from("./files")
}

fn default_base_url() -> String {
    "/files".to_string()
}

fn default_mount_path() -> String {
    "/files".to_string()
}

fn default_bucket() -> String {
    "reports-media".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Local {
            base_path: default_base_path(),
            base_url: default_base_url(),
            mount_path: default_mount_path(),
        }
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path or object key).
    pub key: String,
    /// Public URL to access the file.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Make sure the backing directory or bucket exists.
    async fn ensure_ready(&self) -> AppResult<()>;

    /// Upload a file.
    async fn upload(&self, key: &str, data: &[u8], content_type: &str)
    -> AppResult<UploadedFile>;

    /// Delete a file. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Recover the storage key from a URL produced by [`Self::public_url`].
    ///
    /// Returns `None` for URLs that point elsewhere.
    fn key_from_public_url(&self, url: &str) -> Option<String> {
        let prefix = self.public_url("");
        let rest = url.strip_prefix(prefix.as_str())?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        if rest.is_empty() {
            return None;
        }
        urlencoding::decode(rest)
            .ok()
            .map(std::borrow::Cow::into_owned)
            .filter(|key| is_upload_key(key))
    }
}

/// Whether `key` names a file under [`UPLOAD_PREFIX`].
///
/// Only plain relative segments are allowed: no `.` or `..`, no leading or
/// doubled `/`, no backslashes and no drive prefixes.
#[must_use]
pub fn is_upload_key(key: &str) -> bool {
    if key.contains('\\') {
        return false;
    }

    let segments: Vec<&str> = key.split('/').collect();
    let plain = segments
        .iter()
        .all(|seg| !seg.is_empty() && *seg != "." && *seg != "..");

    plain
        && segments.len() > 1
        && segments[0] == UPLOAD_PREFIX
        && Path::new(key)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Root directory holding the stored files.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Filesystem path of `key`, refusing anything outside the upload area.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        if !is_upload_key(key) {
            tracing::warn!(key = %key, "Rejected storage key outside the upload area");
            return Err(AppError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.base_path.join(key))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn ensure_ready(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(self.base_path.join(UPLOAD_PREFIX))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create storage directory: {e}")))
    }

    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        let md5 = format!("{:x}", md5::compute(data));

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete file: {e}")))?;
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        Ok(path.exists())
    }
}

/// S3-compatible object storage backend.
#[cfg(feature = "s3")]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
    prefix: Option<String>,
}

#[cfg(feature = "s3")]
impl S3Storage {
    /// Create a new S3 storage backend.
    #[must_use]
    pub fn new(
        endpoint: &str,
        bucket: String,
        region: &str,
        access_key_id: &str,
        secret_access_key: &str,
        public_url: Option<String>,
        prefix: Option<String>,
    ) -> Self {
        use aws_sdk_s3::config::{Credentials, Region};

        let credentials =
            Credentials::new(access_key_id, secret_access_key, None, None, "satya-matrix");

        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(endpoint)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket,
            public_url,
            prefix,
        }
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
            None => key.to_string(),
        }
    }
}

#[cfg(feature = "s3")]
#[async_trait::async_trait]
impl StorageBackend for S3Storage {
    async fn ensure_ready(&self) -> AppResult<()> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        tracing::info!(bucket = %self.bucket, "Bucket missing, creating it");
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 create_bucket failed: {e}")))?;
        Ok(())
    }

    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        use aws_sdk_s3::primitives::ByteStream;

        let full_key = self.full_key(key);
        let md5 = format!("{:x}", md5::compute(data));

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(ByteStream::from(data.to_vec()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        Ok(UploadedFile {
            key: key.to_string(),
            url: self.public_url(key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        let full_key = self.full_key(key);
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), full_key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, full_key),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("404") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!("S3 head_object failed: {e}")))
                }
            }
        }
    }
}

/// Build the storage backend described by `config`.
pub fn from_config(config: &StorageConfig) -> AppResult<SharedStorage> {
    match config {
        StorageConfig::Local {
            base_path,
            base_url,
            ..
        } => Ok(Arc::new(LocalStorage::new(
            base_path.clone(),
            base_url.clone(),
        ))),
        #[cfg(feature = "s3")]
        StorageConfig::S3 {
            endpoint,
            bucket,
            region,
            access_key_id,
            secret_access_key,
            public_url,
            prefix,
        } => Ok(Arc::new(S3Storage::new(
            endpoint,
            bucket.clone(),
            region,
            access_key_id,
            secret_access_key,
            public_url.clone(),
            prefix.clone(),
        ))),
        #[cfg(not(feature = "s3"))]
        StorageConfig::S3 { .. } => Err(AppError::Config(
            "S3 storage requested but the `s3` feature is not enabled".to_string(),
        )),
    }
}

/// Generate the storage key for an uploaded image.
///
/// Layout: `uploads/<base>_<unix-millis>_<12 hex>.<ext>`. The base name keeps
/// ASCII alphanumerics, `-` and `_` (everything else becomes `_`) and is cut
/// to 50 characters; the extension is lowercased.
#[must_use]
pub fn generate_storage_key(original_name: &str) -> String {
    let path = Path::new(original_name);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    let mut base: String = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(50)
        .collect();
    if base.is_empty() {
        base.push_str("upload");
    }

    let timestamp = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();

    format!(
        "{UPLOAD_PREFIX}/{base}_{timestamp}_{}{extension}",
        &random[..12]
    )
}
