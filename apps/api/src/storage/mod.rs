//! Object storage for logos and resumes.
//!
//! Uploaded files are first staged in a local temp file (`StagedUpload`) and then
//! forwarded to the `ObjectStore`. The temp file is deleted when the staged upload
//! is dropped, whether or not the forward succeeded.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads the file at `path` under `key` and returns its public URL.
    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, AppError>;
}

/// S3-compatible store (AWS or MinIO).
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_file(
        &self,
        path: &Path,
        key: &str,
        content_type: Option<&str>,
    ) -> Result<String, AppError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| AppError::Storage(format!("cannot read staged file: {e}")))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// A multipart file written to local disk, awaiting upload.
pub struct StagedUpload {
    file: NamedTempFile,
    file_name: String,
    content_type: Option<String>,
}

impl StagedUpload {
    pub async fn stage(
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Result<Self, AppError> {
        let file = NamedTempFile::new()
            .map_err(|e| AppError::Storage(format!("cannot create temp file: {e}")))?;
        tokio::fs::write(file.path(), &data)
            .await
            .map_err(|e| AppError::Storage(format!("cannot write temp file: {e}")))?;
        Ok(Self {
            file,
            file_name: sanitize_file_name(file_name.as_deref().unwrap_or("upload")),
            content_type,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Forwards the staged file to `store` under `prefix/` and consumes it,
    /// removing the temp file on every exit path.
    pub async fn upload(
        self,
        store: &dyn ObjectStore,
        prefix: &str,
        timeout: Duration,
    ) -> Result<String, AppError> {
        let key = format!("{prefix}/{}-{}", Uuid::new_v4(), self.file_name);
        let upload = store.put_file(self.path(), &key, self.content_type.as_deref());
        tokio::time::timeout(timeout, upload)
            .await
            .map_err(|_| AppError::Timeout("Object storage upload"))?
    }
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
pub mod memory {
    use std::path::Path;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::ObjectStore;
    use crate::errors::AppError;

    /// Records uploads in memory; `fail` makes every upload error out.
    #[derive(Default)]
    pub struct MemoryObjectStore {
        pub objects: Mutex<Vec<(String, Vec<u8>)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ObjectStore for MemoryObjectStore {
        async fn put_file(
            &self,
            path: &Path,
            key: &str,
            _content_type: Option<&str>,
        ) -> Result<String, AppError> {
            if self.fail {
                return Err(AppError::Storage("bucket unavailable".into()));
            }
            let data = tokio::fs::read(path)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            self.objects.lock().await.push((key.to_string(), data));
            Ok(format!("https://objects.test/{key}"))
        }
    }
}
