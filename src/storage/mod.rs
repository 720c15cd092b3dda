//! S3-backed asset storage for sponsor logo uploads.
//!
//! Works against AWS S3 or any S3-compatible endpoint (MinIO, Spaces, etc.).
//! When the `[storage]` config section is incomplete the store still
//! constructs, but every upload returns `NotConfigured` so form handlers can
//! report a descriptive operational error instead of crashing.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::StorageConfig;

/// Upload size ceiling, checked before any network call.
pub const MAX_ASSET_SIZE: usize = 4 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File upload is not configured. Add [storage] credentials to the config or save without uploading.")]
    NotConfigured,
    #[error("File is empty")]
    FileEmpty,
    #[error("File must be under 4 MB")]
    FileTooLarge,
    #[error("Upload failed: {0}")]
    Backend(String),
}

pub struct AssetStore {
    client: Option<Client>,
    bucket: String,
    public_base_url: String,
}

impl AssetStore {
    pub async fn new(config: &StorageConfig) -> Self {
        if !config.is_configured() {
            info!("Asset storage not configured; uploads will be rejected");
            return Self {
                client: None,
                bucket: String::new(),
                public_base_url: String::new(),
            };
        }

        let bucket = config.bucket.clone().unwrap_or_default();
        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        info!(
            "Initializing asset storage (bucket: {}, region: {})",
            bucket, config.region
        );

        let credentials = Credentials::new(
            config.access_key_id.clone().unwrap_or_default(),
            config.secret_access_key.clone().unwrap_or_default(),
            None,
            None,
            "sponsorlink",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut builder = S3ConfigBuilder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint);
            builder = builder
                .endpoint_url(endpoint)
                .force_path_style(true); // Required for MinIO and some S3-compatible services
        }

        Self {
            client: Some(Client::from_conf(builder.build())),
            bucket,
            public_base_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Upload an asset and return its public URL.
    ///
    /// The object key is namespaced by `prefix` and the current timestamp so
    /// repeated uploads of the same filename never collide.
    pub async fn upload(
        &self,
        filename: &str,
        data: Vec<u8>,
        prefix: &str,
    ) -> Result<String, UploadError> {
        let client = self.client.as_ref().ok_or(UploadError::NotConfigured)?;
        if data.is_empty() {
            return Err(UploadError::FileEmpty);
        }
        if data.len() > MAX_ASSET_SIZE {
            return Err(UploadError::FileTooLarge);
        }

        let key = format!(
            "{}/{}-{}",
            prefix,
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(filename)
        );
        let content_type = mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string();

        debug!(
            "Uploading asset: {} ({} bytes, type: {})",
            key,
            data.len(),
            content_type
        );

        client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!("Asset upload failed for {}: {}", key, e);
                UploadError::Backend(e.to_string())
            })?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`; an empty name
/// becomes `file`.
fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return "file".to_string();
    }
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn unconfigured_store() -> AssetStore {
        AssetStore::new(&StorageConfig::default()).await
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("logo.png"), "logo.png");
        assert_eq!(sanitize_filename("my logo (v2).png"), "my_logo__v2_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("crème.pdf"), "cr_me.pdf");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[tokio::test]
    async fn test_upload_rejects_when_not_configured() {
        let store = unconfigured_store().await;
        assert!(!store.is_configured());
        let result = store.upload("logo.png", vec![1, 2, 3], "sponsors").await;
        assert!(matches!(result, Err(UploadError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_upload_guards_run_before_network() {
        // A configured-looking store with a dead endpoint: the size and
        // emptiness checks must fire without touching the client.
        let config = StorageConfig {
            bucket: Some("assets".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            public_base_url: Some("https://assets.example.com".to_string()),
            endpoint: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let store = AssetStore::new(&config).await;
        assert!(store.is_configured());

        let empty = store.upload("logo.png", Vec::new(), "sponsors").await;
        assert!(matches!(empty, Err(UploadError::FileEmpty)));

        let oversized = store
            .upload("logo.png", vec![0u8; MAX_ASSET_SIZE + 1], "sponsors")
            .await;
        assert!(matches!(oversized, Err(UploadError::FileTooLarge)));
    }
}
