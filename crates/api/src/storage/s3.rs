use std::time::Duration;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::Client;

use super::{StorageBackend, StorageError, StoredObject};
use crate::config::S3Config;

/// Stores objects in an S3 bucket with AES256 server-side encryption.
pub struct S3Storage {
    client: Client,
    bucket: String,
    cloudfront_domain: Option<String>,
}

impl S3Storage {
    pub async fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "env-credentials",
        );

        let aws_config = aws_config::from_env()
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        Self {
            client: Client::new(&aws_config),
            bucket: config.bucket.clone(),
            cloudfront_domain: config.cloudfront_domain.clone(),
        }
    }

    async fn presigned_url(&self, key: &str, expires_in: u64) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_in))
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl StorageBackend for S3Storage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(bucket = %self.bucket, key, error = %e, "S3 upload failed");
                StorageError::Backend(e.to_string())
            })?;
        tracing::info!(bucket = %self.bucket, key, size, "Uploaded object to S3");

        Ok(StoredObject {
            key: key.to_string(),
            path: format!("s3://{}/{key}", self.bucket),
            url: self.url(key, lookslab_core::images::DEFAULT_URL_EXPIRY_SECS).await?,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn url(&self, key: &str, expires_in: u64) -> Result<String, StorageError> {
        match &self.cloudfront_domain {
            Some(domain) => Ok(format!("https://{domain}/{key}")),
            None => self.presigned_url(key, expires_in).await,
        }
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
