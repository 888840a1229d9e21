//! Object storage for rendered invoice documents

use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};

/// Content type of stored invoice documents
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// S3 client bound to the invoice bucket. Disabled when no bucket is configured.
#[derive(Clone)]
pub struct InvoiceStorage {
    client: Option<S3Client>,
    bucket: Option<String>,
}

impl InvoiceStorage {
    /// Build the client from configuration, loading AWS credentials from the environment
    pub async fn from_config(config: &StorageConfig) -> Self {
        let Some((region, bucket)) = config.target() else {
            tracing::warn!("Invoice bucket or region not configured, S3 disabled");
            return Self::disabled();
        };

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        tracing::info!(region, bucket, "Invoice storage enabled");

        Self {
            client: Some(S3Client::new(&aws_config)),
            bucket: Some(bucket.to_string()),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            bucket: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some() && self.bucket.is_some()
    }

    /// Upload a PDF under `key`
    pub async fn put_pdf(&self, key: &str, body: Vec<u8>) -> AppResult<()> {
        let (Some(client), Some(bucket)) = (&self.client, &self.bucket) else {
            return Err(AppError::Storage("S3 client not configured".to_string()));
        };

        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(PDF_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload of {} failed: {}", key, e)))?;

        tracing::debug!(key, bucket = %bucket, "Invoice PDF uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_storage() {
        assert!(!InvoiceStorage::disabled().is_enabled());
    }

    #[tokio::test]
    async fn test_missing_bucket_disables_storage() {
        let config = StorageConfig {
            region: Some("ap-south-1".to_string()),
            invoice_bucket: None,
        };
        let storage = InvoiceStorage::from_config(&config).await;
        assert!(!storage.is_enabled());
    }

    #[tokio::test]
    async fn test_upload_without_client_fails() {
        let result = InvoiceStorage::disabled()
            .put_pdf("invoices/2024-01-01/INV202401010001.pdf", b"%PDF".to_vec())
            .await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
