use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};

use super::ObjectStore;

const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible endpoint.
///
/// Each value is read from its `AWS_*` name first, then the `S3_*` name used
/// by local MinIO setups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl S3Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |primary: &str, fallback: &str| {
            lookup(primary)
                .or_else(|| lookup(fallback))
                .filter(|v| !v.trim().is_empty())
        };
        let required = |primary: &str, fallback: &str| {
            read(primary, fallback).ok_or_else(|| format!("{primary} or {fallback} must be set"))
        };

        Ok(Self {
            endpoint: required("AWS_ENDPOINT_URL_S3", "S3_ENDPOINT")?,
            access_key: required("AWS_ACCESS_KEY_ID", "S3_ACCESS_KEY")?,
            secret_key: required("AWS_SECRET_ACCESS_KEY", "S3_SECRET_KEY")?,
            region: read("AWS_REGION", "S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }

    /// Tigris serves buckets on their own subdomain and manages public
    /// access itself.
    fn virtual_hosted(&self) -> bool {
        self.endpoint.contains("tigris")
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        if self.virtual_hosted() {
            let host = self
                .endpoint
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            format!("https://{bucket}.{host}/{key}")
        } else {
            format!("{}/{bucket}/{key}", self.endpoint.trim_end_matches('/'))
        }
    }
}

/// Asset store on an S3-compatible bucket (MinIO locally, Tigris on Fly).
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    settings: S3Settings,
}

impl S3ObjectStore {
    pub fn new(settings: S3Settings, bucket: impl Into<String>) -> Self {
        let credentials = Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "catalog-config",
        );
        let config = aws_sdk_s3::Config::builder()
            .endpoint_url(&settings.endpoint)
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .behavior_version_latest()
            .build();

        Self {
            client: Client::from_conf(config),
            bucket: bucket.into(),
            settings,
        }
    }

    pub fn from_env(bucket: &str) -> Result<Self, String> {
        Ok(Self::new(S3Settings::from_env()?, bucket))
    }

    /// Create the bucket when missing and open it for anonymous reads, since
    /// asset URLs are handed straight to browsers.
    pub async fn ensure_bucket(&self) -> Result<(), String> {
        let bucket = self.bucket.as_str();
        let exists = self.client.head_bucket().bucket(bucket).send().await.is_ok();
        if !exists {
            self.client
                .create_bucket()
                .bucket(bucket)
                .send()
                .await
                .map_err(|e| format!("Failed to create bucket {bucket}: {}", e.into_service_error()))?;
            tracing::info!(bucket, "S3 bucket created");
        }

        if self.settings.virtual_hosted() {
            return Ok(());
        }
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(public_read_policy(bucket))
            .send()
            .await
            .map_err(|e| format!("Failed to set policy on {bucket}: {}", e.into_service_error()))?;
        tracing::info!(bucket, "Public-read policy applied");
        Ok(())
    }
}

fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket}/*")],
        }],
    })
    .to_string()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                let err = e.into_service_error();
                tracing::error!(key, error = ?err, "S3 PutObject failed");
                format!("Failed to upload {key}: {err}")
            })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;
        match result.map_err(|e| e.into_service_error()) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(format!("Failed to look up {key}: {err}")),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| format!("Failed to delete {key}: {}", e.into_service_error()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.settings.object_url(&self.bucket, key)
    }
}
