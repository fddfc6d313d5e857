//! Object stores behind the asset resolver.

pub mod local;
pub mod s3;

pub use local::LocalDiskStore;
pub use s3::{S3ObjectStore, S3Settings};

use async_trait::async_trait;

/// Public asset storage (posters, portraits, logos).
///
/// Keys are relative, `/`-separated references such as `tags/<uuid>.png`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<(), String>;

    async fn exists(&self, key: &str) -> Result<bool, String>;

    /// Delete an object. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), String>;

    /// Browser-reachable URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
