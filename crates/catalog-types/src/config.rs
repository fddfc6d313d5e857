use serde::{Deserialize, Serialize};

/// Feature flags controlling which optional integrations are active.
///
/// Every field defaults to `false` so that a missing or incomplete config
/// file disables all optional features.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FeatureFlags {
    /// Persist to Postgres instead of the in-memory catalog.
    #[serde(default)]
    pub database: bool,
    /// Store assets in S3 instead of on local disk.
    #[serde(default)]
    pub s3: bool,
    #[serde(default)]
    pub telemetry: bool,
}

/// Search dispatch tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSettings {
    /// Maximum hits kept per content type.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    /// Per-backend time budget in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_result_limit() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    2000
}

impl SearchSettings {
    /// Most hits any content type may return.
    pub const MAX_RESULT_LIMIT: usize = 10;

    /// These settings with `result_limit` held to `1..=MAX_RESULT_LIMIT`.
    pub fn clamped(self) -> Self {
        Self {
            result_limit: self.result_limit.clamp(1, Self::MAX_RESULT_LIMIT),
            ..self
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Asset storage locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// Root directory of the local public disk.
    #[serde(default = "default_root")]
    pub root: String,
    /// URL prefix under which the public disk is served.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// S3 bucket used when the `s3` flag is on.
    #[serde(default = "default_bucket")]
    pub bucket: String,
}

fn default_root() -> String {
    "storage/public".to_string()
}

fn default_public_url() -> String {
    "/storage".to_string()
}

fn default_bucket() -> String {
    "catalog".to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            public_url: default_public_url(),
            bucket: default_bucket(),
        }
    }
}

/// Top-level config file structure matching `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureFlags,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}
