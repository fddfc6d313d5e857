use catalog_types::AppConfig;
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Default config path, relative to the working directory.
const CONFIG_PATH: &str = "config.toml";

/// Config path, overridable with `CATALOG_CONFIG`.
fn config_path() -> String {
    std::env::var("CATALOG_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string())
}

/// Parse a config document. Missing sections and keys take their defaults;
/// `search.result_limit` is held to `1..=10`.
pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    let mut config: AppConfig = toml::from_str(contents)?;
    let requested = config.search.result_limit;
    config.search = config.search.clamped();
    if config.search.result_limit != requested {
        tracing::warn!(
            requested,
            applied = config.search.result_limit,
            "search.result_limit out of range"
        );
    }
    Ok(config)
}

/// Read the config file and store it in the global `OnceLock`. Safe to call
/// multiple times; only the first call has effect.
///
/// A missing or unparseable file yields the defaults (all flags off).
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let config = parse_config(&contents).unwrap_or_else(|e| {
                    tracing::warn!(%path, error = %e, "Failed to parse config, using defaults");
                    AppConfig::default()
                });
                tracing::info!(features = ?config.features, "Config loaded");
                config
            }
            Err(e) => {
                tracing::info!(%path, error = %e, "Config file not found, using defaults");
                AppConfig::default()
            }
        }
    })
}
