use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIME_OFFSET_SECS: i64 = 900; // upper bound of a task's delay within one run

/// Top-level config (panel.toml + PANEL_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Where the panel's client API lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client API key sent as a bearer token.
    /// Override with env var: PANEL_API__API_KEY
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Check cron field grammar and ranges locally instead of leaving it to the panel.
    #[serde(default)]
    pub strict_cron: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl PanelConfig {
    /// Load config from a TOML file with PANEL_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.panel/panel.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: PanelConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PANEL_").split("__"))
            .extract()
            .map_err(|e| crate::error::PanelError::Config(e.to_string()))?;

        tracing::debug!(%path, base_url = %config.api.base_url, "config loaded");
        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.panel/panel.toml", home)
}
