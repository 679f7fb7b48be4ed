use anyhow::Context;
use serde::Deserialize;

/// Main configuration structure loaded from an optional TOML file
/// (`BOARD_CONFIG`) with environment variable overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where the Activity Service lives and how long to wait for it.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_url")]
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Terminal front end settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Log destination; the alternate screen owns the terminal, so
    /// tracing output is dropped unless a file is configured.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_service_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_tick_ms() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_service_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration: TOML file if `BOARD_CONFIG` points at one,
    /// then environment overrides, then validation.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("BOARD_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {path}"))?;
                toml::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file {path}"))?
            }
            Err(_) => Config::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("BOARD_SERVICE_URL") {
            if !url.is_empty() {
                self.service.url = url;
            }
        }
        if let Some(ms) = std::env::var("BOARD_HTTP_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.service.timeout_ms = ms;
        }
        if let Some(ms) = std::env::var("BOARD_TICK_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            self.ui.tick_ms = ms.clamp(50, 1000);
        }
        if let Ok(path) = std::env::var("BOARD_LOG") {
            if !path.is_empty() {
                self.ui.log_file = Some(path);
            }
        }
        if let Ok(level) = std::env::var("BOARD_LOG_LEVEL") {
            if !level.is_empty() {
                self.ui.log_level = level;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.service.url.is_empty() {
            anyhow::bail!("BOARD_SERVICE_URL must not be empty");
        }
        if !(self.service.url.starts_with("http://") || self.service.url.starts_with("https://")) {
            anyhow::bail!("BOARD_SERVICE_URL must be an http(s) URL");
        }
        if self.service.timeout_ms == 0 {
            anyhow::bail!("BOARD_HTTP_TIMEOUT_MS must be > 0");
        }
        if !(50..=1000).contains(&self.ui.tick_ms) {
            anyhow::bail!("BOARD_TICK_MS must be between 50 and 1000");
        }
        Ok(())
    }
}
