use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub ai_gateway: AiGatewayConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiGatewayConfig {
    /// Chat-completions endpoint
    #[serde(default = "default_ai_gateway_url")]
    pub url: String,
    /// Bearer token; falls back to the FOOD_SCAN_AI_API_KEY environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_timeout")]
    pub timeout: String,
}

/// Per-user monthly spending caps for paid AI calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Cost charged for every scan that reaches the AI gateway
    #[serde(default = "default_scan_cost_cents")]
    pub scan_cost_cents: i64,
    /// Cost charged for every generated family meal plan
    #[serde(default = "default_meal_plan_cost_cents")]
    pub meal_plan_cost_cents: i64,
    /// Ceiling written into usage rows when they are first created
    #[serde(default = "default_monthly_limit_cents")]
    pub monthly_limit_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of leading base64 characters hashed into the cache key
    #[serde(default = "default_hash_prefix_len")]
    pub hash_prefix_len: usize,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_max_request_size() -> usize {
    DEFAULT_MAX_REQUEST_SIZE_BYTES
}

fn default_ai_gateway_url() -> String {
    DEFAULT_AI_GATEWAY_URL.to_string()
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_ai_timeout() -> String {
    DEFAULT_AI_TIMEOUT.to_string()
}

fn default_scan_cost_cents() -> i64 {
    DEFAULT_SCAN_COST_CENTS
}

fn default_meal_plan_cost_cents() -> i64 {
    DEFAULT_MEAL_PLAN_COST_CENTS
}

fn default_monthly_limit_cents() -> i64 {
    DEFAULT_MONTHLY_LIMIT_CENTS
}

fn default_hash_prefix_len() -> usize {
    DEFAULT_HASH_PREFIX_LEN
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_request_size: default_max_request_size(),
        }
    }
}

impl Default for AiGatewayConfig {
    fn default() -> Self {
        Self {
            url: default_ai_gateway_url(),
            api_key: None,
            model: default_ai_model(),
            timeout: default_ai_timeout(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            scan_cost_cents: default_scan_cost_cents(),
            meal_plan_cost_cents: default_meal_plan_cost_cents(),
            monthly_limit_cents: default_monthly_limit_cents(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hash_prefix_len: default_hash_prefix_len(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            web: WebConfig::default(),
            ai_gateway: AiGatewayConfig::default(),
            budget: BudgetConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid web.request_timeout '{}'", self.request_timeout))
    }
}

impl AiGatewayConfig {
    pub fn timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.timeout)
            .with_context(|| format!("Invalid ai_gateway.timeout '{}'", self.timeout))
    }

    /// API key from the config file, or from the environment when the file has none
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(AI_API_KEY_ENV).ok())
    }
}

impl Config {
    /// Load configuration from a TOML file layered with `FOOD_SCAN_*` environment overrides.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !std::path::Path::new(config_file).exists() {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
        }

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load configuration from {config_file}"))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at request time
    pub fn validate(&self) -> Result<()> {
        self.web.request_timeout()?;
        self.ai_gateway.timeout()?;

        if self.scan.hash_prefix_len == 0 {
            anyhow::bail!("scan.hash_prefix_len must be greater than zero");
        }
        if self.budget.scan_cost_cents < 0 || self.budget.meal_plan_cost_cents < 0 {
            anyhow::bail!("budget costs must not be negative");
        }
        if self.budget.monthly_limit_cents < 0 {
            anyhow::bail!("budget.monthly_limit_cents must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan.hash_prefix_len, 10_000);
        assert_eq!(config.web.request_timeout().unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::load_from_file(path).unwrap();

        assert!(std::path::Path::new(path).exists());
        assert_eq!(config.web.port, DEFAULT_PORT);
        assert_eq!(config.budget.monthly_limit_cents, DEFAULT_MONTHLY_LIMIT_CENTS);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[budget]\nscan_cost_cents = 5\nmonthly_limit_cents = 500\n",
        )
        .unwrap();

        let config = Config::load_from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(config.budget.scan_cost_cents, 5);
        assert_eq!(config.budget.monthly_limit_cents, 500);
        assert_eq!(config.budget.meal_plan_cost_cents, DEFAULT_MEAL_PLAN_COST_CENTS);
        assert_eq!(config.database.url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let mut config = Config::default();
        config.ai_gateway.timeout = "soon".to_string();
        assert!(config.validate().is_err());
    }
}
