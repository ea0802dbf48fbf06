//! Configuration loading for Trustmart.
//! Reads trustmart.toml from the current directory or the path in the
//! TRUSTMART_CONFIG env var. Secrets only ever come from the environment.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 8000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    /// Appended to the product name when building the web-search query.
    #[serde(default = "default_query_suffix")]
    pub query_suffix: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Bound on each individual search / reverse-image call.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    /// Bound on a whole product analysis.
    #[serde(default = "default_analysis_deadline")]
    pub analysis_deadline_secs: u64,
}

fn default_search_base_url() -> String { "https://serpapi.com/search.json".to_string() }
fn default_query_suffix()    -> String { " India price and specs".to_string() }
fn default_max_results()     -> usize  { 5 }
fn default_search_timeout()  -> u64    { 15 }
fn default_analysis_deadline() -> u64  { 60 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            query_suffix: default_query_suffix(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
            analysis_deadline_secs: default_analysis_deadline(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini" or "openai_compatible".
    #[serde(default = "default_llm_backend")]
    pub backend: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Only used by the OpenAI-compatible backend.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_llm_backend() -> String { "gemini".to_string() }
fn default_llm_model()   -> String { "gemini-1.5-flash".to_string() }
fn default_llm_timeout() -> u64    { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            model: default_llm_model(),
            base_url: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO code of the marketplace currency.
    #[serde(default = "default_local_currency")]
    pub local_currency: String,
    #[serde(default = "default_local_symbol")]
    pub local_symbol: String,
    /// Units of local currency per one unit of the keyed currency.
    #[serde(default = "default_exchange_rates")]
    pub exchange_rates: BTreeMap<String, f64>,
}

fn default_local_currency() -> String { "INR".to_string() }
fn default_local_symbol()   -> String { "₹".to_string() }
fn default_exchange_rates() -> BTreeMap<String, f64> {
    BTreeMap::from([("USD".to_string(), 80.0)])
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            local_currency: default_local_currency(),
            local_symbol: default_local_symbol(),
            exchange_rates: default_exchange_rates(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_marketplace_domain")]
    pub marketplace_domain: String,
    #[serde(default = "default_reputable_domains")]
    pub reputable_domains: Vec<String>,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_marketplace_domain() -> String { "trustmart.in".to_string() }
fn default_reputable_domains() -> Vec<String> {
    [
        "amazon.in",
        "amazon.com",
        "flipkart.com",
        "croma.com",
        "reliancedigital.in",
        "vijaysales.com",
        "tatacliq.com",
        "myntra.com",
        "bestbuy.com",
        "walmart.com",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}
fn default_max_images() -> usize { 4 }

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            marketplace_domain: default_marketplace_domain(),
            reputable_domains: default_reputable_domains(),
            max_images: default_max_images(),
        }
    }
}

/// API keys, populated from the environment only.
#[derive(Debug, Default)]
pub struct Secrets {
    pub serp_api_key: Option<SecretString>,
    pub llm_api_key: Option<SecretString>,
}

impl Secrets {
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };
        Self {
            serp_api_key: read("SERPAPI_KEY"),
            llm_api_key: read("GEMINI_API_KEY").or_else(|| read("LLM_API_KEY")),
        }
    }
}


impl Config {
    /// Load configuration.
    /// Checks TRUSTMART_CONFIG env var first, then ./trustmart.toml; a missing
    /// default file means built-in defaults, a missing explicit file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let explicit = std::env::var("TRUSTMART_CONFIG").ok();
        let path = explicit.clone().unwrap_or_else(|| "trustmart.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)?
        } else if explicit.is_some() {
            return Err(ConfigError::NotFound(path));
        } else {
            Self::default()
        };

        if let Ok(port) = std::env::var("TRUSTMART_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                field: "TRUSTMART_PORT",
                reason: format!("{port:?} is not a valid port"),
            })?;
        }
        config.secrets = Secrets::from_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "search.timeout_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.search.analysis_deadline_secs < self.search.timeout_secs {
            return Err(ConfigError::Invalid {
                field: "search.analysis_deadline_secs",
                reason: "must not be shorter than search.timeout_secs".into(),
            });
        }
        if let Some((code, rate)) = self
            .pricing
            .exchange_rates
            .iter()
            .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
        {
            return Err(ConfigError::Invalid {
                field: "pricing.exchange_rates",
                reason: format!("rate for {code} must be positive, got {rate}"),
            });
        }
        Ok(())
    }
}
