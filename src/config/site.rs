//! Site configuration (innstastay.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // URL
    pub url: String,

    // Content
    pub content_dir: String,
    pub store: StoreConfig,

    // Price comparison
    pub rates: RatesConfig,

    // Server
    pub server: ServerConfig,
    pub webhook: WebhookConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "InnstaStay".to_string(),
            description: "Compare direct hotel rates".to_string(),
            language: "en".to_string(),

            url: "http://localhost:4000".to_string(),

            content_dir: "content".to_string(),
            store: StoreConfig::default(),

            rates: RatesConfig::default(),

            server: ServerConfig::default(),
            webhook: WebhookConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Content store selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `file` reads JSON documents from `content_dir`; `api` queries the
    /// hosted document store over HTTP
    pub mode: String,
    pub api: ApiStoreConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: "file".to_string(),
            api: ApiStoreConfig::default(),
        }
    }
}

/// Hosted document store settings (GROQ query endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStoreConfig {
    pub base_url: String,
    pub api_version: String,
    pub dataset: String,
    /// Environment variable holding the read token; never stored in the file
    pub token_env: String,
    pub timeout_secs: u64,
}

impl Default for ApiStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_version: "v2024-01-01".to_string(),
            dataset: "production".to_string(),
            token_env: "INNSTASTAY_STORE_TOKEN".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiStoreConfig {
    /// Full query endpoint URL
    pub fn query_url(&self) -> String {
        format!(
            "{}/{}/data/query/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            self.dataset
        )
    }

    /// Read token from the configured environment variable, if set
    pub fn resolve_token(&self) -> Option<String> {
        std::env::var(&self.token_env).ok().filter(|t| !t.is_empty())
    }
}

/// Upstream rate API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// URL template with `{token}`, `{checkin}`, `{checkout}` and `{adults}`
    /// placeholders
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Hotel slug -> upstream hotel token
    pub hotels: HashMap<String, String>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 15,
            hotels: HashMap::new(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

/// Cache-invalidation webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Header carrying the shared secret
    pub header: String,
    /// Environment variable holding the shared secret
    pub secret_env: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            header: "x-webhook-secret".to_string(),
            secret_env: "INNSTASTAY_WEBHOOK_SECRET".to_string(),
        }
    }
}

impl WebhookConfig {
    /// Read the shared secret from the configured environment variable
    pub fn resolve_secret(&self) -> Option<String> {
        std::env::var(&self.secret_env).ok().filter(|s| !s.is_empty())
    }
}
