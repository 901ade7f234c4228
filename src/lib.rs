//! innstastay: server-rendered hotel marketing and booking-comparison site
//!
//! Pages live in an external CMS as ordered lists of typed content sections;
//! this crate resolves their fragment references, renders them through Tera
//! templates, and proxies live rate lookups to the upstream pricing API.

pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod rates;
pub mod render;
pub mod server;

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

use content::{ApiStore, ContentStore, MemoryStore};

/// Configuration file name
const CONFIG_FILE: &str = "innstastay.yml";

/// The main InnstaStay application
#[derive(Clone)]
pub struct InnstaStay {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Local content directory (file store mode)
    pub content_dir: std::path::PathBuf,
}

impl InnstaStay {
    /// Create a new InnstaStay instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
        })
    }

    /// Open the configured content store
    pub fn open_store(&self) -> Result<Arc<dyn ContentStore>> {
        match self.config.store.mode.as_str() {
            "file" => Ok(Arc::new(MemoryStore::from_dir(&self.content_dir)?)),
            "api" => Ok(Arc::new(ApiStore::new(&self.config.store.api)?)),
            other => bail!("Unknown store mode: {} (expected file or api)", other),
        }
    }
}
