//! Configuration module

mod site;

pub use site::{
    ApiStoreConfig, RatesConfig, ServerConfig, SiteConfig, StoreConfig, WebhookConfig,
};
