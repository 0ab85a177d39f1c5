//! Configuration types for Kennel

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::InvalidConfigValueError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where pets, groups and traits are persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// SQLite database file, created on first use
    Sqlite { path: PathBuf },
}

/// Server configuration (kennel.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,

    /// Base URL used for pagination `next`/`previous` links
    pub public_url: String,

    /// Pets per page
    pub page_size: usize,

    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            storage: StorageConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.page_size == 0 {
            return Err(InvalidConfigValueError {
                field: "pageSize".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if !(self.public_url.starts_with("http://") || self.public_url.starts_with("https://")) {
            return Err(InvalidConfigValueError {
                field: "publicUrl".to_string(),
                reason: format!("unsupported URL: {}", self.public_url),
            }
            .into());
        }
        Ok(())
    }

    /// `public_url` without a trailing slash
    pub fn base_url(&self) -> &str {
        self.public_url.trim_end_matches('/')
    }
}
