use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::content::{ContentOptions, DESCRIPTION_LENGTH, OMISSION};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Base URL of a remote post store. The local database is used when unset.
    pub store_url: Option<String>,
    pub store_token: Option<String>,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_description_length")]
    pub description_length: usize,

    #[serde(default = "default_omission")]
    pub omission: String,

    #[serde(default)]
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,

    #[serde(default = "default_site_url")]
    pub url: String,

    #[serde(default = "default_og_type")]
    pub og_type: String,

    #[serde(default = "default_og_locale")]
    pub og_locale: String,

    pub image_alt: Option<String>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("article-comments");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("posts.db").to_string_lossy().to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_description_length() -> usize {
    DESCRIPTION_LENGTH
}

fn default_omission() -> String {
    OMISSION.to_string()
}

fn default_site_name() -> String {
    "Portfolio & Blog".to_string()
}

fn default_site_url() -> String {
    "https://localhost/".to_string()
}

fn default_og_type() -> String {
    "website".to_string()
}

fn default_og_locale() -> String {
    "en_US".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: default_site_url(),
            og_type: default_og_type(),
            og_locale: default_og_locale(),
            image_alt: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            store_url: None,
            store_token: None,
            locale: default_locale(),
            description_length: default_description_length(),
            omission: default_omission(),
            site: SiteConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("article-comments")
            .join("config.toml")
    }

    pub fn content_options(&self) -> ContentOptions {
        ContentOptions {
            locale: self.locale.clone(),
            description_length: self.description_length,
            omission: self.omission.clone(),
        }
    }
}
