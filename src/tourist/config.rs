use crate::error::{Result, TouristError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "FLICKR_API_KEY";

pub const DEFAULT_SEARCH_BASE: &str = "https://www.flickr.com/services/rest";
pub const DEFAULT_PHOTO_BASE: &str = "https://live.staticflickr.com";

/// Configuration for tourist, stored in `<data-dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouristConfig {
    /// Flickr API key
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the REST search endpoint
    #[serde(default = "default_search_base")]
    pub search_base: String,

    /// Base URL of the static image host
    #[serde(default = "default_photo_base")]
    pub photo_base: String,

    /// Photos requested per search
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Searches pick a random page in `1..=max_page`
    #[serde(default = "default_max_page")]
    pub max_page: u32,

    /// Half the side of the search bounding box, in degrees
    #[serde(default = "default_bbox_half_size")]
    pub bbox_half_size: f64,

    /// HTTP client timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_base() -> String {
    DEFAULT_SEARCH_BASE.to_string()
}

fn default_photo_base() -> String {
    DEFAULT_PHOTO_BASE.to_string()
}

fn default_per_page() -> u32 {
    15
}

fn default_max_page() -> u32 {
    10
}

fn default_bbox_half_size() -> f64 {
    0.1
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for TouristConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            search_base: default_search_base(),
            photo_base: default_photo_base(),
            per_page: default_per_page(),
            max_page: default_max_page(),
            bbox_half_size: default_bbox_half_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl TouristConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(TouristError::Io)?;
        let config: TouristConfig =
            serde_json::from_str(&content).map_err(TouristError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(TouristError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(TouristError::Serialization)?;
        fs::write(config_path, content).map_err(TouristError::Io)?;
        Ok(())
    }

    /// Applies `FLICKR_API_KEY` when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = key.trim().to_string();
            }
        }
        self
    }

    pub const KEYS: &'static [&'static str] = &[
        "api-key",
        "search-base",
        "photo-base",
        "per-page",
        "max-page",
        "bbox-half-size",
        "timeout-secs",
    ];

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api-key" => Some(self.api_key.clone()),
            "search-base" => Some(self.search_base.clone()),
            "photo-base" => Some(self.photo_base.clone()),
            "per-page" => Some(self.per_page.to_string()),
            "max-page" => Some(self.max_page.to_string()),
            "bbox-half-size" => Some(self.bbox_half_size.to_string()),
            "timeout-secs" => Some(self.timeout_secs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "api-key" => self.api_key = value.trim().to_string(),
            "search-base" => self.search_base = value.trim_end_matches('/').to_string(),
            "photo-base" => self.photo_base = value.trim_end_matches('/').to_string(),
            "per-page" => self.per_page = parse_positive(key, value)?,
            "max-page" => self.max_page = parse_positive(key, value)?,
            "bbox-half-size" => {
                let size: f64 = value
                    .parse()
                    .map_err(|_| format!("{} must be a number, got {}", key, value))?;
                if !size.is_finite() || size <= 0.0 {
                    return Err(format!("{} must be greater than zero", key));
                }
                self.bbox_half_size = size;
            }
            "timeout-secs" => self.timeout_secs = u64::from(parse_positive(key, value)?),
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> std::result::Result<u32, String> {
    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(format!("{} must be a positive integer, got {}", key, value)),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TouristConfig::default();
        assert_eq!(config.per_page, 15);
        assert_eq!(config.max_page, 10);
        assert_eq!(config.bbox_half_size, 0.1);
        assert_eq!(config.search_base, DEFAULT_SEARCH_BASE);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = TouristConfig::load(dir.path()).unwrap();
        assert_eq!(config, TouristConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = TouristConfig::default();
        config.set("per-page", "30").unwrap();
        config.set("api-key", "abc123").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = TouristConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.per_page, 30);
        assert_eq!(loaded.api_key, "abc123");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"api_key":"k"}"#).unwrap();

        let loaded = TouristConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.api_key, "k");
        assert_eq!(loaded.max_page, 10);
    }

    #[test]
    fn test_set_rejects_zero_page_size() {
        let mut config = TouristConfig::default();
        assert!(config.set("per-page", "0").is_err());
        assert_eq!(config.per_page, 15);
    }

    #[test]
    fn test_set_strips_trailing_slash() {
        let mut config = TouristConfig::default();
        config.set("photo-base", "http://127.0.0.1:9000/").unwrap();
        assert_eq!(config.photo_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_unknown_key() {
        let mut config = TouristConfig::default();
        assert!(config.get("file-ext").is_none());
        assert!(config.set("file-ext", ".md").is_err());
    }
}
