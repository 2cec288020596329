use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_YUML_URL: &str = "https://yuml.me/";
pub const DEFAULT_WEBSEQUENCE_URL: &str = "https://www.websequencediagrams.com/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Runtime settings for the rendering backends and the worker pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // missing keys fall back to the defaults below
pub struct Config {
    /// Base URL of the yUML service, with trailing slash
    pub yuml_url: String,
    /// Base URL of the web sequence diagram service, with trailing slash
    pub websequence_url: String,
    /// Optional HTTP proxy, e.g. `http://proxy:3128`
    pub proxy: Option<String>,
    pub request_timeout_secs: u64,
    pub worker_threads: usize,
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yuml_url: DEFAULT_YUML_URL.to_owned(),
            websequence_url: DEFAULT_WEBSEQUENCE_URL.to_owned(),
            proxy: None,
            request_timeout_secs: 30,
            worker_threads: 2,
            queue_capacity: 16,
        }
    }
}

impl Config {
    /// Reads the file named by `SCHNIZZLE_CONFIG` if set, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("SCHNIZZLE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Applies `SCHNIZZLE_*` overrides looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SCHNIZZLE_YUML_URL") {
            self.yuml_url = with_trailing_slash(url);
        }
        if let Some(url) = lookup("SCHNIZZLE_WEBSEQUENCE_URL") {
            self.websequence_url = with_trailing_slash(url);
        }
        if let Some(proxy) = lookup("SCHNIZZLE_PROXY") {
            self.proxy = Some(proxy).filter(|p| !p.trim().is_empty());
        }
        if let Some(workers) = lookup("SCHNIZZLE_WORKERS") {
            self.worker_threads = match workers.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SCHNIZZLE_WORKERS",
                        value: workers,
                    });
                }
            };
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "worker_threads": 4 }"#).unwrap();
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.yuml_url, DEFAULT_YUML_URL);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SCHNIZZLE_YUML_URL", "http://localhost:8080"),
            ("SCHNIZZLE_PROXY", "http://proxy:3128"),
            ("SCHNIZZLE_WORKERS", "3"),
        ]
        .into_iter()
        .collect();
        let config = Config::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.yuml_url, "http://localhost:8080/");
        assert_eq!(config.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.websequence_url, DEFAULT_WEBSEQUENCE_URL);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = Config::default().with_overrides(|key| {
            (key == "SCHNIZZLE_WORKERS").then(|| "0".to_owned())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schnizzle.json");
        std::fs::write(&path, r#"{ "proxy": "http://p:1", "queue_capacity": 2 }"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.queue_capacity, 2);
        assert_eq!(config.proxy.as_deref(), Some("http://p:1"));
    }
}
