// rest_api/src/config.rs

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8082;
const DEFAULT_HOST: &str = "127.0.0.1";
// Development fallback only; deployments set jwt_secret in the config file
// or HMS_JWT_SECRET.
const DEFAULT_JWT_SECRET: &str = "hms-development-secret-change-me-in-production";

/// Configuration for the REST API server.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_jwt_secret() -> String {
    env::var("HMS_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string())
}

impl Default for RestApiConfig {
    fn default() -> Self {
        RestApiConfig {
            host: default_host(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
        }
    }
}

/// Loads the REST API configuration from `HMS_CONFIG` (when set) or
/// `config.yaml` beside the manifest, falling back to defaults when no file
/// is present.
pub fn load_rest_api_config() -> Result<RestApiConfig> {
    let path = match env::var("HMS_CONFIG") {
        Ok(p) => PathBuf::from(p),
        Err(_) => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml"),
    };

    if !path.exists() {
        return Ok(RestApiConfig::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: RestApiConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RestApiConfig::default();
        assert_eq!(config.port, 8082);
        assert_eq!(config.host, "127.0.0.1");
        assert!(!config.jwt_secret.is_empty());
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: RestApiConfig = serde_yaml::from_str("port: 9090\n").unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
    }
}
