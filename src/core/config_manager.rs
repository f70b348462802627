// src/core/config_manager.rs
//! Configuration loading: optional `config.yaml` with one block per
//! environment, then environment variable overrides.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::service_client::DEFAULT_TIMEOUT_SECS;
use crate::core::{FsOps, ServiceClient};

pub const DEFAULT_BRIEF_API_URL: &str = "https://rhia-copilot-dashboard.onrender.com";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub name: String,
    pub data_path: PathBuf,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub brief_api_url: String,
    pub hunter_api_url: Option<String>,
    pub hunter_api_token: Option<String>,
    pub timeout_seconds: u64,
}

/// One environment block of `config.yaml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub brief_api_url: Option<String>,
    pub hunter_api_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub data_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: FileConfig,
    #[serde(default)]
    production: FileConfig,
}

impl ConfigManager {
    /// Load configuration from `config.yaml` (or `BRIEFGEN_CONFIG`) and the
    /// process environment
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("BRIEFGEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit file path and variable lookup.
    /// A missing file is not an error: defaults and variables still apply.
    pub fn load_from<F>(config_path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Self::environment_name(&lookup);
        info!("Loading configuration for environment: {}", environment);

        let file_config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            Self::select_environment(&content, &environment)?
        } else {
            FileConfig::default()
        };

        Self::resolve(environment, file_config, &lookup)
    }

    fn environment_name<F>(lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("BRIEFGEN_ENV")
            .or_else(|| lookup("ENVIRONMENT"))
            .or_else(|| lookup("ENV"))
            .unwrap_or_else(|| "local".to_string())
    }

    fn select_environment(content: &str, environment: &str) -> Result<FileConfig> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn resolve<F>(environment: String, file: FileConfig, lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let brief_api_url = lookup("BRIEF_API_URL")
            .or(file.brief_api_url)
            .unwrap_or_else(|| DEFAULT_BRIEF_API_URL.to_string());

        let hunter_api_url = lookup("HUNTER_API_URL").or(file.hunter_api_url);
        let hunter_api_token = lookup("HUNTER_API_TOKEN");

        let timeout_seconds = match lookup("SERVICE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("SERVICE_TIMEOUT_SECS must be a number of seconds"))?,
            None => file.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        let data_path = resolve_path(&file.data_path.unwrap_or_else(|| PathBuf::from("data")))?;
        let database_path = match file.database_path {
            Some(path) => resolve_path(&path)?,
            None => data_path.join("briefs.db"),
        };

        Ok(Self {
            environment: EnvironmentConfig {
                name: environment,
                data_path,
                database_path,
            },
            service: ServiceConfig {
                brief_api_url,
                hunter_api_url,
                hunter_api_token,
                timeout_seconds,
            },
        })
    }

    pub fn brief_service_client(&self) -> Result<ServiceClient> {
        ServiceClient::new(&self.service.brief_api_url, self.service.timeout_seconds)
    }

    pub fn hunter_service_client(&self) -> Result<ServiceClient> {
        let url = self
            .service
            .hunter_api_url
            .as_deref()
            .context("HUNTER_API_URL is not configured")?;

        let client = ServiceClient::new(url, self.service.timeout_seconds)?;
        Ok(match &self.service.hunter_api_token {
            Some(token) => client.with_bearer_token(token),
            None => client,
        })
    }

    /// Ensure the directory holding the archive exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(db_parent) = self.environment.database_path.parent() {
            FsOps::ensure_dir_exists(db_parent).await?;
        }

        Ok(())
    }
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(current_dir.join(path))
    }
}
