use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default address of a local ActivityWatch server
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5600";

/// How the chart is presented
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Interactive terminal chart
    Tui,
    /// One-shot bar listing on stdout
    Text,
    /// Chart document as JSON on stdout
    Json,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: default_server_url(),
            hostname: None,
            format: None,
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "activitywatch", "blockchart")
}

impl Config {
    pub fn get_config_path() -> Option<PathBuf> {
        project_dirs().map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }

    /// Load the config file, returning defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path().ok_or(ConfigError::NoConfigDirectory)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_data = fs::read_to_string(config_path).map_err(|e| {
            ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&config_data).map_err(|e| {
            ConfigError::LoadFailed(format!("{}: {}", config_path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path().ok_or(ConfigError::NoConfigDirectory)?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let config_data = serde_json::to_string_pretty(self)?;

        fs::write(config_path, config_data)
            .map_err(|e| ConfigError::SaveFailed(format!("{}: {}", config_path.display(), e)))?;

        Ok(())
    }

    /// Checks that the server URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        validate_server_url(&self.server_url)?;
        Ok(())
    }
}

pub fn validate_server_url(server_url: &str) -> Result<Url> {
    let url = Url::parse(server_url)
        .map_err(|e| ConfigError::InvalidServerUrl(format!("{}: {}", server_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidServerUrl(format!(
            "{}: unsupported scheme {}",
            server_url, other
        ))
        .into()),
    }
}
