use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ports::youtube::PrivacyStatus;
use crate::youtube_rs::playlist::DEFAULT_API_BASE_URL;

const APP_DIR: &str = "rimusic2yt";

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google OAuth client secret, as downloaded from the Cloud console
    client_secret: Option<String>,
    /// Where the OAuth token is cached between runs
    token_cache: Option<String>,
    pub privacy_status: PrivacyStatus,
    pub playlist_description: String,
    api_base_url: Option<String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load the default config file, falling back to defaults if there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            log::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    /// Expand ~ to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn client_secret_path(&self) -> PathBuf {
        match &self.client_secret {
            Some(path) => Self::expand_path(path),
            None => Self::config_dir().join("client_secret.json"),
        }
    }

    pub fn token_cache_path(&self) -> PathBuf {
        match &self.token_cache {
            Some(path) => Self::expand_path(path),
            None => Self::config_dir().join("token.json"),
        }
    }

    /// Base URL of the YouTube Data API, always ending in `/` so endpoints can be joined.
    pub fn api_base_url(&self) -> Result<Url> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let mut url = Url::parse(raw).wrap_err(format!("Invalid api_base_url: {raw}"))?;
        if url.cannot_be_a_base() {
            return Err(eyre!("Invalid api_base_url: {raw}"));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}
