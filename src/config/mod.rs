//! Configuration loading and storage
//!
//! Settings live in a TOML file under the platform config directory. The
//! access token itself is never written here; only the client credentials
//! needed to obtain one.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::AuthConfig;
use crate::models::{AirportCode, Locale};

const ENV_CLIENT_ID: &str = "FLIGHTBOARD_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "FLIGHTBOARD_CLIENT_SECRET";

const TDX_AIR_BASE: &str = "https://tdx.transportdata.tw/api/basic/v2/Air";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

/// Data API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the TDX air endpoints
    pub base_url: String,
    /// Per-request timeout (connect + response)
    pub request_timeout_secs: u64,
    /// Optional `$top` limit for board queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: TDX_AIR_BASE.to_string(),
            request_timeout_secs: 30,
            max_records: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Weekday and status language
    pub locale: Locale,
    /// Auto-refresh period for `watch` and the TUI
    pub refresh_interval_secs: u64,
    /// Exchange a token at startup instead of on first request
    pub prime_token: bool,
    /// Airport preselected in the TUI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_airport: Option<AirportCode>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            refresh_interval_secs: 300,
            prime_token: false,
            default_airport: None,
        }
    }
}

impl DisplayConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("tw", "flightboard", "flightboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Default config file path
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Write a default config holding the given credentials.
    ///
    /// An existing file is only replaced when `force` is set.
    pub fn init(
        path: Option<&Path>,
        client_id: &str,
        client_secret: &str,
        force: bool,
    ) -> Result<PathBuf> {
        let path = Self::resolve(path)?;
        if path.exists() && !force {
            bail!(
                "Config file {} already exists (use --force to overwrite)",
                path.display()
            );
        }

        let mut config = Self::default();
        config.auth.client_id = client_id.trim().to_string();
        config.auth.client_secret = client_secret.trim().to_string();
        config.save(Some(&path))
    }

    /// Load configuration from `path` (or the default location), then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        let mut config = Self::load_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Override credentials from the environment.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.auth.client_id = id;
        }
        if let Some(secret) = lookup(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.auth.client_secret = secret;
        }
    }

    /// Save configuration to `path` (or the default location).
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve(path)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // The file holds the client secret: create it owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&path)
            .context("Failed to open config file for writing")?;

        // `mode` only applies on creation; tighten a pre-existing file
        // before the secret is written into it.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .context("Failed to set config permissions")?;
        }

        file.write_all(content.as_bytes())
            .context("Failed to write config file")?;

        Ok(path)
    }
}
