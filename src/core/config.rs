//! Application configuration management
//!
//! Handles loading and saving application settings including:
//! - OAuth app registration (client id, redirect URI)
//! - Page sizes and search debounce
//! - Where the vault key is kept
//!
//! ## Environment Variable Overrides
//!
//! - `GHVIEW_CONFIG_DIR` - directory holding `config.toml`
//! - `GHVIEW_DATA_DIR` - directory holding the encrypted token
//! - `GHVIEW_KEY_SOURCE` - `keyring` or `memory`
//! - `GHVIEW_CLIENT_SECRET` - OAuth client secret
//!
//! Priority: env var > config file > default

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use keyring::Entry;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::core::keys::SERVICE_NAME;
use crate::error::{GhviewError, Result};
use crate::github::auth::OAuthApp;
use crate::github::client::DEFAULT_API_BASE_URL;

const CONFIG_DIR_ENV: &str = "GHVIEW_CONFIG_DIR";
const DATA_DIR_ENV: &str = "GHVIEW_DATA_DIR";
const KEY_SOURCE_ENV: &str = "GHVIEW_KEY_SOURCE";
const CLIENT_SECRET_ENV: &str = "GHVIEW_CLIENT_SECRET";

/// Keyring entry for the OAuth client secret
const CLIENT_SECRET_KEY: &str = "oauth_client_secret";

/// GitHub caps `per_page` at 100
pub const MAX_PAGE_SIZE: u32 = 100;

/// Where the credential vault keeps its encryption key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeySource {
    /// System keyring (default)
    #[default]
    Keyring,
    /// Process memory only; the stored token does not survive a restart
    Memory,
}

impl KeySource {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Some(KeySource::Keyring),
            "memory" => Some(KeySource::Memory),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KeySource::Keyring => "keyring",
            KeySource::Memory => "memory",
        }
    }
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OAuth app client id
    #[serde(default)]
    pub client_id: String,

    /// Redirect URI registered for the OAuth app
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// REST API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Repositories requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Branches requested per page
    #[serde(default = "default_branch_page_size")]
    pub branch_page_size: u32,

    /// Quiet period before a typed search is sent, in milliseconds
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Where the vault key lives
    #[serde(default)]
    pub key_source: KeySource,
}

fn default_redirect_uri() -> String {
    "http://127.0.0.1:8765/callback".to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_branch_page_size() -> u32 {
    30
}

fn default_search_debounce_ms() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: default_redirect_uri(),
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            branch_page_size: default_branch_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            key_source: KeySource::default(),
        }
    }
}

impl Config {
    /// Load configuration with environment overrides applied
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        if let Ok(source) = std::env::var(KEY_SOURCE_ENV) {
            config.key_source = KeySource::from_str(&source).ok_or_else(|| {
                GhviewError::Config(format!(
                    "{} must be 'keyring' or 'memory', got '{}'",
                    KEY_SOURCE_ENV, source
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file as written, or defaults if it does not exist
    ///
    /// Use this when the result will be saved back, so environment overrides
    /// are not persisted.
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("page_size", self.page_size),
            ("branch_page_size", self.branch_page_size),
        ] {
            if value == 0 || value > MAX_PAGE_SIZE {
                return Err(GhviewError::Config(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_PAGE_SIZE, value
                )));
            }
        }
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = env_dir(CONFIG_DIR_ENV) {
            return Ok(dir);
        }

        Ok(project_dirs()?.config_dir().to_path_buf())
    }

    /// Get the directory holding the encrypted token
    pub fn data_dir() -> Result<PathBuf> {
        if let Some(dir) = env_dir(DATA_DIR_ENV) {
            return Ok(dir);
        }

        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Debounce window for typed searches
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// OAuth app settings, if the app has been configured
    pub fn oauth_app(&self) -> Result<Option<OAuthApp>> {
        if self.client_id.trim().is_empty() {
            return Ok(None);
        }

        let Some(client_secret) = Self::client_secret()? else {
            return Ok(None);
        };

        Ok(Some(OAuthApp {
            client_id: self.client_id.trim().to_string(),
            client_secret,
            redirect_uri: self.redirect_uri.clone(),
        }))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // OAuth Client Secret
    // ─────────────────────────────────────────────────────────────────────────

    /// Retrieve the OAuth client secret
    ///
    /// Priority: environment variable > keyring
    pub fn client_secret() -> Result<Option<SecretString>> {
        if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
            if !secret.is_empty() {
                return Ok(Some(SecretString::from(secret)));
            }
        }

        let entry = Entry::new(SERVICE_NAME, CLIENT_SECRET_KEY)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(SecretString::from(password))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(GhviewError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    /// Store the OAuth client secret in the keyring
    pub fn store_client_secret(secret: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, CLIENT_SECRET_KEY)?;
        entry.set_password(secret)?;
        Ok(())
    }

    /// Delete the OAuth client secret from the keyring
    pub fn delete_client_secret() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, CLIENT_SECRET_KEY)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(GhviewError::Credential(e.to_string())),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "ghview", "ghview")
        .ok_or_else(|| GhviewError::Config("Could not determine config directory".into()))
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
