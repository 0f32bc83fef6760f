//! Configuration CLI command handlers

use crate::cli::commands::{ConfigCommand, ConfigKey};
use crate::core::config::{Config, KeySource};
use crate::core::credentials::CredentialVault;
use crate::error::{GhviewError, Result};

/// Handle configuration commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => handle_show(),
        ConfigCommand::Set { key, value } => handle_set(key, value),
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Remove { key } => handle_remove(key),
        ConfigCommand::Path => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
    }
}

fn handle_show() -> Result<()> {
    let config = Config::load()?;
    println!("Configuration ({}):", Config::config_path()?.display());
    for key in ALL_KEYS {
        println!("  {:<20} {}", key_name(*key), display_value(&config, *key)?);
    }
    Ok(())
}

const ALL_KEYS: &[ConfigKey] = &[
    ConfigKey::ClientId,
    ConfigKey::ClientSecret,
    ConfigKey::RedirectUri,
    ConfigKey::ApiBaseUrl,
    ConfigKey::PageSize,
    ConfigKey::BranchPageSize,
    ConfigKey::SearchDebounceMs,
    ConfigKey::KeySource,
];

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::ClientId => "client-id",
        ConfigKey::ClientSecret => "client-secret",
        ConfigKey::RedirectUri => "redirect-uri",
        ConfigKey::ApiBaseUrl => "api-base-url",
        ConfigKey::PageSize => "page-size",
        ConfigKey::BranchPageSize => "branch-page-size",
        ConfigKey::SearchDebounceMs => "search-debounce-ms",
        ConfigKey::KeySource => "key-source",
    }
}

fn display_value(config: &Config, key: ConfigKey) -> Result<String> {
    let value = match key {
        ConfigKey::ClientId if config.client_id.is_empty() => "Not configured".to_string(),
        ConfigKey::ClientId => config.client_id.clone(),
        ConfigKey::ClientSecret => match Config::client_secret()? {
            Some(secret) => CredentialVault::mask_token(&secret),
            None => "Not configured".to_string(),
        },
        ConfigKey::RedirectUri => config.redirect_uri.clone(),
        ConfigKey::ApiBaseUrl => config.api_base_url.clone(),
        ConfigKey::PageSize => config.page_size.to_string(),
        ConfigKey::BranchPageSize => config.branch_page_size.to_string(),
        ConfigKey::SearchDebounceMs => config.search_debounce_ms.to_string(),
        ConfigKey::KeySource => config.key_source.to_string(),
    };
    Ok(value)
}

/// Apply `value` for `key` to `config`
///
/// The client secret never lives in the file and is rejected here.
fn apply(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        ConfigKey::ClientId => config.client_id = value.to_string(),
        ConfigKey::RedirectUri => {
            url::Url::parse(value).map_err(|e| {
                GhviewError::InvalidInput(format!("Invalid redirect URI '{}': {}", value, e))
            })?;
            config.redirect_uri = value.to_string();
        }
        ConfigKey::ApiBaseUrl => {
            url::Url::parse(value).map_err(|e| {
                GhviewError::InvalidInput(format!("Invalid API URL '{}': {}", value, e))
            })?;
            config.api_base_url = value.trim_end_matches('/').to_string();
        }
        ConfigKey::PageSize => config.page_size = parse_number(key, value)?,
        ConfigKey::BranchPageSize => config.branch_page_size = parse_number(key, value)?,
        ConfigKey::SearchDebounceMs => config.search_debounce_ms = parse_number(key, value)?,
        ConfigKey::KeySource => {
            config.key_source = KeySource::from_str(value).ok_or_else(|| {
                GhviewError::InvalidInput(format!(
                    "Invalid key source '{}'. Available: keyring, memory",
                    value
                ))
            })?;
        }
        ConfigKey::ClientSecret => {
            return Err(GhviewError::InvalidInput(
                "The client secret is not stored in the config file".to_string(),
            ))
        }
    }
    config.validate()
}

fn parse_number<T: std::str::FromStr>(key: ConfigKey, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        GhviewError::InvalidInput(format!(
            "{} expects a number, got '{}'",
            key_name(key),
            value
        ))
    })
}

/// Handle setting a configuration value
fn handle_set(key: ConfigKey, value: String) -> Result<()> {
    if key == ConfigKey::ClientSecret {
        Config::store_client_secret(value.trim())?;
        println!("OAuth client secret has been stored securely.");
        return Ok(());
    }

    let mut config = Config::load_file()?;
    apply(&mut config, key, &value)?;
    config.save()?;

    println!("{} set to: {}", key_name(key), display_value(&config, key)?);
    Ok(())
}

/// Handle getting a configuration value
fn handle_get(key: ConfigKey) -> Result<()> {
    let config = Config::load()?;
    println!("{}: {}", key_name(key), display_value(&config, key)?);
    Ok(())
}

/// Handle removing a configuration value
fn handle_remove(key: ConfigKey) -> Result<()> {
    if key == ConfigKey::ClientSecret {
        Config::delete_client_secret()?;
        println!("OAuth client secret has been removed.");
        return Ok(());
    }

    let mut config = Config::load_file()?;
    reset(&mut config, key);
    config.save()?;

    println!(
        "{} reset to default: {}",
        key_name(key),
        display_value(&config, key)?
    );
    Ok(())
}

fn reset(config: &mut Config, key: ConfigKey) {
    let defaults = Config::default();
    match key {
        ConfigKey::ClientId => config.client_id = defaults.client_id,
        ConfigKey::RedirectUri => config.redirect_uri = defaults.redirect_uri,
        ConfigKey::ApiBaseUrl => config.api_base_url = defaults.api_base_url,
        ConfigKey::PageSize => config.page_size = defaults.page_size,
        ConfigKey::BranchPageSize => config.branch_page_size = defaults.branch_page_size,
        ConfigKey::SearchDebounceMs => config.search_debounce_ms = defaults.search_debounce_ms,
        ConfigKey::KeySource => config.key_source = defaults.key_source,
        ConfigKey::ClientSecret => {}
    }
}
