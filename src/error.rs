//! Custom error types for ghview
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

/// Main error type for the ghview application
#[derive(Error, Debug)]
pub enum GhviewError {
    /// User is not authenticated
    #[error("You are not logged in to GitHub.\n\n  → Run 'ghview auth login' to authenticate.")]
    NotAuthenticated,

    /// Authentication process failed
    #[error("GitHub authentication failed: {0}\n\n  → Try running 'ghview auth login' again.")]
    AuthenticationFailed(String),

    /// GitHub API error
    #[error("{0}")]
    GitHubApi(String),

    /// Credential encryption or decryption failed
    #[error("Credential encryption failed: {0}")]
    Encryption(String),

    /// Credential slot could not be written or removed
    #[error("Cannot write credential storage: {0}\n\n  → Check permissions on the ghview data directory.")]
    Storage(String),

    /// Keyring access error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.\n  → Or set key_source = \"memory\" to keep the vault key in process memory.")]
    Credential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Terminal/TUI error
    #[error("Terminal error: {0}\n\n  → Try resizing your terminal or restarting it.")]
    Terminal(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl From<keyring::Error> for GhviewError {
    fn from(err: keyring::Error) -> Self {
        GhviewError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for GhviewError {
    fn from(err: toml::de::Error) -> Self {
        GhviewError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for GhviewError {
    fn from(err: toml::ser::Error) -> Self {
        GhviewError::Toml(err.to_string())
    }
}

impl From<octocrab::Error> for GhviewError {
    fn from(err: octocrab::Error) -> Self {
        // Use the error handler to classify and provide actionable guidance
        crate::github::error_handler::classify_github_error(err)
    }
}

/// Result type alias using GhviewError
pub type Result<T> = std::result::Result<T, GhviewError>;
