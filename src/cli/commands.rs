//! CLI command definitions using clap
//!
//! Defines the command structure for the `ghview` CLI tool.

use clap::{Parser, Subcommand, ValueEnum};

/// ghview - GitHub repository browser
///
/// A terminal application for browsing your GitHub repositories and branches.
/// Run without arguments to launch the TUI mode.
#[derive(Parser, Debug)]
#[command(name = "ghview", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with GitHub
    Auth(AuthArgs),

    /// List and search your repositories
    Repos(ReposArgs),

    /// List the branches of a repository
    Branches(BranchesArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Login to GitHub
    Login {
        /// Authorization code returned to the redirect URI
        /// (skips opening the browser)
        #[arg(long, conflicts_with = "pat")]
        code: Option<String>,

        /// Use a Personal Access Token instead of the OAuth web flow
        #[arg(long)]
        pat: bool,
    },
    /// Logout and remove stored credentials
    Logout,
    /// Show current authentication status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Repository commands
#[derive(Parser, Debug)]
pub struct ReposArgs {
    #[command(subcommand)]
    pub command: ReposCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReposCommand {
    /// List your repositories
    List {
        /// Page to fetch
        #[arg(long, short, default_value = "1")]
        page: u32,
    },

    /// Search your repositories
    Search {
        /// Search text (blank lists all repositories)
        query: String,

        /// Page to fetch
        #[arg(long, short, default_value = "1")]
        page: u32,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Branch Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Branch commands
#[derive(Parser, Debug)]
pub struct BranchesArgs {
    /// Repository as owner/name
    pub repo: String,

    /// Page to fetch
    #[arg(long, short, default_value = "1")]
    pub page: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show all configuration values
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: ConfigKey,

        /// Configuration value
        value: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key
        key: ConfigKey,
    },

    /// Remove a configuration value, restoring its default
    Remove {
        /// Configuration key
        key: ConfigKey,
    },

    /// Print the configuration file path
    Path,
}

/// Available configuration keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// OAuth app client id
    #[value(name = "client-id")]
    ClientId,

    /// OAuth app client secret (stored in the system keyring)
    #[value(name = "client-secret")]
    ClientSecret,

    /// OAuth redirect URI
    #[value(name = "redirect-uri")]
    RedirectUri,

    /// REST API root
    #[value(name = "api-base-url")]
    ApiBaseUrl,

    /// Repositories per page
    #[value(name = "page-size")]
    PageSize,

    /// Branches per page
    #[value(name = "branch-page-size")]
    BranchPageSize,

    /// Search debounce in milliseconds
    #[value(name = "search-debounce-ms")]
    SearchDebounceMs,

    /// Where the vault key is kept (keyring or memory)
    #[value(name = "key-source")]
    KeySource,
}
