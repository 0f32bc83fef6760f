//! Composition root
//!
//! Builds the vault, gateway, repository and use-cases once from a `Config`.
//! Nothing in the crate reaches for these through globals.

use std::sync::Arc;
use std::time::Duration;

use crate::controller::{BrowserController, SessionController};
use crate::core::config::{Config, KeySource};
use crate::core::credentials::CredentialVault;
use crate::core::keys::{EphemeralKeyProvider, KeyProvider, KeyringKeyProvider};
use crate::core::repository::{PageSizes, SessionRepository};
use crate::core::slot::FileSlot;
use crate::core::usecases::{ListBranches, ListRepositories, RepositoryQueries, SearchRepositories};
use crate::error::Result;
use crate::github::auth::OAuthApp;
use crate::github::client::GitHubGateway;
use crate::github::gateway::RemoteGateway;

/// Everything the CLI and TUI need, wired together
pub struct AppContext {
    pub repository: Arc<SessionRepository>,
    pub list_repositories: ListRepositories,
    pub list_branches: ListBranches,
    pub search_repositories: SearchRepositories,
    search_debounce: Duration,
}

impl AppContext {
    /// Wire the production components described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let keys: Box<dyn KeyProvider> = match config.key_source {
            KeySource::Keyring => Box::new(KeyringKeyProvider::new()),
            KeySource::Memory => Box::new(EphemeralKeyProvider::new()),
        };
        let slot = FileSlot::in_dir(&Config::data_dir()?);
        tracing::debug!(slot = %slot.path().display(), keys = %config.key_source, "opening credential vault");

        let vault = CredentialVault::from_parts(Box::new(slot), keys);
        let gateway = Arc::new(GitHubGateway::new(config.api_base_url.clone())?);

        let repository = SessionRepository::new(gateway, vault)
            .with_oauth(usable_oauth_app(config.oauth_app()))
            .with_page_sizes(PageSizes {
                repositories: config.page_size,
                branches: config.branch_page_size,
            });

        Ok(Self::with_repository(
            Arc::new(repository),
            config.search_debounce(),
        ))
    }

    /// Wire use-cases over an already built repository
    pub fn with_repository(repository: Arc<SessionRepository>, search_debounce: Duration) -> Self {
        Self {
            list_repositories: ListRepositories::new(repository.clone()),
            list_branches: ListBranches::new(repository.clone()),
            search_repositories: SearchRepositories::new(repository.clone()),
            repository,
            search_debounce,
        }
    }

    /// Wire over an arbitrary gateway and vault
    pub fn with_gateway(
        gateway: Arc<dyn RemoteGateway>,
        vault: CredentialVault,
        search_debounce: Duration,
    ) -> Self {
        Self::with_repository(
            Arc::new(SessionRepository::new(gateway, vault)),
            search_debounce,
        )
    }

    pub fn session(&self) -> SessionController {
        SessionController::new(self.repository.clone())
    }

    /// Start a browser controller; needs a running tokio runtime
    pub fn browser(&self) -> BrowserController {
        BrowserController::spawn(
            RepositoryQueries::new(self.repository.clone()),
            self.search_debounce,
        )
    }
}

/// OAuth settings, or none when the client secret cannot be read
///
/// Only `auth login --code` needs the app, so a broken keyring must not stop
/// token or listing commands.
fn usable_oauth_app(lookup: Result<Option<OAuthApp>>) -> Option<OAuthApp> {
    match lookup {
        Ok(app) => app,
        Err(e) => {
            tracing::warn!(error = %e, "OAuth client secret unavailable; code sign-in disabled");
            None
        }
    }
}
