//! Session-aware access to GitHub
//!
//! `SessionRepository` owns the credential vault and the remote gateway. It
//! attaches the stored token to every remote call, maps wire types into
//! domain types, and passes failures up unchanged for the use-case layer to
//! translate.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;

use crate::core::credentials::CredentialVault;
use crate::core::model::{BranchSummary, RepositorySummary};
use crate::error::{GhviewError, Result};
use crate::github::auth::{OAuthApp, TokenGrant};
use crate::github::gateway::RemoteGateway;

/// Per-page sizes for paged endpoints
#[derive(Debug, Clone, Copy)]
pub struct PageSizes {
    pub repositories: u32,
    pub branches: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            repositories: 20,
            branches: 30,
        }
    }
}

/// Single source of truth for the credential and remote data
pub struct SessionRepository {
    gateway: Arc<dyn RemoteGateway>,
    vault: CredentialVault,
    oauth: Option<OAuthApp>,
    pages: PageSizes,
    // Login the stored token belongs to, once looked up
    viewer: RwLock<Option<String>>,
}

impl SessionRepository {
    pub fn new(gateway: Arc<dyn RemoteGateway>, vault: CredentialVault) -> Self {
        Self {
            gateway,
            vault,
            oauth: None,
            pages: PageSizes::default(),
            viewer: RwLock::new(None),
        }
    }

    /// Use a registered OAuth app for code exchange
    pub fn with_oauth(mut self, oauth: Option<OAuthApp>) -> Self {
        self.oauth = oauth;
        self
    }

    /// Override the per-page sizes
    pub fn with_page_sizes(mut self, pages: PageSizes) -> Self {
        self.pages = pages;
        self
    }

    /// Repositories requested per page
    pub fn page_size(&self) -> u32 {
        self.pages.repositories
    }

    /// Branches requested per page
    pub fn branch_page_size(&self) -> u32 {
        self.pages.branches
    }

    /// OAuth app used by `exchange_code`, if configured
    pub fn oauth_app(&self) -> Option<&OAuthApp> {
        self.oauth.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Remote data
    // ─────────────────────────────────────────────────────────────────────────

    /// The authenticated user's repositories
    pub async fn fetch_repositories(&self, page: u32) -> Result<Vec<RepositorySummary>> {
        let repos = self
            .gateway
            .list_repositories(self.current_token(), page, self.pages.repositories)
            .await?;
        Ok(repos.into_iter().map(RepositorySummary::from).collect())
    }

    /// Branches of `owner/repo`
    pub async fn fetch_branches(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<Vec<BranchSummary>> {
        let branches = self
            .gateway
            .list_branches(
                self.current_token(),
                owner.to_string(),
                repo.to_string(),
                page,
                self.pages.branches,
            )
            .await?;
        Ok(branches.into_iter().map(BranchSummary::from).collect())
    }

    /// First page of the user's repositories matching `query`
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<RepositorySummary>> {
        self.search_repositories_page(query, 1).await
    }

    /// One page of the user's repositories matching `query`
    ///
    /// Search is scoped to repositories owned by the signed-in user.
    pub async fn search_repositories_page(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Vec<RepositorySummary>> {
        let login = self.viewer_login().await?;
        let scoped = format!("{} user:{}", query.trim(), login);

        let response = self
            .gateway
            .search_repositories(self.current_token(), scoped, page, self.pages.repositories)
            .await?;
        Ok(response
            .items
            .into_iter()
            .map(RepositorySummary::from)
            .collect())
    }

    /// Login of the account the stored token belongs to
    pub async fn current_user(&self) -> Result<String> {
        let user = self.gateway.current_user(self.current_token()).await?;
        if let Ok(mut viewer) = self.viewer.write() {
            *viewer = Some(user.login.clone());
        }
        Ok(user.login)
    }

    async fn viewer_login(&self) -> Result<String> {
        let cached = self.viewer.read().ok().and_then(|viewer| viewer.clone());
        match cached {
            Some(login) => Ok(login),
            None => self.current_user().await,
        }
    }

    fn forget_viewer(&self) {
        if let Ok(mut viewer) = self.viewer.write() {
            *viewer = None;
        }
    }

    /// Login of the account a candidate token belongs to
    pub async fn validate_token(&self, token: &SecretString) -> Result<String> {
        let user = self.gateway.current_user(Some(token.clone())).await?;
        Ok(user.login)
    }

    /// Trade an OAuth authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let app = self.oauth.clone().ok_or_else(|| {
            GhviewError::Config(
                "No OAuth app configured.\n\n  → Run 'ghview config set client-id <ID>' and 'ghview config set client-secret <SECRET>'."
                    .to_string(),
            )
        })?;

        self.gateway
            .exchange_code_for_token(app, code.to_string())
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credential
    // ─────────────────────────────────────────────────────────────────────────

    /// The stored token, if any
    pub fn current_token(&self) -> Option<SecretString> {
        self.vault.load()
    }

    /// Persist a token
    pub fn store_token(&self, token: &str) -> Result<()> {
        self.forget_viewer();
        self.vault.save(token)
    }

    /// Erase the stored token
    pub fn forget_token(&self) {
        self.forget_viewer();
        self.vault.clear()
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::core::keys::EphemeralKeyProvider;
    use crate::core::slot::MemorySlot;
    use crate::github::gateway::MockRemoteGateway;
    use crate::github::models::{BranchDto, CommitDto, SearchResponseDto, UserDto};
    use crate::test_support::repo_dto;

    fn vault() -> CredentialVault {
        CredentialVault::new(MemorySlot::new(), EphemeralKeyProvider::new())
    }

    fn user(login: &str) -> UserDto {
        UserDto {
            id: 1,
            login: login.to_string(),
            avatar_url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_token_is_attached_to_requests() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_list_repositories()
            .withf(|token, page, per_page| {
                token.as_ref().map(|t| t.expose_secret().to_string()) == Some("tok-1".to_string())
                    && *page == 2
                    && *per_page == 20
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![repo_dto("octo", "one")]));

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        repository.store_token("tok-1").unwrap();

        let repos = repository.fetch_repositories(2).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].full_name(), "octo/one");
    }

    #[tokio::test]
    async fn test_requests_without_token_are_unauthenticated() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_list_repositories()
            .withf(|token, _, _| token.is_none())
            .times(1)
            .returning(|_, _, _| Err(classify_401()));

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        let err = repository.fetch_repositories(1).await.unwrap_err();
        assert!(matches!(err, GhviewError::GitHubApi(_)));
    }

    fn classify_401() -> GhviewError {
        crate::github::error_handler::classify_message(Some(401), "Bad credentials")
    }

    #[tokio::test]
    async fn test_branches_are_mapped() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_list_branches()
            .with(
                mockall::predicate::always(),
                eq("octo".to_string()),
                eq("one".to_string()),
                eq(1),
                eq(30),
            )
            .times(1)
            .returning(|_, _, _, _, _| {
                Ok(vec![BranchDto {
                    name: "main".to_string(),
                    commit: CommitDto {
                        sha: "6dcb09b5b57875f334f61aebed695e2e4193db5e".to_string(),
                        url: "https://api.github.com/repos/octo/one/commits/6dcb09b".to_string(),
                    },
                    protected: true,
                }])
            });

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        let branches = repository.fetch_branches("octo", "one", 1).await.unwrap();
        assert_eq!(branches[0].name, "main");
        assert!(branches[0].protected);
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_current_user() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_current_user()
            .times(1)
            .returning(|_| Ok(user("octo")));
        gateway
            .expect_search_repositories()
            .withf(|_, query, page, _| query == "cli user:octo" && *page == 3)
            .times(1)
            .returning(|_, _, _, _| {
                Ok(SearchResponseDto {
                    total_count: 1,
                    items: vec![repo_dto("octo", "cli-tool")],
                })
            });

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        let repos = repository.search_repositories_page("  cli ", 3).await.unwrap();
        assert_eq!(repos[0].name, "cli-tool");
    }

    #[tokio::test]
    async fn test_viewer_login_is_looked_up_once_per_token() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_current_user()
            .times(2)
            .returning(|_| Ok(user("octo")));
        gateway
            .expect_search_repositories()
            .withf(|_, query, _, _| query == "cli user:octo")
            .times(3)
            .returning(|_, _, _, _| {
                Ok(SearchResponseDto {
                    total_count: 0,
                    items: Vec::new(),
                })
            });

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        repository.store_token("tok-1").unwrap();
        repository.search_repositories_page("cli", 1).await.unwrap();
        repository.search_repositories_page("cli", 2).await.unwrap();

        repository.forget_token();
        repository.store_token("tok-2").unwrap();
        repository.search_repositories_page("cli", 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_failures_propagate_unmodified() {
        let mut gateway = MockRemoteGateway::new();
        gateway
            .expect_current_user()
            .returning(|_| Err(GhviewError::Custom("network down".to_string())));

        let repository = SessionRepository::new(Arc::new(gateway), vault());
        let err = repository.search_repositories("x").await.unwrap_err();
        assert_eq!(err.to_string(), "network down");
    }

    #[tokio::test]
    async fn test_exchange_requires_oauth_app() {
        let gateway = MockRemoteGateway::new();
        let repository = SessionRepository::new(Arc::new(gateway), vault());
        let err = repository.exchange_code("abc").await.unwrap_err();
        assert!(matches!(err, GhviewError::Config(_)));
    }

    #[test]
    fn test_token_pass_through() {
        let repository = SessionRepository::new(Arc::new(MockRemoteGateway::new()), vault());
        assert!(repository.current_token().is_none());

        repository.store_token("tok-1").unwrap();
        assert_eq!(repository.current_token().unwrap().expose_secret(), "tok-1");

        repository.forget_token();
        assert!(repository.current_token().is_none());
    }
}
