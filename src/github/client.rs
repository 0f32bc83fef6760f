//! GitHub API client wrapper using octocrab

use async_trait::async_trait;
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::Result;
use crate::github::auth::{CodeExchange, OAuthApp, TokenGrant};
use crate::github::gateway::RemoteGateway;
use crate::github::models::{BranchDto, RepositoryDto, SearchResponseDto, UserDto};

/// Default REST API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Pagination query parameters
#[derive(Serialize)]
struct PageParams {
    page: u32,
    per_page: u32,
}

/// Search query parameters
#[derive(Serialize)]
struct SearchParams<'a> {
    q: &'a str,
    page: u32,
    per_page: u32,
}

/// `RemoteGateway` backed by the GitHub REST API
///
/// A fresh octocrab instance is built for every call so the token handed in
/// by the session layer is always the one attached to the request.
pub struct GitHubGateway {
    /// REST API root, e.g. `https://api.github.com`
    base_url: String,
    /// OAuth token endpoint client
    exchange: CodeExchange,
}

impl GitHubGateway {
    /// Create a gateway for the given API root
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ghview/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            exchange: CodeExchange::new(http),
        })
    }

    /// Build an octocrab instance, authenticated when a token is present
    fn octocrab(&self, token: Option<SecretString>) -> Result<Octocrab> {
        let mut builder = Octocrab::builder().base_uri(self.base_url.as_str())?;

        if let Some(token) = token {
            builder = builder.personal_token(token.expose_secret().to_string());
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl RemoteGateway for GitHubGateway {
    async fn list_repositories(
        &self,
        token: Option<SecretString>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepositoryDto>> {
        let params = PageParams { page, per_page };
        let repos = self
            .octocrab(token)?
            .get("/user/repos", Some(&params))
            .await?;
        Ok(repos)
    }

    async fn list_branches(
        &self,
        token: Option<SecretString>,
        owner: String,
        repo: String,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<BranchDto>> {
        // GitHub API: GET /repos/{owner}/{repo}/branches
        let route = format!("/repos/{}/{}/branches", owner, repo);
        let params = PageParams { page, per_page };
        let branches = self.octocrab(token)?.get(&route, Some(&params)).await?;
        Ok(branches)
    }

    async fn search_repositories(
        &self,
        token: Option<SecretString>,
        query: String,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResponseDto> {
        let params = SearchParams {
            q: &query,
            page,
            per_page,
        };
        let response = self
            .octocrab(token)?
            .get("/search/repositories", Some(&params))
            .await?;
        Ok(response)
    }

    async fn current_user(&self, token: Option<SecretString>) -> Result<UserDto> {
        let user = self.octocrab(token)?.get("/user", None::<&()>).await?;
        Ok(user)
    }

    async fn exchange_code_for_token(&self, app: OAuthApp, code: String) -> Result<TokenGrant> {
        self.exchange.exchange(&app, &code).await
    }
}
