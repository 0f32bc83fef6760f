//! The remote operations the session layer depends on
//!
//! `GitHubGateway` is the production implementation; tests substitute
//! mocks. Every call receives the bearer token explicitly so the gateway
//! itself holds no session state.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::Result;
use crate::github::auth::{OAuthApp, TokenGrant};
use crate::github::models::{BranchDto, RepositoryDto, SearchResponseDto, UserDto};

/// Remote GitHub operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `GET /user/repos`
    async fn list_repositories(
        &self,
        token: Option<SecretString>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<RepositoryDto>>;

    /// `GET /repos/{owner}/{repo}/branches`
    async fn list_branches(
        &self,
        token: Option<SecretString>,
        owner: String,
        repo: String,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<BranchDto>>;

    /// `GET /search/repositories`
    async fn search_repositories(
        &self,
        token: Option<SecretString>,
        query: String,
        page: u32,
        per_page: u32,
    ) -> Result<SearchResponseDto>;

    /// `GET /user`
    async fn current_user(&self, token: Option<SecretString>) -> Result<UserDto>;

    /// Exchange an OAuth authorization code for an access token
    async fn exchange_code_for_token(&self, app: OAuthApp, code: String) -> Result<TokenGrant>;
}
