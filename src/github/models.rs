//! Wire types for the GitHub REST endpoints ghview consumes
//!
//! Only the fields the client maps are declared; serde ignores the rest.

use serde::Deserialize;

/// Repository as returned by `/user/repos` and `/search/repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDto {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub private: bool,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub language: Option<String>,
    pub updated_at: String,
    pub owner: UserDto,
}

/// Account as returned by `/user` and nested in repositories
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// Branch as returned by `/repos/{owner}/{repo}/branches`
#[derive(Debug, Clone, Deserialize)]
pub struct BranchDto {
    pub name: String,
    pub commit: CommitDto,
    #[serde(default)]
    pub protected: bool,
}

/// Head commit reference of a branch
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDto {
    pub sha: String,
    pub url: String,
}

/// Envelope of `/search/repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponseDto {
    #[serde(default)]
    pub total_count: u64,
    pub items: Vec<RepositoryDto>,
}
