//! Query use-cases
//!
//! Thin stateless operations over `SessionRepository`. This is where raised
//! errors become `Outcome::Failed`; nothing above this layer handles a
//! `GhviewError` from a query.

use std::sync::Arc;

use crate::core::model::{BranchSummary, RepositorySummary};
use crate::core::outcome::Outcome;
use crate::core::repository::SessionRepository;

const LIST_REPOSITORIES_FAILED: &str = "Failed to load repositories";
const LIST_BRANCHES_FAILED: &str = "Failed to load branches";
const SEARCH_FAILED: &str = "Search failed";

/// List the user's repositories
#[derive(Clone)]
pub struct ListRepositories {
    repository: Arc<SessionRepository>,
}

impl ListRepositories {
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn run(&self, page: u32) -> Outcome<Vec<RepositorySummary>> {
        Outcome::from_result(
            self.repository.fetch_repositories(page).await,
            LIST_REPOSITORIES_FAILED,
        )
    }
}

/// List the branches of one repository
#[derive(Clone)]
pub struct ListBranches {
    repository: Arc<SessionRepository>,
}

impl ListBranches {
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn run(&self, owner: &str, repo: &str, page: u32) -> Outcome<Vec<BranchSummary>> {
        Outcome::from_result(
            self.repository.fetch_branches(owner, repo, page).await,
            LIST_BRANCHES_FAILED,
        )
    }
}

/// Search the user's repositories, falling back to the plain listing for a
/// blank query
#[derive(Clone)]
pub struct SearchRepositories {
    repository: Arc<SessionRepository>,
    list: ListRepositories,
}

impl SearchRepositories {
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        Self {
            list: ListRepositories::new(repository.clone()),
            repository,
        }
    }

    pub async fn run(&self, query: &str) -> Outcome<Vec<RepositorySummary>> {
        self.run_page(query, 1).await
    }

    pub async fn run_page(&self, query: &str, page: u32) -> Outcome<Vec<RepositorySummary>> {
        if query.trim().is_empty() {
            return self.list.run(page).await;
        }

        Outcome::from_result(
            self.repository.search_repositories_page(query, page).await,
            SEARCH_FAILED,
        )
    }
}

/// The repository queries the browser controller runs
#[derive(Clone)]
pub struct RepositoryQueries {
    pub list: ListRepositories,
    pub search: SearchRepositories,
    /// Items requested per page, used to decide whether more pages exist
    pub page_size: u32,
}

impl RepositoryQueries {
    pub fn new(repository: Arc<SessionRepository>) -> Self {
        Self {
            page_size: repository.page_size(),
            list: ListRepositories::new(repository.clone()),
            search: SearchRepositories::new(repository),
        }
    }
}
