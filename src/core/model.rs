//! Domain types handed to controllers and the UI

use crate::github::models::{BranchDto, RepositoryDto};

/// A repository the user can browse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    /// GitHub numeric id
    pub id: u64,
    /// Owner login (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
    /// Whether the repository is private
    pub private: bool,
    pub description: Option<String>,
    pub stars: u32,
    pub forks: u32,
    /// Primary language as detected by GitHub
    pub language: Option<String>,
    /// Last update, ISO-8601
    pub updated_at: String,
}

impl RepositorySummary {
    /// Get the full repository name (owner/name)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Last update parsed as a UTC timestamp, if GitHub sent a valid one
    pub fn updated(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

impl From<RepositoryDto> for RepositorySummary {
    fn from(dto: RepositoryDto) -> Self {
        Self {
            id: dto.id,
            owner: dto.owner.login,
            name: dto.name,
            private: dto.private,
            description: dto.description.filter(|d| !d.trim().is_empty()),
            stars: dto.stargazers_count,
            forks: dto.forks_count,
            language: dto.language,
            updated_at: dto.updated_at,
        }
    }
}

/// A branch of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    /// Branch name
    pub name: String,
    /// Head commit SHA
    pub sha: String,
    /// API URL of the head commit
    pub commit_url: String,
    /// Whether this is a protected branch
    pub protected: bool,
}

impl BranchSummary {
    /// Abbreviated head commit, as git prints it
    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }
}

impl From<BranchDto> for BranchSummary {
    fn from(dto: BranchDto) -> Self {
        Self {
            name: dto.name,
            sha: dto.commit.sha,
            commit_url: dto.commit.url,
            protected: dto.protected,
        }
    }
}

/// Render a timestamp relative to now ("3d ago"), or as a date when older
/// than a month
pub fn format_relative_time(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 30 {
        dt.format("%Y-%m-%d").to_string()
    } else if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}
