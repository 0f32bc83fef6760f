//! Repository CLI command handlers

use crate::cli::commands::ReposCommand;
use crate::core::context::AppContext;
use crate::core::model::{format_relative_time, RepositorySummary};
use crate::core::outcome::Outcome;
use crate::error::{GhviewError, Result};

/// Handle repository commands
pub async fn handle_repos(command: ReposCommand, context: &AppContext) -> Result<()> {
    match command {
        ReposCommand::List { page } => {
            let outcome = context.list_repositories.run(page).await;
            print_repositories(outcome, "No repositories found.")
        }
        ReposCommand::Search { query, page } => {
            let outcome = context.search_repositories.run_page(&query, page).await;
            print_repositories(outcome, &format!("No repositories match '{}'.", query.trim()))
        }
    }
}

fn print_repositories(outcome: Outcome<Vec<RepositorySummary>>, empty: &str) -> Result<()> {
    let repos = match outcome {
        Outcome::Ok(repos) => repos,
        Outcome::Failed { message, .. } => return Err(GhviewError::GitHubApi(message)),
        Outcome::Pending => return Ok(()),
    };

    if repos.is_empty() {
        println!("{}", empty);
        return Ok(());
    }

    for repo in &repos {
        println!("{}", format_repository(repo));
    }

    Ok(())
}

fn format_repository(repo: &RepositorySummary) -> String {
    let visibility = if repo.private { " 🔒" } else { "" };
    let language = repo
        .language
        .as_deref()
        .map(|l| format!("  [{}]", l))
        .unwrap_or_default();
    let updated = repo
        .updated()
        .map(|dt| format!("  {}", format_relative_time(dt)))
        .unwrap_or_default();

    let mut line = format!(
        "  {}{}{}  ★ {}{}",
        repo.full_name(),
        visibility,
        language,
        repo.stars,
        updated
    );
    if let Some(description) = &repo.description {
        line.push_str(&format!("\n      {}", description));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_repository() {
        let repo = RepositorySummary {
            id: 1,
            owner: "octo".to_string(),
            name: "ghview".to_string(),
            private: true,
            description: Some("Terminal browser".to_string()),
            stars: 12,
            forks: 0,
            language: Some("Rust".to_string()),
            updated_at: "2020-05-01T00:00:00Z".to_string(),
        };

        let line = format_repository(&repo);
        assert!(line.starts_with("  octo/ghview 🔒  [Rust]  ★ 12  2020-05-01"));
        assert!(line.ends_with("Terminal browser"));
    }

    #[test]
    fn test_failure_becomes_error() {
        let outcome = Outcome::Failed {
            message: "network down".to_string(),
            cause: None,
        };
        let err = print_repositories(outcome, "none").unwrap_err();
        assert_eq!(err.to_string(), "network down");
    }
}
