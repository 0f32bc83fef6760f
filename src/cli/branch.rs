//! Branch CLI command handlers

use crate::cli::commands::BranchesArgs;
use crate::core::context::AppContext;
use crate::core::outcome::Outcome;
use crate::error::{GhviewError, Result};

/// Handle the branches command
pub async fn handle_branches(args: BranchesArgs, context: &AppContext) -> Result<()> {
    let (owner, name) = parse_repo(&args.repo)?;

    let branches = match context.list_branches.run(owner, name, args.page).await {
        Outcome::Ok(branches) => branches,
        Outcome::Failed { message, .. } => return Err(GhviewError::GitHubApi(message)),
        Outcome::Pending => return Ok(()),
    };

    if branches.is_empty() {
        println!("No branches found.");
        return Ok(());
    }

    println!("Branches for {}/{}:\n", owner, name);

    for branch in branches {
        let protected_marker = if branch.protected { " 🔒" } else { "" };
        println!("  {}  {}{}", branch.short_sha(), branch.name, protected_marker);
    }

    Ok(())
}

/// Split `owner/name`
fn parse_repo(repo: &str) -> Result<(&str, &str)> {
    match repo.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(GhviewError::InvalidInput(format!(
            "Expected a repository as owner/name, got '{}'",
            repo
        ))),
    }
}
