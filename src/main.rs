//! ghview - GitHub repository browser
//!
//! A terminal application for browsing your GitHub repositories and branches.
//! Run without arguments to launch the TUI, or use subcommands for CLI mode.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghview::cli::commands::{Cli, Commands};
use ghview::cli::{auth, branch, config, repos};
use ghview::core::{AppContext, Config};
use ghview::error::{GhviewError, Result};
use ghview::tui::App;

#[tokio::main]
async fn main() {
    // Logs go to stderr so they never land inside the TUI or piped output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands need neither the vault nor the gateway
    if let Some(Commands::Config(args)) = cli.command {
        return config::handle_config(args.command);
    }

    let settings = Config::load()?;
    let context = AppContext::from_config(&settings)?;

    match cli.command {
        // No subcommand - launch TUI mode
        None => App::new(context).run().await,
        Some(Commands::Auth(args)) => auth::handle_auth(args.command, &context, &settings).await,
        Some(command) => {
            if context.repository.current_token().is_none() {
                return Err(GhviewError::NotAuthenticated);
            }

            match command {
                Commands::Repos(args) => repos::handle_repos(args.command, &context).await,
                Commands::Branches(args) => branch::handle_branches(args, &context).await,
                Commands::Auth(_) | Commands::Config(_) => Ok(()),
            }
        }
    }
}
