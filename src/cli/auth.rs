//! Authentication CLI command handlers

use std::io::{self, Write};

use crate::cli::commands::AuthCommand;
use crate::controller::{SessionController, SessionState};
use crate::core::context::AppContext;
use crate::core::credentials::CredentialVault;
use crate::core::outcome::Outcome;
use crate::core::Config;
use crate::error::{GhviewError, Result};
use crate::github::{authorize_url, open_browser};

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand, context: &AppContext, config: &Config) -> Result<()> {
    let mut session = context.session();

    match command {
        AuthCommand::Login { code, pat } => {
            if session.state().is_authenticated() {
                println!("✓ Already authenticated with GitHub.");
                println!();
                println!("  To re-authenticate, first run: ghview auth logout");
                return Ok(());
            }

            if pat {
                handle_login_pat(&mut session).await
            } else {
                handle_login_oauth(&mut session, context, code).await
            }
        }
        AuthCommand::Logout => handle_logout(&mut session),
        AuthCommand::Status => handle_status(&session, context, config).await,
    }
}

/// Handle login through the OAuth web flow
async fn handle_login_oauth(
    session: &mut SessionController,
    context: &AppContext,
    code: Option<String>,
) -> Result<()> {
    let Some(app) = context.repository.oauth_app() else {
        return Err(GhviewError::Config(
            "No OAuth app configured.\n\n  → Run 'ghview config set client-id <ID>' and 'ghview config set client-secret <SECRET>',\n    or log in with 'ghview auth login --pat'."
                .to_string(),
        ));
    };

    let code = match code {
        Some(code) => code,
        None => {
            let url = authorize_url(app)?;
            println!("Open this URL in your browser:");
            println!("  {}", url);
            println!();

            if open_browser(url.as_str()) {
                println!("✓ Browser opened automatically.");
            }

            println!("Authorize the app, then copy the 'code' parameter from the");
            println!("page you are redirected to ({}).", app.redirect_uri);
            println!();
            prompt("Paste the code here: ")?
        }
    };

    println!("Exchanging code for a token...");
    finish_sign_in(session.sign_in(&code).await)?;

    println!("\n✓ Successfully authenticated with GitHub!");
    Ok(())
}

/// Handle login using a Personal Access Token
async fn handle_login_pat(session: &mut SessionController) -> Result<()> {
    println!("Personal Access Token Authentication");
    println!("====================================");
    println!();
    println!("To create a token:");
    println!("  1. Go to: https://github.com/settings/tokens/new");
    println!("  2. Give it a name (e.g., 'ghview')");
    println!("  3. Select the 'repo' scope");
    println!("  4. Click 'Generate token' and copy it");
    println!();

    let token_url = "https://github.com/settings/tokens/new?scopes=repo&description=ghview";
    if open_browser(token_url) {
        println!("✓ Browser opened to token creation page.");
        println!();
    }

    let token = prompt("Paste your token here: ")?;
    if token.is_empty() {
        return Err(GhviewError::InvalidInput("No token provided".to_string()));
    }

    println!();
    println!("Validating token...");
    finish_sign_in(session.sign_in_with_token(&token).await)?;

    if let Outcome::Ok(login) = session.viewer().await {
        println!("✓ Token valid! Logged in as @{}", login);
    }
    println!();
    println!("✓ Successfully authenticated with Personal Access Token!");
    Ok(())
}

fn finish_sign_in(state: SessionState) -> Result<()> {
    match state {
        SessionState::Authenticated => Ok(()),
        // Already a user-facing message
        SessionState::Error(message) => Err(GhviewError::Custom(message)),
        other => Err(GhviewError::AuthenticationFailed(format!(
            "Unexpected session state: {:?}",
            other
        ))),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Handle the logout command
fn handle_logout(session: &mut SessionController) -> Result<()> {
    if !session.state().is_authenticated() {
        println!("Not currently authenticated.");
        return Ok(());
    }

    session.sign_out();
    println!("Successfully logged out.");
    Ok(())
}

/// Handle the status command
async fn handle_status(
    session: &SessionController,
    context: &AppContext,
    config: &Config,
) -> Result<()> {
    let authenticated = session.state().is_authenticated();

    println!("Authentication Status:");
    println!(
        "  GitHub: {}",
        if authenticated {
            "Authenticated"
        } else {
            "Not authenticated"
        }
    );
    println!(
        "  OAuth app: {}",
        if context.repository.oauth_app().is_some() {
            "Configured"
        } else {
            "Not configured"
        }
    );
    println!("  Key source: {}", config.key_source);

    if authenticated {
        if let Some(token) = context.repository.current_token() {
            println!("\n  GitHub token: {}", CredentialVault::mask_token(&token));
        }

        match session.viewer().await {
            Outcome::Ok(login) => println!("  Logged in as: @{}", login),
            Outcome::Failed { message, .. } => println!("  Could not verify token: {}", message),
            Outcome::Pending => {}
        }
    }

    Ok(())
}
