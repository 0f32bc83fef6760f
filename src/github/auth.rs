//! OAuth authorization-code exchange for GitHub
//!
//! The browser part of the web flow happens outside ghview: the user opens
//! the authorization URL, approves the app and hands the resulting code back.
//! This module builds that URL and trades the code for an access token.
//! See: https://docs.github.com/en/apps/oauth-apps/building-oauth-apps/authorizing-oauth-apps#web-application-flow

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GhviewError, Result};

/// GitHub authorization page
const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// GitHub OAuth token endpoint
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// OAuth scopes required for ghview
pub const OAUTH_SCOPES: &str = "repo";

/// Registered OAuth application the code is exchanged for
#[derive(Debug, Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
}

/// Token response from GitHub
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    scope: String,
}

/// Error response from GitHub
///
/// The token endpoint answers `200 OK` with this body on failure.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// Token request body
#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// Result of a successful code exchange
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// The access token for API requests
    pub access_token: SecretString,
    /// Token type (usually "bearer")
    pub token_type: String,
    /// Granted scopes
    pub scope: String,
}

/// Build the page the user visits to authorize ghview
pub fn authorize_url(app: &OAuthApp) -> Result<Url> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", app.client_id.as_str()),
            ("redirect_uri", app.redirect_uri.as_str()),
            ("scope", OAUTH_SCOPES),
        ],
    )
    .map_err(|e| GhviewError::Config(format!("Invalid authorization URL: {}", e)))
}

/// OAuth code exchange handler
pub struct CodeExchange {
    client: Client,
    token_url: String,
}

impl CodeExchange {
    /// Create a handler talking to github.com
    pub fn new(client: Client) -> Self {
        Self {
            client,
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange(&self, app: &OAuthApp, code: &str) -> Result<TokenGrant> {
        let code = code.trim();
        if code.is_empty() {
            return Err(GhviewError::InvalidInput(
                "Authorization code is empty".to_string(),
            ));
        }

        let request = TokenRequest {
            client_id: &app.client_id,
            client_secret: app.client_secret.expose_secret(),
            code,
            redirect_uri: &app.redirect_uri,
        };

        let response = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        parse_token_response(status.as_u16(), &text)
    }
}

/// Interpret the body of the token endpoint
fn parse_token_response(status: u16, text: &str) -> Result<TokenGrant> {
    if let Ok(token_response) = serde_json::from_str::<TokenResponse>(text) {
        if !token_response.access_token.is_empty() {
            return Ok(TokenGrant {
                access_token: SecretString::from(token_response.access_token),
                token_type: token_response.token_type,
                scope: token_response.scope,
            });
        }
    }

    if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(text) {
        let reason = match error_response.error.as_str() {
            "bad_verification_code" => {
                "The authorization code is invalid or has expired".to_string()
            }
            "incorrect_client_credentials" => {
                "The client id or client secret is incorrect".to_string()
            }
            "redirect_uri_mismatch" => {
                "The redirect URI does not match the OAuth app settings".to_string()
            }
            _ => error_response
                .error_description
                .unwrap_or(error_response.error),
        };
        return Err(GhviewError::AuthenticationFailed(reason));
    }

    Err(GhviewError::AuthenticationFailed(format!(
        "Invalid response from GitHub (HTTP {})",
        status
    )))
}
