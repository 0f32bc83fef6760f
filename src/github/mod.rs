//! GitHub API integration module
//!
//! This module provides all GitHub-related functionality:
//! - The `RemoteGateway` seam and its octocrab-backed implementation
//! - OAuth authorization-code exchange
//! - Wire types for repositories, branches and search
//! - Error classification

pub mod auth;
pub mod client;
pub mod error_handler;
pub mod gateway;
pub mod models;

pub use auth::{authorize_url, OAuthApp, TokenGrant};
pub use client::GitHubGateway;
pub use error_handler::{classify_github_error, open_browser};
pub use gateway::RemoteGateway;
