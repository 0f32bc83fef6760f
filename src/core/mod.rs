//! Core functionality for ghview
//!
//! This module contains the session and data layer:
//! - Encrypted credential storage
//! - Session-aware GitHub access
//! - Query use-cases
//! - Application configuration

pub mod config;
pub mod context;
pub mod credentials;
pub mod keys;
pub mod model;
pub mod outcome;
pub mod repository;
pub mod slot;
pub mod usecases;

pub use config::Config;
pub use context::AppContext;
pub use credentials::CredentialVault;
pub use model::{BranchSummary, RepositorySummary};
pub use outcome::Outcome;
pub use repository::SessionRepository;
