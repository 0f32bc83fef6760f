//! CLI module for ghview
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod auth;
pub mod branch;
pub mod commands;
pub mod config;
pub mod repos;

pub use commands::{Cli, Commands};
