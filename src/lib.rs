//! ghview - Browse your GitHub repositories and branches from the terminal
//!
//! This library provides both CLI and TUI interfaces over a session layer
//! that keeps the access token encrypted at rest and turns searches,
//! pagination and retries into a single observable browser state.

pub mod cli;
pub mod controller;
pub mod core;
pub mod error;
pub mod github;
pub mod tui;

#[cfg(test)]
mod test_support;

pub use error::{GhviewError, Result};
