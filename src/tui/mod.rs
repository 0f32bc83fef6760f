//! Terminal User Interface module
//!
//! This module contains the ratatui-based repository browser.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
