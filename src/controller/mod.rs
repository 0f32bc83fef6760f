//! UI-facing state machines
//!
//! Controllers accept intents and publish read-only snapshots on watch
//! channels. They only ever see `Outcome`s from the use-case layer.

pub mod browser;
pub mod session;

pub use browser::{
    BrowserController, BrowserIntent, BrowserMachine, BrowserState, BrowserStatus, QueryContext,
    DEFAULT_SEARCH_DEBOUNCE,
};
pub use session::{SessionController, SessionState};
