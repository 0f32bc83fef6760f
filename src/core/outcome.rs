//! Uniform result type seen above the use-case layer
//!
//! Below the use-cases failures travel as `GhviewError`; controllers and the
//! UI only ever see an `Outcome`.

use std::sync::Arc;

use crate::error::GhviewError;

/// State of an operation as presented to the UI
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// Request in flight; never returned by a use-case
    Pending,
    /// Operation succeeded
    Ok(T),
    /// Operation failed with a displayable message
    Failed {
        message: String,
        cause: Option<Arc<GhviewError>>,
    },
}

impl<T> Outcome<T> {
    /// Build a failure from an error, using `fallback` when its text is blank
    pub fn from_error(err: GhviewError, fallback: &str) -> Self {
        Outcome::Failed {
            message: failure_message(&err, fallback),
            cause: Some(Arc::new(err)),
        }
    }

    /// Fold a `Result` into an outcome
    pub fn from_result(result: crate::error::Result<T>, fallback: &str) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(err) => Outcome::from_error(err, fallback),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    /// Failure message, if this is a failure
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Failed { message, .. } => Some(message),
            Outcome::Pending | Outcome::Ok(_) => None,
        }
    }

    /// Success value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(value) => Some(value),
            Outcome::Pending | Outcome::Failed { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Pending => Outcome::Pending,
            Outcome::Ok(value) => Outcome::Ok(f(value)),
            Outcome::Failed { message, cause } => Outcome::Failed { message, cause },
        }
    }
}

/// Display text of `err`, or `fallback` when that text is blank
pub fn failure_message(err: &GhviewError, fallback: &str) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
