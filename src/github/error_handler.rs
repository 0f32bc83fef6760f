//! GitHub API error detection and classification
//!
//! Turns octocrab errors into short, actionable messages. These messages end
//! up verbatim in `Outcome::Failed` and from there in the UI, so they are
//! kept to a single line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;

use crate::error::GhviewError;

/// Matches the HTTP status GitHub echoes back in error payloads
static STATUS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"status(?:_code)?:\s*(\d{3})").expect("Invalid regex pattern for status detection")
});

/// Classifies an octocrab error into a more specific GhviewError if possible
pub fn classify_github_error(err: octocrab::Error) -> GhviewError {
    let (status, error_message) = match &err {
        octocrab::Error::GitHub { source, .. } => {
            (Some(source.status_code.as_u16()), source.message.clone())
        }
        // Display only returns a terse variant name for the rest
        other => {
            let debug = format!("{:?}", other);
            (extract_status(&debug), debug)
        }
    };

    classify_message(status, &error_message)
}

/// Classification shared by octocrab errors and raw status/message pairs
pub fn classify_message(status: Option<u16>, error_message: &str) -> GhviewError {
    if is_rate_limit_error(status, error_message) {
        return GhviewError::GitHubApi(
            "API rate limit exceeded. Please wait a few minutes and try again.".to_string(),
        );
    }

    if is_bad_credentials_error(status, error_message) {
        return GhviewError::GitHubApi(
            "GitHub rejected the stored credentials. Run 'ghview auth login' again.".to_string(),
        );
    }

    if is_not_found_error(status, error_message) {
        return GhviewError::GitHubApi(
            "Repository not found. It may be private or you may not have access.".to_string(),
        );
    }

    GhviewError::GitHubApi(format!("GitHub API request failed: {}", error_message))
}

fn extract_status(error_message: &str) -> Option<u16> {
    STATUS_PATTERN
        .captures(error_message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Check if error is a rate limit error
fn is_rate_limit_error(status: Option<u16>, error_message: &str) -> bool {
    error_message.contains("rate limit")
        || (matches!(status, Some(403) | Some(429)) && error_message.contains("limit exceeded"))
}

/// Check if error is a 401 bad credentials
fn is_bad_credentials_error(status: Option<u16>, error_message: &str) -> bool {
    status == Some(401) || error_message.contains("Bad credentials")
}

/// Check if error is a 404 not found
fn is_not_found_error(status: Option<u16>, error_message: &str) -> bool {
    status == Some(404) || error_message.contains("Not Found")
}

/// Attempt to open a URL in the default browser
///
/// Returns true if the browser was successfully launched, false otherwise.
#[allow(unused_variables)]
pub fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .is_ok()
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        assert!(is_rate_limit_error(None, "API rate limit exceeded"));
        assert!(is_rate_limit_error(Some(403), "secondary limit exceeded"));
        assert!(!is_rate_limit_error(Some(403), "Some other error"));
    }

    #[test]
    fn test_bad_credentials_detection() {
        assert!(is_bad_credentials_error(Some(401), "whatever"));
        assert!(is_bad_credentials_error(None, "Bad credentials"));
        assert!(!is_bad_credentials_error(Some(500), "Server Error"));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(is_not_found_error(Some(404), "gone"));
        assert!(is_not_found_error(None, "Resource Not Found"));
        assert!(!is_not_found_error(None, "Some other error"));
    }

    #[test]
    fn test_extract_status_from_debug_text() {
        assert_eq!(extract_status("GitHubError { status_code: 502, .. }"), Some(502));
        assert_eq!(extract_status("status: 401"), Some(401));
        assert_eq!(extract_status("no numbers here"), None);
    }

    #[test]
    fn test_classify_message_falls_back_to_generic() {
        let err = classify_message(Some(500), "Server Error");
        assert_eq!(err.to_string(), "GitHub API request failed: Server Error");
    }

    #[test]
    fn test_classify_message_bad_credentials() {
        let err = classify_message(Some(401), "Bad credentials");
        assert!(err.to_string().contains("ghview auth login"));
    }
}
