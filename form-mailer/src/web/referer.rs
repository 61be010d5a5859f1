//! Referer allow-list check.

use axum::http::{header, HeaderMap};

/// Outcome of checking a request's Referer against the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefererCheck {
    /// Referer is on the allow-list
    Allowed,
    /// No allow-list configured, every origin passes
    Unrestricted,
    /// Allow-list configured and the referer is not on it
    Rejected,
}

/// Check a referer against the configured allow-list.
///
/// Matching is exact. A request without a Referer header is checked as the
/// empty string.
pub fn check_referer(allowed: &[String], referer: &str) -> RefererCheck {
    if allowed.is_empty() {
        return RefererCheck::Unrestricted;
    }

    if allowed.iter().any(|candidate| candidate == referer) {
        RefererCheck::Allowed
    } else {
        RefererCheck::Rejected
    }
}

/// Extract the Referer header, treating a missing or non-ASCII value as empty.
pub fn referer_from_headers(headers: &HeaderMap) -> &str {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
