//! Unified application error model and user-facing message mapping.
//! This module provides a common error enum used across the HTTP shell and the
//! auth/intimation operations, along with the lookup table that turns raw
//! backend failures into sentences fit for an end user.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    Validation { code: String, message: String },
    NotFound { code: String, message: String },
    Auth { code: String, message: String },
    Upstream { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Validation { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Upstream { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Upstream { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn validation<S: Into<String>>(code: S, msg: S) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn upstream<S: Into<String>>(code: S, msg: S) -> Self { AppError::Upstream { code: code.into(), message: msg.into() } }
    pub fn io<S: Into<String>>(code: S, msg: S) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Validation { .. } => 422,
            AppError::NotFound { .. } => 404,
            AppError::Auth { .. } => 401,
            AppError::Upstream { .. } => 502,
            AppError::Io { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as Internal unless downcasted elsewhere
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

/// Fallback sentence used when no mapping matches and the raw message is
/// unfit to show (too long, or carries machine-style tokens).
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Raw messages longer than this are never surfaced verbatim.
const MAX_RAW_LEN: usize = 100;

static HTTP_STATUS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"status:?\s*(\d{3})").unwrap());
static UPPER_SNAKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)+\b").unwrap());

/// Known substrings of backend/auth error payloads, matched case-insensitively,
/// in order. First hit wins.
const FRIENDLY_SUBSTRINGS: &[(&str, &str)] = &[
    ("invalid credentials", "The email or password you entered is incorrect."),
    ("invalid email or password", "The email or password you entered is incorrect."),
    ("incorrect password", "The email or password you entered is incorrect."),
    ("user not found", "No account was found for that email address."),
    ("user already exists", "An account with this email already exists."),
    ("email already", "An account with this email already exists."),
    ("email not verified", "Please verify your email address before signing in."),
    ("account pending", "Your account is awaiting approval. Please check back later."),
    ("token expired", "This link has expired. Please request a new one."),
    ("token has expired", "This link has expired. Please request a new one."),
    ("invalid token", "This link is no longer valid. Please request a new one."),
    ("session expired", "Your session has expired. Please sign in again."),
    ("network request failed", "Unable to reach the server. Please check your connection and try again."),
    ("failed to fetch", "Unable to reach the server. Please check your connection and try again."),
    ("connection refused", "Unable to reach the server. Please check your connection and try again."),
    ("timed out", "The request timed out. Please try again."),
];

fn status_message(code: u16) -> Option<&'static str> {
    Some(match code {
        400 => "The request could not be processed. Please review your input and try again.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource could not be found.",
        408 => "The request timed out. Please try again.",
        409 => "This request conflicts with an existing record.",
        422 => "Some of the submitted details were invalid. Please review and try again.",
        429 => "Too many attempts. Please wait a moment and try again.",
        500 => "The server encountered a problem. Please try again later.",
        502 | 503 | 504 => "The service is temporarily unavailable. Please try again later.",
        _ => return None,
    })
}

/// Turn a raw error message into a sentence safe to show an end user.
///
/// Resolution order: embedded `HTTP error! status: NNN` codes, then the known
/// substring table, then the raw message itself when it is short and free of
/// upper-snake machine tokens, else [`GENERIC_MESSAGE`].
pub fn user_friendly_message(raw: &str) -> String {
    if let Some(caps) = HTTP_STATUS_RE.captures(raw) {
        if let Ok(code) = caps[1].parse::<u16>() {
            if let Some(msg) = status_message(code) {
                return msg.to_string();
            }
        }
    }
    let lower = raw.to_lowercase();
    for (needle, msg) in FRIENDLY_SUBSTRINGS {
        if lower.contains(needle) {
            return msg.to_string();
        }
    }
    let trimmed = raw.trim();
    if !trimmed.is_empty() && trimmed.len() <= MAX_RAW_LEN && !UPPER_SNAKE_RE.is_match(trimmed) {
        return trimmed.to_string();
    }
    GENERIC_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::user("bad_input", "oops").http_status(), 400);
        assert_eq!(AppError::validation("validation", "bad field").http_status(), 422);
        assert_eq!(AppError::not_found("not_found", "missing").http_status(), 404);
        assert_eq!(AppError::auth("auth", "no").http_status(), 401);
        assert_eq!(AppError::upstream("upstream", "backend down").http_status(), 502);
        assert_eq!(AppError::io("io", "io").http_status(), 503);
        assert_eq!(AppError::internal("internal", "panic").http_status(), 500);
    }

    #[test]
    fn friendly_maps_http_status_codes() {
        assert_eq!(
            user_friendly_message("HTTP error! status: 404"),
            "The requested resource could not be found."
        );
        assert_eq!(
            user_friendly_message("HTTP error! status: 503"),
            "The service is temporarily unavailable. Please try again later."
        );
        // Unmapped status falls through to the other rules
        assert_eq!(user_friendly_message("HTTP error! status: 418"), "HTTP error! status: 418");
    }

    #[test]
    fn friendly_maps_known_substrings() {
        assert_eq!(
            user_friendly_message("login failed: Invalid Credentials"),
            "The email or password you entered is incorrect."
        );
        assert_eq!(
            user_friendly_message("reset failed: token expired at 2026-01-01"),
            "This link has expired. Please request a new one."
        );
    }

    #[test]
    fn friendly_passes_short_plain_messages_through() {
        assert_eq!(user_friendly_message("Please pick a claim handler."), "Please pick a claim handler.");
    }

    #[test]
    fn friendly_falls_back_for_long_or_technical_messages() {
        let long = "x".repeat(120);
        assert_eq!(user_friendly_message(&long), GENERIC_MESSAGE);
        assert_eq!(user_friendly_message("ERR_CONNECTION_RESET at layer 7"), GENERIC_MESSAGE);
        assert_eq!(user_friendly_message(""), GENERIC_MESSAGE);
    }
}
