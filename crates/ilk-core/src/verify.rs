//! Outcome types of a single issue lookup.

use std::fmt;

/// Why a token could not be verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupFailure {
    /// URL that was requested.
    pub url: String,
    /// HTTP status, if a response was received at all.
    pub status: Option<u16>,
    pub detail: String,
}

impl LookupFailure {
    pub fn unreachable(url: impl Into<String>, detail: impl fmt::Display) -> Self {
        Self {
            url: url.into(),
            status: None,
            detail: format!("unreachable: {detail}"),
        }
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            detail: "unexpected status".to_string(),
        }
    }

    pub fn body(url: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({status}): {}", self.url, self.detail),
            None => write!(f, "{}: {}", self.url, self.detail),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verification {
    /// The tracker confirmed the issue; `key` is the tracker's spelling.
    Verified { key: String },
    Unverified(LookupFailure),
}

/// Result of checking one requested token against the tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationResult {
    pub token: String,
    pub outcome: Verification,
}

impl VerificationResult {
    pub fn verified(token: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            outcome: Verification::Verified { key: key.into() },
        }
    }

    pub fn unverified(token: impl Into<String>, failure: LookupFailure) -> Self {
        Self {
            token: token.into(),
            outcome: Verification::Unverified(failure),
        }
    }

    /// Returned issue key, if verified.
    pub fn key(&self) -> Option<&str> {
        match &self.outcome {
            Verification::Verified { key } => Some(key),
            Verification::Unverified(_) => None,
        }
    }
}
