use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SKEW: TimeDelta = TimeDelta::seconds(60);

/// OAuth credential for the YouTube Data API, as stored in the token cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + EXPIRY_SKEW >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to read client secret {path}: {reason}")]
    InvalidClientSecret { path: String, reason: String },
    #[error("Failed to persist credential to {path}: {reason}")]
    CacheWrite { path: String, reason: String },
    #[error("Authorization was not granted: {reason}")]
    ConsentFailed { reason: String },
    #[error("Token request was rejected: {reason}")]
    TokenRejected { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
    #[error("Loopback redirect failed: {0}")]
    Redirect(#[from] std::io::Error),
}

/// Port trait for obtaining a usable credential, prompting for consent if needed.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn get_credentials(&self) -> Result<Credential, AuthError>;
}
