use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use tokio::net::TcpListener;

use crate::ports::credentials::{AuthError, Credential, CredentialProvider};
use crate::youtube_rs::auth::{
    exchange_code_for_token, initiate_oauth, load_client_secret, receive_authorization_code,
    refresh_access_token,
};
use crate::youtube_rs::types::{ClientSecret, GoogleTokenResponse};

/// Credential provider backed by a JSON token cache on disk.
///
/// A cached, unexpired token is used as is. An expired one is refreshed
/// silently. Without a usable cache the user is sent through Google's consent
/// page and the result is written back to the cache.
pub struct TokenCacheCredentialProvider {
    client: Client,
    client_secret_path: PathBuf,
    token_cache_path: PathBuf,
}

impl TokenCacheCredentialProvider {
    pub fn new(client_secret_path: PathBuf, token_cache_path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            client_secret_path,
            token_cache_path,
        }
    }

    fn load_cached(&self) -> Option<Credential> {
        let contents = match std::fs::read_to_string(&self.token_cache_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No token cache at {}", self.token_cache_path.display());
                return None;
            }
            Err(err) => {
                log::warn!(
                    "Failed to read token cache {}: {}",
                    self.token_cache_path.display(),
                    err
                );
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(credential) => Some(credential),
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable token cache {}: {}",
                    self.token_cache_path.display(),
                    err
                );
                None
            }
        }
    }

    fn persist(&self, credential: &Credential) -> Result<(), AuthError> {
        write_cache(&self.token_cache_path, credential)?;
        log::debug!("Saved credential to {}", self.token_cache_path.display());
        Ok(())
    }

    async fn refresh(
        &self,
        secret: &ClientSecret,
        cached: &Credential,
    ) -> Result<Credential, AuthError> {
        let refresh_token = cached.refresh_token.as_deref().unwrap_or_default();
        let token = refresh_access_token(&self.client, secret, refresh_token).await?;
        Ok(credential_from_token(
            token,
            cached.refresh_token.clone(),
            Utc::now(),
        ))
    }

    async fn consent(&self, secret: &ClientSecret) -> Result<Credential, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let redirect_uri = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
        let session = initiate_oauth(secret, &redirect_uri)?;

        println!(
            "Open this URL in your browser to allow access to your YouTube account:\n\n{}\n",
            session.auth_url
        );

        let code = receive_authorization_code(&listener, &session.state).await?;
        let token = exchange_code_for_token(&self.client, secret, &session, &code).await?;
        log::info!("Authorization granted");

        Ok(credential_from_token(token, None, Utc::now()))
    }
}

#[async_trait::async_trait]
impl CredentialProvider for TokenCacheCredentialProvider {
    async fn get_credentials(&self) -> Result<Credential, AuthError> {
        let cached = self.load_cached().filter(Credential::is_valid);

        if let Some(cached) = &cached {
            if !cached.is_expired() {
                log::debug!("Using cached credential, expires at {}", cached.expires_at);
                return Ok(cached.clone());
            }
        }

        let secret = load_client_secret(&self.client_secret_path)?;

        if let Some(cached) = cached.filter(Credential::is_refreshable) {
            log::info!("Cached credential expired, refreshing");
            match self.refresh(&secret, &cached).await {
                Ok(credential) => {
                    self.persist(&credential)?;
                    return Ok(credential);
                }
                Err(AuthError::TokenRejected { reason }) => {
                    log::warn!("Refresh token was rejected, asking for consent again: {reason}");
                }
                Err(err) => return Err(err),
            }
        }

        let credential = self.consent(&secret).await?;
        self.persist(&credential)?;
        Ok(credential)
    }
}

/// Google omits the refresh token on refresh, so the previous one is kept.
///
/// A lifetime that does not fit a timestamp yields a credential that is
/// already expired.
fn credential_from_token(
    token: GoogleTokenResponse,
    previous_refresh_token: Option<String>,
    now: DateTime<Utc>,
) -> Credential {
    let expires_at = TimeDelta::try_seconds(token.expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| {
            log::warn!(
                "Token endpoint returned an out of range lifetime of {}s, treating token as expired",
                token.expires_in
            );
            now
        });

    Credential {
        access_token: token.access_token,
        refresh_token: token.refresh_token.or(previous_refresh_token),
        expires_at,
        scope: token.scope,
    }
}

fn write_cache(path: &Path, credential: &Credential) -> Result<(), AuthError> {
    let cache_write = |reason: String| AuthError::CacheWrite {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| cache_write(err.to_string()))?;
    }
    let contents =
        serde_json::to_string_pretty(credential).map_err(|err| cache_write(err.to_string()))?;
    std::fs::write(path, contents).map_err(|err| cache_write(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(refresh_token: Option<&str>) -> GoogleTokenResponse {
        GoogleTokenResponse {
            access_token: "new-access".into(),
            expires_in: 3599,
            refresh_token: refresh_token.map(Into::into),
            scope: Some("https://www.googleapis.com/auth/youtube".into()),
        }
    }

    fn credential(expires_at: DateTime<Utc>) -> Credential {
        Credential {
            access_token: "cached-access".into(),
            refresh_token: Some("cached-refresh".into()),
            expires_at,
            scope: None,
        }
    }

    #[test]
    fn test_credential_from_token_keeps_previous_refresh_token() {
        let now = Utc::now();
        let credential = credential_from_token(token(None), Some("old".into()), now);

        assert_eq!(credential.access_token, "new-access");
        assert_eq!(credential.refresh_token.as_deref(), Some("old"));
        assert_eq!(credential.expires_at, now + TimeDelta::seconds(3599));
    }

    #[test]
    fn test_credential_from_token_prefers_new_refresh_token() {
        let credential = credential_from_token(token(Some("new")), Some("old".into()), Utc::now());
        assert_eq!(credential.refresh_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_out_of_range_lifetime_is_already_expired() {
        let now = Utc::now();
        for expires_in in [i64::MAX, i64::MIN] {
            let credential = credential_from_token(
                GoogleTokenResponse {
                    expires_in,
                    ..token(Some("new"))
                },
                None,
                now,
            );

            assert_eq!(credential.expires_at, now);
            assert!(credential.is_expired_at(now));
            assert!(credential.is_refreshable());
        }
    }

    #[test]
    fn test_persist_and_load_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("nested").join("token.json");
        let provider =
            TokenCacheCredentialProvider::new(dir.path().join("client_secret.json"), cache_path);

        assert_eq!(provider.load_cached(), None);

        let cred = credential(Utc::now() + TimeDelta::hours(1));
        provider.persist(&cred).unwrap();

        assert_eq!(provider.load_cached(), Some(cred));
    }

    #[test]
    fn test_unreadable_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("token.json");
        std::fs::write(&cache_path, "not json").unwrap();
        let provider =
            TokenCacheCredentialProvider::new(dir.path().join("client_secret.json"), cache_path);

        assert_eq!(provider.load_cached(), None);
    }

    #[tokio::test]
    async fn test_valid_cached_credential_needs_no_client_secret() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TokenCacheCredentialProvider::new(
            dir.path().join("missing_client_secret.json"),
            dir.path().join("token.json"),
        );
        let cred = credential(Utc::now() + TimeDelta::hours(1));
        provider.persist(&cred).unwrap();

        assert_eq!(provider.get_credentials().await.unwrap(), cred);
    }

    #[tokio::test]
    async fn test_expired_credential_without_client_secret_fails() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TokenCacheCredentialProvider::new(
            dir.path().join("missing_client_secret.json"),
            dir.path().join("token.json"),
        );
        provider
            .persist(&credential(Utc::now() - TimeDelta::hours(1)))
            .unwrap();

        let err = provider.get_credentials().await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientSecret { .. }));
    }
}
