use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use crate::ports::credentials::AuthError;
use crate::youtube_rs::types::{
    ClientSecret, ClientSecretFile, GoogleTokenResponse, OAuthSession,
};

/// Manage the user's YouTube playlists.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

const AUTHORIZED_PAGE: &str = "Authorization complete, you can close this tab.";

/// Generate a cryptographically secure random string for PKCE
fn generate_random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            const CHARSET: &[u8] =
                b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
            CHARSET[rng.random_range(0..CHARSET.len())] as char
        })
        .collect()
}

/// Generate PKCE code verifier (43-128 characters)
fn generate_code_verifier() -> String {
    generate_random_string(128)
}

/// Generate PKCE code challenge from verifier using S256 method
fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let hash = hasher.finalize();
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state parameter for CSRF protection
fn generate_state() -> String {
    generate_random_string(16)
}

/// Reads the client secret JSON downloaded from the Google Cloud console.
pub fn load_client_secret(path: &Path) -> Result<ClientSecret, AuthError> {
    let invalid = |reason: String| AuthError::InvalidClientSecret {
        path: path.display().to_string(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|err| invalid(err.to_string()))?;
    parse_client_secret(&contents).map_err(invalid)
}

fn parse_client_secret(contents: &str) -> Result<ClientSecret, String> {
    let file: ClientSecretFile = serde_json::from_str(contents).map_err(|err| err.to_string())?;
    file.installed
        .or(file.web)
        .ok_or_else(|| "expected an `installed` or `web` client".to_string())
}

/// Initiate Google OAuth flow with PKCE
/// Returns the consent URL the user has to open, bundled with the verifier and state
pub fn initiate_oauth(
    secret: &ClientSecret,
    redirect_uri: &str,
) -> Result<OAuthSession, AuthError> {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);
    let state = generate_state();

    let auth_url = Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code"),
            ("scope", YOUTUBE_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("state", state.as_str()),
            ("code_challenge", code_challenge.as_str()),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|err| AuthError::InvalidClientSecret {
        path: secret.auth_uri.clone(),
        reason: err.to_string(),
    })?;

    Ok(OAuthSession {
        auth_url: auth_url.into(),
        redirect_uri: redirect_uri.to_string(),
        code_verifier,
        state,
    })
}

/// Extracts the authorization code from the request target of the loopback redirect.
///
/// Returns `Ok(None)` for requests that are not the redirect, e.g. a favicon lookup.
fn parse_redirect(target: &str, expected_state: &str) -> Result<Option<String>, AuthError> {
    let url = Url::parse("http://127.0.0.1")
        .and_then(|base| base.join(target))
        .map_err(|err| AuthError::ConsentFailed {
            reason: format!("Malformed redirect {target:?}: {err}"),
        })?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(AuthError::ConsentFailed { reason: error });
    }
    let Some(code) = code else {
        return Ok(None);
    };
    if state.as_deref() != Some(expected_state) {
        return Err(AuthError::ConsentFailed {
            reason: "State parameter mismatch".to_string(),
        });
    }
    Ok(Some(code))
}

/// Waits for Google to redirect the browser to the loopback listener.
pub async fn receive_authorization_code(
    listener: &TcpListener,
    expected_state: &str,
) -> Result<String, AuthError> {
    loop {
        let (mut stream, peer) = listener.accept().await?;
        log::debug!("Loopback connection from {peer}");

        let mut buf = vec![0u8; 8192];
        let read = stream.read(&mut buf).await?;
        let request = String::from_utf8_lossy(&buf[..read]);

        // GET /?code=...&state=... HTTP/1.1
        let target = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/");

        match parse_redirect(target, expected_state) {
            Ok(Some(code)) => {
                respond(&mut stream, "200 OK", AUTHORIZED_PAGE).await?;
                return Ok(code);
            }
            Ok(None) => {
                respond(&mut stream, "404 Not Found", "Not found").await?;
            }
            Err(err) => {
                respond(&mut stream, "400 Bad Request", &err.to_string()).await?;
                return Err(err);
            }
        }
    }
}

async fn respond(
    stream: &mut tokio::net::TcpStream,
    status: &str,
    body: &str,
) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Exchange authorization code for access token
/// https://developers.google.com/identity/protocols/oauth2/native-app#exchange-authorization-code
pub async fn exchange_code_for_token(
    client: &Client,
    secret: &ClientSecret,
    session: &OAuthSession,
    code: &str,
) -> Result<GoogleTokenResponse, AuthError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", session.redirect_uri.as_str()),
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
        ("code_verifier", session.code_verifier.as_str()),
    ];
    request_token(client, &secret.token_uri, &params).await
}

/// Refresh an access token using a refresh token
pub async fn refresh_access_token(
    client: &Client,
    secret: &ClientSecret,
    refresh_token: &str,
) -> Result<GoogleTokenResponse, AuthError> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", secret.client_id.as_str()),
        ("client_secret", secret.client_secret.as_str()),
    ];
    request_token(client, &secret.token_uri, &params).await
}

async fn request_token(
    client: &Client,
    token_uri: &str,
    params: &[(&str, &str)],
) -> Result<GoogleTokenResponse, AuthError> {
    let response = client
        .post(token_uri)
        // This automatically serializes to x-www-form-urlencoded and sets the header
        .form(params)
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(AuthError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(AuthError::TokenRejected {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(AuthError::FailedToParseResponse)
}
