use serde::{Deserialize, Serialize};

/* ---------- Playlists ---------- */

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistInsert<'a> {
    pub snippet: PlaylistSnippet<'a>,
    pub status: PlaylistStatus<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistSnippet<'a> {
    pub title: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistStatus<'a> {
    #[serde(rename = "privacyStatus")]
    pub privacy_status: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubePlaylist {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<YouTubePlaylistSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YouTubePlaylistSnippet {
    pub title: String,
}

/* ---------- Playlist items ---------- */

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemInsert<'a> {
    pub snippet: PlaylistItemSnippet<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemSnippet<'a> {
    #[serde(rename = "playlistId")]
    pub playlist_id: &'a str,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceId<'a>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceId<'a> {
    pub kind: &'a str,
    #[serde(rename = "videoId")]
    pub video_id: &'a str,
}

/* ---------- Errors ---------- */

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: GoogleError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleError {
    pub message: String,
}

/* ---------- OAuth ---------- */

/// Client secret file as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretFile {
    #[serde(default)]
    pub installed: Option<ClientSecret>,
    #[serde(default)]
    pub web: Option<ClientSecret>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Google OAuth token response
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// State of a started consent flow, needed to finish it.
#[derive(Debug, Clone)]
pub struct OAuthSession {
    pub auth_url: String,
    pub redirect_uri: String,
    pub code_verifier: String,
    pub state: String,
}
