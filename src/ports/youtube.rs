use serde::{Deserialize, Serialize};
use url::Url;

const PLAYLIST_PAGE: &str = "https://www.youtube.com/playlist";

/// Who can see a playlist created on YouTube.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Unlisted => "unlisted",
            PrivacyStatus::Private => "private",
        }
    }
}

/// Request body fields for a new playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaylist {
    pub title: String,
    pub description: String,
    pub privacy: PrivacyStatus,
}

/// A playlist that was created on YouTube.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePlaylist {
    pub id: String,
    pub title: String,
}

impl RemotePlaylist {
    pub fn url(&self) -> String {
        match Url::parse_with_params(PLAYLIST_PAGE, &[("list", self.id.as_str())]) {
            Ok(url) => url.into(),
            Err(_) => format!("{PLAYLIST_PAGE}?list={}", self.id),
        }
    }
}

/// A YouTube API call that did not succeed.
///
/// `status` is `None` when no response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "YouTube API request failed ({}): {message}",
    .status.map_or_else(|| "no response".to_string(), |status| format!("HTTP {status}"))
)]
pub struct RemoteApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl RemoteApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

/// Port trait wrapping the YouTube Data API calls used to fill a playlist.
///
/// Implementations live in `services::youtube::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait YouTubeClient: Send + Sync {
    async fn create_playlist(
        &self,
        playlist: &NewPlaylist,
    ) -> Result<RemotePlaylist, RemoteApiError>;

    /// Appends a video to the end of a playlist. Not idempotent.
    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), RemoteApiError>;
}
