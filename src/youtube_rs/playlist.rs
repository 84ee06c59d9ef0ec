use reqwest::{Client, Response};
use url::Url;

use crate::ports::youtube::{NewPlaylist, RemoteApiError, RemotePlaylist};
use crate::youtube_rs::types::{
    GoogleErrorResponse, PlaylistInsert, PlaylistItemInsert, PlaylistItemSnippet, PlaylistSnippet,
    PlaylistStatus, ResourceId, YouTubePlaylist,
};

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/* ---------- Create playlist ---------- */

/// Docs: https://developers.google.com/youtube/v3/docs/playlists/insert
pub async fn create_playlist(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    playlist: &NewPlaylist,
) -> Result<RemotePlaylist, RemoteApiError> {
    let mut url = join(base_url, "playlists")?;
    url.query_pairs_mut().append_pair("part", "snippet,status");

    let body = PlaylistInsert {
        snippet: PlaylistSnippet {
            title: &playlist.title,
            description: &playlist.description,
        },
        status: PlaylistStatus {
            privacy_status: playlist.privacy.as_str(),
        },
    };

    let res = client
        .post(url)
        .bearer_auth(access_token)
        .header("Accept", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(transport_error)?;

    let created = error_for_status(res)
        .await?
        .json::<YouTubePlaylist>()
        .await
        .map_err(|err| {
            RemoteApiError::transport(format!(
                "Failed to deserialize create playlist response: {err}"
            ))
        })?;

    Ok(RemotePlaylist {
        title: created
            .snippet
            .map_or_else(|| playlist.title.clone(), |snippet| snippet.title),
        id: created.id,
    })
}

/* ---------- Playlist items ---------- */

/// Docs: https://developers.google.com/youtube/v3/docs/playlistItems/insert
///
/// No position is sent, so YouTube appends the video to the end.
pub async fn insert_playlist_item(
    client: &Client,
    base_url: &Url,
    access_token: &str,
    playlist_id: &str,
    video_id: &str,
) -> Result<(), RemoteApiError> {
    let mut url = join(base_url, "playlistItems")?;
    url.query_pairs_mut().append_pair("part", "snippet");

    let body = PlaylistItemInsert {
        snippet: PlaylistItemSnippet {
            playlist_id,
            resource_id: ResourceId {
                kind: "youtube#video",
                video_id,
            },
        },
    };

    let res = client
        .post(url)
        .bearer_auth(access_token)
        .header("Accept", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(transport_error)?;

    error_for_status(res).await?;

    Ok(())
}

/* ---------- Helpers ---------- */

fn join(base_url: &Url, path: &str) -> Result<Url, RemoteApiError> {
    base_url
        .join(path)
        .map_err(|err| RemoteApiError::transport(format!("Invalid API URL {base_url}: {err}")))
}

fn transport_error(err: reqwest::Error) -> RemoteApiError {
    RemoteApiError {
        status: err.status().map(|status| status.as_u16()),
        message: err.to_string(),
    }
}

/// Turns a non-success response into a [`RemoteApiError`] carrying Google's message.
async fn error_for_status(res: Response) -> Result<Response, RemoteApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res
        .text()
        .await
        .unwrap_or("Failed to get error text".to_string());

    Err(RemoteApiError::new(status.as_u16(), error_message(&body)))
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(response) => response.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
