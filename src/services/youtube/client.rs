use reqwest::Client;
use url::Url;

use crate::ports::credentials::Credential;
use crate::ports::youtube::{NewPlaylist, RemoteApiError, RemotePlaylist, YouTubeClient};
use crate::youtube_rs::playlist::{create_playlist, insert_playlist_item};

pub struct YouTubeHttpAdapter {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl YouTubeHttpAdapter {
    pub fn new(base_url: Url, credential: &Credential) -> Self {
        Self {
            client: Client::new(),
            base_url,
            access_token: credential.access_token.clone(),
        }
    }
}

#[async_trait::async_trait]
impl YouTubeClient for YouTubeHttpAdapter {
    async fn create_playlist(
        &self,
        playlist: &NewPlaylist,
    ) -> Result<RemotePlaylist, RemoteApiError> {
        create_playlist(&self.client, &self.base_url, &self.access_token, playlist).await
    }

    async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), RemoteApiError> {
        insert_playlist_item(
            &self.client,
            &self.base_url,
            &self.access_token,
            playlist_id,
            video_id,
        )
        .await
    }
}
