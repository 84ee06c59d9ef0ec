use crate::ports::credentials::{AuthError, Credential, CredentialProvider};
use crate::ports::youtube::{
    NewPlaylist, PrivacyStatus, RemoteApiError, RemotePlaylist, YouTubeClient,
};
use crate::rimusic::{PlaylistExport, Track, derive_playlist_name};
use crate::services::diff::unique_tracks;

/// How new playlists are set up on YouTube.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistSettings {
    pub privacy: PrivacyStatus,
    pub description: String,
}

/// Authenticated access to the playlist operations of the YouTube API.
pub struct RemoteSession<C: YouTubeClient> {
    client: C,
    settings: PlaylistSettings,
}

impl<C: YouTubeClient> RemoteSession<C> {
    pub fn new(client: C, settings: PlaylistSettings) -> Self {
        Self { client, settings }
    }

    /// Obtains a credential once and builds the client from it.
    pub async fn open<P>(
        provider: &P,
        connect: impl FnOnce(&Credential) -> C,
        settings: PlaylistSettings,
    ) -> Result<Self, AuthError>
    where
        P: CredentialProvider + ?Sized,
    {
        let credential = provider.get_credentials().await?;
        Ok(Self::new(connect(&credential), settings))
    }

    pub async fn create_playlist(&self, name: &str) -> Result<RemotePlaylist, RemoteApiError> {
        let playlist = NewPlaylist {
            title: name.to_string(),
            description: self.settings.description.clone(),
            privacy: self.settings.privacy,
        };
        self.client.create_playlist(&playlist).await
    }

    /// Appends one video. Adding the same video twice adds it twice.
    pub async fn add_item(
        &self,
        playlist: &RemotePlaylist,
        media_id: &str,
    ) -> Result<(), RemoteApiError> {
        self.client
            .insert_playlist_item(&playlist.id, media_id)
            .await
    }
}

/// What a run is going to do: the playlist name and the tracks to add, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub playlist_name: String,
    pub tracks: Vec<Track>,
}

impl SyncPlan {
    /// An explicit name wins over the one derived from the export's file name.
    /// With a baseline, only tracks not already in it are planned.
    pub fn resolve(
        export: &PlaylistExport,
        baseline: Option<&PlaylistExport>,
        playlist_name: Option<&str>,
    ) -> Self {
        let playlist_name = match playlist_name {
            Some(name) => name.to_string(),
            None => derive_playlist_name(export.file_name()),
        };
        let tracks = match baseline {
            Some(baseline) => unique_tracks(baseline, export),
            None => export.tracks().to_vec(),
        };
        Self {
            playlist_name,
            tracks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    NameResolved,
    RemotePlaylistCreated,
    Inserting,
    Done,
    Failed,
}

impl SyncState {
    fn advance(&mut self, next: SyncState) {
        log::debug!("Sync state {:?} -> {:?}", self, next);
        *self = next;
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to create playlist \"{name}\": {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: RemoteApiError,
    },
}

/// Result of adding one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub media_id: String,
    pub result: Result<(), RemoteApiError>,
}

/// Progress of the insertion loop, reported after every item.
#[derive(Debug, Clone, Copy)]
pub struct SyncProgress<'a> {
    /// 1-based position of the item.
    pub processed: usize,
    pub total: usize,
    pub outcome: &'a ItemOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub playlist: RemotePlaylist,
    pub outcomes: Vec<ItemOutcome>,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &RemoteApiError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(()) => None,
            Err(err) => Some((o.media_id.as_str(), err)),
        })
    }
}

/// Resolves the playlist name, then creates the playlist and fills it one
/// track at a time.
///
/// `Idle -> NameResolved` happens on [`SyncDriver::resolve`], before any
/// remote access. A failed insert is recorded and the next track is tried.
/// Only a failed playlist creation stops the run, moving `NameResolved` to
/// `Failed`.
#[derive(Debug)]
pub struct SyncDriver {
    state: SyncState,
    plan: SyncPlan,
}

impl SyncDriver {
    pub fn resolve(
        export: &PlaylistExport,
        baseline: Option<&PlaylistExport>,
        playlist_name: Option<&str>,
    ) -> Self {
        let mut state = SyncState::Idle;
        let plan = SyncPlan::resolve(export, baseline, playlist_name);
        state.advance(SyncState::NameResolved);
        Self { state, plan }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn plan(&self) -> &SyncPlan {
        &self.plan
    }

    pub fn into_plan(self) -> SyncPlan {
        self.plan
    }

    pub async fn run<C: YouTubeClient>(
        &mut self,
        session: &RemoteSession<C>,
        mut on_progress: impl FnMut(SyncProgress<'_>),
    ) -> Result<SyncReport, SyncError> {
        let plan = &self.plan;

        log::info!("Creating playlist '{}'", plan.playlist_name);
        let playlist = match session.create_playlist(&plan.playlist_name).await {
            Ok(playlist) => playlist,
            Err(source) => {
                log::error!(
                    "Failed to create playlist '{}': {}",
                    plan.playlist_name,
                    source
                );
                self.state.advance(SyncState::Failed);
                return Err(SyncError::CreationFailed {
                    name: plan.playlist_name.clone(),
                    source,
                });
            }
        };
        log::info!(
            "Created playlist '{}' (ID: {})",
            playlist.title,
            playlist.id
        );
        self.state.advance(SyncState::RemotePlaylistCreated);

        self.state.advance(SyncState::Inserting);
        let total = plan.tracks.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, track) in plan.tracks.iter().enumerate() {
            let result = session.add_item(&playlist, &track.media_id).await;
            match &result {
                Ok(()) => log::info!("Added track to playlist (media_id: {})", track.media_id),
                Err(e) => log::error!("Failed to add track (media_id: {}): {}", track.media_id, e),
            }

            outcomes.push(ItemOutcome {
                media_id: track.media_id.clone(),
                result,
            });
            if let Some(outcome) = outcomes.last() {
                on_progress(SyncProgress {
                    processed: index + 1,
                    total,
                    outcome,
                });
            }
        }

        self.state.advance(SyncState::Done);

        let report = SyncReport { playlist, outcomes };
        log::info!(
            "Sync complete for playlist '{}': {} added, {} failed",
            report.playlist.title,
            report.succeeded(),
            report.total() - report.succeeded()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mockall::Sequence;

    use super::*;
    use crate::ports::credentials::MockCredentialProvider;
    use crate::ports::youtube::MockYouTubeClient;

    fn driver(ids: &[&str]) -> SyncDriver {
        let export = PlaylistExport::new(
            "RMPlaylist_SummerHits_20230915.csv",
            ids.iter()
                .map(|id| Track::from_raw(*id, "Artist", "Title"))
                .collect(),
        );
        SyncDriver::resolve(&export, None, None)
    }

    fn created(title: &str) -> RemotePlaylist {
        RemotePlaylist {
            id: "PL123".into(),
            title: title.into(),
        }
    }

    fn session(client: MockYouTubeClient) -> RemoteSession<MockYouTubeClient> {
        RemoteSession::new(client, PlaylistSettings::default())
    }

    #[tokio::test]
    async fn test_run_adds_every_track_in_order() {
        let mut client = MockYouTubeClient::new();
        let mut seq = Sequence::new();
        client
            .expect_create_playlist()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|playlist| Ok(created(&playlist.title)));
        for id in ["a", "b", "c"] {
            client
                .expect_insert_playlist_item()
                .withf(move |playlist_id, video_id| playlist_id == "PL123" && video_id == id)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }

        let session = session(client);
        let mut driver = driver(&["a", "b", "c"]);
        assert_eq!(driver.state(), SyncState::NameResolved);
        assert_eq!(driver.plan().playlist_name, "2023-09-15 SummerHits");

        let report = driver.run(&session, |_| {}).await.unwrap();

        assert_eq!(driver.state(), SyncState::Done);
        assert_eq!(report.playlist.title, "2023-09-15 SummerHits");
        assert_eq!(report.total(), 3);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_item_does_not_stop_the_run() {
        let attempted = Arc::new(Mutex::new(Vec::new()));

        let mut client = MockYouTubeClient::new();
        client
            .expect_create_playlist()
            .returning(|playlist| Ok(created(&playlist.title)));
        let attempted_clone = attempted.clone();
        client
            .expect_insert_playlist_item()
            .times(5)
            .returning(move |_, video_id| {
                attempted_clone.lock().unwrap().push(video_id.to_string());
                if video_id == "3" {
                    Err(RemoteApiError::new(404, "Video not found."))
                } else {
                    Ok(())
                }
            });

        let session = session(client);
        let mut driver = driver(&["1", "2", "3", "4", "5"]);
        let mut progress = Vec::new();

        let report = driver
            .run(&session, |p| {
                progress.push((p.processed, p.total, p.outcome.result.is_ok()));
            })
            .await
            .unwrap();

        assert_eq!(driver.state(), SyncState::Done);
        assert_eq!(*attempted.lock().unwrap(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(
            progress,
            vec![
                (1, 5, true),
                (2, 5, true),
                (3, 5, false),
                (4, 5, true),
                (5, 5, true),
            ]
        );
        assert_eq!(report.succeeded(), 4);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "3");
        assert_eq!(failures[0].1.status, Some(404));
        assert_eq!(failures[0].1.message, "Video not found.");
    }

    #[tokio::test]
    async fn test_creation_failure_never_adds_items() {
        let mut client = MockYouTubeClient::new();
        client
            .expect_create_playlist()
            .times(1)
            .returning(|_| Err(RemoteApiError::new(403, "quotaExceeded")));
        client.expect_insert_playlist_item().never();

        let session = session(client);
        let mut driver = driver(&["1", "2"]);
        let mut progress_calls = 0;

        let err = driver
            .run(&session, |_| progress_calls += 1)
            .await
            .unwrap_err();

        assert_eq!(driver.state(), SyncState::Failed);
        assert_eq!(progress_calls, 0);
        let SyncError::CreationFailed { name, source } = err;
        assert_eq!(name, "2023-09-15 SummerHits");
        assert_eq!(source.status, Some(403));
    }

    #[tokio::test]
    async fn test_empty_plan_still_creates_playlist() {
        let mut client = MockYouTubeClient::new();
        client
            .expect_create_playlist()
            .times(1)
            .returning(|playlist| Ok(created(&playlist.title)));
        client.expect_insert_playlist_item().never();

        let session = session(client);
        let report = driver(&[])
            .run(&session, |_| {})
            .await
            .unwrap();

        assert_eq!(report.total(), 0);
    }

    #[tokio::test]
    async fn test_session_passes_playlist_settings() {
        let mut client = MockYouTubeClient::new();
        client
            .expect_create_playlist()
            .withf(|playlist| {
                playlist.title == "Mix"
                    && playlist.description == "Imported from RiMusic"
                    && playlist.privacy == PrivacyStatus::Unlisted
            })
            .times(1)
            .returning(|playlist| Ok(created(&playlist.title)));

        let session = RemoteSession::new(
            client,
            PlaylistSettings {
                privacy: PrivacyStatus::Unlisted,
                description: "Imported from RiMusic".into(),
            },
        );

        assert_eq!(session.create_playlist("Mix").await.unwrap().id, "PL123");
    }

    #[tokio::test]
    async fn test_open_authenticates_once() {
        let mut provider = MockCredentialProvider::new();
        provider.expect_get_credentials().times(1).returning(|| {
            Ok(Credential {
                access_token: "token".into(),
                refresh_token: None,
                expires_at: chrono::Utc::now() + chrono::TimeDelta::hours(1),
                scope: None,
            })
        });

        let session = RemoteSession::open(
            &provider,
            |credential| {
                assert_eq!(credential.access_token, "token");
                MockYouTubeClient::new()
            },
            PlaylistSettings::default(),
        )
        .await;

        assert!(session.is_ok());
    }

    #[test]
    fn test_driver_starts_resolved_with_explicit_name() {
        let export = PlaylistExport::new(
            "RMPlaylist_SummerHits_20230915.csv",
            vec![Track::from_raw("1", "A", "x")],
        );

        let driver = SyncDriver::resolve(&export, None, Some("Road Trip"));

        assert_eq!(driver.state(), SyncState::NameResolved);
        assert_eq!(driver.into_plan().playlist_name, "Road Trip");
    }

    #[test]
    fn test_resolve_plan_prefers_explicit_name() {
        let export = PlaylistExport::new(
            "RMPlaylist_SummerHits_20230915.csv",
            vec![Track::from_raw("1", "A", "x")],
        );

        let derived = SyncPlan::resolve(&export, None, None);
        assert_eq!(derived.playlist_name, "2023-09-15 SummerHits");
        assert_eq!(derived.tracks, export.tracks());

        let named = SyncPlan::resolve(&export, None, Some("Road Trip"));
        assert_eq!(named.playlist_name, "Road Trip");
    }

    #[test]
    fn test_resolve_plan_with_baseline() {
        let baseline = PlaylistExport::new(
            "RMPlaylist_SummerHits_20230901.csv",
            vec![Track::from_raw("1", "A", "x")],
        );
        let export = PlaylistExport::new(
            "RMPlaylist_SummerHits_20230915.csv",
            vec![Track::from_raw("1", "A", "x"), Track::from_raw("2", "B", "y")],
        );

        let plan = SyncPlan::resolve(&export, Some(&baseline), None);

        assert_eq!(plan.playlist_name, "2023-09-15 SummerHits");
        assert_eq!(plan.tracks, vec![Track::from_raw("2", "B", "y")]);
    }
}
