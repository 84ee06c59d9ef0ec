use crate::ports::credentials::{AuthError, Credential, CredentialProvider};
use crate::ports::youtube::YouTubeClient;
use crate::rimusic::PlaylistExport;
use crate::services::sync::{
    PlaylistSettings, RemoteSession, SyncDriver, SyncError, SyncPlan, SyncProgress, SyncReport,
};

/// One invocation of the importer.
#[derive(Debug, Clone)]
pub struct MigrationRequest {
    pub export: PlaylistExport,
    /// Export that was imported before; its tracks are skipped.
    pub already_processed: Option<PlaylistExport>,
    pub playlist_name: Option<String>,
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum MigrationOutcome {
    /// Nothing was sent to YouTube; the plan lists what would have been added.
    DryRun(SyncPlan),
    /// Every track was already processed, so no playlist was created.
    NothingToSync(SyncPlan),
    Synced(SyncReport),
}

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// What is left to do after planning a migration.
#[derive(Debug)]
pub enum Planned {
    /// The run is over without touching YouTube.
    Finished(MigrationOutcome),
    /// The playlist still has to be created and filled.
    Remote(SyncDriver),
}

/// Resolves the playlist name and the tracks to add.
///
/// A dry run, or a baseline that leaves nothing new, finishes here. Neither
/// needs credentials or any remote settings.
pub fn plan_migration(request: &MigrationRequest) -> Planned {
    let driver = SyncDriver::resolve(
        &request.export,
        request.already_processed.as_ref(),
        request.playlist_name.as_deref(),
    );
    let plan = driver.plan();
    log::info!(
        "Planned {} of {} tracks for playlist '{}'",
        plan.tracks.len(),
        request.export.len(),
        plan.playlist_name
    );

    if request.dry_run {
        return Planned::Finished(MigrationOutcome::DryRun(driver.into_plan()));
    }

    if plan.tracks.is_empty() && request.already_processed.is_some() {
        log::info!("All tracks were already processed, not creating a playlist");
        return Planned::Finished(MigrationOutcome::NothingToSync(driver.into_plan()));
    }

    Planned::Remote(driver)
}

/// Opens a session with a credential from `provider` and runs the sync.
pub async fn run_migration<P, C>(
    mut driver: SyncDriver,
    provider: &P,
    connect: impl FnOnce(&Credential) -> C,
    settings: PlaylistSettings,
    on_progress: impl FnMut(SyncProgress<'_>),
) -> Result<MigrationOutcome, MigrateError>
where
    P: CredentialProvider + ?Sized,
    C: YouTubeClient,
{
    let session = RemoteSession::open(provider, connect, settings).await?;
    let result = driver.run(&session, on_progress).await;
    log::debug!("Sync finished in state {:?}", driver.state());
    let report = result?;

    Ok(MigrationOutcome::Synced(report))
}
