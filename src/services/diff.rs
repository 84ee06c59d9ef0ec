use std::collections::HashSet;

use crate::rimusic::{PlaylistExport, Track};

/// Returns the tracks of `candidate` whose media id does not occur in `baseline`.
///
/// Candidate order is kept, and every candidate row with a new id is returned,
/// including repeated rows.
pub fn unique_tracks(baseline: &PlaylistExport, candidate: &PlaylistExport) -> Vec<Track> {
    let already_processed: HashSet<&str> = baseline
        .tracks()
        .iter()
        .map(|track| track.media_id.as_str())
        .collect();

    let unique: Vec<Track> = candidate
        .tracks()
        .iter()
        .filter(|track| !already_processed.contains(track.media_id.as_str()))
        .cloned()
        .collect();

    log::info!(
        "{} of {} tracks in {} are not in {}",
        unique.len(),
        candidate.len(),
        candidate.file_name(),
        baseline.file_name()
    );

    unique
}
