use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Title prefix RiMusic uses to flag explicit tracks.
pub const EXPLICIT_PREFIX: &str = "e:";

pub const MEDIA_ID_COLUMN: &str = "MediaId";
pub const ARTISTS_COLUMN: &str = "Artists";
pub const TITLE_COLUMN: &str = "Title";

const REQUIRED_COLUMNS: [&str; 3] = [MEDIA_ID_COLUMN, ARTISTS_COLUMN, TITLE_COLUMN];

/// One song row of a RiMusic playlist export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// RiMusic media id, which is the YouTube video id of the song.
    pub media_id: String,
    pub artist: String,
    /// Display title, without the explicit marker.
    pub title: String,
    pub explicit: bool,
}

impl Track {
    /// Builds a track from a raw export title, splitting off the explicit marker.
    pub fn from_raw(
        media_id: impl Into<String>,
        artist: impl Into<String>,
        raw_title: &str,
    ) -> Self {
        let (title, explicit) = match raw_title.strip_prefix(EXPLICIT_PREFIX) {
            Some(stripped) => (stripped, true),
            None => (raw_title, false),
        };
        Self {
            media_id: media_id.into(),
            artist: artist.into(),
            title: title.to_string(),
            explicit,
        }
    }

    /// `"<artist> - <title>"`, as printed by a dry run.
    pub fn display_line(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// An ordered list of tracks read from one export file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistExport {
    file_name: String,
    tracks: Vec<Track>,
}

impl PlaylistExport {
    pub fn new(file_name: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            file_name: file_name.into(),
            tracks,
        }
    }

    /// Base name of the file the export was read from.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to read playlist export {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Playlist export {} is missing the required column `{column}`", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Malformed playlist export {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "MediaId")]
    media_id: String,
    #[serde(rename = "Artists")]
    artists: String,
    #[serde(rename = "Title")]
    title: String,
}

/// Reads a RiMusic CSV export.
///
/// Columns other than `MediaId`, `Artists` and `Title` are ignored. Rows
/// without a media id cannot be synced and are skipped.
pub fn read_export(path: &Path) -> Result<PlaylistExport, ExportError> {
    let file = std::fs::File::open(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_export(file_name, file, path)
}

fn parse_export(
    file_name: String,
    reader: impl std::io::Read,
    path: &Path,
) -> Result<PlaylistExport, ExportError> {
    let csv_error = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(ExportError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut tracks = Vec::new();
    for (index, row) in reader.deserialize::<ExportRow>().enumerate() {
        let row = row.map_err(csv_error)?;
        let media_id = row.media_id.trim();
        if media_id.is_empty() {
            log::warn!(
                "Skipping row {} of {}: no media id ({} - {})",
                index + 1,
                path.display(),
                row.artists,
                row.title
            );
            continue;
        }
        tracks.push(Track::from_raw(media_id, row.artists, &row.title));
    }

    log::debug!("Read {} tracks from {}", tracks.len(), path.display());

    Ok(PlaylistExport::new(file_name, tracks))
}
