//! Reading playlists exported by RiMusic.

pub mod export;
pub mod naming;

pub use export::{PlaylistExport, Track, read_export};
pub use naming::derive_playlist_name;
