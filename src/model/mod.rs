//! Model module - playback data types
//!
//! - `track`: track descriptors, playlists and URL validation
//! - `state`: internal lifecycle states and the external projection
//! - `ui`: terminal UI state (errors, help popup, notification strip)

mod state;
mod track;
mod ui;

pub use state::{InternalState, PlaybackState};
pub use track::{Playlist, Track, is_web_url};
pub use ui::UiState;

#[cfg(test)]
pub(crate) use track::tests::track as test_track;
