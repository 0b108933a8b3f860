use thiserror::Error;

use crate::model::InternalState;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("playlist is empty")]
    EmptyPlaylist,

    #[error("track index {index} is out of range for a playlist of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid audio source {url:?}: {reason}")]
    InvalidAudioSource { url: String, reason: String },

    #[error("playback failed (what={what}, extra={extra})")]
    PlaybackFailure { what: i32, extra: i32 },

    #[error("{operation} is not allowed while {state}")]
    InvalidState {
        operation: &'static str,
        state: InternalState,
    },

    #[error("playback controller is not running")]
    ControllerClosed,
}

impl SessionError {
    pub(crate) fn invalid_source(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAudioSource {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
