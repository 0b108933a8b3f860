//! Session lifecycle states and their projection for observers

use std::fmt;

/// Lifecycle of the decoder the session drives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InternalState {
    Initializing,
    Preparing,
    Playing,
    Paused,
    Stopped,
    Error,
}

impl InternalState {
    /// Coarse state shown to observers. Buffering reads the same as playing.
    pub fn external(self) -> PlaybackState {
        match self {
            Self::Initializing | Self::Preparing | Self::Playing => PlaybackState::Playing,
            Self::Paused => PlaybackState::Paused,
            Self::Error => PlaybackState::Error,
            Self::Stopped => PlaybackState::Inactive,
        }
    }

    /// Whether a "now playing" affordance should be offered.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Preparing | Self::Playing | Self::Paused)
    }

    /// The keep-alive lock is held in exactly these states.
    #[cfg(test)]
    pub(crate) fn holds_keep_alive(self) -> bool {
        matches!(self, Self::Preparing | Self::Playing)
    }

    /// Position and duration are only meaningful once the decoder is prepared.
    pub fn has_timeline(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for InternalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Preparing => "preparing",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Playback state presented to the outside world
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Inactive,
    Playing,
    Paused,
    Error,
}
