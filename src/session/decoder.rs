//! Collaborators the session drives: the media decoder and the keep-alive lock.
//!
//! Completion of asynchronous work is reported back to the session through
//! [`PlaybackSession::on_prepared`](super::PlaybackSession::on_prepared),
//! [`on_playback_completed`](super::PlaybackSession::on_playback_completed) and
//! [`on_playback_error`](super::PlaybackSession::on_playback_error).

use super::SessionError;

/// An opaque media-playback object.
///
/// `reset` returns the decoder to idle so it can take a new source; any
/// preparation in flight is abandoned.
pub trait MediaDecoder {
    fn set_source(&mut self, url: &str) -> Result<(), SessionError>;

    /// Begin preparing the current source. Completion is reported later.
    fn prepare_async(&mut self);

    fn start(&mut self);

    fn pause(&mut self);

    fn seek_to(&mut self, position_ms: u32);

    fn reset(&mut self);

    /// Free the decoder for good.
    fn release(&mut self);

    fn current_position_ms(&self) -> u32;

    fn duration_ms(&self) -> u32;
}

/// Exclusive grant that keeps the network radio awake while streaming.
pub trait KeepAliveLock {
    fn acquire(&mut self);

    fn release(&mut self);

    fn is_held(&self) -> bool;
}

/// Creates the decoder and lock the first time a session loads a track.
pub trait PlaybackBackend {
    type Decoder: MediaDecoder;
    type Lock: KeepAliveLock;

    fn create_decoder(&mut self) -> Self::Decoder;

    fn create_lock(&mut self) -> Self::Lock;
}
