//! Playback session - playlist cursor, decoder lifecycle and transport controls
//!
//! The session is a plain state machine. It is not safe to mutate from several
//! places at once; the [`controller`](crate::controller) serialises every
//! command and decoder callback onto a single task.
//!
//! - `decoder`: traits for the decoder, keep-alive lock and the backend creating them
//! - `notification`: payload rebuilt on each transition for the notification surface
//! - `observer`: transition listeners and the snapshot they receive
//! - `error`: error taxonomy

mod decoder;
mod error;
mod notification;
mod observer;

#[cfg(test)]
pub(crate) mod testing;

pub use decoder::{KeepAliveLock, MediaDecoder, PlaybackBackend};
pub use error::SessionError;
pub use notification::{
    ActionIcon, ActionKind, ERROR_TEXT, NotificationAction, NotificationPayload, NotificationSink,
};
pub use observer::{SessionObserver, SessionSnapshot};

use crate::model::{InternalState, PlaybackState, Playlist, Track};

pub struct PlaybackSession<B: PlaybackBackend> {
    backend: B,
    decoder: Option<B::Decoder>,
    keep_alive: Option<B::Lock>,
    playlist: Option<Playlist>,
    cursor: Option<usize>,
    state: InternalState,
    last_error: Option<SessionError>,
    app_name: String,
    notification: Option<Box<dyn NotificationSink>>,
    notification_active: bool,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl<B: PlaybackBackend> PlaybackSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            decoder: None,
            keep_alive: None,
            playlist: None,
            cursor: None,
            state: InternalState::Initializing,
            last_error: None,
            app_name: String::new(),
            notification: None,
            notification_active: false,
            observers: Vec::new(),
        }
    }

    /// Attach a notification surface. It is activated by the first `start`.
    pub fn with_notifications(
        mut self,
        app_name: impl Into<String>,
        sink: impl NotificationSink + 'static,
    ) -> Self {
        self.app_name = app_name.into();
        self.notification = Some(Box::new(sink));
        self
    }

    pub fn add_observer(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Replace the playlist and begin loading the track at `index`.
    pub fn start(&mut self, playlist: Playlist, index: usize) -> Result<(), SessionError> {
        if index >= playlist.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                len: playlist.len(),
            });
        }

        tracing::info!(tracks = playlist.len(), index, "Starting playback session");
        self.playlist = Some(playlist);
        self.cursor = Some(index);
        self.load_current();

        if self.notification.is_some() && !self.notification_active {
            tracing::debug!("Activating playback notification");
            self.notification_active = true;
            self.publish_notification();
        }
        Ok(())
    }

    pub fn next(&mut self) {
        let (Some(playlist), Some(cursor)) = (self.playlist.as_ref(), self.cursor) else {
            tracing::debug!("next: no playlist loaded");
            return;
        };
        self.cursor = Some(playlist.next_index(cursor));
        self.load_current();
    }

    pub fn previous(&mut self) {
        let (Some(playlist), Some(cursor)) = (self.playlist.as_ref(), self.cursor) else {
            tracing::debug!("previous: no playlist loaded");
            return;
        };
        self.cursor = Some(playlist.previous_index(cursor));
        self.load_current();
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != InternalState::Playing {
            tracing::warn!(state = %self.state, "pause: invalid state");
            return Err(SessionError::InvalidState {
                operation: "pause",
                state: self.state,
            });
        }

        if let Some(decoder) = self.decoder.as_mut() {
            decoder.pause();
        }
        self.release_keep_alive();
        self.change_state(InternalState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != InternalState::Paused {
            tracing::warn!(state = %self.state, "resume: invalid state");
            return Err(SessionError::InvalidState {
                operation: "resume",
                state: self.state,
            });
        }

        self.acquire_keep_alive();
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.start();
        }
        self.change_state(InternalState::Playing);
        Ok(())
    }

    pub fn toggle_pause_play(&mut self) -> Result<(), SessionError> {
        match self.state {
            InternalState::Playing => self.pause(),
            InternalState::Paused => self.resume(),
            _ => Ok(()),
        }
    }

    pub fn seek(&mut self, position_ms: u32) {
        if !self.state.has_timeline() {
            tracing::debug!(state = %self.state, position_ms, "Ignoring seek");
            return;
        }
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.seek_to(position_ms);
        }
    }

    /// Halt playback and take down the notification. The playlist is kept, so a
    /// later `next`/`previous` reloads from where the session stopped.
    pub fn stop(&mut self) {
        tracing::info!(state = %self.state, "Stopping playback session");
        self.cancel_notification();
        self.release_keep_alive();
        self.reset_decoder();
        self.change_state(InternalState::Stopped);
    }

    // ========================================================================
    // Decoder callbacks
    // ========================================================================

    pub fn on_prepared(&mut self) {
        if self.state != InternalState::Preparing {
            tracing::debug!(state = %self.state, "Ignoring stale prepared callback");
            return;
        }

        if let Some(decoder) = self.decoder.as_mut() {
            decoder.start();
        }
        self.change_state(InternalState::Playing);
    }

    pub fn on_playback_completed(&mut self) {
        if self.state != InternalState::Playing {
            tracing::debug!(state = %self.state, "Ignoring stale completion callback");
            return;
        }
        let (Some(playlist), Some(cursor)) = (self.playlist.as_ref(), self.cursor) else {
            return;
        };

        // keep cycling through the playlist until the user stops
        self.cursor = Some(playlist.next_index(cursor));
        self.load_current();
    }

    /// Always reports the error as handled.
    pub fn on_playback_error(&mut self, what: i32, extra: i32) -> bool {
        if matches!(self.state, InternalState::Initializing | InternalState::Stopped) {
            tracing::debug!(state = %self.state, what, extra, "Ignoring decoder error");
            return true;
        }

        tracing::warn!(state = %self.state, what, extra, "Decoder reported an error");
        self.release_keep_alive();
        self.reset_decoder();
        self.last_error = Some(SessionError::PlaybackFailure { what, extra });
        self.change_state(InternalState::Error);
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn state(&self) -> InternalState {
        self.state
    }

    pub fn external_state(&self) -> PlaybackState {
        self.state.external()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist
            .as_ref()
            .zip(self.cursor)
            .and_then(|(playlist, cursor)| playlist.get(cursor))
    }

    pub fn current_position_ms(&self) -> u32 {
        match self.decoder.as_ref() {
            Some(decoder) if self.state.has_timeline() => decoder.current_position_ms(),
            _ => 0,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        match self.decoder.as_ref() {
            Some(decoder) if self.state.has_timeline() => decoder.duration_ms(),
            _ => 0,
        }
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn keep_alive_held(&self) -> bool {
        self.keep_alive.as_ref().is_some_and(|lock| lock.is_held())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.external_state(),
            active: self.is_active(),
            cursor: self.cursor,
            track: self.current_track().cloned(),
            position_ms: self.current_position_ms(),
            duration_ms: self.duration_ms(),
            error: self.last_error.as_ref().map(ToString::to_string),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Tear down whatever the decoder is doing and start loading the track at the cursor.
    fn load_current(&mut self) {
        let Some(track) = self.current_track().cloned() else {
            return;
        };

        match self.state {
            InternalState::Initializing => {}
            InternalState::Preparing | InternalState::Playing => {
                self.release_keep_alive();
                self.reset_decoder();
            }
            _ => self.reset_decoder(),
        }
        if self.decoder.is_none() {
            self.decoder = Some(self.backend.create_decoder());
        }
        if self.keep_alive.is_none() {
            self.keep_alive = Some(self.backend.create_lock());
        }

        let source = match track.playable_url() {
            Some(url) => self.attach_source(url),
            None => Err(SessionError::invalid_source(
                track.audio_url.clone().unwrap_or_default(),
                "not a well-formed web URL",
            )),
        };

        match source {
            Ok(()) => {
                self.acquire_keep_alive();
                if let Some(decoder) = self.decoder.as_mut() {
                    decoder.prepare_async();
                }
                tracing::info!(
                    track = %track.track_name,
                    artist = %track.artist_name,
                    cursor = ?self.cursor,
                    "Preparing track"
                );
                self.change_state(InternalState::Preparing);
            }
            Err(error) => {
                tracing::error!(track = %track.track_name, error = %error, "Cannot play track");
                self.last_error = Some(error);
                self.change_state(InternalState::Error);
            }
        }
    }

    fn attach_source(&mut self, url: &str) -> Result<(), SessionError> {
        match self.decoder.as_mut() {
            Some(decoder) => decoder.set_source(url),
            None => Err(SessionError::invalid_source(url, "no decoder available")),
        }
    }

    fn change_state(&mut self, state: InternalState) {
        tracing::debug!(from = %self.state, to = %state, "Changing state");
        self.state = state;
        if state != InternalState::Error {
            self.last_error = None;
        }

        self.publish_notification();

        if !self.observers.is_empty() {
            let snapshot = self.snapshot();
            for observer in &mut self.observers {
                observer.on_transition(&snapshot);
            }
        }
    }

    fn publish_notification(&mut self) {
        if !self.notification_active {
            return;
        }
        let Some(track) = self.current_track() else {
            return;
        };
        let payload = NotificationPayload::build(&self.app_name, track, self.state);
        if let Some(sink) = self.notification.as_mut() {
            sink.publish(&payload);
        }
    }

    fn cancel_notification(&mut self) {
        if !self.notification_active {
            return;
        }
        self.notification_active = false;
        if let Some(sink) = self.notification.as_mut() {
            sink.cancel();
        }
    }

    fn acquire_keep_alive(&mut self) {
        if let Some(lock) = self.keep_alive.as_mut() {
            if !lock.is_held() {
                lock.acquire();
            }
        }
    }

    fn release_keep_alive(&mut self) {
        if let Some(lock) = self.keep_alive.as_mut() {
            if lock.is_held() {
                lock.release();
            }
        }
    }

    fn reset_decoder(&mut self) {
        if let Some(decoder) = self.decoder.as_mut() {
            decoder.reset();
        }
    }
}

impl<B: PlaybackBackend> Drop for PlaybackSession<B> {
    fn drop(&mut self) {
        self.cancel_notification();
        self.release_keep_alive();
        if let Some(mut decoder) = self.decoder.take() {
            decoder.release();
        }
    }
}

#[cfg(test)]
mod tests;
