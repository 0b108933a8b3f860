//! Transport controls sent to the session task

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::model::Playlist;
use crate::session::{SessionError, SessionSnapshot};

use super::{Request, SessionCommand};

/// Cloneable handle to a running session. Dropping the last one stops playback.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<Request>,
    transitions: broadcast::Sender<SessionSnapshot>,
}

impl SessionHandle {
    pub(super) fn new(
        requests: mpsc::UnboundedSender<Request>,
        transitions: broadcast::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            requests,
            transitions,
        }
    }

    pub async fn send(&self, command: SessionCommand) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Command(command, reply))
            .map_err(|_| SessionError::ControllerClosed)?;
        response.await.map_err(|_| SessionError::ControllerClosed)?
    }

    pub async fn start(
        &self,
        playlist: Playlist,
        index: usize,
    ) -> Result<SessionSnapshot, SessionError> {
        tracing::debug!(tracks = playlist.len(), index, "Starting playlist");
        self.send(SessionCommand::Start { playlist, index }).await
    }

    pub async fn next(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Next).await
    }

    pub async fn previous(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Previous).await
    }

    pub async fn pause(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Resume).await
    }

    pub async fn toggle_pause_play(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::TogglePausePlay).await
    }

    pub async fn seek(&self, position_ms: u32) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Seek(position_ms)).await
    }

    /// Seek relative to the current position, clamped to the track.
    pub async fn seek_by(&self, offset_ms: i64) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::SeekBy(offset_ms)).await
    }

    pub async fn stop(&self) -> Result<SessionSnapshot, SessionError> {
        self.send(SessionCommand::Stop).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Request::Snapshot(reply))
            .map_err(|_| SessionError::ControllerClosed)?;
        response.await.map_err(|_| SessionError::ControllerClosed)
    }

    /// False when the session is idle, in error, or no longer running.
    pub async fn is_active(&self) -> bool {
        self.snapshot().await.is_ok_and(|snapshot| snapshot.active)
    }

    /// Snapshots published on every state transition.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.transitions.subscribe()
    }

    /// A handle that does not keep the session running.
    pub fn downgrade(&self) -> WeakSessionHandle {
        WeakSessionHandle {
            requests: self.requests.downgrade(),
            transitions: self.transitions.downgrade(),
        }
    }
}

#[derive(Clone)]
pub struct WeakSessionHandle {
    requests: mpsc::WeakUnboundedSender<Request>,
    transitions: broadcast::WeakSender<SessionSnapshot>,
}

impl WeakSessionHandle {
    /// `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<SessionHandle> {
        Some(SessionHandle {
            requests: self.requests.upgrade()?,
            transitions: self.transitions.upgrade()?,
        })
    }
}
