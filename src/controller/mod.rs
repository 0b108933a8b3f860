//! Controller module - owns the playback session and serialises access to it
//!
//! The session lives inside a single tokio task. Transport commands arrive
//! from [`SessionHandle`]s, decoder callbacks from [`DecoderEvents`]; the task
//! applies them one at a time so the session never sees concurrent mutation.
//!
//! - `playback`: transport methods on the handle
//! - `player_events`: decoder callback dispatch
//! - `input`: key event handling for the terminal client
//! - `monitor`: now-playing poller

mod input;
mod monitor;
mod playback;
mod player_events;

pub use input::AppController;
pub use monitor::{Controls, NowPlayingMonitor, NowPlayingTracker, NowPlayingView};
pub use playback::{SessionHandle, WeakSessionHandle};
pub use player_events::{DecoderEvent, DecoderEventReceiver, DecoderEvents};

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::model::Playlist;
use crate::session::{PlaybackBackend, PlaybackSession, SessionError, SessionSnapshot};

const TRANSITION_CAPACITY: usize = 32;

#[derive(Clone, Debug)]
pub enum SessionCommand {
    Start { playlist: Playlist, index: usize },
    Next,
    Previous,
    Pause,
    Resume,
    TogglePausePlay,
    Seek(u32),
    /// Relative seek, clamped to the current track.
    SeekBy(i64),
    Stop,
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::TogglePausePlay => "toggle_pause_play",
            Self::Seek(_) => "seek",
            Self::SeekBy(_) => "seek_by",
            Self::Stop => "stop",
        }
    }
}

pub(crate) type Reply<T> = oneshot::Sender<T>;

pub(crate) enum Request {
    Command(SessionCommand, Reply<Result<SessionSnapshot, SessionError>>),
    Snapshot(Reply<SessionSnapshot>),
}

pub struct SessionController;

impl SessionController {
    /// Move `session` onto its own task. `events` is the receiving half of the
    /// channel whose sender the session's backend reports decoder callbacks on.
    pub fn spawn<B>(
        mut session: PlaybackSession<B>,
        events: DecoderEventReceiver,
    ) -> SessionHandle
    where
        B: PlaybackBackend + Send + 'static,
        B::Decoder: Send + 'static,
        B::Lock: Send + 'static,
    {
        let (requests, request_rx) = mpsc::unbounded_channel();
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);

        let publisher = transitions.clone();
        session.add_observer(move |snapshot: &SessionSnapshot| {
            // no subscribers is fine
            let _ = publisher.send(snapshot.clone());
        });

        tokio::spawn(run(session, request_rx, events));
        SessionHandle::new(requests, transitions)
    }
}

async fn run<B: PlaybackBackend>(
    mut session: PlaybackSession<B>,
    mut requests: mpsc::UnboundedReceiver<Request>,
    mut events: DecoderEventReceiver,
) {
    tracing::info!("Playback controller started");

    loop {
        tokio::select! {
            // decoder callbacks queued before a request are applied first
            biased;

            Some(event) = events.recv() => player_events::dispatch(&mut session, event),
            request = requests.recv() => match request {
                Some(request) => handle_request(&mut session, request),
                None => break,
            },
        }
    }

    tracing::info!("Playback controller shutting down");
    session.stop();
}

fn handle_request<B: PlaybackBackend>(session: &mut PlaybackSession<B>, request: Request) {
    match request {
        Request::Command(command, reply) => {
            let name = command.name();
            tracing::debug!(command = name, "Applying session command");
            let result = apply(session, command).map(|()| session.snapshot());
            if let Err(e) = &result {
                tracing::warn!(command = name, error = %e, "Session command rejected");
            }
            let _ = reply.send(result);
        }
        Request::Snapshot(reply) => {
            let _ = reply.send(session.snapshot());
        }
    }
}

fn apply<B: PlaybackBackend>(
    session: &mut PlaybackSession<B>,
    command: SessionCommand,
) -> Result<(), SessionError> {
    match command {
        SessionCommand::Start { playlist, index } => session.start(playlist, index),
        SessionCommand::Next => {
            session.next();
            Ok(())
        }
        SessionCommand::Previous => {
            session.previous();
            Ok(())
        }
        SessionCommand::Pause => session.pause(),
        SessionCommand::Resume => session.resume(),
        SessionCommand::TogglePausePlay => session.toggle_pause_play(),
        SessionCommand::Seek(position_ms) => {
            session.seek(position_ms);
            Ok(())
        }
        SessionCommand::SeekBy(offset_ms) => {
            let target = (i64::from(session.current_position_ms()) + offset_ms)
                .clamp(0, i64::from(session.duration_ms()));
            session.seek(target as u32);
            Ok(())
        }
        SessionCommand::Stop => {
            session.stop();
            Ok(())
        }
    }
}

/// Short message for the status line.
pub fn format_error(error: &SessionError) -> String {
    match error {
        SessionError::InvalidAudioSource { .. } => "This track has no playable preview.".to_string(),
        SessionError::PlaybackFailure { .. } => {
            "Playback failed. Try the next or previous track.".to_string()
        }
        SessionError::InvalidState { operation, .. } => {
            format!("Cannot {} right now.", operation.replace('_', " "))
        }
        SessionError::ControllerClosed => "Player is not running. Please restart the app.".to_string(),
        SessionError::EmptyPlaylist | SessionError::IndexOutOfRange { .. } => {
            format!("Error: {}", error)
        }
    }
}
