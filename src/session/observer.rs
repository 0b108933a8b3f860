use crate::model::{PlaybackState, Track};

/// Point-in-time view of a session, handed to observers and pollers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: PlaybackState,
    pub active: bool,
    pub cursor: Option<usize>,
    pub track: Option<Track>,
    pub position_ms: u32,
    pub duration_ms: u32,
    pub error: Option<String>,
}

/// Listener told about every state transition of a session.
pub trait SessionObserver: Send {
    fn on_transition(&mut self, snapshot: &SessionSnapshot);
}

impl<F> SessionObserver for F
where
    F: FnMut(&SessionSnapshot) + Send,
{
    fn on_transition(&mut self, snapshot: &SessionSnapshot) {
        self(snapshot)
    }
}
