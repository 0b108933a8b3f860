//! Now-playing poller
//!
//! Polls the session on a fixed period: fast while playing, slow otherwise.
//! A transition broadcast wakes it early so state changes show up at once.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::model::{PlaybackState, Track};
use crate::session::{ActionIcon, ERROR_TEXT, SessionError, SessionSnapshot};
use crate::view::format_time;

use super::{SessionHandle, WeakSessionHandle};

/// Which transport buttons accept input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub previous: bool,
    pub pause_play: bool,
    pub next: bool,
}

/// Everything the now-playing panel shows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NowPlayingView {
    pub state: PlaybackState,
    pub cursor: Option<usize>,
    pub artist_name: String,
    pub track_label: String,
    pub album_name: String,
    pub image_url: Option<String>,
    pub share_text: Option<String>,
    pub controls: Controls,
    pub pause_play_icon: ActionIcon,
    pub position_ms: u32,
    pub duration_ms: u32,
    pub position_label: String,
    pub duration_label: String,
}

impl NowPlayingView {
    pub fn progress_ratio(&self) -> f64 {
        if self.duration_ms > 0 {
            (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Folds successive snapshots into a [`NowPlayingView`].
pub struct NowPlayingTracker {
    slow: Duration,
    fast: Duration,
    delay: Duration,
    share_hashtag: String,
    seen_state: Option<PlaybackState>,
    seen_track: Option<(Option<usize>, Option<Track>)>,
    view: NowPlayingView,
}

impl NowPlayingTracker {
    pub fn new(slow: Duration, fast: Duration, share_hashtag: impl Into<String>) -> Self {
        Self {
            slow,
            fast,
            delay: slow,
            share_hashtag: share_hashtag.into(),
            seen_state: None,
            seen_track: None,
            view: NowPlayingView {
                position_label: format_time(0),
                duration_label: format_time(0),
                ..NowPlayingView::default()
            },
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn view(&self) -> &NowPlayingView {
        &self.view
    }

    /// Returns whether the view changed.
    pub fn apply(&mut self, snapshot: &SessionSnapshot) -> bool {
        let before = self.view.clone();

        let track_key = (snapshot.cursor, snapshot.track.clone());
        if self.seen_track.as_ref() != Some(&track_key) {
            self.show_track(snapshot);
            self.seen_track = Some(track_key);
        }

        if self.seen_state != Some(snapshot.state) {
            self.show_state(snapshot.state);
            self.seen_state = Some(snapshot.state);
        }
        self.refresh_label(snapshot.track.as_ref());

        if snapshot.state == PlaybackState::Playing {
            self.show_progress(snapshot.position_ms, snapshot.duration_ms);
        }

        self.view != before
    }

    fn show_track(&mut self, snapshot: &SessionSnapshot) {
        let view = &mut self.view;
        view.cursor = snapshot.cursor;
        match &snapshot.track {
            Some(track) => {
                view.artist_name = track.artist_name.clone();
                view.album_name = track.album_name.clone();
                view.image_url = crate::model::is_web_url(&track.play_image_url)
                    .then(|| track.play_image_url.clone());
                view.share_text = track.share_text(&self.share_hashtag);
            }
            None => {
                view.artist_name.clear();
                view.album_name.clear();
                view.image_url = None;
                view.share_text = None;
            }
        }
        self.show_progress(0, 0);
    }

    fn show_state(&mut self, state: PlaybackState) {
        self.delay = self.slow;
        self.view.state = state;

        let (controls, icon) = match state {
            PlaybackState::Playing => {
                self.delay = self.fast;
                (Controls { previous: true, pause_play: true, next: true }, ActionIcon::Pause)
            }
            PlaybackState::Paused => {
                (Controls { previous: true, pause_play: true, next: true }, ActionIcon::Play)
            }
            PlaybackState::Error => {
                (Controls { previous: true, pause_play: false, next: true }, ActionIcon::Play)
            }
            PlaybackState::Inactive => (Controls::default(), ActionIcon::Play),
        };
        self.view.controls = controls;
        self.view.pause_play_icon = icon;
    }

    fn refresh_label(&mut self, track: Option<&Track>) {
        self.view.track_label = match (self.view.state, track) {
            (PlaybackState::Error, _) => ERROR_TEXT.to_string(),
            (_, Some(track)) => track.track_name.clone(),
            (_, None) => String::new(),
        };
    }

    fn show_progress(&mut self, position_ms: u32, duration_ms: u32) {
        self.view.position_ms = position_ms;
        self.view.duration_ms = duration_ms;
        self.view.position_label = format_time(position_ms);
        self.view.duration_label = format_time(duration_ms);
    }
}

pub struct NowPlayingMonitor {
    handle: WeakSessionHandle,
    transitions: broadcast::Receiver<SessionSnapshot>,
    tracker: NowPlayingTracker,
}

impl NowPlayingMonitor {
    /// The monitor does not keep the session alive; it stops with it.
    pub fn new(handle: &SessionHandle, config: &Config) -> Self {
        Self {
            handle: handle.downgrade(),
            transitions: handle.subscribe(),
            tracker: NowPlayingTracker::new(
                config.poll_slow(),
                config.poll_fast(),
                config.share_hashtag.clone(),
            ),
        }
    }

    /// One poll of the session. Returns whether the view changed.
    pub async fn poll(&mut self) -> Result<bool, SessionError> {
        let handle = self.handle.upgrade().ok_or(SessionError::ControllerClosed)?;
        let snapshot = handle.snapshot().await?;
        Ok(self.tracker.apply(&snapshot))
    }

    pub fn tracker(&self) -> &NowPlayingTracker {
        &self.tracker
    }

    /// Poll until the session or every view receiver goes away.
    pub fn spawn(mut self) -> (watch::Receiver<NowPlayingView>, JoinHandle<()>) {
        let (views, receiver) = watch::channel(self.tracker.view().clone());

        let task = tokio::spawn(async move {
            tracing::debug!("Now-playing monitor started");
            loop {
                match self.poll().await {
                    Ok(true) => {
                        if views.send(self.tracker.view().clone()).is_err() {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(_) => break,
                }

                let delay = self.tracker.delay();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = views.closed() => break,
                    received = self.transitions.recv() => {
                        if let Err(broadcast::error::RecvError::Closed) = received {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Now-playing monitor stopped");
        });

        (receiver, task)
    }
}
