//! Ongoing "now playing" notification published on every state transition

use crate::model::{InternalState, Track};

pub const ERROR_TEXT: &str = "Unable to play this track";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Previous,
    PausePlay,
    Next,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionIcon {
    Previous,
    Pause,
    #[default]
    Play,
    Next,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationAction {
    pub kind: ActionKind,
    pub icon: ActionIcon,
    pub label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub text: String,
    pub actions: [NotificationAction; 3],
    /// Fetched by the surface and shown as the large icon.
    pub large_image_url: Option<String>,
    pub ongoing: bool,
}

impl NotificationPayload {
    pub fn build(app_name: &str, track: &Track, state: InternalState) -> Self {
        // the pause/play action shows what the next tap will do
        let (icon, label) = match state {
            InternalState::Initializing | InternalState::Preparing | InternalState::Playing => {
                (ActionIcon::Pause, "Pause")
            }
            _ => (ActionIcon::Play, "Play"),
        };

        let text = if state == InternalState::Error {
            ERROR_TEXT.to_string()
        } else {
            track.track_name.clone()
        };

        Self {
            title: app_name.to_string(),
            text,
            actions: [
                NotificationAction {
                    kind: ActionKind::Previous,
                    icon: ActionIcon::Previous,
                    label: "Previous",
                },
                NotificationAction {
                    kind: ActionKind::PausePlay,
                    icon,
                    label,
                },
                NotificationAction {
                    kind: ActionKind::Next,
                    icon: ActionIcon::Next,
                    label: "Next",
                },
            ],
            large_image_url: track.thumbnail_url().map(str::to_string),
            ongoing: true,
        }
    }

    pub fn pause_play(&self) -> &NotificationAction {
        &self.actions[1]
    }
}

/// Platform surface that shows the notification.
pub trait NotificationSink: Send {
    fn publish(&mut self, payload: &NotificationPayload);

    fn cancel(&mut self);
}
