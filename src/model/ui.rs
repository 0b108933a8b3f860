//! Terminal UI state that lives outside the playback session

use std::time::{Duration, Instant};

use crate::session::NotificationPayload;

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
    pub should_quit: bool,
    /// Latest payload published to the notification strip.
    pub notification: Option<NotificationPayload>,
}

impl UiState {
    pub fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timestamp = Some(Instant::now());
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
        self.error_timestamp = None;
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn auto_clear_old_errors(&mut self) {
        if self
            .error_timestamp
            .is_some_and(|shown| shown.elapsed() >= ERROR_DISPLAY_TIME)
        {
            self.clear_error();
        }
    }
}
