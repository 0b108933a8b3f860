//! View module - UI rendering
//!
//! - `utils`: time formatting and label truncation
//! - `panel`: now-playing details and the notification strip
//! - `progress`: progress bar with transport hints
//! - `overlays`: modal overlays (error, help)

mod overlays;
mod panel;
mod progress;
mod utils;

pub use utils::format_time;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::controller::NowPlayingView;
use crate::model::UiState;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, view: &NowPlayingView, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Track details
                Constraint::Length(3), // Notification strip
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        panel::render_now_playing(frame, chunks[0], view);
        panel::render_notification(frame, chunks[1], ui_state.notification.as_ref());
        progress::render_progress_bar(frame, chunks[2], view);

        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
