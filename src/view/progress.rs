//! Progress bar rendering

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
};

use crate::controller::{Controls, NowPlayingView};
use crate::model::PlaybackState;
use crate::session::ActionIcon;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, view: &NowPlayingView) {
    let status_text = match view.state {
        PlaybackState::Inactive => " Nothing playing".to_string(),
        PlaybackState::Playing => format!(" ▶ {} | {}", view.track_label, view.artist_name),
        PlaybackState::Paused => format!(" ⏸  {} | {}", view.track_label, view.artist_name),
        PlaybackState::Error => format!(" ✖ {}", view.track_label),
    };

    let time_str = format!("{} / {}", view.position_label, view.duration_label);
    let controls_info = format!(" {} ", controls_hint(view.controls, view.pause_play_icon));

    let gauge_color = if view.state == PlaybackState::Error {
        Color::Red
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text))
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(view.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}

fn controls_hint(controls: Controls, icon: ActionIcon) -> String {
    let pause_play = if icon == ActionIcon::Pause { "Pause" } else { "Play" };
    let mut parts = Vec::new();
    if controls.previous {
        parts.push("P: Previous".to_string());
    }
    if controls.pause_play {
        parts.push(format!("Space: {}", pause_play));
    }
    if controls.next {
        parts.push("N: Next".to_string());
    }
    if parts.is_empty() {
        "H: Help".to_string()
    } else {
        parts.join(" | ")
    }
}
