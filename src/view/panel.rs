//! Now-playing panel and notification strip

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::controller::NowPlayingView;
use crate::model::PlaybackState;
use crate::session::NotificationPayload;

use super::utils::truncate_string;

pub fn render_now_playing(frame: &mut Frame, area: Rect, view: &NowPlayingView) {
    let width = area.width.saturating_sub(14) as usize;
    let label_style = Style::default().fg(Color::DarkGray);

    let title_style = if view.state == PlaybackState::Error {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let field = |label: &'static str, value: &str, style: Style| {
        Line::from(vec![
            Span::styled(format!("{:>10}  ", label), label_style),
            Span::styled(truncate_string(value, width), style),
        ])
    };

    let mut lines = vec![
        field("Track", view.track_label.as_str(), title_style),
        field("Artist", view.artist_name.as_str(), Style::default().fg(Color::White)),
        field("Album", view.album_name.as_str(), Style::default().fg(Color::White)),
        Line::from(""),
    ];
    if let Some(url) = &view.image_url {
        lines.push(field("Artwork", url.as_str(), Style::default().fg(Color::Cyan)));
    }
    if let Some(text) = &view.share_text {
        lines.push(field("Share", text.as_str(), Style::default().fg(Color::Gray)));
    }

    let title = match view.cursor {
        Some(index) => format!(" Now Playing (#{}) ", index + 1),
        None => " Now Playing ".to_string(),
    };

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(panel, area);
}

pub fn render_notification(frame: &mut Frame, area: Rect, payload: Option<&NotificationPayload>) {
    let line = match payload {
        Some(payload) => {
            let actions = payload
                .actions
                .iter()
                .map(|action| format!("[{}]", action.label))
                .collect::<Vec<_>>()
                .join(" ");
            Line::from(vec![
                Span::styled(
                    format!(" {}: ", payload.title),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
                Span::raw(payload.text.clone()),
                Span::styled(format!("  {}", actions), Style::default().fg(Color::DarkGray)),
            ])
        }
        None => Line::from(Span::styled(" No notification", Style::default().fg(Color::DarkGray))),
    };

    let strip = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Notification "),
    );

    frame.render_widget(strip, area);
}
