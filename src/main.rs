use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::{Mutex, watch};

use spotify_streamer::audio::PreviewBackend;
use spotify_streamer::config::Config;
use spotify_streamer::controller::{
    AppController, DecoderEvents, NowPlayingMonitor, NowPlayingView, SessionController,
};
use spotify_streamer::logging;
use spotify_streamer::model::{Playlist, UiState};
use spotify_streamer::session::{NotificationPayload, NotificationSink, PlaybackSession};
use spotify_streamer::view::AppView;

/// Stream 30-second previews from a playlist file
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON array of tracks
    playlist: PathBuf,

    /// Track to start from (0-based)
    #[arg(short, long, default_value_t = 0)]
    index: usize,
}

/// Publishes the notification into the terminal's notification strip.
struct StripSink(watch::Sender<Option<NotificationPayload>>);

impl NotificationSink for StripSink {
    fn publish(&mut self, payload: &NotificationPayload) {
        self.0.send_replace(Some(payload.clone()));
    }

    fn cancel(&mut self) {
        self.0.send_replace(None);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_env()?;

    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Spotify Streamer Starting ===");

    let raw = std::fs::read_to_string(&args.playlist)
        .with_context(|| format!("failed to read {}", args.playlist.display()))?;
    let playlist = Playlist::from_json(&raw)?;
    tracing::info!(tracks = playlist.len(), index = args.index, "Playlist loaded");

    let (events, event_rx) = DecoderEvents::channel();
    let mut session = PlaybackSession::new(PreviewBackend::new(events, &config));

    let (notification_tx, notification_rx) = watch::channel(None);
    if config.notifications_enabled {
        session = session.with_notifications(config.app_name.clone(), StripSink(notification_tx));
    }

    let handle = SessionController::spawn(session, event_rx);
    handle.start(playlist, args.index).await?;

    let (now_playing, monitor) = NowPlayingMonitor::new(&handle, &config).spawn();

    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let controller = AppController::new(handle.clone(), ui_state, config.seek_step_ms);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, controller, now_playing, notification_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    if let Err(e) = handle.stop().await {
        tracing::debug!(error = %e, "Stop on shutdown failed");
    }
    drop(handle);
    monitor.abort();

    tracing::info!("Spotify Streamer shutting down");
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: AppController,
    now_playing: watch::Receiver<NowPlayingView>,
    notifications: watch::Receiver<Option<NotificationPayload>>,
) -> Result<()> {
    loop {
        let view = now_playing.borrow().clone();
        let mut ui_state = controller.ui_state().await;
        ui_state.notification = notifications.borrow().clone();

        terminal.draw(|f| AppView::render(f, &view, &ui_state))?;

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            controller.handle_key_event(key).await?;
        }

        if controller.should_quit().await {
            break;
        }
    }

    Ok(())
}
