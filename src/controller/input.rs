//! Key event handling

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::Mutex;

use crate::model::UiState;
use crate::session::{SessionError, SessionSnapshot};

use super::{SessionHandle, format_error};

/// Maps terminal input onto session commands and keeps the UI state.
#[derive(Clone)]
pub struct AppController {
    handle: SessionHandle,
    ui_state: Arc<Mutex<UiState>>,
    seek_step_ms: u32,
}

impl AppController {
    pub fn new(handle: SessionHandle, ui_state: Arc<Mutex<UiState>>, seek_step_ms: u32) -> Self {
        Self {
            handle,
            ui_state,
            seek_step_ms,
        }
    }

    pub async fn ui_state(&self) -> UiState {
        let mut ui = self.ui_state.lock().await;
        ui.auto_clear_old_errors();
        ui.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.ui_state.lock().await.should_quit
    }

    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        {
            let mut ui = self.ui_state.lock().await;

            // an error message blocks everything until dismissed
            if ui.has_error() {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    ui.clear_error();
                }
                return Ok(());
            }

            if ui.show_help_popup {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                    ui.show_help_popup = false;
                }
                return Ok(());
            }
        }

        let step = i64::from(self.seek_step_ms);
        let result = match key.code {
            KeyCode::Char(' ') => self.handle.toggle_pause_play().await,
            KeyCode::Char('n') | KeyCode::Char('N') => self.handle.next().await,
            KeyCode::Char('p') | KeyCode::Char('P') => self.handle.previous().await,
            KeyCode::Right => self.handle.seek_by(step).await,
            KeyCode::Left => self.handle.seek_by(-step).await,
            KeyCode::Char('s') | KeyCode::Char('S') => self.handle.stop().await,
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.ui_state.lock().await.show_help_popup = true;
                return Ok(());
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                tracing::info!("Quit requested");
                self.ui_state.lock().await.should_quit = true;
                return Ok(());
            }
            _ => return Ok(()),
        };

        self.report(result).await;
        Ok(())
    }

    async fn report(&self, result: Result<SessionSnapshot, SessionError>) {
        match result {
            Ok(snapshot) => {
                tracing::trace!(state = ?snapshot.state, cursor = ?snapshot.cursor, "Command applied");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Playback command failed");
                self.ui_state.lock().await.set_error(format_error(&e));
            }
        }
    }
}
