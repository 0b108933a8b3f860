//! Headless preview backend
//!
//! Models a fixed-length preview clip on the tokio clock: preparation takes a
//! configurable delay, playback runs until the clip length is reached. Both
//! milestones are reported through [`DecoderEvents`]. No audio is decoded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

use crate::config::Config;
use crate::controller::{DecoderEvent, DecoderEvents};
use crate::model::is_web_url;
use crate::session::{KeepAliveLock, MediaDecoder, PlaybackBackend, SessionError};

const LOCK_TAG: &str = "spotify-streamer:radio";

pub struct PreviewBackend {
    events: DecoderEvents,
    clip: Duration,
    prepare_delay: Duration,
}

impl PreviewBackend {
    pub fn new(events: DecoderEvents, config: &Config) -> Self {
        Self {
            events,
            clip: Duration::from_millis(u64::from(config.preview_duration_ms)),
            prepare_delay: config.prepare_delay(),
        }
    }
}

impl PlaybackBackend for PreviewBackend {
    type Decoder = PreviewDecoder;
    type Lock = RadioLock;

    fn create_decoder(&mut self) -> PreviewDecoder {
        tracing::debug!(clip_ms = self.clip.as_millis() as u64, "Creating preview decoder");
        PreviewDecoder {
            events: self.events.clone(),
            clip: self.clip,
            prepare_delay: self.prepare_delay,
            source: None,
            prepared: Arc::new(AtomicBool::new(false)),
            offset: Duration::ZERO,
            started_at: None,
            timer: None,
        }
    }

    fn create_lock(&mut self) -> RadioLock {
        RadioLock { held: false }
    }
}

pub struct PreviewDecoder {
    events: DecoderEvents,
    clip: Duration,
    prepare_delay: Duration,
    source: Option<String>,
    prepared: Arc<AtomicBool>,
    /// Position when the clock was last stopped or moved.
    offset: Duration,
    started_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl PreviewDecoder {
    fn position(&self) -> Duration {
        let running = self
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default();
        (self.offset + running).min(self.clip)
    }

    /// Abort the pending timer and invalidate anything it already emitted.
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.events.advance();
    }

    fn schedule_completion(&mut self) {
        self.cancel_timer();
        let remaining = self.clip.saturating_sub(self.offset);
        let events = self.events.clone();
        let generation = events.generation();
        self.timer = Some(tokio::spawn(async move {
            sleep(remaining).await;
            events.emit_from(generation, DecoderEvent::Completed);
        }));
    }
}

impl MediaDecoder for PreviewDecoder {
    fn set_source(&mut self, url: &str) -> Result<(), SessionError> {
        let scheme_ok = url.starts_with("http://") || url.starts_with("https://");
        if !scheme_ok || !is_web_url(url) {
            return Err(SessionError::invalid_source(url, "not an http(s) stream"));
        }
        tracing::debug!(url, "Preview source attached");
        self.source = Some(url.to_string());
        Ok(())
    }

    fn prepare_async(&mut self) {
        if self.source.is_none() {
            tracing::warn!("prepare_async without a source");
            self.events.emit(DecoderEvent::Error { what: 1, extra: -1010 });
            return;
        }

        self.cancel_timer();
        let events = self.events.clone();
        let generation = events.generation();
        let prepared = Arc::clone(&self.prepared);
        let delay = self.prepare_delay;
        self.timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            prepared.store(true, Ordering::SeqCst);
            events.emit_from(generation, DecoderEvent::Prepared);
        }));
    }

    fn start(&mut self) {
        if !self.prepared.load(Ordering::SeqCst) {
            tracing::warn!("start before the source was prepared");
            return;
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
            self.schedule_completion();
        }
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started_at = None;
        self.cancel_timer();
    }

    fn seek_to(&mut self, position_ms: u32) {
        self.offset = Duration::from_millis(u64::from(position_ms)).min(self.clip);
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
            self.schedule_completion();
        }
    }

    fn reset(&mut self) {
        self.cancel_timer();
        self.source = None;
        self.prepared = Arc::new(AtomicBool::new(false));
        self.offset = Duration::ZERO;
        self.started_at = None;
    }

    fn release(&mut self) {
        self.reset();
        tracing::debug!("Preview decoder released");
    }

    fn current_position_ms(&self) -> u32 {
        self.position().as_millis() as u32
    }

    fn duration_ms(&self) -> u32 {
        if self.prepared.load(Ordering::SeqCst) {
            self.clip.as_millis() as u32
        } else {
            0
        }
    }
}

impl Drop for PreviewDecoder {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Stand-in for a wifi/radio wake lock; only tracks and logs the grant.
pub struct RadioLock {
    held: bool,
}

impl KeepAliveLock for RadioLock {
    fn acquire(&mut self) {
        if !self.held {
            self.held = true;
            tracing::debug!(tag = LOCK_TAG, "Keep-alive lock acquired");
        }
    }

    fn release(&mut self) {
        if self.held {
            self.held = false;
            tracing::debug!(tag = LOCK_TAG, "Keep-alive lock released");
        }
    }

    fn is_held(&self) -> bool {
        self.held
    }
}
