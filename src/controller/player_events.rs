//! Decoder callbacks delivered back to the session task
//!
//! Every event is stamped with the decoder generation current when the work
//! behind it was scheduled. The decoder advances the generation whenever it
//! abandons that work (reset, pause, seek), and the receiving side drops any
//! event whose stamp is no longer current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

use crate::session::{PlaybackBackend, PlaybackSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderEvent {
    Prepared,
    Completed,
    Error { what: i32, extra: i32 },
}

type Stamped = (u64, DecoderEvent);

/// Sending half handed to the decoder backend.
#[derive(Clone, Debug)]
pub struct DecoderEvents {
    tx: mpsc::UnboundedSender<Stamped>,
    generation: Arc<AtomicU64>,
}

impl DecoderEvents {
    pub fn channel() -> (Self, DecoderEventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        (
            Self {
                tx,
                generation: Arc::clone(&generation),
            },
            DecoderEventReceiver { rx, generation },
        )
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidate every event stamped so far. Returns the new generation.
    pub fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Emit for the current generation.
    pub fn emit(&self, event: DecoderEvent) {
        self.emit_from(self.generation(), event);
    }

    pub fn emit_from(&self, generation: u64, event: DecoderEvent) {
        if self.tx.send((generation, event)).is_err() {
            tracing::debug!(?event, "Playback controller gone, dropping decoder event");
        }
    }
}

/// Receiving half owned by the session task.
#[derive(Debug)]
pub struct DecoderEventReceiver {
    rx: mpsc::UnboundedReceiver<Stamped>,
    generation: Arc<AtomicU64>,
}

impl DecoderEventReceiver {
    /// Next event still belonging to the current generation. Cancel safe.
    pub async fn recv(&mut self) -> Option<DecoderEvent> {
        loop {
            let (stamp, event) = self.rx.recv().await?;
            let current = self.generation.load(Ordering::SeqCst);
            if stamp == current {
                return Some(event);
            }
            tracing::debug!(?event, stamp, current, "Dropping superseded decoder event");
        }
    }

    /// Non-blocking [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<DecoderEvent> {
        while let Ok((stamp, event)) = self.rx.try_recv() {
            if stamp == self.generation.load(Ordering::SeqCst) {
                return Some(event);
            }
        }
        None
    }
}

pub(super) fn dispatch<B: PlaybackBackend>(session: &mut PlaybackSession<B>, event: DecoderEvent) {
    match event {
        DecoderEvent::Prepared => {
            tracing::debug!("DecoderEvent::Prepared");
            session.on_prepared();
        }
        DecoderEvent::Completed => {
            tracing::debug!("DecoderEvent::Completed");
            session.on_playback_completed();
        }
        DecoderEvent::Error { what, extra } => {
            let handled = session.on_playback_error(what, extra);
            tracing::debug!(what, extra, handled, "DecoderEvent::Error");
        }
    }
}
