//! Recording doubles for the session collaborators

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    KeepAliveLock, MediaDecoder, NotificationPayload, NotificationSink, PlaybackBackend,
    SessionError,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    CreateDecoder,
    CreateLock,
    SetSource(String),
    Prepare,
    Start,
    Pause,
    Seek(u32),
    Reset,
    Release,
    Acquire,
    ReleaseLock,
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) calls: Vec<Call>,
    pub(crate) lock_held: bool,
    pub(crate) rejected_sources: HashSet<String>,
    pub(crate) position_ms: u32,
    pub(crate) duration_ms: u32,
    pub(crate) published: Vec<NotificationPayload>,
    pub(crate) cancelled: usize,
}

/// Shared view of everything the doubles were asked to do
#[derive(Clone, Default)]
pub(crate) struct Spy(Arc<Mutex<Recorder>>);

impl Spy {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.0.lock().unwrap()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub(crate) fn lock_held(&self) -> bool {
        self.lock().lock_held
    }

    pub(crate) fn reject_source(&self, url: &str) {
        self.lock().rejected_sources.insert(url.to_string());
    }

    pub(crate) fn set_timeline(&self, position_ms: u32, duration_ms: u32) {
        let mut recorder = self.lock();
        recorder.position_ms = position_ms;
        recorder.duration_ms = duration_ms;
    }

    pub(crate) fn published(&self) -> Vec<NotificationPayload> {
        self.lock().published.clone()
    }

    pub(crate) fn cancelled(&self) -> usize {
        self.lock().cancelled
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

pub(crate) struct MockBackend {
    pub(crate) spy: Spy,
}

impl MockBackend {
    pub(crate) fn new() -> (Self, Spy) {
        let spy = Spy::default();
        (
            Self {
                spy: spy.clone(),
            },
            spy,
        )
    }
}

impl PlaybackBackend for MockBackend {
    type Decoder = MockDecoder;
    type Lock = MockLock;

    fn create_decoder(&mut self) -> MockDecoder {
        self.spy.record(Call::CreateDecoder);
        MockDecoder {
            spy: self.spy.clone(),
        }
    }

    fn create_lock(&mut self) -> MockLock {
        self.spy.record(Call::CreateLock);
        MockLock {
            spy: self.spy.clone(),
        }
    }
}

pub(crate) struct MockDecoder {
    spy: Spy,
}

impl MediaDecoder for MockDecoder {
    fn set_source(&mut self, url: &str) -> Result<(), SessionError> {
        self.spy.record(Call::SetSource(url.to_string()));
        if self.spy.lock().rejected_sources.contains(url) {
            return Err(SessionError::invalid_source(url, "rejected by decoder"));
        }
        Ok(())
    }

    fn prepare_async(&mut self) {
        self.spy.record(Call::Prepare);
    }

    fn start(&mut self) {
        self.spy.record(Call::Start);
    }

    fn pause(&mut self) {
        self.spy.record(Call::Pause);
    }

    fn seek_to(&mut self, position_ms: u32) {
        self.spy.record(Call::Seek(position_ms));
    }

    fn reset(&mut self) {
        self.spy.record(Call::Reset);
    }

    fn release(&mut self) {
        self.spy.record(Call::Release);
    }

    fn current_position_ms(&self) -> u32 {
        self.spy.lock().position_ms
    }

    fn duration_ms(&self) -> u32 {
        self.spy.lock().duration_ms
    }
}

pub(crate) struct MockLock {
    spy: Spy,
}

impl KeepAliveLock for MockLock {
    fn acquire(&mut self) {
        let mut recorder = self.spy.lock();
        recorder.calls.push(Call::Acquire);
        recorder.lock_held = true;
    }

    fn release(&mut self) {
        let mut recorder = self.spy.lock();
        recorder.calls.push(Call::ReleaseLock);
        recorder.lock_held = false;
    }

    fn is_held(&self) -> bool {
        self.spy.lock_held()
    }
}

pub(crate) struct MockSink {
    pub(crate) spy: Spy,
}

impl NotificationSink for MockSink {
    fn publish(&mut self, payload: &NotificationPayload) {
        self.spy.lock().published.push(payload.clone());
    }

    fn cancel(&mut self) {
        self.spy.lock().cancelled += 1;
    }
}
