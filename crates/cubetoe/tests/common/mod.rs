//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cubetoe::{
    DestinationId, DestinationResolver, Handle, Notifier, NotifyError, Resolution, ResolveError,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, DestinationId)>>,
    fail: bool,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, DestinationId)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str, destination: DestinationId) -> Result<(), NotifyError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), destination));
        if self.fail {
            return Err(NotifyError::new("network unreachable"));
        }
        Ok(())
    }
}

/// Replays queued answers, then keeps answering `NotYetFound`.
#[derive(Default)]
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<Result<Resolution, String>>>,
    calls: AtomicUsize,
}

impl ScriptedResolver {
    pub fn new(answers: impl IntoIterator<Item = Result<Resolution, String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DestinationResolver for ScriptedResolver {
    async fn resolve(&self, _handle: &Handle) -> Result<Resolution, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.lock().unwrap().pop_front() {
            Some(Ok(resolution)) => Ok(resolution),
            Some(Err(message)) => Err(ResolveError::new(message)),
            None => Ok(Resolution::NotYetFound),
        }
    }
}
