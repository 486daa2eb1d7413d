//! Narration hook: the countdown starts only once the question has been
//! read out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use trivia_core::model::Question;

/// Something that reads a question aloud (text-to-speech, a human host).
#[async_trait]
pub trait Narration: Send + Sync {
    /// Resolves once `question` has been fully narrated.
    async fn wait_until_finished(&self, question: &Question);
}

/// No narration; the countdown starts immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNarration;

#[async_trait]
impl Narration for NoNarration {
    async fn wait_until_finished(&self, _question: &Question) {}
}

/// Narration finished by an external signal, e.g. the moderator UI
/// reporting that speech synthesis ended.
#[derive(Debug, Clone, Default)]
pub struct SignalNarration {
    finished: Arc<Notify>,
}

impl SignalNarration {
    /// Creates a narration waiting for [`finish`](Self::finish).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals that the current question was read out. A signal sent before
    /// anyone waits is kept for the next wait.
    pub fn finish(&self) {
        self.finished.notify_one();
    }
}

#[async_trait]
impl Narration for SignalNarration {
    async fn wait_until_finished(&self, _question: &Question) {
        self.finished.notified().await;
    }
}
