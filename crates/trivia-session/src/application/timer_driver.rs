//! Drives the question countdown in real time.
//!
//! One background task per presentation. The task waits for narration, starts
//! the countdown, then applies one tick per second until the answer is
//! revealed or the presentation goes stale. Launching a new presentation
//! aborts the previous task, so at most one countdown runs at a time.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};
use trivia_core::clock::Clock;
use trivia_core::event::DomainEvent;
use uuid::Uuid;

use super::narration::Narration;
use crate::domain::events::SessionEvent;
use crate::domain::session::{Presentation, QuizSession};
use crate::domain::timer::TickOutcome;

/// The session shared between request handlers and the timer task.
pub type SharedSession = Arc<Mutex<QuizSession>>;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Owns the background countdown task.
pub struct TimerDriver {
    clock: Arc<dyn Clock>,
    narration: Arc<dyn Narration>,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for TimerDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerDriver")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl TimerDriver {
    /// Creates a driver with no task running.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, narration: Arc<dyn Narration>) -> Self {
        Self {
            clock,
            narration,
            task: std::sync::Mutex::new(None),
        }
    }

    /// Spawns the countdown for `presentation`, aborting any previous one.
    pub fn launch(&self, session: SharedSession, presentation: Presentation) {
        let clock = Arc::clone(&self.clock);
        let narration = Arc::clone(&self.narration);
        let task = tokio::spawn(run_countdown(session, presentation, clock, narration));
        let previous = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Aborts the running countdown task, if any.
    pub fn cancel(&self) {
        let task = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    /// Whether a countdown task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_countdown(
    session: SharedSession,
    presentation: Presentation,
    clock: Arc<dyn Clock>,
    narration: Arc<dyn Narration>,
) {
    let generation = presentation.generation;
    narration.wait_until_finished(&presentation.question).await;

    {
        let mut guard = session.lock().await;
        if let Err(err) = guard.start_timer(generation, Uuid::new_v4(), clock.as_ref()) {
            debug!(generation, error = %err, "countdown not started");
            return;
        }
        log_events(&guard.drain_events());
    }

    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut guard = session.lock().await;
        let outcome = guard.tick(generation, clock.as_ref());
        log_events(&guard.drain_events());
        match outcome {
            TickOutcome::Counting(_) | TickOutcome::Expired | TickOutcome::Grace => {}
            TickOutcome::Revealed | TickOutcome::Ignored | TickOutcome::Stale => {
                debug!(generation, ?outcome, "countdown finished");
                break;
            }
        }
    }
}

/// Logs drained session events.
pub(crate) fn log_events(events: &[SessionEvent]) {
    for event in events {
        info!(
            event_type = event.event_type(),
            sequence_number = event.metadata().sequence_number,
            "session event"
        );
    }
}
