//! Countdown/reveal state machine for a single question.
//!
//! The timer is purely tick-driven: something outside (the
//! [`TimerDriver`](crate::application::timer_driver::TimerDriver) in
//! production, the test itself in unit tests) calls [`QuestionTimer::tick`]
//! once per elapsed second.
//!
//! ```text
//! Idle --start--> Running --0s--> Expired --grace--> Revealed
//!                    |                                  ^
//!                    +--------------stop----------------+
//! Idle | Running | Expired --cancel--> Cancelled
//! ```

use serde::Serialize;
use trivia_core::error::DomainError;

/// Ticks spent in `Expired` before the answer is revealed automatically.
pub const REVEAL_GRACE_TICKS: u32 = 2;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    /// Not started yet.
    Idle,
    /// Counting down.
    Running,
    /// Countdown hit zero; waiting out the grace interval.
    Expired,
    /// Answer shown; judging is possible. Terminal.
    Revealed,
    /// Torn down without revealing. Terminal.
    Cancelled,
}

impl TimerState {
    /// Whether no further transition can happen.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Revealed | Self::Cancelled)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this many seconds left.
    Counting(u32),
    /// The countdown just reached zero.
    Expired,
    /// A grace tick passed without revealing yet.
    Grace,
    /// The grace interval ended and the answer is now revealed.
    Revealed,
    /// The tick had no effect (timer idle or in a terminal state).
    Ignored,
    /// The tick belonged to a presentation that is no longer active.
    Stale,
}

/// Countdown for the question currently presented.
#[derive(Debug, Clone)]
pub struct QuestionTimer {
    state: TimerState,
    duration: u32,
    remaining: u32,
    grace_remaining: u32,
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionTimer {
    /// Creates an idle timer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            duration: 0,
            remaining: 0,
            grace_remaining: 0,
        }
    }

    /// Starts counting down from `duration_seconds`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a zero duration and
    /// `DomainError::InvalidTransition` unless the timer is `Idle`.
    pub fn start(&mut self, duration_seconds: u32) -> Result<(), DomainError> {
        if duration_seconds == 0 {
            return Err(DomainError::Validation(
                "timer duration must be at least one second".to_owned(),
            ));
        }
        if self.state != TimerState::Idle {
            return Err(DomainError::InvalidTransition(format!(
                "cannot start a timer that is {:?}",
                self.state
            )));
        }
        self.state = TimerState::Running;
        self.duration = duration_seconds;
        self.remaining = duration_seconds;
        Ok(())
    }

    /// Advances the timer by one elapsed second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.state {
            TimerState::Running => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.state = TimerState::Expired;
                    self.grace_remaining = REVEAL_GRACE_TICKS;
                    TickOutcome::Expired
                } else {
                    TickOutcome::Counting(self.remaining)
                }
            }
            TimerState::Expired => {
                self.grace_remaining = self.grace_remaining.saturating_sub(1);
                if self.grace_remaining == 0 {
                    self.state = TimerState::Revealed;
                    TickOutcome::Revealed
                } else {
                    TickOutcome::Grace
                }
            }
            TimerState::Idle | TimerState::Revealed | TimerState::Cancelled => {
                TickOutcome::Ignored
            }
        }
    }

    /// Moderator stop: reveals immediately, skipping `Expired`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the timer is `Running`.
    pub fn stop(&mut self) -> Result<(), DomainError> {
        if self.state != TimerState::Running {
            return Err(DomainError::InvalidTransition(format!(
                "cannot stop a timer that is {:?}",
                self.state
            )));
        }
        self.state = TimerState::Revealed;
        Ok(())
    }

    /// Tears the timer down with no further transitions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the timer is already in a
    /// terminal state.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "cannot cancel a timer that is {:?}",
                self.state
            )));
        }
        self.state = TimerState::Cancelled;
        Ok(())
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The duration the timer was started with (0 while idle).
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(duration: u32) -> QuestionTimer {
        let mut timer = QuestionTimer::new();
        timer.start(duration).unwrap();
        timer
    }

    #[test]
    fn test_start_moves_idle_to_running_with_full_duration() {
        let timer = running(30);

        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 30);
        assert_eq!(timer.duration(), 30);
    }

    #[test]
    fn test_thirty_ticks_expire_a_thirty_second_timer() {
        let mut timer = running(30);

        for expected in (1..30).rev() {
            assert_eq!(timer.tick(), TickOutcome::Counting(expected));
        }
        assert_eq!(timer.tick(), TickOutcome::Expired);

        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.state(), TimerState::Expired);

        // A 31st tick never takes remaining below zero.
        timer.tick();
        assert_eq!(timer.remaining(), 0);
    }

    #[test]
    fn test_grace_interval_then_automatic_reveal() {
        let mut timer = running(1);
        assert_eq!(timer.tick(), TickOutcome::Expired);

        for _ in 1..REVEAL_GRACE_TICKS {
            assert_eq!(timer.tick(), TickOutcome::Grace);
            assert_eq!(timer.state(), TimerState::Expired);
        }
        assert_eq!(timer.tick(), TickOutcome::Revealed);
        assert_eq!(timer.state(), TimerState::Revealed);

        assert_eq!(timer.tick(), TickOutcome::Ignored);
        assert_eq!(timer.state(), TimerState::Revealed);
    }

    #[test]
    fn test_stop_while_running_reveals_and_skips_expired() {
        let mut timer = running(30);
        timer.tick();

        timer.stop().unwrap();

        assert_eq!(timer.state(), TimerState::Revealed);
        assert_eq!(timer.remaining(), 29);
        assert_eq!(timer.tick(), TickOutcome::Ignored);
    }

    #[test]
    fn test_stop_outside_running_is_rejected() {
        let mut idle = QuestionTimer::new();
        assert!(matches!(
            idle.stop(),
            Err(DomainError::InvalidTransition(_))
        ));

        let mut expired = running(1);
        expired.tick();
        assert!(matches!(
            expired.stop(),
            Err(DomainError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let mut timer = running(10);

        let result = timer.start(10);

        assert!(matches!(result, Err(DomainError::InvalidTransition(_))));
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn test_start_with_zero_duration_is_rejected() {
        let mut timer = QuestionTimer::new();

        let result = timer.start(0);

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_cancel_stops_all_further_transitions() {
        let mut timer = running(2);
        timer.tick();

        timer.cancel().unwrap();

        assert_eq!(timer.state(), TimerState::Cancelled);
        for _ in 0..5 {
            assert_eq!(timer.tick(), TickOutcome::Ignored);
        }
        assert_eq!(timer.remaining(), 1);
    }

    #[test]
    fn test_cancel_is_valid_while_expired_but_not_once_revealed() {
        let mut expired = running(1);
        expired.tick();
        assert!(expired.cancel().is_ok());

        let mut revealed = running(5);
        revealed.stop().unwrap();
        assert!(matches!(
            revealed.cancel(),
            Err(DomainError::InvalidTransition(_))
        ));
    }
}
