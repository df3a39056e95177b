use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::runtime::{AppEvent, CancelToken, PeriodicTask};
use crate::session::{SessionState, TypingSession};

pub const DEFAULT_COUNTDOWN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    WaitingForStart,
    Running,
    /// Time ran out and the session was finished by the countdown
    Expired,
    /// The session finished some other way
    Stopped,
    Cancelled,
}

/// Result of a single countdown evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownTick {
    /// Nothing to do: cancelled, already expired, or not a timed session
    Idle,
    Waiting,
    Running { remaining: f64 },
    /// Emitted exactly once, on the tick that finished the session
    Expired,
}

/// Turns elapsed time into the finish signal of a timed session.
///
/// The countdown never touches the session from the timer thread. Its
/// [`PeriodicTask`] only posts [`AppEvent::Countdown`] into the event
/// queue; the runner then calls [`Countdown::on_tick`] next to the
/// keystroke handling, which is where `finish()` happens.
#[derive(Debug)]
pub struct Countdown {
    phase: CountdownPhase,
    token: CancelToken,
    task: Option<PeriodicTask>,
}

impl Countdown {
    /// Countdown evaluated by an external tick source
    pub fn new(token: CancelToken) -> Self {
        Self {
            phase: CountdownPhase::WaitingForStart,
            token,
            task: None,
        }
    }

    /// Countdown with its own timer posting into `tx` every `interval`
    pub fn start(interval: Duration, tx: Sender<AppEvent>) -> Self {
        let task = PeriodicTask::spawn(interval, tx, AppEvent::Countdown);
        Self {
            phase: CountdownPhase::WaitingForStart,
            token: task.token(),
            task: Some(task),
        }
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn on_tick(&mut self, session: &mut TypingSession) -> CountdownTick {
        self.on_tick_at(session, Instant::now())
    }

    pub fn on_tick_at(&mut self, session: &mut TypingSession, now: Instant) -> CountdownTick {
        match self.phase {
            CountdownPhase::Expired | CountdownPhase::Stopped | CountdownPhase::Cancelled => {
                return CountdownTick::Idle
            }
            CountdownPhase::WaitingForStart | CountdownPhase::Running => {}
        }

        // the timer task shares this token and cancels it once stopped
        if self.token.is_cancelled() {
            self.phase = CountdownPhase::Cancelled;
            return CountdownTick::Idle;
        }

        match session.state() {
            SessionState::NotStarted => CountdownTick::Waiting,
            SessionState::Finished => {
                self.stop(CountdownPhase::Stopped);
                CountdownTick::Idle
            }
            SessionState::InProgress => {
                let Some(remaining) = session.time_remaining_at(now) else {
                    self.stop(CountdownPhase::Stopped);
                    return CountdownTick::Idle;
                };

                if remaining <= 0.0 {
                    session.finish_at(now);
                    self.stop(CountdownPhase::Expired);
                    info!(mode = %session.mode().label(), "time is up");
                    return CountdownTick::Expired;
                }

                self.phase = CountdownPhase::Running;
                CountdownTick::Running { remaining }
            }
        }
    }

    /// Suppresses any finish signal still pending; safe to call repeatedly
    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
        if self.phase != CountdownPhase::Expired && self.phase != CountdownPhase::Stopped {
            self.phase = CountdownPhase::Cancelled;
        }
        debug!(phase = ?self.phase, "countdown cancelled");
    }

    fn stop(&mut self, phase: CountdownPhase) {
        self.phase = phase;
        if let Some(task) = self.task.as_mut() {
            task.cancel();
        }
    }
}
