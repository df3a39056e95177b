use std::time::{Duration, Instant};

use crate::session::{SessionState, TypingSession};

pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 100;

/// Collects the progress series drawn on the results graph.
///
/// The sampler can be driven by any tick source; it takes at most one
/// sample per `interval` of session time, and only while the session is
/// running. The closing sample is taken by the session itself when it
/// finishes.
#[derive(Debug, Clone)]
pub struct ProgressSampler {
    interval: Duration,
    last_sampled: Option<Duration>,
}

impl ProgressSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sampled: None,
        }
    }

    pub fn on_tick(&mut self, session: &mut TypingSession) -> bool {
        self.on_tick_at(session, Instant::now())
    }

    /// Returns true if a sample was appended to the session.
    pub fn on_tick_at(&mut self, session: &mut TypingSession, now: Instant) -> bool {
        if session.state() != SessionState::InProgress {
            return false;
        }

        let elapsed = session.elapsed_at(now);
        if let Some(last) = self.last_sampled {
            if elapsed.saturating_sub(last) < self.interval {
                return false;
            }
        }

        if session.record_snapshot_at(now) {
            self.last_sampled = Some(elapsed);
            return true;
        }
        false
    }
}

impl Default for ProgressSampler {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS))
    }
}
