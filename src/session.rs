use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::debug;

use crate::metrics;
use crate::time_series::Snapshot;

/// Largest word count a session accepts
pub const MAX_WORD_COUNT: usize = 1000;
/// Longest timed session in seconds
pub const MAX_TIMED_SECS: u64 = 3600;

/// Completion and timing policy of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Finish once all words of the target are typed
    WordCount(usize),
    /// Finish when the countdown of this many seconds runs out
    Timed(u64),
    /// Finish once an externally supplied text is typed
    FreeText,
}

impl Mode {
    pub fn label(&self) -> String {
        match self {
            Mode::WordCount(n) => format!("{n} words"),
            Mode::Timed(secs) => format!("{secs}s"),
            Mode::FreeText => "custom".to_string(),
        }
    }

    /// Whether the limits are positive and within the supported maximum
    pub fn is_valid(&self) -> bool {
        match self {
            Mode::WordCount(n) => (1..=MAX_WORD_COUNT).contains(n),
            Mode::Timed(secs) => (1..=MAX_TIMED_SECS).contains(secs),
            Mode::FreeText => true,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, Mode::Timed(_))
    }

    pub fn limit_secs(&self) -> Option<f64> {
        match self {
            Mode::Timed(secs) => Some(*secs as f64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot start a typing test without any text")]
    EmptyTarget,
    #[error("invalid mode {0:?}: use 1 to 1000 words or 1 to 3600 seconds")]
    InvalidMode(Mode),
}

/// Final figures of a session, handed to the history store
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub date: DateTime<Local>,
    pub mode_label: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub correct: usize,
    pub wrong: usize,
    pub elapsed: Duration,
}

/// One attempt at typing a target text.
///
/// Key events are applied in arrival order through [`type_char`](Self::type_char),
/// [`backspace`](Self::backspace) and [`delete_word`](Self::delete_word).
/// Once finished every mutation is a no-op and the metrics are frozen.
#[derive(Debug, Clone)]
pub struct TypingSession {
    target: Vec<char>,
    input: Vec<char>,
    mode: Mode,
    word_count: usize,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    snapshots: Vec<Snapshot>,
}

impl TypingSession {
    pub fn new(target: impl Into<String>, mode: Mode) -> Result<Self, SessionError> {
        let target: String = target.into();
        if target.is_empty() {
            return Err(SessionError::EmptyTarget);
        }

        if !mode.is_valid() {
            return Err(SessionError::InvalidMode(mode));
        }

        let word_count = match mode {
            Mode::WordCount(n) => n,
            _ => target.split_whitespace().count(),
        };
        let target: Vec<char> = target.chars().collect();

        Ok(Self {
            input: Vec::with_capacity(target.len()),
            target,
            mode,
            word_count,
            started_at: None,
            finished_at: None,
            snapshots: vec![],
        })
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    pub fn state(&self) -> SessionState {
        match (self.started_at, self.finished_at) {
            (_, Some(_)) => SessionState::Finished,
            (Some(_), None) => SessionState::InProgress,
            (None, None) => SessionState::NotStarted,
        }
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn type_char(&mut self, c: char) {
        self.type_char_at(c, Instant::now())
    }

    pub fn type_char_at(&mut self, c: char, now: Instant) {
        if self.has_finished() || self.input.len() >= self.target.len() {
            return;
        }

        if self.started_at.is_none() {
            self.started_at = Some(now);
            debug!(mode = %self.mode.label(), "session started");
        }

        self.input.push(c);

        if !self.mode.is_timed() && self.input.len() == self.target.len() {
            self.finish_at(now);
        }
    }

    pub fn backspace(&mut self) {
        if self.has_finished() {
            return;
        }
        self.input.pop();
    }

    /// Erases the last word of the typed buffer: trailing spaces first, then
    /// everything back to the previous space.
    pub fn delete_word(&mut self) {
        if self.has_finished() || self.input.is_empty() {
            return;
        }

        while self.input.last() == Some(&' ') {
            self.input.pop();
        }
        while matches!(self.input.last(), Some(c) if *c != ' ') {
            self.input.pop();
        }
    }

    pub fn finish(&mut self) {
        self.finish_at(Instant::now())
    }

    pub fn finish_at(&mut self, now: Instant) {
        if self.has_finished() {
            return;
        }

        self.finished_at = Some(now);

        if self.has_started() {
            let elapsed = self.elapsed().as_secs_f64();
            let needs_final = self
                .snapshots
                .last()
                .map_or(true, |last| last.elapsed_secs < elapsed);
            if needs_final {
                self.snapshots
                    .push(Snapshot::new(elapsed, self.wpm(), self.wrong_count()));
            }
        }

        debug!(
            wpm = self.wpm(),
            accuracy = self.accuracy(),
            samples = self.snapshots.len(),
            "session finished"
        );
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match (self.started_at, self.finished_at) {
            (None, _) => Duration::ZERO,
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
        }
    }

    pub fn time_remaining(&self) -> Option<f64> {
        self.time_remaining_at(Instant::now())
    }

    /// Seconds left on the countdown, `None` for modes without a limit.
    pub fn time_remaining_at(&self, now: Instant) -> Option<f64> {
        let limit = self.mode.limit_secs()?;
        if !self.has_started() {
            return Some(limit);
        }

        Some((limit - self.elapsed_at(now).as_secs_f64()).max(0.0))
    }

    pub fn correct_count(&self) -> usize {
        metrics::correct_count(&self.input, &self.target)
    }

    pub fn wrong_count(&self) -> usize {
        metrics::wrong_count(&self.input, &self.target)
    }

    pub fn wpm(&self) -> f64 {
        self.wpm_at(Instant::now())
    }

    pub fn wpm_at(&self, now: Instant) -> f64 {
        metrics::wpm(self.correct_count(), self.elapsed_at(now))
    }

    pub fn accuracy(&self) -> f64 {
        metrics::accuracy(self.correct_count(), self.input.len())
    }

    /// Words completed so far, as shown in the progress header
    pub fn words_typed(&self) -> usize {
        if self.has_finished() {
            return self.word_count;
        }
        self.input.iter().filter(|c| **c == ' ').count()
    }

    /// Appends a progress sample. Only a running session is sampled, and the
    /// series never goes back in time.
    pub fn record_snapshot_at(&mut self, now: Instant) -> bool {
        if self.state() != SessionState::InProgress {
            return false;
        }

        let elapsed = self.elapsed_at(now).as_secs_f64();
        if matches!(self.snapshots.last(), Some(last) if last.elapsed_secs > elapsed) {
            return false;
        }

        let snapshot = Snapshot::new(elapsed, self.wpm_at(now), self.wrong_count());
        self.snapshots.push(snapshot);
        true
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            date: Local::now(),
            mode_label: self.mode.label(),
            wpm: self.wpm().round(),
            accuracy: self.accuracy(),
            correct: self.correct_count(),
            wrong: self.wrong_count(),
            elapsed: self.elapsed(),
        }
    }
}
