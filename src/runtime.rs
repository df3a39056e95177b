use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{trace, warn};

/// Unified event type consumed by the app runner.
///
/// Keystrokes, progress sampling and the countdown all arrive through one
/// queue so the session is only ever touched from the runner's thread.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Idle redraw tick produced by the runner on timeout
    Tick,
    /// Progress sampler cadence
    Sample,
    /// Countdown coordinator cadence
    Countdown,
}

/// Source of application events
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Serialized queue shared by every producer of events
pub struct EventQueue {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for EventQueue {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Forwards terminal key and resize events into the queue
pub fn spawn_terminal_reader(tx: Sender<AppEvent>) -> JoinHandle<()> {
    thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(err) => {
                warn!(%err, "terminal event stream closed");
                break;
            }
        };

        if tx.send(evt).is_err() {
            break;
        }
    })
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

/// Shared flag checked by a periodic task and its consumer before acting
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Background timer that posts `event` into the queue every `interval`
/// until cancelled or until the queue is gone.
#[derive(Debug)]
pub struct PeriodicTask {
    token: CancelToken,
    stop_tx: Option<Sender<()>>,
}

impl PeriodicTask {
    pub fn spawn(interval: Duration, tx: Sender<AppEvent>, event: AppEvent) -> Self {
        let token = CancelToken::new();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let task_token = token.clone();
        thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if task_token.is_cancelled() || tx.send(event.clone()).is_err() {
                            break;
                        }
                    }
                    // stop message or the task handle was dropped
                    _ => break,
                }
            }
            trace!(?event, "periodic task stopped");
        });

        Self {
            token,
            stop_tx: Some(stop_tx),
        }
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Stops the task right away; the timer thread wakes up and exits
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.stop_tx.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
