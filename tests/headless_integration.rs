use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use term_type::countdown::{Countdown, CountdownPhase, CountdownTick};
use term_type::runtime::{AppEvent, EventQueue, FixedTicker, PeriodicTask, Runner};
use term_type::sampler::ProgressSampler;
use term_type::session::{Mode, SessionState, TypingSession};

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the runtime and a session without a TTY.
// Verifies that a minimal typing flow completes through Runner/EventQueue.
#[test]
fn headless_typing_flow_completes() {
    let mut session = TypingSession::new("hi", Mode::FreeText).unwrap();

    let queue = EventQueue::new();
    let tx = queue.sender();
    let runner = Runner::new(queue, FixedTicker::new(Duration::from_millis(5)));

    tx.send(key('h')).unwrap();
    tx.send(key('i')).unwrap();

    for _ in 0..100u32 {
        if let AppEvent::Key(key) = runner.step() {
            if let KeyCode::Char(c) = key.code {
                session.type_char(c);
                if session.has_finished() {
                    break;
                }
            }
        }
    }

    assert!(session.has_finished(), "session should have finished typing");
    let summary = session.summary();
    assert!(summary.wpm >= 0.0);
    assert_eq!(summary.accuracy, 100.0);
    assert_eq!(summary.mode_label, "custom");
}

#[test]
fn headless_timed_session_finishes_by_countdown() {
    let mut session = TypingSession::new("hello world", Mode::Timed(1)).unwrap();

    let queue = EventQueue::new();
    let mut countdown = Countdown::start(Duration::from_millis(10), queue.sender());
    let _sample_task =
        PeriodicTask::spawn(Duration::from_millis(50), queue.sender(), AppEvent::Sample);
    let mut sampler = ProgressSampler::new(Duration::from_millis(50));
    let runner = Runner::new(queue, FixedTicker::new(Duration::from_millis(20)));

    session.type_char('h');
    let deadline = Instant::now() + Duration::from_secs(5);

    let mut expired = 0;
    while Instant::now() < deadline && !session.has_finished() {
        match runner.step() {
            AppEvent::Countdown => {
                if countdown.on_tick(&mut session) == CountdownTick::Expired {
                    expired += 1;
                }
            }
            AppEvent::Sample => {
                sampler.on_tick(&mut session);
            }
            _ => {}
        }
    }

    assert_eq!(expired, 1);
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(countdown.phase(), CountdownPhase::Expired);
    assert!(session.elapsed() >= Duration::from_secs(1));
    assert!(session.snapshots().len() >= 2);

    // keystrokes after time is up are ignored
    session.type_char('e');
    assert_eq!(session.input(), &['h']);

    countdown.cancel();
    assert_eq!(countdown.phase(), CountdownPhase::Expired);
}

#[test]
fn headless_snapshots_are_monotonic() {
    let mut session = TypingSession::new("the quick brown fox", Mode::FreeText).unwrap();

    let queue = EventQueue::new();
    let tx = queue.sender();
    let _sample_task = PeriodicTask::spawn(Duration::from_millis(5), tx.clone(), AppEvent::Sample);
    let mut sampler = ProgressSampler::new(Duration::from_millis(5));
    let runner = Runner::new(queue, FixedTicker::new(Duration::from_millis(5)));

    for c in "the quick brown fox".chars() {
        tx.send(key(c)).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline && !session.has_finished() {
        match runner.step() {
            AppEvent::Key(key) => {
                if let KeyCode::Char(c) = key.code {
                    session.type_char(c);
                }
                std::thread::sleep(Duration::from_millis(2));
            }
            AppEvent::Sample => {
                sampler.on_tick(&mut session);
            }
            _ => {}
        }
    }

    assert!(session.has_finished());
    let series = session.snapshots();
    assert!(!series.is_empty());
    assert!(series
        .windows(2)
        .all(|pair| pair[0].elapsed_secs <= pair[1].elapsed_secs));
    assert!(series.iter().all(|s| s.errors == 0));
}

#[test]
fn headless_abort_cancels_pending_countdown() {
    let mut session = TypingSession::new("hello", Mode::Timed(1)).unwrap();

    let queue = EventQueue::new();
    let mut countdown = Countdown::start(Duration::from_millis(5), queue.sender());
    let runner = Runner::new(queue, FixedTicker::new(Duration::from_millis(5)));

    session.type_char('h');
    countdown.cancel();

    // drain whatever was already queued, past the time limit
    let deadline = Instant::now() + Duration::from_millis(1200);
    while Instant::now() < deadline {
        if let AppEvent::Countdown = runner.step() {
            assert_eq!(countdown.on_tick(&mut session), CountdownTick::Idle);
        }
    }

    assert!(!session.has_finished());
    assert_eq!(countdown.phase(), CountdownPhase::Cancelled);
}
