use std::time::{Duration, Instant};

use term_type::history::{newest_first, HistoryRecord, HistoryStore, JsonHistoryStore};
use term_type::session::{Mode, TypingSession};

fn finished_session(text: &str, typed: &str, mode: Mode) -> TypingSession {
    let mut session = TypingSession::new(text, mode).unwrap();
    let t0 = Instant::now();
    for (i, c) in typed.chars().enumerate() {
        session.type_char_at(c, t0 + Duration::from_millis(200 * i as u64));
    }
    session.finish_at(t0 + Duration::from_secs(3));
    session
}

#[test]
fn finished_sessions_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("term-type").join("history.json");

    {
        let store = JsonHistoryStore::with_path(&path);
        let first = finished_session("one two", "one twp", Mode::FreeText);
        let second = finished_session("alpha beta", "alpha", Mode::Timed(3));
        store.append(HistoryRecord::from(&first.summary())).unwrap();
        store.append(HistoryRecord::from(&second.summary())).unwrap();
    }

    let records = JsonHistoryStore::with_path(&path).load().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].mode, "custom");
    assert_eq!(records[0].correct, 6);
    assert_eq!(records[0].wrong, 1);
    assert_eq!(records[1].mode, "3s");
    assert_eq!(records[1].accuracy, 100.0);

    let shown: Vec<&str> = newest_first(&records)
        .into_iter()
        .map(|r| r.mode.as_str())
        .collect();
    assert_eq!(shown, vec!["3s", "custom"]);
}

#[test]
fn clearing_an_absent_history_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonHistoryStore::with_path(dir.path().join("history.json"));

    store.clear().unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn hand_written_history_is_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(
        &path,
        r#"[
  {
    "date": "2024-05-01T12:30:00+02:00",
    "mode": "25 words",
    "wpm": 74.0,
    "accuracy": 98.2,
    "correct": 131,
    "wrong": 2
  }
]"#,
    )
    .unwrap();

    let records = JsonHistoryStore::with_path(&path).load().unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].mode, "25 words");
    assert_eq!(records[0].wpm, 74.0);
}
