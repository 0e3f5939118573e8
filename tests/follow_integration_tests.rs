// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of a follower tailing real files on disk.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use logfollow::bounded_channel::{self, BoundedReceiver};
use logfollow::follow::{
    Entry, FollowConfig, FollowEvent, LineEntryParser, LogFollower, LoopState, ParserType,
};
use tempfile::TempDir;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn config(start_paused: bool) -> FollowConfig {
    FollowConfig {
        idle_delay_ms: 20,
        pause_wait_hint_ms: 1000,
        start_paused,
        ..Default::default()
    }
}

fn new_follower(
    config: FollowConfig,
) -> (
    LogFollower<LineEntryParser>,
    BoundedReceiver<FollowEvent<Entry>>,
) {
    let parser = LineEntryParser::from_config(&config).unwrap();
    let (tx, rx) = bounded_channel::bounded(1024);
    (LogFollower::new(config, parser, tx), rx)
}

/// Receive events until one matches `pred`, returning all of them.
fn collect_until(
    rx: &BoundedReceiver<FollowEvent<Entry>>,
    pred: impl Fn(&FollowEvent<Entry>) -> bool,
) -> Vec<FollowEvent<Entry>> {
    let deadline = Instant::now() + TEST_TIMEOUT;
    let mut events = Vec::new();
    while Instant::now() < deadline {
        if let Some(event) = rx.recv_timeout(Duration::from_millis(50)) {
            let done = pred(&event);
            events.push(event);
            if done {
                return events;
            }
        }
    }
    panic!("timed out, received: {:?}", events);
}

fn bodies(events: &[FollowEvent<Entry>]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            FollowEvent::NewEntry(entry) => entry.body_string().map(str::to_string),
            _ => None,
        })
        .collect()
}

fn wait_for_state(follower: &LogFollower<LineEntryParser>, state: LoopState) {
    let deadline = Instant::now() + TEST_TIMEOUT;
    while follower.loop_state() != state {
        assert!(
            Instant::now() < deadline,
            "loop never reached {}, stuck in {}",
            state,
            follower.loop_state()
        );
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn append(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

/// A line of exactly `len` bytes including its newline.
fn line_of(tag: char, len: usize) -> String {
    let mut line: String = std::iter::repeat_n(tag, len - 1).collect();
    line.push('\n');
    line
}

#[test]
fn test_initial_read_then_only_appended_entries() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let initial = format!("{}{}{}", line_of('a', 40), line_of('b', 40), line_of('c', 40));
    std::fs::write(&path, &initial).unwrap();

    let (mut follower, rx) = new_follower(config(true));
    follower.set_path(&path);
    follower.start().unwrap();

    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    assert_eq!(events.len(), 6);
    assert_eq!(events[0], FollowEvent::PathChanged(path.clone()));
    assert_eq!(events[1], FollowEvent::FileSizeChanged(120));
    assert_eq!(
        bodies(&events),
        vec!["a".repeat(39), "b".repeat(39), "c".repeat(39)]
    );
    assert_eq!(events[5], FollowEvent::CycleEndReached(120));
    assert_eq!(follower.offset(), Some(120));

    // Paused after the first cycle: nothing else happens until resumed.
    wait_for_state(&follower, LoopState::WaitingPaused);
    append(&path, format!("{}{}", line_of('d', 25), line_of('e', 25)).as_bytes());

    assert!(follower.set_paused(false));
    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    assert_eq!(events.first(), Some(&FollowEvent::PausedChanged(false)));
    assert_eq!(bodies(&events), vec!["d".repeat(24), "e".repeat(24)]);
    assert_eq!(events.last(), Some(&FollowEvent::CycleEndReached(170)));
    assert_eq!(follower.file_size(), 170);

    follower.stop();
}

#[test]
fn test_nonexistent_path_reports_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.log");

    let (mut follower, rx) = new_follower(config(false));
    follower.set_path(&path);
    follower.start().unwrap();

    let events = collect_until(&rx, |e| matches!(e, FollowEvent::ErrorOccurred { .. }));
    match events.last() {
        Some(FollowEvent::ErrorOccurred { path: p, message }) => {
            assert_eq!(p, &path);
            assert!(message.contains("Can't open file"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    wait_for_state(&follower, LoopState::Stopped);
    follower.stop();
    assert!(rx.drain().iter().all(|e| !matches!(
        e,
        FollowEvent::NewEntry(_) | FollowEvent::CycleEndReached(_)
    )));
}

#[test]
fn test_truncation_rereads_from_start() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    let initial: String = (0..10).map(|_| line_of('x', 50)).collect();
    std::fs::write(&path, &initial).unwrap();

    let (mut follower, rx) = new_follower(config(true));
    follower.set_path(&path);
    follower.start().unwrap();

    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    assert_eq!(bodies(&events).len(), 10);
    assert_eq!(events.last(), Some(&FollowEvent::CycleEndReached(500)));
    wait_for_state(&follower, LoopState::WaitingPaused);

    // Truncate to zero and write a single new entry between two cycles.
    {
        let mut file = File::create(&path).unwrap();
        file.write_all(b"after rotation\n").unwrap();
    }

    follower.set_paused(false);
    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    assert!(events.contains(&FollowEvent::FileSizeChanged(15)));
    assert_eq!(bodies(&events), vec!["after rotation".to_string()]);
    match events.iter().find(|e| matches!(e, FollowEvent::NewEntry(_))) {
        Some(FollowEvent::NewEntry(entry)) => assert_eq!(entry.offset(), 0),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(events.last(), Some(&FollowEvent::CycleEndReached(15)));

    follower.stop();
}

#[test]
fn test_no_duplicates_across_pause_toggles() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    File::create(&path).unwrap();

    let (mut follower, rx) = new_follower(config(false));
    follower.set_path(&path);
    follower.start().unwrap();

    let mut expected = Vec::new();
    for i in 0..50 {
        let line = format!("entry {}", i);
        append(&path, format!("{}\n", line).as_bytes());
        expected.push(line);
        follower.set_paused(i % 2 == 0);
        std::thread::sleep(Duration::from_millis(3));
    }
    follower.set_paused(false);

    let mut received = Vec::new();
    let deadline = Instant::now() + TEST_TIMEOUT;
    while received.len() < expected.len() && Instant::now() < deadline {
        if let Some(event) = rx.recv_timeout(Duration::from_millis(50)) {
            received.extend(bodies(&[event]));
        }
    }
    follower.stop();
    received.extend(bodies(&rx.drain()));

    assert_eq!(received, expected);
}

#[test]
fn test_restart_resumes_at_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    std::fs::write(&path, "first\n").unwrap();

    let (mut follower, rx) = new_follower(config(false));
    follower.set_path(&path);
    follower.start().unwrap();
    collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(6)));
    follower.stop();
    assert_eq!(follower.loop_state(), LoopState::Stopped);

    append(&path, b"second\n");
    rx.drain();
    follower.start().unwrap();

    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(13)));
    assert_eq!(bodies(&events), vec!["second".to_string()]);
    follower.stop();
}

#[test]
fn test_stop_during_paused_wait_is_prompt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.log");
    std::fs::write(&path, "only\n").unwrap();

    let (mut follower, rx) = new_follower(FollowConfig {
        pause_wait_hint_ms: 60_000,
        ..config(true)
    });
    follower.set_path(&path);
    follower.start().unwrap();
    collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    wait_for_state(&follower, LoopState::WaitingPaused);

    let start = Instant::now();
    follower.stop();
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(!follower.is_running());
}

#[test]
fn test_json_entries_are_structured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.json");
    std::fs::write(
        &path,
        "{\"level\":\"error\",\"msg\":\"disk full\"}\nplain text\n",
    )
    .unwrap();

    let (mut follower, rx) = new_follower(FollowConfig {
        parser: ParserType::Json,
        ..config(false)
    });
    follower.set_path(&path);
    follower.start().unwrap();

    let events = collect_until(&rx, |e| matches!(e, FollowEvent::CycleEndReached(_)));
    let entries: Vec<Entry> = events.into_iter().filter_map(|e| e.into_entry()).collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].attribute_str("msg"), Some("disk full"));
    assert_eq!(entries[0].severity_text.as_deref(), Some("error"));
    // Lenient by default: non-JSON lines are kept as plain entries.
    assert_eq!(entries[1].body_string(), Some("plain text"));

    follower.stop();
}
