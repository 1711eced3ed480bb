//! Integration tests for `SyncSession` against scripted links.
//!
//! These pin the state trace of each command path and check that the radio
//! is always torn down, whatever failed on the way.

use std::cell::Cell;

use crate::mock_hw::{BoardCall, MockBoard, MockLink};

use feedlog::app::commands::FeedingCommand;
use feedlog::config::DeviceConfig;
use feedlog::feeding_log::{CompactDateTime, FeedingLog};
use feedlog::sync::SyncState::{self, *};
use feedlog::sync::{SyncOutcome, SyncSession};

fn log_of(entries: &[CompactDateTime]) -> FeedingLog {
    let mut log = FeedingLog::new();
    for e in entries {
        log.insert_front(*e);
    }
    log
}

/// Run one session; returns the outcome and how often the log was committed.
fn run(
    config: &DeviceConfig,
    command: FeedingCommand,
    log: &mut FeedingLog,
    link: &mut MockLink,
    board: &mut MockBoard,
) -> (SyncOutcome, u32) {
    let commits = Cell::new(0);
    let mut commit = |_: &FeedingLog| commits.set(commits.get() + 1);
    let outcome = SyncSession::new(config).run(command, log, link, board, &mut commit);
    (outcome, commits.get())
}

fn trace(outcome: &SyncOutcome) -> &[SyncState] {
    outcome.trace.states()
}

#[test]
fn add_online_walks_the_full_path() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("2401021345");
    let mut board = MockBoard::woken_at(0);
    let (out, commits) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert_eq!(
        trace(&out),
        &[
            Idle,
            Connecting,
            Connected,
            AwaitingTime,
            TimeKnown,
            MutatingLog,
            Publishing,
            Disconnected
        ]
    );
    assert_eq!(commits, 1);
    assert!(out.published);
    assert_eq!(link.subscriptions, ["feedlog/time"]);
    assert_eq!(link.published[0].0, "feedlog/status");
    assert_eq!(
        board.calls[..2],
        [BoardCall::Connecting, BoardCall::ConnectSuccess]
    );
}

#[test]
fn wifi_timeout_is_bounded_and_reported() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::offline();
    let mut board = MockBoard::woken_at(1_000);
    let (out, commits) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert_eq!(board.now, 1_000 + cfg.timing.wifi_timeout_ms);
    assert!(!out.connected);
    assert_eq!(link.opened, 0, "broker never tried without a network");
    assert_eq!(
        trace(&out),
        &[Idle, Connecting, Failed, MutatingLog, Publishing, Disconnected]
    );
    assert_eq!(commits, 1);
    assert_eq!(log.latest(), CompactDateTime::UNKNOWN);
}

#[test]
fn unreachable_broker_fails_after_its_own_timeout() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("2401021345");
    link.broker_reachable = false;
    let mut board = MockBoard::woken_at(0);
    let (out, _) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert!(trace(&out).contains(&Failed));
    assert!(!trace(&out).contains(&AwaitingTime));
    // One poll interval to bring the network up, then the broker wait.
    assert_eq!(board.now, 10 + cfg.timing.broker_timeout_ms);
    assert_eq!((link.closed, link.shut_down), (1, 1));
}

#[test]
fn silent_time_topic_times_out() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::silent();
    let mut board = MockBoard::woken_at(0);
    let (out, _) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert!(out.connected);
    assert!(trace(&out).contains(&TimeTimeout));
    assert_eq!(out.learned_time, CompactDateTime::UNKNOWN);
    assert!(out.published, "status is still published without a time");
}

#[test]
fn time_payload_without_digits_is_unknown() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("n/a");
    let mut board = MockBoard::woken_at(0);
    let (out, _) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert!(trace(&out).contains(&TimeTimeout));
    assert!(!trace(&out).contains(&TimeKnown));
    assert_eq!(log.entries(), &[CompactDateTime::UNKNOWN]);
}

#[test]
fn subscribe_failure_skips_the_wait() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("2401021345");
    link.subscribe_fails = true;
    let mut board = MockBoard::woken_at(0);
    let (out, _) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert!(trace(&out).contains(&TimeTimeout));
    assert!(board.now < cfg.timing.sync_timeout_ms);
}

#[test]
fn publish_failure_still_disconnects() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("2401021345");
    link.publish_fails = true;
    let mut board = MockBoard::woken_at(0);
    let (out, commits) = run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert!(!out.published);
    assert_eq!(commits, 1);
    assert_eq!(out.trace.current(), Disconnected);
    assert_eq!((link.closed, link.shut_down), (1, 1));
}

#[test]
fn remove_mutates_before_connecting() {
    let cfg = DeviceConfig::default();
    let mut log = log_of(&[
        CompactDateTime::from_parts(240_102, 700),
        CompactDateTime::from_parts(240_102, 1_100),
    ]);
    let mut link = MockLink::online("2401021345");
    let mut board = MockBoard::woken_at(0);
    let (out, commits) = run(&cfg, FeedingCommand::RemoveFeeding, &mut log, &mut link, &mut board);

    assert_eq!(
        trace(&out),
        &[Idle, MutatingLog, Connecting, Connected, Publishing, Disconnected]
    );
    assert_eq!(commits, 1);
    assert!(link.subscriptions.is_empty(), "remove never waits for time");
    assert_eq!(log.len(), 1);
}

#[test]
fn remove_and_clear_on_empty_log_do_nothing() {
    let cfg = DeviceConfig::default();
    for command in [FeedingCommand::RemoveFeeding, FeedingCommand::ClearFeedings] {
        let mut log = FeedingLog::new();
        let mut link = MockLink::online("2401021345");
        let mut board = MockBoard::woken_at(0);
        let (out, commits) = run(&cfg, command, &mut log, &mut link, &mut board);

        assert_eq!(trace(&out), &[Idle], "{:?}", command);
        assert_eq!(commits, 0);
        assert!(!out.log_changed);
        assert_eq!(link.began, 0);
        assert_eq!(board.now, 0);
    }
}

#[test]
fn clear_offline_still_commits() {
    let cfg = DeviceConfig::default();
    let mut log = log_of(&[CompactDateTime::from_parts(240_102, 700)]);
    let mut link = MockLink::offline();
    let mut board = MockBoard::woken_at(0);
    let (out, commits) = run(&cfg, FeedingCommand::ClearFeedings, &mut log, &mut link, &mut board);

    assert!(log.is_empty());
    assert_eq!(commits, 1);
    assert!(out.log_changed);
    assert!(!out.published);
    assert_eq!(out.trace.current(), Disconnected);
}

#[test]
fn local_commands_never_touch_the_link() {
    let cfg = DeviceConfig::default();
    for command in [FeedingCommand::QueryBattery, FeedingCommand::ShowStatus] {
        let mut log = log_of(&[CompactDateTime::from_parts(240_102, 700)]);
        let mut link = MockLink::online("2401021345");
        let mut board = MockBoard::woken_at(0);
        let (out, commits) = run(&cfg, command, &mut log, &mut link, &mut board);

        assert_eq!(trace(&out), &[Idle]);
        assert_eq!(commits, 0);
        assert_eq!((link.began, link.closed, link.shut_down), (0, 0, 0));
    }
}

#[test]
fn non_finite_voltage_publishes_zero() {
    let cfg = DeviceConfig::default();
    let mut log = FeedingLog::new();
    let mut link = MockLink::online("2401021345");
    let mut board = MockBoard {
        voltage: f32::NAN,
        ..MockBoard::woken_at(0)
    };
    run(&cfg, FeedingCommand::AddFeeding, &mut log, &mut link, &mut board);

    assert_eq!(
        link.last_status(),
        Some(r#"{"count":1, "datetime":2401021345, "battery-voltage":0.00}"#)
    );
}
