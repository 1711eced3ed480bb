//! Integration tests for the wake cycle across simulated reboots.
//!
//! Each "boot" builds a fresh [`WakeCycleController`] over the retained
//! memory left behind by the previous one.  A boot cut short by the next
//! press only runs [`WakeCycleController::register_press`], which is all a
//! real boot completes before the button restarts the chip.

use crate::mock_hw::{BoardCall, MockBoard, MockLink, RecordingSink};

use feedlog::adapters::rtc_memory::RtcMemory;
use feedlog::app::commands::FeedingCommand;
use feedlog::app::ports::RetainedMemoryPort;
use feedlog::app::service::{CycleReport, WakeCycleController};
use feedlog::config::DeviceConfig;
use feedlog::feeding_log::{CompactDateTime, FeedingLog};
use feedlog::gesture::Gesture;
use feedlog::persist::PersistedState;
use feedlog::persist::record::RECORD_LEN;
use feedlog::sync::SyncState;
use feedlog::sync::session::ClearReason;

const T0: u32 = 10_000;

fn dt(date: u32, time: u32) -> CompactDateTime {
    CompactDateTime::from_parts(date, time)
}

/// Retained memory holding a valid record with `entries`, oldest first.
fn seeded(entries: &[CompactDateTime]) -> RtcMemory {
    let mut log = FeedingLog::new();
    for e in entries {
        assert!(log.insert_front(*e));
    }
    let mut memory = RtcMemory::new();
    *memory.image_mut() = PersistedState {
        last_wake_ms: 0,
        pending_presses: 0,
        feeding_log: log,
    }
    .encode();
    memory
}

fn stored(memory: &RtcMemory) -> Option<PersistedState> {
    let mut buf = [0u8; RECORD_LEN];
    memory.read(&mut buf).ok()?;
    PersistedState::decode(&buf)
}

/// A boot that is restarted by the next press before its window closes.
fn interrupted_boot(config: &DeviceConfig, memory: RtcMemory, at: u32) -> RtcMemory {
    let mut ctl = WakeCycleController::new(config.clone(), memory);
    let mut board = MockBoard::woken_at(at);
    ctl.register_press(&mut board, &mut RecordingSink::new());
    ctl.into_memory()
}

/// A boot that runs through to deep sleep.
fn full_boot(
    config: &DeviceConfig,
    memory: RtcMemory,
    board: &mut MockBoard,
    link: &mut MockLink,
) -> (CycleReport, RtcMemory) {
    let mut ctl = WakeCycleController::new(config.clone(), memory);
    let report = ctl.run(board, link, &mut RecordingSink::new());
    (report, ctl.into_memory())
}

/// `presses` taps 50 ms apart starting at `start`; only the last boot
/// completes.
fn gesture(
    config: &DeviceConfig,
    mut memory: RtcMemory,
    start: u32,
    presses: u32,
    link: &mut MockLink,
) -> (CycleReport, RtcMemory, MockBoard) {
    for i in 0..presses - 1 {
        memory = interrupted_boot(config, memory, start + i * 50);
    }
    let mut board = MockBoard::woken_at(start + (presses - 1) * 50);
    let (report, memory) = full_boot(config, memory, &mut board, link);
    (report, memory, board)
}

// ── Gesture coalescing across reboots ─────────────────────────

#[test]
fn fresh_memory_single_tap_adds_one_feeding() {
    let cfg = DeviceConfig::default();
    let mut link = MockLink::online("24-01-02 13:45");
    let (report, memory, _) = gesture(&cfg, RtcMemory::new(), T0, 1, &mut link);

    assert!(!report.record_valid, "zeroed memory must not be trusted");
    assert_eq!(report.gesture, Gesture::Single);
    assert_eq!(report.outcome.learned_time, dt(240_102, 1_345));

    let state = stored(&memory).unwrap();
    assert_eq!(state.pending_presses, 0);
    assert_eq!(state.feeding_log.entries(), &[dt(240_102, 1_345)]);
}

#[test]
fn second_press_inside_window_counts_as_double() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_102, 700), dt(240_102, 1_100)]);
    let mut link = MockLink::online("2401021200");
    let (report, memory, _) = gesture(&cfg, memory, T0, 2, &mut link);

    assert!(report.record_valid);
    assert_eq!(report.pending_at_wake, 2);
    assert_eq!(report.gesture, Gesture::Double);
    assert_eq!(report.command, FeedingCommand::RemoveFeeding);

    let state = stored(&memory).unwrap();
    assert_eq!(state.feeding_log.entries(), &[dt(240_102, 700)]);
    assert_eq!(
        link.last_status(),
        Some(r#"{"count":1, "datetime":2401020700, "battery-voltage":3.87}"#)
    );
}

#[test]
fn interrupted_boot_persists_its_press() {
    let cfg = DeviceConfig::default();
    let memory = interrupted_boot(&cfg, RtcMemory::new(), T0);
    let state = stored(&memory).unwrap();
    assert_eq!(state.pending_presses, 1);
    assert_eq!(state.last_wake_ms, T0);

    let memory = interrupted_boot(&cfg, memory, T0 + 120);
    let state = stored(&memory).unwrap();
    assert_eq!(state.pending_presses, 2);
    assert_eq!(state.last_wake_ms, T0 + 120);
}

#[test]
fn wakes_at_0_50_260_make_two_gestures() {
    // No slack, so the boot at 50 resolves at 250, before the 260 press.
    let mut cfg = DeviceConfig::default();
    cfg.timing.coalescing_slack_ms = 0;

    let memory = interrupted_boot(&cfg, RtcMemory::new(), T0);
    let mut board = MockBoard::woken_at(T0 + 50);
    let (first, memory) = full_boot(&cfg, memory, &mut board, &mut MockLink::offline());
    assert_eq!(board.now, T0 + 250);
    assert_eq!(first.gesture, Gesture::Double);

    let mut board = MockBoard::woken_at(T0 + 260);
    let (second, _) = full_boot(&cfg, memory, &mut board, &mut MockLink::offline());
    assert_eq!(second.pending_at_wake, 1);
    assert_eq!(second.gesture, Gesture::Single);
}

#[test]
fn gesture_survives_clock_wrap() {
    let cfg = DeviceConfig::default();
    let memory = interrupted_boot(&cfg, RtcMemory::new(), u32::MAX - 20);
    let mut board = MockBoard::woken_at(29);
    let (report, _) = full_boot(&cfg, memory, &mut board, &mut MockLink::offline());
    assert_eq!(report.gesture, Gesture::Double);
}

#[test]
fn triple_press_only_redisplays() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_102, 700)]);
    let mut link = MockLink::online("2401021200");
    let (report, memory, board) = gesture(&cfg, memory, T0, 3, &mut link);

    assert_eq!(report.gesture, Gesture::Triple);
    assert_eq!(report.command, FeedingCommand::ShowStatus);
    assert_eq!(board.last_present(), Some((1, dt(240_102, 700))));
    assert_eq!(link.began, 0, "status display never touches the radio");
    assert_eq!(stored(&memory).unwrap().feeding_log.len(), 1);
}

#[test]
fn quadruple_press_clears_and_publishes() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_102, 700), dt(240_102, 900), dt(240_102, 1_100)]);
    let mut link = MockLink::online("2401021200");
    let (report, memory, board) = gesture(&cfg, memory, T0, 4, &mut link);

    assert_eq!(report.command, FeedingCommand::ClearFeedings);
    assert!(stored(&memory).unwrap().feeding_log.is_empty());
    assert_eq!(board.last_present(), Some((0, CompactDateTime::UNKNOWN)));
    assert_eq!(
        link.last_status(),
        Some(r#"{"count":0, "datetime":99999999, "battery-voltage":3.87}"#)
    );
}

#[test]
fn five_presses_fall_back_to_status() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_102, 700)]);
    let mut link = MockLink::offline();
    let (report, memory, _) = gesture(&cfg, memory, T0, 5, &mut link);

    assert_eq!(report.gesture, Gesture::Other(5));
    assert_eq!(report.command, FeedingCommand::ShowStatus);
    assert_eq!(stored(&memory).unwrap().feeding_log.len(), 1);
}

#[test]
fn press_after_resolution_starts_new_gesture() {
    let cfg = DeviceConfig::default();
    let mut link = MockLink::offline();
    let (first, memory, board) = gesture(&cfg, RtcMemory::new(), T0, 2, &mut link);
    assert_eq!(first.gesture, Gesture::Double);

    let mut next = MockBoard::woken_at(board.now + 10);
    let (second, _) = full_boot(&cfg, memory, &mut next, &mut link);
    assert_eq!(second.pending_at_wake, 1);
    assert_eq!(second.gesture, Gesture::Single);
}

// ── Long press ────────────────────────────────────────────────

#[test]
fn long_hold_reports_battery_without_radio() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_102, 700)]);
    let mut board = MockBoard::held_at(T0, 1_500);
    let mut link = MockLink::online("2401021200");
    let (report, memory) = full_boot(&cfg, memory, &mut board, &mut link);

    assert_eq!(report.gesture, Gesture::SingleHeld);
    assert_eq!(report.outcome.battery_voltage, Some(3.87));
    assert_eq!(board.count(&BoardCall::PresentBattery(3.87)), 1);
    assert_eq!(link.began, 0);
    assert_eq!(stored(&memory).unwrap().feeding_log.len(), 1);
}

#[test]
fn hold_released_early_is_a_plain_single() {
    let cfg = DeviceConfig::default();
    let mut board = MockBoard::held_at(T0, 600);
    let (report, _) = full_boot(&cfg, RtcMemory::new(), &mut board, &mut MockLink::offline());

    assert_eq!(report.gesture, Gesture::Single);
    assert_eq!(board.now, T0 + 600);
}

// ── Integrity ─────────────────────────────────────────────────

#[test]
fn corrupted_record_resets_log_and_count() {
    let cfg = DeviceConfig::default();
    let mut memory = seeded(&[dt(240_102, 700), dt(240_102, 900)]);
    memory.image_mut()[10] ^= 0x01;

    let mut board = MockBoard::woken_at(T0);
    let (report, memory) = full_boot(&cfg, memory, &mut board, &mut MockLink::offline());

    assert!(!report.record_valid);
    assert_eq!(report.pending_at_wake, 1);
    assert_eq!(report.command, FeedingCommand::AddFeeding);
    let state = stored(&memory).unwrap();
    assert_eq!(state.feeding_log.entries(), &[CompactDateTime::UNKNOWN]);
}

#[test]
fn corrupted_pending_count_starts_fresh_gesture() {
    let cfg = DeviceConfig::default();
    let mut memory = interrupted_boot(&cfg, RtcMemory::new(), T0);
    memory.image_mut()[25] = 3;

    let mut board = MockBoard::woken_at(T0 + 50);
    let (report, _) = full_boot(&cfg, memory, &mut board, &mut MockLink::offline());
    assert_eq!(report.pending_at_wake, 1);
    assert_eq!(report.gesture, Gesture::Single);
}

// ── Add-feeding rules ─────────────────────────────────────────

#[test]
fn new_day_clears_yesterdays_feedings() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_101, 800), dt(240_101, 2_200)]);
    let mut link = MockLink::online("2401020615");
    let (report, memory, _) = gesture(&cfg, memory, T0, 1, &mut link);

    assert_eq!(
        report.outcome.cleared_before_add,
        Some(ClearReason::DayRollover)
    );
    assert_eq!(
        stored(&memory).unwrap().feeding_log.entries(),
        &[dt(240_102, 615)]
    );
}

#[test]
fn unknown_time_appends_without_rollover() {
    let cfg = DeviceConfig::default();
    let memory = seeded(&[dt(240_101, 800)]);
    let mut link = MockLink::silent();
    let (report, memory, _) = gesture(&cfg, memory, T0, 1, &mut link);

    assert!(report.outcome.connected);
    assert_eq!(report.outcome.cleared_before_add, None);
    assert!(report.outcome.trace.contains(SyncState::TimeTimeout));
    assert_eq!(
        stored(&memory).unwrap().feeding_log.entries(),
        &[CompactDateTime::UNKNOWN, dt(240_101, 800)]
    );
}

fn full_day() -> RtcMemory {
    seeded(&[
        dt(240_102, 600),
        dt(240_102, 900),
        dt(240_102, 1_200),
        dt(240_102, 1_500),
    ])
}

#[test]
fn full_log_rejects_add_but_still_publishes() {
    let cfg = DeviceConfig::default();
    let mut link = MockLink::online("2401021800");
    let (report, memory, _) = gesture(&cfg, full_day(), T0, 1, &mut link);

    assert!(!report.outcome.log_changed);
    assert!(report.outcome.published);
    let log = stored(&memory).unwrap().feeding_log;
    assert_eq!(log.len(), 4);
    assert_eq!(log.latest(), dt(240_102, 1_500));
    assert_eq!(
        link.last_status(),
        Some(r#"{"count":4, "datetime":2401021500, "battery-voltage":3.87}"#)
    );
}

#[test]
fn full_log_auto_clears_when_enabled() {
    let mut cfg = DeviceConfig::default();
    cfg.auto_clear_when_full = true;
    let mut link = MockLink::online("2401021800");
    let (report, memory, _) = gesture(&cfg, full_day(), T0, 1, &mut link);

    assert_eq!(report.outcome.cleared_before_add, Some(ClearReason::Full));
    assert_eq!(
        stored(&memory).unwrap().feeding_log.entries(),
        &[dt(240_102, 1_800)]
    );
}

// ── Cycle shape ───────────────────────────────────────────────

#[test]
fn add_cycle_emits_events_in_order() {
    let cfg = DeviceConfig::default();
    let mut ctl = WakeCycleController::new(cfg, RtcMemory::new());
    let mut board = MockBoard::woken_at(T0);
    let mut sink = RecordingSink::new();
    ctl.run(&mut board, &mut MockLink::online("2401021345"), &mut sink);

    assert_eq!(
        sink.kinds(),
        [
            "Woke",
            "PressRegistered",
            "GestureResolved",
            "LogChanged",
            "CommandFinished",
            "Sleeping",
        ]
    );
}

#[test]
fn every_command_ends_in_deep_sleep() {
    let cfg = DeviceConfig::default();
    for presses in 1..=5 {
        let (report, _, board) = gesture(
            &cfg,
            seeded(&[dt(240_102, 700)]),
            T0,
            presses,
            &mut MockLink::offline(),
        );
        let tail = &board.calls[board.calls.len() - 3..];
        assert_eq!(
            tail,
            [
                BoardCall::Dismiss,
                BoardCall::PeripheralsOff,
                BoardCall::DeepSleep
            ],
            "{:?}",
            report.command
        );
        assert_eq!(board.count(&BoardCall::DeepSleep), 1);
    }
}

#[test]
fn offline_add_still_shuts_radio_down() {
    let cfg = DeviceConfig::default();
    let mut link = MockLink::offline();
    let (report, _, board) = gesture(&cfg, RtcMemory::new(), T0, 1, &mut link);

    assert_eq!(
        report.outcome.trace.states(),
        &[
            SyncState::Idle,
            SyncState::Connecting,
            SyncState::Failed,
            SyncState::MutatingLog,
            SyncState::Publishing,
            SyncState::Disconnected,
        ]
    );
    assert_eq!(board.count(&BoardCall::ConnectFailure), 1);
    assert_eq!((link.closed, link.shut_down), (1, 1));
    assert!(link.published.is_empty());
}
