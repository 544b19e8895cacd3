// Cut-timing laws: one cut per interval boundary of active recording time,
// and no cuts at all while paused.

use std::time::Duration;

use segscribe::SegmentClock;

const INTERVAL: Duration = Duration::from_secs(30);

#[test]
fn cuts_exactly_at_interval_boundary() {
    let mut clock = SegmentClock::new(INTERVAL, 0);

    assert!(!clock.should_cut(0));
    assert!(!clock.should_cut(29_999));
    assert!(clock.should_cut(30_000));

    // Starting the next segment arms the next boundary.
    clock.begin_segment(30_000);
    assert!(!clock.should_cut(30_001));
    assert!(!clock.should_cut(59_999));
    assert!(clock.should_cut(60_000));
}

#[test]
fn never_cuts_while_paused() {
    let mut clock = SegmentClock::new(INTERVAL, 0);
    clock.pause(10_000);

    assert!(clock.is_paused());
    assert!(!clock.should_cut(40_000));
    assert!(!clock.should_cut(1_000_000));

    // Elapsed active time is frozen at the pause point.
    assert_eq!(clock.elapsed_active_ms(500_000), 10_000);
}

#[test]
fn resume_shifts_reference_so_only_active_time_counts() {
    let mut clock = SegmentClock::new(INTERVAL, 0);
    clock.pause(10_000);
    clock.resume(50_000); // 40s paused

    assert_eq!(clock.elapsed_active_ms(55_000), 15_000);
    assert!(!clock.should_cut(69_999)); // 29 999 ms active
    assert!(clock.should_cut(70_000)); // 30 000 ms active
}

#[test]
fn pause_and_resume_are_idempotent() {
    let mut clock = SegmentClock::new(INTERVAL, 0);

    clock.resume(5_000); // resume without pause: no-op
    assert_eq!(clock.elapsed_active_ms(5_000), 5_000);

    clock.pause(10_000);
    clock.pause(20_000); // second pause keeps the original pause point
    clock.resume(30_000);
    assert_eq!(clock.elapsed_active_ms(30_000), 10_000);
}

#[test]
fn begin_segment_resets_pause_accumulator() {
    let mut clock = SegmentClock::new(INTERVAL, 0);
    clock.pause(5_000);
    clock.resume(15_000);

    clock.begin_segment(40_000);
    assert_eq!(clock.elapsed_active_ms(41_000), 1_000);
}
