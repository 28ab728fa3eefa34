use super::*;

fn point(x: u16, y: u16, t_ms: u64) -> Option<TouchPoint> {
    Some(TouchPoint::new(x, y, t_ms))
}

fn tracker() -> ContactTracker {
    ContactTracker::new(DebounceConfig::DEFAULT)
}

#[test]
fn single_noisy_poll_never_becomes_contact() {
    let mut tracker = tracker();

    let frame = tracker.update(0, point(50, 60, 0));
    assert_eq!(frame.count(), 0);
    assert_eq!(frame.pending, 1);

    let frame = tracker.update(20, None);
    assert_eq!(frame.count(), 0);
    assert_eq!(frame.pending, 0);

    let frame = tracker.update(40, None);
    assert_eq!(frame.count(), 0);
    assert_eq!(frame.pending, 0);
}

#[test]
fn contact_becomes_stable_after_press_polls() {
    let mut tracker = tracker();

    assert_eq!(tracker.update(0, point(100, 100, 0)).count(), 0);
    let frame = tracker.update(20, point(102, 99, 20));
    assert_eq!(frame.count(), 1);

    let contact = frame.slot(0).unwrap();
    assert!(contact.stable);
    assert_eq!(contact.first_seen_ms, 0);
    assert_eq!(contact.last_seen_ms, 20);
    assert_eq!(frame.latest, point(102, 99, 20));
}

#[test]
fn absent_poll_restarts_pending_count() {
    let mut tracker = tracker();

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, None);
    assert_eq!(tracker.update(40, point(100, 100, 40)).count(), 0);
    assert_eq!(tracker.update(60, point(100, 100, 60)).count(), 1);
}

#[test]
fn stable_contact_survives_short_dropout() {
    let mut tracker = tracker();

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, point(100, 100, 20));

    let frame = tracker.update(40, None);
    assert_eq!(frame.count(), 1, "one absent poll is below release_polls");

    let frame = tracker.update(60, point(101, 100, 60));
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.slot(0).unwrap().first_seen_ms, 0);
}

#[test]
fn stable_contact_released_after_release_polls() {
    let mut tracker = tracker();

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, point(100, 100, 20));
    assert_eq!(tracker.update(40, None).count(), 1);
    assert_eq!(tracker.update(60, None).count(), 0);
}

#[test]
fn reported_position_is_latest_sample() {
    let mut tracker = tracker();

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, point(104, 100, 20));
    let frame = tracker.update(40, point(130, 110, 40));

    let contact = frame.slot(0).unwrap();
    assert_eq!((contact.point.x, contact.point.y), (130, 110));
}

#[test]
fn alternating_positions_track_two_contacts() {
    let mut tracker = tracker();

    tracker.update(0, point(60, 80, 0));
    tracker.update(20, point(180, 240, 20));
    let frame = tracker.update(40, point(61, 80, 40));
    assert_eq!(frame.count(), 1);
    let frame = tracker.update(60, point(180, 241, 60));
    assert_eq!(frame.count(), 2);

    let a = frame.slot(0).unwrap();
    let b = frame.slot(1).unwrap();
    assert_eq!((a.point.x, a.point.y), (61, 80));
    assert_eq!((b.point.x, b.point.y), (180, 241));
}

#[test]
fn third_location_is_ignored() {
    let mut tracker = tracker();

    tracker.update(0, point(20, 20, 0));
    tracker.update(20, point(200, 20, 20));
    let frame = tracker.update(40, point(110, 300, 40));
    assert!(frame.ignored);
    assert_eq!(frame.pending, 2);

    tracker.update(60, point(20, 20, 60));
    let frame = tracker.update(80, point(200, 20, 80));
    assert_eq!(frame.count(), 2);
    let frame = tracker.update(100, point(110, 300, 100));
    assert!(frame.ignored);
    assert_eq!(frame.count(), 2);
    assert_eq!(frame.ignored_samples, 2);
    assert_eq!(tracker.ignored_samples(), 2);
}

#[test]
fn scattered_noise_does_not_build_contact() {
    let mut tracker = tracker();

    for (idx, x) in [100u16, 130, 160, 190, 220].into_iter().enumerate() {
        let t_ms = idx as u64 * 20;
        let frame = tracker.update(t_ms, point(x, 100, t_ms));
        assert_eq!(frame.count(), 0, "sample {idx}");
    }
}

#[test]
fn unmatched_contact_expires_after_grace() {
    let mut tracker = tracker();

    tracker.update(0, point(60, 80, 0));
    tracker.update(20, point(180, 240, 20));
    tracker.update(40, point(60, 80, 40));
    assert_eq!(tracker.update(60, point(180, 240, 60)).count(), 2);

    // Second finger lifts; first keeps reporting.
    let mut t_ms = 80;
    let mut last = ContactFrame::default();
    while t_ms <= 200 {
        last = tracker.update(t_ms, point(60, 80, t_ms));
        t_ms += 20;
    }
    assert_eq!(last.count(), 1);
    assert!(last.slot(0).is_some());
    assert!(last.slot(1).is_none());
}

#[test]
fn single_press_poll_config_promotes_immediately() {
    let mut tracker = ContactTracker::new(DebounceConfig {
        press_polls: 1,
        ..DebounceConfig::DEFAULT
    });

    let frame = tracker.update(0, point(10, 10, 0));
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.latest, point(10, 10, 0));
}

#[test]
fn slow_cadence_promotes_pending_contact() {
    let mut tracker = tracker();

    assert_eq!(tracker.update(0, point(100, 100, 0)).pending, 1);
    let frame = tracker.update(150, point(100, 100, 150));
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.slot(0).unwrap().first_seen_ms, 0);
}

#[test]
fn slow_cadence_keeps_matched_contact() {
    let mut tracker = tracker();

    for t_ms in [0u64, 150, 300, 450, 600] {
        tracker.update(t_ms, point(100, 100, t_ms));
    }
    let frame = tracker.update(750, point(101, 100, 750));
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.pending, 0);
    assert_eq!(frame.slot(0).unwrap().first_seen_ms, 0);
}

#[test]
fn slow_alternation_keeps_both_contacts() {
    let mut tracker = tracker();

    let mut last = ContactFrame::default();
    for step in 0..8u64 {
        let t_ms = step * 150;
        let sample = if step % 2 == 0 {
            point(60, 80, t_ms)
        } else {
            point(180, 240, t_ms)
        };
        last = tracker.update(t_ms, sample);
    }
    assert_eq!(last.count(), 2);
    assert_eq!(last.slot(0).unwrap().first_seen_ms, 0);
    assert_eq!(last.slot(1).unwrap().first_seen_ms, 150);
}

#[test]
fn drifting_samples_do_not_build_contact() {
    let mut tracker = ContactTracker::new(DebounceConfig {
        press_polls: 3,
        ..DebounceConfig::DEFAULT
    });

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, point(110, 100, 20));
    let frame = tracker.update(40, point(120, 100, 40));
    assert_eq!(frame.count(), 0, "each step is within tolerance of the last");
    assert_eq!(frame.pending, 2);
}

#[test]
fn samples_near_first_one_build_contact() {
    let mut tracker = ContactTracker::new(DebounceConfig {
        press_polls: 3,
        ..DebounceConfig::DEFAULT
    });

    tracker.update(0, point(100, 100, 0));
    tracker.update(20, point(105, 100, 20));
    let frame = tracker.update(40, point(110, 100, 40));
    assert_eq!(frame.count(), 1);
    assert_eq!(frame.latest, point(110, 100, 40));
}
