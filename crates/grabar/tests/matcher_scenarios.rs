//! End-to-end segmentation scenarios driven through the public API.

use grabar::{
    GrabarError, LifecycleState, MouseButton, PushOutcome, RawEvent, StepKind, StepMatcher, Target,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared notification log: one line per callback firing.
type Log = Rc<RefCell<Vec<String>>>;

fn logging_matcher() -> (StepMatcher, Log) {
    // surface the matcher's tracing output under --nocapture
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut matcher = StepMatcher::new();

    let log_new = Rc::clone(&log);
    matcher.on_new_step(move |step| {
        log_new.borrow_mut().push(format!("new:{:?}", step.kind));
    });
    let log_update = Rc::clone(&log);
    matcher.on_update_step(move |step| {
        log_update
            .borrow_mut()
            .push(format!("update:{:?}:{}", step.kind, step.events.len()));
    });
    let log_end = Rc::clone(&log);
    matcher.on_end_step(move |step| {
        log_end
            .borrow_mut()
            .push(format!("end:{:?}:{}", step.kind, step.events.len()));
    });

    matcher.start();
    (matcher, log)
}

fn button() -> Option<Target> {
    Some(Target::new(1, "button"))
}

fn text_input() -> Option<Target> {
    Some(Target::new(2, "input"))
}

#[test]
fn scenario_click_is_three_events() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 10.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(80, 10.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::click(81, 10.0, 10.0), button())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::Click);
    assert_eq!(step.events.len(), 3);
}

#[test]
fn scenario_down_move_move_up_click_is_one_drag() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 10.0, 10.0), button())
        .unwrap();
    // spaced past the 50ms sample throttle so both moves survive
    matcher
        .push_event(RawEvent::pointer_move(60, 14.0, 16.0), None)
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_move(120, 20.0, 24.0), None)
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(200, 20.0, 24.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::click(201, 20.0, 24.0), button())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::Drag);
    assert_eq!(step.events.len(), 5);
}

#[test]
fn scenario_scroll_steps_split_per_wheel_target() {
    let (mut matcher, log) = logging_matcher();
    let t1 = Some(Target::new(10, "div"));
    let t2 = Some(Target::new(11, "div"));

    matcher.push_event(RawEvent::wheel(0, 0.0, 5.0), t1.clone()).unwrap();
    matcher
        .push_event(RawEvent::scroll(40, 0.0, 120.0), t1.clone())
        .unwrap();
    matcher.push_event(RawEvent::scroll(300, 0.0, 260.0), t1).unwrap();
    // second wheel on another container: the first SCROLL step ends here,
    // with the buffered scroll flushed into it first
    matcher.push_event(RawEvent::wheel(600, 0.0, 5.0), t2).unwrap();

    assert!(log.borrow().contains(&"end:Scroll:3".to_string()));
    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::Scroll);
    assert_eq!(step.events.len(), 1);
}

#[test]
fn scenario_second_click_within_gap_is_double_click() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 10.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(5, 10.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::click(10, 10.0, 10.0), button())
        .unwrap();
    // 100ms after the click: inside the 350ms gap
    matcher
        .push_event(RawEvent::pointer_down(110, 10.0, 10.0), button())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::DoubleClick);
    assert_eq!(step.events.len(), 4);
}

#[test]
fn scenario_text_run_is_one_step() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::key_down(0, "a", "KeyA"), text_input())
        .unwrap();
    matcher
        .push_event(RawEvent::key_press(1, "a", "KeyA"), text_input())
        .unwrap();
    matcher
        .push_event(RawEvent::text_input(2, "a", "a"), text_input())
        .unwrap();
    matcher
        .push_event(RawEvent::text_change(3, "a"), text_input())
        .unwrap();
    matcher
        .push_event(RawEvent::key_up(4, "a", "KeyA"), text_input())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::Text);
    assert_eq!(step.events.len(), 5);
}

#[test]
fn scenario_special_key_opens_keypress_over_input() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::key_down(0, "F1", "F1"), text_input())
        .unwrap();

    assert_eq!(matcher.current_step().unwrap().kind, StepKind::KeyPress);
}

#[test]
fn boundary_double_click_gap_is_inclusive() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 1.0, 1.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(5, 1.0, 1.0), button())
        .unwrap();
    matcher.push_event(RawEvent::click(10, 1.0, 1.0), button()).unwrap();
    // exactly 350ms after the click
    matcher
        .push_event(RawEvent::pointer_down(360, 1.0, 1.0), button())
        .unwrap();

    assert_eq!(matcher.current_step().unwrap().kind, StepKind::DoubleClick);
}

#[test]
fn boundary_jitter_move_is_not_a_drag() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 10.0, 10.0), button())
        .unwrap();
    // same coordinates as the down, immediately after
    matcher
        .push_event(RawEvent::pointer_move(5, 10.0, 10.0), None)
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(80, 10.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::click(81, 10.0, 10.0), button())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::Click);
    assert_eq!(step.events.len(), 3);
}

#[test]
fn boundary_triple_click_does_not_chain() {
    let (mut matcher, log) = logging_matcher();

    for (base, expect_double) in [(0u64, false), (100, true)] {
        matcher
            .push_event(RawEvent::pointer_down(base, 1.0, 1.0), button())
            .unwrap();
        matcher
            .push_event(RawEvent::pointer_up(base + 5, 1.0, 1.0), button())
            .unwrap();
        matcher
            .push_event(RawEvent::click(base + 10, 1.0, 1.0), button())
            .unwrap();
        if expect_double {
            assert_eq!(matcher.current_step().unwrap().kind, StepKind::DoubleClick);
        }
    }
    // third qualifying click: the open DOUBLE_CLICK ends, a fresh CLICK opens
    matcher
        .push_event(RawEvent::pointer_down(200, 1.0, 1.0), button())
        .unwrap();

    assert_eq!(matcher.current_step().unwrap().kind, StepKind::Click);
    assert_eq!(matcher.current_step().unwrap().events.len(), 1);
    let ends: Vec<_> = log
        .borrow()
        .iter()
        .filter(|line| line.starts_with("end:"))
        .cloned()
        .collect();
    assert_eq!(ends, vec!["end:DoubleClick:6".to_string()]);
}

#[test]
fn emission_end_always_precedes_replacement_new() {
    let (mut matcher, log) = logging_matcher();

    matcher
        .push_event(RawEvent::pointer_down(0, 1.0, 1.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::key_down(500, "a", "KeyA"), text_input())
        .unwrap();
    matcher
        .push_event(RawEvent::key_down(2000, "Enter", "Enter"), text_input())
        .unwrap();

    // every close that reroutes produces end directly followed by new
    let log = log.borrow();
    let kinds: Vec<&str> = log.iter().map(|l| l.split(':').next().unwrap()).collect();
    assert_eq!(kinds, vec!["new", "end", "new", "end", "new"]);
}

#[test]
fn emission_balance_never_exceeds_one_open_step() {
    let (mut matcher, log) = logging_matcher();
    let t1 = Some(Target::new(5, "div"));

    let stream = vec![
        (RawEvent::pointer_down(0, 1.0, 1.0), button()),
        (RawEvent::pointer_up(20, 1.0, 1.0), button()),
        (RawEvent::click(21, 1.0, 1.0), button()),
        (RawEvent::key_down(400, "a", "KeyA"), text_input()),
        (RawEvent::wheel(900, 0.0, 4.0), t1.clone()),
        (RawEvent::scroll(950, 0.0, 40.0), t1),
        (RawEvent::Blur { timestamp: 2500 }, None),
        (RawEvent::pointer_down(3000, 9.0, 9.0), button()),
    ];
    for (event, target) in stream {
        matcher.push_event(event, target).unwrap();
    }

    let mut open = 0i64;
    for line in log.borrow().iter() {
        match line.split(':').next().unwrap() {
            "new" => open += 1,
            "end" => open -= 1,
            _ => {}
        }
        assert!((0..=1).contains(&open), "open-step balance violated: {open}");
    }
}

#[test]
fn determinism_same_stream_same_steps() {
    let stream = || {
        vec![
            (RawEvent::pointer_down(0, 1.0, 1.0), button()),
            (RawEvent::pointer_move(60, 5.0, 6.0), None),
            (RawEvent::pointer_move(120, 9.0, 12.0), None),
            (RawEvent::pointer_up(200, 9.0, 12.0), button()),
            (RawEvent::click(201, 9.0, 12.0), button()),
            (RawEvent::key_down(700, "a", "KeyA"), text_input()),
            (RawEvent::text_input(710, "a", "a"), text_input()),
            (RawEvent::wheel(1500, 0.0, 3.0), Some(Target::new(9, "div"))),
            (RawEvent::scroll(1550, 0.0, 30.0), Some(Target::new(9, "div"))),
            (RawEvent::Blur { timestamp: 4000 }, None),
        ]
    };

    let run = || {
        let (mut matcher, log) = logging_matcher();
        for (event, target) in stream() {
            matcher.push_event(event, target).unwrap();
        }
        let result = log.borrow().clone();
        result
    };

    assert_eq!(run(), run());
}

#[test]
fn lifecycle_follows_the_original_transition_table() {
    let mut matcher = StepMatcher::new();
    assert_eq!(matcher.lifecycle(), LifecycleState::Inactive);

    matcher.start();
    assert_eq!(matcher.lifecycle(), LifecycleState::Active);
    matcher.suspend();
    assert_eq!(matcher.lifecycle(), LifecycleState::Suspended);
    matcher.start();
    assert_eq!(matcher.lifecycle(), LifecycleState::Active);
    matcher.stop();
    assert_eq!(matcher.lifecycle(), LifecycleState::Inactive);
    matcher.suspend();
    assert_eq!(matcher.lifecycle(), LifecycleState::Inactive);
}

#[test]
fn lifecycle_push_rules() {
    let mut matcher = StepMatcher::new();
    assert_eq!(
        matcher.push_event(RawEvent::click(0, 1.0, 1.0), button()),
        Err(GrabarError::Inactive)
    );

    matcher.start();
    assert_eq!(
        matcher
            .push_event(RawEvent::pointer_down(0, 1.0, 1.0), button())
            .unwrap(),
        PushOutcome::Processed
    );

    matcher.suspend();
    assert_eq!(
        matcher
            .push_event(RawEvent::pointer_up(10, 1.0, 1.0), button())
            .unwrap(),
        PushOutcome::Dropped
    );

    // resume: the suspended step is still accumulating
    matcher.start();
    matcher
        .push_event(RawEvent::pointer_up(20, 1.0, 1.0), button())
        .unwrap();
    assert_eq!(matcher.current_step().unwrap().events.len(), 2);

    matcher.stop();
    assert!(matcher.current_step().is_none());
}

#[test]
fn right_click_segments_separately() {
    let (mut matcher, _log) = logging_matcher();

    matcher
        .push_event(
            RawEvent::pointer_down_with(0, 1.0, 1.0, MouseButton::Secondary),
            button(),
        )
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(10, 1.0, 1.0), button())
        .unwrap();

    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::RightClick);
    assert_eq!(step.events.len(), 2);
}

#[test]
fn browse_file_survives_picker_blur() {
    let (mut matcher, log) = logging_matcher();
    let file_input = Some(Target::new(3, "input").with_attribute("type", "file"));

    matcher
        .push_event(RawEvent::pointer_down(0, 1.0, 1.0), file_input.clone())
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_up(10, 1.0, 1.0), file_input.clone())
        .unwrap();
    matcher
        .push_event(RawEvent::click(11, 1.0, 1.0), file_input.clone())
        .unwrap();
    // the native dialog takes focus
    matcher
        .push_event(RawEvent::Blur { timestamp: 30 }, None)
        .unwrap();
    matcher
        .push_event(
            RawEvent::FileSelection {
                timestamp: 1200,
                files: vec![grabar::FileInfo {
                    name: "report.pdf".to_string(),
                    size: 4096,
                }],
            },
            file_input,
        )
        .unwrap();

    assert!(log.borrow().iter().all(|line| !line.starts_with("end:")));
    let step = matcher.current_step().unwrap();
    assert_eq!(step.kind, StepKind::BrowseFile);
    assert_eq!(step.events.len(), 4);
}

#[test]
fn unknown_steps_are_reported_not_dropped() {
    let (mut matcher, log) = logging_matcher();

    // a scroll with no preceding wheel has no classification
    matcher
        .push_event(RawEvent::scroll(0, 0.0, 10.0), button())
        .unwrap();
    matcher
        .push_event(RawEvent::pointer_down(600, 1.0, 1.0), button())
        .unwrap();

    let log = log.borrow();
    assert_eq!(log[0], "new:Unknown");
    assert!(log.contains(&"end:Unknown:1".to_string()));
}
