#![forbid(unsafe_code)]

//! End-to-end playback scenarios on a manual clock.
//!
//!   1. Full run of a registry algorithm at 24 fps
//!   2. Backpressure enters and exits exactly once per window, even when
//!      playback is toggled inside the window
//!   3. Traces past the precompute cap play on demand
//!   4. Finish fires once no matter how often it is provoked
//!   5. Step back inverts step forward for every mutating op
//!   6. Logical time stays monotonic across fps changes
//!   7. Compare mode keeps both sides independent
//!
//! Run:
//!   cargo test -p sortviz-runtime --test playback_scenarios

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use sortviz_algos::AlgorithmRegistry;
use sortviz_core::{Algorithm, Op, SourceMode, Step, StepIter, algorithm, replay};
use sortviz_runtime::{
    Capability, Clock, CompareController, ManualClock, Pane, PlaybackConfig, PlaybackEvent, PlayerState,
};

// ============================================================================
// Helpers
// ============================================================================

fn registry_algorithm(name: &str) -> Algorithm {
    AlgorithmRegistry::builtin().get(name).unwrap().1
}

fn scripted(steps: Vec<Step>) -> Algorithm {
    algorithm(move |_a: Vec<i64>| -> StepIter { Box::new(steps.clone().into_iter()) })
}

fn pane_on(
    alg: Algorithm,
    initial: Vec<i64>,
    config: PlaybackConfig,
) -> (Arc<ManualClock>, Pane, Arc<Mutex<Vec<PlaybackEvent>>>) {
    let clock = Arc::new(ManualClock::new());
    let mut pane = Pane::with_clock(alg, initial, config, clock.clone());
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    pane.subscribe(move |e| sink.lock().unwrap().push(*e));
    (clock, pane, events)
}

/// Advance the clock deadline by deadline until nothing is scheduled.
fn run_to_completion(clock: &ManualClock, pane: &mut Pane) {
    while let Some(deadline) = pane.next_deadline() {
        clock.set(deadline);
        pane.poll().unwrap();
    }
}

fn count(events: &Mutex<Vec<PlaybackEvent>>, pred: impl Fn(&PlaybackEvent) -> bool) -> usize {
    events.lock().unwrap().iter().filter(|e| pred(*e)).count()
}

// ============================================================================
// 1. End-to-end
// ============================================================================

#[test]
fn quick_sort_plays_to_the_end_at_24_fps() {
    let config = PlaybackConfig {
        fps_default: 24,
        ..PlaybackConfig::default()
    };
    let (clock, mut pane, events) = pane_on(registry_algorithm("quick"), vec![9, 1, 8, 2, 7], config);
    assert_eq!(pane.fps(), 24);
    pane.play();
    run_to_completion(&clock, &mut pane);

    let state = pane.state();
    assert!(state.comparisons > 0);
    assert_eq!(state.array, vec![1, 2, 7, 8, 9]);
    assert_eq!(Some(state.step_index), state.total_steps);
    assert_eq!(pane.player_state(), PlayerState::Finished);
    assert_eq!(pane.confirmed(), 0..5);
    assert_eq!(pane.narration(), "Array sorted!");

    let stepped: Vec<usize> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            PlaybackEvent::Stepped(i) => Some(*i),
            _ => None,
        })
        .collect();
    assert_eq!(stepped, (1..=state.step_index).collect::<Vec<_>>());

    let expected_logical = Duration::from_secs(1) / 24 * state.step_index as u32;
    assert_eq!(state.logical_elapsed_seconds, expected_logical.as_secs_f64());
}

#[test]
fn every_builtin_algorithm_finishes_sorted() {
    let registry = AlgorithmRegistry::builtin();
    for info in registry.infos() {
        let (_, alg) = registry.get(info.key).unwrap();
        let (clock, mut pane, _) = pane_on(alg, vec![5, -3, 12, 0, 5, 8, 1], PlaybackConfig::default());
        pane.set_fps(60);
        pane.play();
        run_to_completion(&clock, &mut pane);
        assert_eq!(pane.array(), &[-3, 0, 1, 5, 5, 8, 12], "{}", info.name);
        assert_eq!(pane.step_index(), pane.total_steps(), "{}", info.name);
    }
}

// ============================================================================
// 2. Backpressure
// ============================================================================

#[test]
fn backpressure_enters_and_exits_once() {
    let config = PlaybackConfig {
        fps_default: 60,
        per_tick: 1,
        per_second: 5,
        ..PlaybackConfig::default()
    };
    let trace: Vec<Step> = (0..200).map(|i| Step::compare(i % 3, 3)).collect();
    let (clock, mut pane, events) = pane_on(scripted(trace), vec![0, 1, 2, 3], config);
    pane.play();

    // 60 ticks are owed in the first second; the window admits 5.
    while let Some(deadline) = pane.next_deadline() {
        if deadline >= Duration::from_secs(1) {
            break;
        }
        clock.set(deadline);
        pane.poll().unwrap();
    }
    assert_eq!(pane.step_index(), 5);
    assert!(pane.player().under_backpressure());
    let active = |e: &PlaybackEvent| matches!(e, PlaybackEvent::Backpressure(b) if b.active);
    let cleared = |e: &PlaybackEvent| matches!(e, PlaybackEvent::Backpressure(b) if !b.active);
    assert_eq!(count(&events, active), 1);
    assert_eq!(count(&events, cleared), 0);

    let entry = events
        .lock()
        .unwrap()
        .iter()
        .find_map(|e| match e {
            PlaybackEvent::Backpressure(b) if b.active => Some(*b),
            _ => None,
        })
        .unwrap();
    assert_eq!(entry.reason.map(|r| r.as_str()), Some("per_second_cap"));
    assert_eq!(entry.limit, Some(5));

    // The next window clears it exactly once and admits again.
    for _ in 0..3 {
        let deadline = pane.next_deadline().unwrap();
        clock.set(deadline);
        pane.poll().unwrap();
    }
    assert_eq!(count(&events, active), 1);
    assert_eq!(count(&events, cleared), 1);
    assert_eq!(pane.step_index(), 8);
    assert!(!pane.player().under_backpressure());
}

#[test]
fn toggling_playback_does_not_reopen_the_window() {
    let config = PlaybackConfig {
        fps_default: 60,
        per_tick: 1,
        per_second: 5,
        ..PlaybackConfig::default()
    };
    let trace: Vec<Step> = (0..200).map(|i| Step::compare(i % 3, 3)).collect();
    let (clock, mut pane, events) = pane_on(scripted(trace), vec![0, 1, 2, 3], config);

    for _ in 0..10 {
        pane.play();
        for _ in 0..2 {
            let deadline = pane.next_deadline().unwrap();
            clock.set(deadline + Duration::from_millis(4));
            pane.poll().unwrap();
        }
        pane.toggle_pause();
    }
    assert!(clock.now_mono() < Duration::from_secs(1));
    assert_eq!(pane.step_index(), 5);
    let active = |e: &PlaybackEvent| matches!(e, PlaybackEvent::Backpressure(b) if b.active);
    let cleared = |e: &PlaybackEvent| matches!(e, PlaybackEvent::Backpressure(b) if !b.active);
    assert_eq!(count(&events, active), 1);
    assert_eq!(count(&events, cleared), 0);
}

// ============================================================================
// 3. Capacity fallback
// ============================================================================

#[test]
fn long_traces_play_on_demand() {
    let input: Vec<i64> = (0..150).rev().collect();
    let (_, mut pane, events) = pane_on(registry_algorithm("bubble"), input.clone(), PlaybackConfig::default());
    assert_eq!(pane.run().source_mode(), SourceMode::OnDemand);
    assert!(!pane.capabilities().get(Capability::TrueTotal));
    assert_eq!(pane.total_steps(), 0);

    while pane.step_forward().unwrap() {
        if !pane.is_finished() {
            assert_eq!(pane.total_steps(), 0);
        }
    }
    assert!(pane.is_finished());
    assert!(pane.step_index() > 10_000);
    assert_eq!(pane.total_steps(), pane.step_index());
    let mut sorted = input;
    sorted.sort_unstable();
    assert_eq!(pane.array(), sorted.as_slice());
    assert_eq!(count(&events, |e| matches!(e, PlaybackEvent::Finished)), 1);
}

// ============================================================================
// 4. Finish idempotence
// ============================================================================

#[test]
fn finish_fires_once() {
    let steps = vec![Step::compare(0, 1), Step::swap(0, 1)];
    let (clock, mut pane, events) = pane_on(scripted(steps), vec![2, 1], PlaybackConfig::default());
    pane.play();
    run_to_completion(&clock, &mut pane);
    assert!(pane.is_finished());

    pane.play();
    assert!(!pane.step_forward().unwrap());
    clock.advance(Duration::from_secs(5));
    assert_eq!(pane.poll().unwrap(), 0);
    pane.toggle_pause();

    assert_eq!(count(&events, |e| matches!(e, PlaybackEvent::Finished)), 1);
    assert!(pane.run().is_finished());
    assert_eq!(pane.array(), &[1, 2]);
}

// ============================================================================
// 5. Step-back inversion
// ============================================================================

#[test]
fn step_back_inverts_swap_set_and_shift() {
    let steps = vec![
        Step::swap(0, 2),
        Step::set(1, 40),
        Step::shift(2, 7),
        Step::compare(0, 1),
        Step::shift(0, -3),
    ];
    let initial = vec![3, 1, 4];
    let (_, mut pane, _) = pane_on(scripted(steps.clone()), initial.clone(), PlaybackConfig::default());

    for k in 0..steps.len() {
        assert!(pane.step_forward().unwrap());
        let array = pane.array().to_vec();
        let logical = pane.player().logical();
        let metrics = pane.run().metrics();
        assert_eq!(array, replay(&initial, &steps[..=k]).unwrap());

        assert!(pane.step_back().unwrap());
        assert_eq!(pane.array(), replay(&initial, &steps[..k]).unwrap().as_slice());
        assert!(pane.step_forward().unwrap());

        assert_eq!(pane.array(), array.as_slice(), "op {}", steps[k].op());
        assert_eq!(pane.player().logical(), logical);
        assert_eq!(pane.run().metrics(), metrics);
    }
    assert!(pane.is_finished());

    while pane.step_back().unwrap() {}
    assert_eq!(pane.array(), initial.as_slice());
    assert_eq!(pane.logical_seconds(), 0.0);
    assert_eq!(pane.step_index(), 0);
}

// ============================================================================
// 6. Logical time
// ============================================================================

#[test]
fn logical_time_is_monotonic_across_fps_changes() {
    let trace: Vec<Step> = (0..12).map(|_| Step::compare(0, 1)).collect();
    let (_, mut pane, _) = pane_on(scripted(trace), vec![1, 2], PlaybackConfig::default());
    let mut expected = Duration::ZERO;
    let mut last = 0.0;
    for fps in [24, 5, 60, 1, 33, 24, 2, 60, 59, 10, 3, 24] {
        pane.set_fps(fps);
        pane.step_forward().unwrap();
        expected += Duration::from_secs(1) / fps;
        let now = pane.logical_seconds();
        assert!(now > last, "fps {fps}: {now} <= {last}");
        last = now;
    }
    assert_eq!(pane.player().logical(), expected);
}

#[test]
fn wall_clock_ignores_pauses_but_logical_ignores_wall_clock() {
    let trace: Vec<Step> = (0..1000).map(|_| Step::compare(0, 1)).collect();
    let (clock, mut pane, _) = pane_on(scripted(trace), vec![1, 2], PlaybackConfig::default());
    pane.play();
    for _ in 0..10 {
        let deadline = pane.next_deadline().unwrap();
        clock.set(deadline);
        pane.poll().unwrap();
    }
    pane.pause();
    let wall = pane.elapsed_seconds();
    clock.advance(Duration::from_secs(30));
    assert_eq!(pane.elapsed_seconds(), wall);

    let applied = pane.step_index() as u32;
    assert_eq!(pane.player().logical(), Duration::from_secs(1) / 24 * applied);
}

// ============================================================================
// 7. Compare mode
// ============================================================================

#[test]
fn compare_sides_run_independently_on_copies() {
    let clock = Arc::new(ManualClock::new());
    let dataset = vec![9, 1, 8, 2, 7, 3, 6, 4, 5];
    let mut cc = CompareController::new(
        registry_algorithm("bubble"),
        registry_algorithm("counting"),
        &dataset,
        &PlaybackConfig::default(),
        clock.clone(),
    );
    cc.set_fps(60);
    cc.play();
    let mut first_finisher = None;
    while let Some(deadline) = cc.next_deadline() {
        clock.set(deadline);
        let results = cc.poll();
        assert!(results.left.is_ok() && results.right.is_ok());
        if first_finisher.is_none() && cc.left().is_finished() != cc.right().is_finished() {
            first_finisher = Some(if cc.left().is_finished() { "left" } else { "right" });
            assert!(cc.is_running());
        }
    }
    assert!(cc.is_finished());
    let states = cc.states();
    assert_eq!(states.left.array, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(states.right.array, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert!(states.left.step_index > states.right.step_index + 8);
    assert_eq!(first_finisher, Some("right"));
    assert!(states.left.logical_elapsed_seconds > states.right.logical_elapsed_seconds);
    assert_eq!(dataset, vec![9, 1, 8, 2, 7, 3, 6, 4, 5]);

    cc.reset();
    assert_eq!(cc.left().array(), dataset.as_slice());
    assert_eq!(cc.right().array(), dataset.as_slice());
    assert!(!cc.is_running());
}

// ============================================================================
// Observers
// ============================================================================

#[test]
fn unsubscribed_observers_stop_receiving() {
    let (_, mut pane, events) = pane_on(
        scripted(vec![Step::compare(0, 1), Step::compare(0, 1), Step::compare(0, 1)]),
        vec![1, 2],
        PlaybackConfig::default(),
    );
    let late = Arc::new(Mutex::new(0usize));
    let late_sink = Arc::clone(&late);
    let id = pane.subscribe(move |e| {
        if matches!(e, PlaybackEvent::Stepped(_)) {
            *late_sink.lock().unwrap() += 1;
        }
    });
    pane.step_forward().unwrap();
    assert!(pane.unsubscribe(id));
    pane.step_forward().unwrap();
    assert_eq!(*late.lock().unwrap(), 1);
    assert_eq!(count(&events, |e| matches!(e, PlaybackEvent::Stepped(_))), 2);
    assert!(pane.run().log().iter().all(|s| s.op() == Op::Compare));
}
