//! Integration Tests
//!
//! End-to-end tests for session scheduling over the synthesis engine,
//! driven on a manual clock so whole sessions run in milliseconds.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use neuroharmonic::protocol::{find_protocol, Intensity, ProtocolCategory};
use neuroharmonic::session::{
    SessionObserver, SessionProgress, SessionRecord, SessionScheduler, SessionState,
};
use neuroharmonic::{AudioContext, AudioEngine, Phase, Protocol};

fn test_scheduler() -> SessionScheduler {
    let mut ctx = AudioContext::manual(44_100);
    ctx.unlock_output();
    SessionScheduler::new(AudioEngine::new(ctx))
}

fn protocol_from(phases: Vec<Phase>) -> Protocol {
    Protocol {
        id: "custom".into(),
        name: "Custom".into(),
        category: ProtocolCategory::Cognitive,
        subcategory: "Test".into(),
        description: String::new(),
        benefits: vec![],
        phases,
        intensity: Intensity::Moderate,
        time_of_day: None,
    }
}

fn advance(scheduler: &mut SessionScheduler, secs: f64) {
    let ticks = (secs / 0.1).round() as usize;
    for _ in 0..ticks {
        scheduler.engine_mut().context_mut().advance(0.1);
        scheduler.tick();
    }
}

#[derive(Clone, Default)]
struct Spy {
    progress: Rc<RefCell<Vec<SessionProgress>>>,
    records: Rc<RefCell<Vec<SessionRecord>>>,
    states: Rc<RefCell<Vec<SessionState>>>,
}

impl SessionObserver for Spy {
    fn on_progress(&mut self, progress: &SessionProgress) {
        self.progress.borrow_mut().push(progress.clone());
    }
    fn on_record(&mut self, record: &SessionRecord) {
        self.records.borrow_mut().push(record.clone());
    }
    fn on_state_change(&mut self, state: SessionState) {
        self.states.borrow_mut().push(state);
    }
}

// === Whole-session playback ===

#[test]
fn test_builtin_protocol_runs_to_completion() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(find_protocol("focus-boost").unwrap())
        .unwrap();
    scheduler.drive();

    assert_eq!(scheduler.state(), SessionState::Complete);
    assert!(!scheduler.engine().is_playing());

    let records = spy.records.borrow();
    assert_eq!(records.len(), 1);
    assert!(records[0].completed);
    assert_eq!(records[0].protocol_id, "focus-boost");
    assert_relative_eq!(records[0].duration_secs, 120.0, epsilon = 0.2);
}

#[test]
fn test_session_walks_state_machine() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    // Second phase is long enough that its entry morph is observable
    scheduler
        .start_session(protocol_from(vec![
            Phase::new("warmup", 2.0, 10.0),
            Phase::new("main", 60.0, 6.0),
        ]))
        .unwrap();
    advance(&mut scheduler, 2.1);
    advance(&mut scheduler, 70.0);

    let states = spy.states.borrow();
    assert_eq!(
        states.as_slice(),
        &[
            SessionState::Playing,
            SessionState::Morphing,
            SessionState::Playing,
            SessionState::Complete,
        ]
    );
}

#[test]
fn test_progress_is_monotonic() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(protocol_from(vec![
            Phase::new("a", 3.0, 10.0),
            Phase::new("b", 3.0, 6.0),
        ]))
        .unwrap();
    scheduler.drive();

    let progress = spy.progress.borrow();
    assert!(!progress.is_empty());
    assert!(progress
        .windows(2)
        .all(|w| w[1].total_progress >= w[0].total_progress));
    assert!(progress
        .windows(2)
        .all(|w| w[1].elapsed_secs >= w[0].elapsed_secs));
    assert_relative_eq!(progress.last().unwrap().total_progress, 1.0);
    assert_relative_eq!(progress.last().unwrap().remaining_secs, 0.0);
}

#[test]
fn test_audio_morphs_across_phase_boundary() {
    let mut scheduler = test_scheduler();
    scheduler
        .start_session(protocol_from(vec![
            Phase::new("alpha", 2.0, 10.0).carrier(200.0),
            Phase::new("theta", 100.0, 4.0),
        ]))
        .unwrap();

    advance(&mut scheduler, 2.0);
    let (l0, r0) = scheduler.engine().binaural_frequencies().unwrap();
    assert_relative_eq!(r0 - l0, 10.0, epsilon = 0.05);

    // The second phase morphs in over 30s (capped), so halfway through the
    // morph the beat reads between the two targets
    advance(&mut scheduler, 15.0);
    let (l, r) = scheduler.engine().binaural_frequencies().unwrap();
    let beat = r - l;
    assert!(beat < 9.0 && beat > 5.0, "beat not gliding: {beat}");

    advance(&mut scheduler, 20.0);
    let (l, r) = scheduler.engine().binaural_frequencies().unwrap();
    assert_relative_eq!(r - l, 4.0, epsilon = 0.05);
}

// === Pause / resume ===

#[test]
fn test_pause_resume_preserves_elapsed_time() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(protocol_from(vec![
            Phase::new("a", 10.0, 10.0),
            Phase::new("b", 10.0, 6.0),
        ]))
        .unwrap();
    advance(&mut scheduler, 4.0);
    scheduler.pause();
    assert_eq!(scheduler.state(), SessionState::Paused);
    assert!(!scheduler.engine().is_playing());

    // Paused wall time is not session time
    advance(&mut scheduler, 120.0);
    scheduler.resume().unwrap();
    advance(&mut scheduler, 0.1);

    let progress = spy.progress.borrow();
    let latest = progress.last().unwrap();
    assert_relative_eq!(latest.elapsed_secs, 4.1, epsilon = 0.01);
    assert_eq!(latest.phase_index, 0);

    drop(progress);
    scheduler.drive();
    assert_eq!(scheduler.state(), SessionState::Complete);
}

#[test]
fn test_completion_happens_exactly_once() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(protocol_from(vec![Phase::new("a", 1.0, 10.0)]))
        .unwrap();
    scheduler.drive();
    // Extra ticks after completion change nothing
    advance(&mut scheduler, 5.0);

    assert_eq!(spy.records.borrow().len(), 1);
    let completes = spy
        .states
        .borrow()
        .iter()
        .filter(|s| **s == SessionState::Complete)
        .count();
    assert_eq!(completes, 1);
}

// === Records ===

#[test]
fn test_early_stop_produces_incomplete_record() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(find_protocol("anxiety-relief").unwrap())
        .unwrap();
    advance(&mut scheduler, 90.0);
    scheduler.stop();

    assert_eq!(scheduler.state(), SessionState::Idle);
    let records = spy.records.borrow();
    assert_eq!(records.len(), 1);
    assert!(!records[0].completed);
    assert_eq!(records[0].category, ProtocolCategory::Emotional);
    assert_relative_eq!(records[0].duration_secs, 90.0, epsilon = 0.01);
}

#[test]
fn test_brief_listen_leaves_no_record() {
    let mut scheduler = test_scheduler();
    let spy = Spy::default();
    scheduler.subscribe(Box::new(spy.clone()));

    scheduler
        .start_session(find_protocol("sleep-induction").unwrap())
        .unwrap();
    advance(&mut scheduler, 10.0);
    scheduler.stop();

    assert!(spy.records.borrow().is_empty());
}

// === Engine interplay ===

#[test]
fn test_scheduler_restart_reuses_engine() {
    let mut scheduler = test_scheduler();
    scheduler
        .start_session(protocol_from(vec![Phase::new("a", 1.0, 10.0)]))
        .unwrap();
    scheduler.drive();
    assert_eq!(scheduler.state(), SessionState::Complete);

    scheduler
        .start_session(protocol_from(vec![Phase::new("b", 1.0, 6.0)]))
        .unwrap();
    assert_eq!(scheduler.state(), SessionState::Playing);
    assert!(scheduler.engine().is_playing());
    scheduler.drive();
    assert_eq!(scheduler.state(), SessionState::Complete);
}

#[test]
fn test_phase_config_reaches_the_graph() {
    let mut scheduler = test_scheduler();
    scheduler
        .start_session(protocol_from(vec![Phase::new("iso", 60.0, 6.0)
            .solfeggio(&[852.0])
            .isochronic(4.5)]))
        .unwrap();

    let config = scheduler.engine().current_config();
    assert!(config.has_solfeggio(852.0));
    assert_relative_eq!(config.isochronic_rate, 4.5);
    // 1 master + 4 binaural + 2 solfeggio + 3 isochronic
    assert_eq!(scheduler.engine().active_node_count(), 10);
}
