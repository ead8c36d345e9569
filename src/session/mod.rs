//! Session scheduling
//!
//! [`SessionScheduler`] walks a [`Protocol`](crate::protocol::Protocol)
//! through its phases against the engine clock, morphing the audio at each
//! phase boundary and emitting progress events to subscribed observers.
//!
//! The scheduler is tick-driven: nothing happens between calls to
//! [`tick`](SessionScheduler::tick). A caller on the wall clock runs
//! [`drive`](SessionScheduler::drive) or its own 100ms loop; tests inject a
//! manual-clock engine and call `tick` after advancing time.

use chrono::Utc;
use log::{debug, info};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

use crate::engine::AudioEngine;
use crate::error::{EngineError, Result};
use crate::protocol::{Phase, Protocol};

pub mod events;

pub use events::{SessionObserver, SessionProgress, SessionRecord, SessionState};

// ============================================================================
// Constants
// ============================================================================

/// Tick cadence of the wall-clock drive loop
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on phase-transition morph time, in seconds
pub const MAX_MORPH_SECS: f64 = 30.0;

/// Fraction of a phase's length spent morphing into it, capped by
/// [`MAX_MORPH_SECS`]
pub const MORPH_FRACTION: f64 = 0.3;

/// Window over which the displayed beat frequency glides after a phase change
const DISPLAY_MORPH_SECS: f64 = 30.0;

/// Minimum listening time before an abandoned session produces a record
const MIN_RECORD_SECS: f64 = 30.0;

// ============================================================================
// Session run state
// ============================================================================

/// Mutable state of one protocol run
#[derive(Debug)]
struct SessionRun {
    run_id: Uuid,
    protocol: Protocol,
    phase_index: usize,
    /// Context time the session started; shifted forward on resume so
    /// elapsed time excludes pauses
    started_at: f64,
    phase_started_at: f64,
    paused_at: Option<f64>,
    /// Beat frequency of the previous phase, kept for display interpolation
    prev_beat_hz: Option<f32>,
    /// Context time the in-flight phase morph settles
    morph_until: Option<f64>,
}

/// What `advance_phase` decided under the run borrow
enum Advance {
    Enter(Phase, usize, f64),
    Finished,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Drives a protocol through the audio engine, one phase at a time
pub struct SessionScheduler {
    engine: AudioEngine,
    state: SessionState,
    run: Option<SessionRun>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl SessionScheduler {
    /// Create a scheduler over an explicit engine (inject a manual-clock
    /// engine for tests and offline rendering)
    pub fn new(engine: AudioEngine) -> Self {
        Self {
            engine,
            state: SessionState::Idle,
            run: None,
            observers: Vec::new(),
        }
    }

    /// Create a scheduler on the wall clock
    pub fn realtime() -> Self {
        Self::new(AudioEngine::realtime())
    }

    /// Subscribe an observer to session events. Observers are notified in
    /// subscription order and never removed.
    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AudioEngine {
        &mut self.engine
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The protocol of the current (or just-completed) run
    pub fn current_protocol(&self) -> Option<&Protocol> {
        self.run.as_ref().map(|run| &run.protocol)
    }

    /// Identifier of the current run
    pub fn run_id(&self) -> Option<Uuid> {
        self.run.as_ref().map(|run| run.run_id)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Validate `protocol` and begin playing its first phase
    ///
    /// Fails with [`EngineError::SessionAlreadyActive`] while a session is
    /// playing, morphing, or paused. A completed or idle scheduler restarts
    /// cleanly.
    pub fn start_session(&mut self, protocol: Protocol) -> Result<()> {
        protocol.validate()?;
        if self.state.is_active() || self.state == SessionState::Paused {
            return Err(EngineError::SessionAlreadyActive);
        }

        let first = protocol.phases[0].clone();
        self.engine.start(&first.to_patch())?;

        let now = self.engine.context().current_time();
        let run_id = Uuid::new_v4();
        info!(
            "session {run_id} started: {} ({} phases, {:.0}s)",
            protocol.id,
            protocol.phases.len(),
            protocol.total_duration_secs()
        );
        self.run = Some(SessionRun {
            run_id,
            protocol,
            phase_index: 0,
            started_at: now,
            phase_started_at: now,
            paused_at: None,
            prev_beat_hz: None,
            morph_until: None,
        });
        self.set_state(SessionState::Playing);
        self.notify(|o| o.on_phase_change(&first, 0));
        Ok(())
    }

    /// Advance the session against the engine clock: emit progress, settle
    /// finished morphs, and cross phase boundaries. No-op unless active.
    pub fn tick(&mut self) {
        self.engine.poll();
        if !self.state.is_active() {
            return;
        }
        let Some(run) = &self.run else {
            return;
        };

        let now = self.engine.context().current_time();
        let total = run.protocol.total_duration_secs();
        let elapsed_total = now - run.started_at;
        let elapsed_phase = now - run.phase_started_at;

        let phase = &run.protocol.phases[run.phase_index];
        let phase_progress = if phase.duration_secs > 0.0 {
            (elapsed_phase / phase.duration_secs).min(1.0)
        } else {
            1.0
        };
        let current_beat_hz = match run.prev_beat_hz {
            Some(prev) => {
                let glide = (elapsed_phase / DISPLAY_MORPH_SECS).min(1.0) as f32;
                prev + (phase.beat_hz - prev) * glide
            }
            None => phase.beat_hz,
        };
        let progress = SessionProgress {
            phase_index: run.phase_index,
            phase_name: phase.name.clone(),
            phase_progress,
            total_progress: if total > 0.0 {
                (elapsed_total / total).min(1.0)
            } else {
                1.0
            },
            elapsed_secs: elapsed_total,
            remaining_secs: (total - elapsed_total).max(0.0),
            current_beat_hz,
        };
        let morph_settled = run.morph_until.is_some_and(|t| now >= t);

        self.notify(|o| o.on_progress(&progress));

        if self.state == SessionState::Morphing && morph_settled {
            if let Some(run) = &mut self.run {
                run.morph_until = None;
            }
            self.set_state(SessionState::Playing);
        }
        if phase_progress >= 1.0 {
            self.advance_phase(now);
        }
    }

    /// Freeze session time and silence the audio. No-op unless active.
    pub fn pause(&mut self) {
        if !self.state.is_active() {
            return;
        }
        let now = self.engine.context().current_time();
        if let Some(run) = &mut self.run {
            run.paused_at = Some(now);
        }
        self.engine.stop();
        self.set_state(SessionState::Paused);
    }

    /// Resume a paused session where it left off
    ///
    /// The pause interval is carved out of session time: elapsed and phase
    /// timers continue from the values they froze at.
    pub fn resume(&mut self) -> Result<()> {
        if self.state != SessionState::Paused {
            return Ok(());
        }
        let now = self.engine.context().current_time();
        let phase = {
            let Some(run) = &mut self.run else {
                return Ok(());
            };
            let paused_for = now - run.paused_at.take().unwrap_or(now);
            run.started_at += paused_for;
            run.phase_started_at += paused_for;
            run.morph_until = None;
            run.protocol.phases[run.phase_index].clone()
        };
        self.engine.start(&phase.to_patch())?;
        self.set_state(SessionState::Playing);
        Ok(())
    }

    /// Stop the session and return to idle
    ///
    /// An abandoned run still produces a (not-completed) record when at
    /// least [`MIN_RECORD_SECS`] of listening time elapsed.
    pub fn stop(&mut self) {
        if self.state == SessionState::Idle {
            return;
        }
        let now = self.engine.context().current_time();
        let record = match (&self.run, self.state) {
            (Some(run), state) if state != SessionState::Complete => {
                let end = run.paused_at.unwrap_or(now);
                let elapsed = end - run.started_at;
                (elapsed >= MIN_RECORD_SECS).then(|| make_record(run, elapsed, false))
            }
            _ => None,
        };
        self.engine.stop();
        self.run = None;
        self.set_state(SessionState::Idle);
        if let Some(record) = record {
            info!(
                "session {} abandoned after {:.0}s",
                record.run_id, record.duration_secs
            );
            self.notify(|o| o.on_record(&record));
        }
    }

    /// Run the session to completion on this thread
    ///
    /// Sleeps between ticks on a wall clock; on a manual clock it advances
    /// time by the tick interval instead, fast-forwarding the whole session.
    pub fn drive(&mut self) {
        let manual = self.engine.context().is_manual();
        while self.state.is_active() {
            if manual {
                self.engine.context_mut().advance(TICK_INTERVAL.as_secs_f64());
            } else {
                thread::sleep(TICK_INTERVAL);
            }
            self.tick();
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn advance_phase(&mut self, now: f64) {
        let decision = {
            let Some(run) = &mut self.run else {
                return;
            };
            let prev_beat = run.protocol.phases[run.phase_index].beat_hz;
            run.phase_index += 1;
            while run
                .protocol
                .phases
                .get(run.phase_index)
                .is_some_and(|p| p.duration_secs <= 0.0)
            {
                debug!(
                    "skipping zero-length phase '{}'",
                    run.protocol.phases[run.phase_index].name
                );
                run.phase_index += 1;
            }
            if run.phase_index >= run.protocol.phases.len() {
                Advance::Finished
            } else {
                let phase = run.protocol.phases[run.phase_index].clone();
                let morph_secs = (phase.duration_secs * MORPH_FRACTION).min(MAX_MORPH_SECS);
                run.phase_started_at = now;
                run.prev_beat_hz = Some(prev_beat);
                run.morph_until = Some(now + morph_secs);
                Advance::Enter(phase, run.phase_index, morph_secs)
            }
        };

        match decision {
            Advance::Finished => self.complete(now),
            Advance::Enter(phase, index, morph_secs) => {
                debug!("entering phase {index} '{}' (morph {morph_secs:.1}s)", phase.name);
                self.engine.morph_to(&phase.to_patch(), morph_secs);
                self.notify(|o| o.on_phase_change(&phase, index));
                self.set_state(SessionState::Morphing);
            }
        }
    }

    fn complete(&mut self, now: f64) {
        self.engine.stop();
        let record = self
            .run
            .as_ref()
            .map(|run| make_record(run, now - run.started_at, true));
        self.set_state(SessionState::Complete);
        self.notify(|o| o.on_complete());
        if let Some(record) = record {
            info!(
                "session {} complete after {:.0}s",
                record.run_id, record.duration_secs
            );
            self.notify(|o| o.on_record(&record));
        }
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.notify(|o| o.on_state_change(state));
    }

    fn notify<F: FnMut(&mut dyn SessionObserver)>(&mut self, mut f: F) {
        for observer in &mut self.observers {
            f(observer.as_mut());
        }
    }
}

fn make_record(run: &SessionRun, duration_secs: f64, completed: bool) -> SessionRecord {
    SessionRecord {
        run_id: run.run_id,
        protocol_id: run.protocol.id.clone(),
        protocol_name: run.protocol.name.clone(),
        category: run.protocol.category,
        completed_at: Utc::now(),
        duration_secs: duration_secs.max(0.0),
        completed,
    }
}

// ============================================================================
// Tests
// ============================================================================
