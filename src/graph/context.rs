//! Audio output context
//!
//! [`AudioContext`] models the platform audio device: it owns the timebase
//! every ramp and scheduler computation reads, the output sample rate, and a
//! suspended/running lifecycle. The autoplay-unlock policy of browser targets
//! is modeled as an output lock: a locked context refuses to resume until
//! [`AudioContext::unlock_output`] is called (the "user gesture"), and callers
//! are expected to fail soft and retry.

use log::debug;
use std::fmt;
use std::time::Instant;

/// Default output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Lifecycle state of the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    /// Output acquired but not producing audio (initial state)
    #[default]
    Suspended,
    /// Output running; the clock is meaningful for scheduling
    Running,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextState::Suspended => write!(f, "Suspended"),
            ContextState::Running => write!(f, "Running"),
        }
    }
}

#[derive(Debug)]
enum ClockSource {
    /// Wall-clock time measured from context creation
    Wall(Instant),
    /// Manually advanced time, for tests and offline rendering
    Manual(f64),
}

/// The platform audio output abstraction
#[derive(Debug)]
pub struct AudioContext {
    sample_rate: u32,
    state: ContextState,
    clock: ClockSource,
    output_locked: bool,
}

impl AudioContext {
    /// Create a context on the wall clock (live playback)
    pub fn realtime(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            state: ContextState::Suspended,
            clock: ClockSource::Wall(Instant::now()),
            output_locked: false,
        }
    }

    /// Create a context with a manually advanced clock (tests, offline render)
    pub fn manual(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            state: ContextState::Suspended,
            clock: ClockSource::Manual(0.0),
            output_locked: true,
        }
    }

    /// Mark the output as locked pending a user gesture
    pub fn with_locked_output(mut self) -> Self {
        self.output_locked = true;
        self
    }

    /// The user gesture: permits the context to resume
    pub fn unlock_output(&mut self) {
        if self.output_locked {
            self.output_locked = false;
            debug!("audio output unlocked");
        }
    }

    pub fn output_locked(&self) -> bool {
        self.output_locked
    }

    /// Resume a suspended context. Fails soft: returns whether the context is
    /// running afterwards, and never errors while the output is still locked.
    pub fn resume(&mut self) -> bool {
        if self.state == ContextState::Running {
            return true;
        }
        if self.output_locked {
            debug!("resume deferred: output still locked");
            return false;
        }
        self.state = ContextState::Running;
        debug!("audio context running at {} Hz", self.sample_rate);
        true
    }

    /// Suspend the output device
    pub fn suspend(&mut self) {
        self.state = ContextState::Suspended;
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ContextState::Running
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// True when the context runs on a manually advanced clock
    pub fn is_manual(&self) -> bool {
        matches!(self.clock, ClockSource::Manual(_))
    }

    /// Seconds elapsed on the context clock
    pub fn current_time(&self) -> f64 {
        match self.clock {
            ClockSource::Wall(start) => start.elapsed().as_secs_f64(),
            ClockSource::Manual(now) => now,
        }
    }

    /// Advance a manual clock. No-op (with a warning) on a wall clock.
    pub fn advance(&mut self, secs: f64) {
        match &mut self.clock {
            ClockSource::Manual(now) => *now += secs.max(0.0),
            ClockSource::Wall(_) => {
                log::warn!("advance() ignored: context runs on the wall clock");
            }
        }
    }
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::realtime(DEFAULT_SAMPLE_RATE)
    }
}
