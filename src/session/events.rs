//! Session states, progress snapshots, and the observer seam

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::protocol::{Phase, ProtocolCategory};

/// Lifecycle of a scheduled session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Playing,
    /// A phase transition's parameter glide is in flight
    Morphing,
    Paused,
    Complete,
}

impl SessionState {
    /// True while session time is advancing (playing or morphing)
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Morphing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Playing => "playing",
            SessionState::Morphing => "morphing",
            SessionState::Paused => "paused",
            SessionState::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// Point-in-time progress snapshot, emitted on every scheduler tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub phase_index: usize,
    pub phase_name: String,
    /// Fraction of the current phase elapsed, 0-1
    pub phase_progress: f64,
    /// Fraction of the whole session elapsed, 0-1
    pub total_progress: f64,
    pub elapsed_secs: f64,
    pub remaining_secs: f64,
    /// Display beat frequency, interpolated across phase transitions so a
    /// UI readout glides instead of jumping
    pub current_beat_hz: f32,
}

/// Durable summary of a finished (or abandoned) session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub run_id: Uuid,
    pub protocol_id: String,
    pub protocol_name: String,
    pub category: ProtocolCategory,
    pub completed_at: DateTime<Utc>,
    /// Listening time in seconds, not the protocol's nominal length
    pub duration_secs: f64,
    /// False when the session was stopped before its final phase ended
    pub completed: bool,
}

/// Subscriber interface for session lifecycle events
///
/// Every method has a no-op default, so observers implement only what they
/// care about. Observers are invoked synchronously from the scheduler tick.
pub trait SessionObserver {
    fn on_state_change(&mut self, _state: SessionState) {}

    fn on_progress(&mut self, _progress: &SessionProgress) {}

    fn on_phase_change(&mut self, _phase: &Phase, _index: usize) {}

    fn on_complete(&mut self) {}

    /// A record was produced: session completed, or abandoned after enough
    /// listening time to be worth keeping
    fn on_record(&mut self, _record: &SessionRecord) {}
}
