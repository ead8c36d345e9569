//! NeuroHarmonic - Brainwave Entrainment Engine
//!
//! NeuroHarmonic synthesizes layered entrainment audio and schedules it
//! through multi-phase sessions:
//! - Binaural beats: a detuned stereo pair whose difference frequency
//!   targets a brainwave band
//! - Solfeggio tones: low-level pure tones layered over the beat
//! - Isochronic pulses: an amplitude-gated tone for speaker playback
//! - Colored noise: a looping white/pink/brown background bed
//!
//! # Architecture
//!
//! The crate splits along the signal path:
//! - [`graph`]: the output context, ramped parameters, and the node graph
//!   the audio is synthesized from
//! - [`engine`]: lifecycle over a single live graph (start, stop, morph)
//! - [`protocol`]: phase-sequenced session definitions and the built-in
//!   library
//! - [`session`]: the tick-driven scheduler that walks a protocol through
//!   the engine and reports progress

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod protocol;
pub mod session;

pub use config::{ConfigPatch, FrequencyLayerConfig, NoiseType};
pub use engine::AudioEngine;
pub use error::{EngineError, Result};
pub use graph::AudioContext;
pub use protocol::{Phase, Protocol};
pub use session::{SessionScheduler, SessionState};
