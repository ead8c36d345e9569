//! Signal graph construction and scheduling primitives
//!
//! Everything below the engine: the output context and its clock, ramped
//! parameters, node types, noise buffers, and the layered synthesis graph.

pub mod context;
pub mod nodes;
pub mod noise;
pub mod param;
pub mod signal;

pub use context::{AudioContext, ContextState, DEFAULT_SAMPLE_RATE};
pub use nodes::{BufferSource, GainNode, Oscillator, Waveform};
pub use param::AudioParam;
pub use signal::SignalGraph;
