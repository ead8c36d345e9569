//! Error handling for NeuroHarmonic Core
//!
//! Invalid *input* (empty protocols, negative durations, out-of-range
//! frequencies) is rejected with an error at the API boundary. Invalid-*state*
//! calls (morphing a stopped engine, pausing twice) are deliberately no-ops
//! and never reach this type.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    // Protocol Validation Errors
    #[error("Protocol '{name}' has no phases")]
    EmptyProtocol { name: String },

    #[error("Phase '{name}' has a negative duration: {duration_secs}s")]
    InvalidPhaseDuration { name: String, duration_secs: f64 },

    #[error("Unknown protocol: {id}")]
    UnknownProtocol { id: String },

    // Config Validation Errors
    #[error("{field} out of range: {value} Hz (expected {min}-{max} Hz)")]
    FrequencyOutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    // Synthesis Errors
    #[error("Invalid noise sample count: {count} (must be > 0)")]
    InvalidSampleCount { count: usize },

    #[error("Noise type 'none' has no buffer to generate")]
    NoiselessBuffer,

    // Session Errors
    #[error("A session is already active (stop it before starting another)")]
    SessionAlreadyActive,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV export failed: {reason}")]
    WavExport { reason: String },

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::EmptyProtocol { .. } => "EMPTY_PROTOCOL",
            EngineError::InvalidPhaseDuration { .. } => "INVALID_PHASE_DURATION",
            EngineError::UnknownProtocol { .. } => "UNKNOWN_PROTOCOL",
            EngineError::FrequencyOutOfRange { .. } => "FREQUENCY_OUT_OF_RANGE",
            EngineError::InvalidSampleCount { .. } => "INVALID_SAMPLE_COUNT",
            EngineError::NoiselessBuffer => "NOISELESS_BUFFER",
            EngineError::SessionAlreadyActive => "SESSION_ALREADY_ACTIVE",
            EngineError::Io(_) => "IO_ERROR",
            EngineError::WavExport { .. } => "WAV_EXPORT_ERROR",
            EngineError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check whether this error indicates bad caller input (as opposed to an
    /// environment failure such as I/O)
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyProtocol { .. }
                | EngineError::InvalidPhaseDuration { .. }
                | EngineError::UnknownProtocol { .. }
                | EngineError::FrequencyOutOfRange { .. }
                | EngineError::InvalidSampleCount { .. }
                | EngineError::NoiselessBuffer
                | EngineError::SessionAlreadyActive
        )
    }
}
