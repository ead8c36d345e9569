//! Phase-sequenced entrainment protocols
//!
//! A [`Protocol`] is an ordered list of [`Phase`]s, each describing the
//! synthesis config for a stretch of time. Protocols are pure data: the
//! session scheduler interprets them, the engine never sees them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{ConfigPatch, FrequencyLayerConfig};
use crate::error::{EngineError, Result};

pub mod catalog;

pub use catalog::{
    builtin_protocols, carrier_presets, find_protocol, protocols_by_category, solfeggio_tones,
    CarrierPreset, SolfeggioTone,
};

// ============================================================================
// Categories
// ============================================================================

/// Top-level grouping of the protocol library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolCategory {
    Emotional,
    Physical,
    Cognitive,
    Spiritual,
    Adhd,
}

impl ProtocolCategory {
    pub const ALL: [ProtocolCategory; 5] = [
        ProtocolCategory::Emotional,
        ProtocolCategory::Physical,
        ProtocolCategory::Cognitive,
        ProtocolCategory::Spiritual,
        ProtocolCategory::Adhd,
    ];
}

impl fmt::Display for ProtocolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolCategory::Emotional => "emotional",
            ProtocolCategory::Physical => "physical",
            ProtocolCategory::Cognitive => "cognitive",
            ProtocolCategory::Spiritual => "spiritual",
            ProtocolCategory::Adhd => "adhd",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ProtocolCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "emotional" => Ok(ProtocolCategory::Emotional),
            "physical" => Ok(ProtocolCategory::Physical),
            "cognitive" => Ok(ProtocolCategory::Cognitive),
            "spiritual" => Ok(ProtocolCategory::Spiritual),
            "adhd" => Ok(ProtocolCategory::Adhd),
            other => Err(EngineError::UnknownProtocol {
                id: format!("category:{other}"),
            }),
        }
    }
}

/// How strongly a protocol entrains; informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Gentle,
    Moderate,
    Deep,
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Intensity::Gentle => "gentle",
            Intensity::Moderate => "moderate",
            Intensity::Deep => "deep",
        };
        write!(f, "{name}")
    }
}

/// Suggested listening window; informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
    Anytime,
}

// ============================================================================
// Phases
// ============================================================================

/// One stretch of a protocol with a fixed target configuration
///
/// Optional fields inherit from the running config when absent: a phase that
/// names no carrier keeps whatever carrier the previous phase used. An
/// isochronic rate of `Some(0.0)` explicitly turns the pulse layer off,
/// which is different from `None` (leave it alone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    /// Length in seconds; zero-length phases are legal and skipped at runtime
    pub duration_secs: f64,
    pub beat_hz: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_hz: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solfeggio_hz: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isochronic_rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Phase {
    pub fn new(name: &str, duration_secs: f64, beat_hz: f32) -> Self {
        Self {
            name: name.to_string(),
            duration_secs,
            beat_hz,
            carrier_hz: None,
            solfeggio_hz: Vec::new(),
            isochronic_rate: None,
            description: None,
        }
    }

    pub fn carrier(mut self, hz: f32) -> Self {
        self.carrier_hz = Some(hz);
        self
    }

    pub fn solfeggio(mut self, tones: &[f32]) -> Self {
        self.solfeggio_hz = tones.to_vec();
        self
    }

    pub fn isochronic(mut self, rate: f32) -> Self {
        self.isochronic_rate = Some(rate);
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    /// Express this phase as a patch over the running config
    ///
    /// The solfeggio set is always emitted, so a phase with no tones clears
    /// any tones carried over from the previous phase.
    pub fn to_patch(&self) -> ConfigPatch {
        let mut patch = ConfigPatch::none()
            .beat(self.beat_hz)
            .solfeggio(self.solfeggio_hz.clone());
        if let Some(carrier) = self.carrier_hz {
            patch = patch.carrier(carrier);
        }
        if let Some(rate) = self.isochronic_rate {
            patch = patch.isochronic(rate);
        }
        patch
    }

    /// The full config this phase produces when entered from `base`
    pub fn effective_config(&self, base: &FrequencyLayerConfig) -> FrequencyLayerConfig {
        let mut config = base.clone();
        config.apply(&self.to_patch());
        config
    }

    fn validate(&self) -> Result<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(EngineError::InvalidPhaseDuration {
                name: self.name.clone(),
                duration_secs: self.duration_secs,
            });
        }
        self.effective_config(&FrequencyLayerConfig::default())
            .validate()
    }
}

// ============================================================================
// Protocols
// ============================================================================

/// A named, ordered sequence of phases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String,
    pub name: String,
    pub category: ProtocolCategory,
    pub subcategory: String,
    pub description: String,
    pub benefits: Vec<String>,
    pub phases: Vec<Phase>,
    pub intensity: Intensity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
}

impl Protocol {
    /// Total runtime in seconds (sum of phase durations)
    pub fn total_duration_secs(&self) -> f64 {
        self.phases.iter().map(|p| p.duration_secs).sum()
    }

    /// Reject empty protocols, negative or non-finite phase durations, and
    /// phase configs outside the audible ranges
    pub fn validate(&self) -> Result<()> {
        if self.phases.is_empty() {
            return Err(EngineError::EmptyProtocol {
                name: self.name.clone(),
            });
        }
        for phase in &self.phases {
            phase.validate()?;
        }
        Ok(())
    }

    /// Sessions of five minutes or less, suitable as quick interventions
    pub fn is_micro_session(&self) -> bool {
        self.total_duration_secs() <= 300.0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn two_phase_protocol() -> Protocol {
        Protocol {
            id: "test".into(),
            name: "Test".into(),
            category: ProtocolCategory::Cognitive,
            subcategory: "Test".into(),
            description: String::new(),
            benefits: vec![],
            phases: vec![
                Phase::new("A", 120.0, 10.0).solfeggio(&[528.0]),
                Phase::new("B", 180.0, 6.0).carrier(300.0).isochronic(4.0),
            ],
            intensity: Intensity::Moderate,
            time_of_day: None,
        }
    }

    #[test]
    fn test_total_duration_sums_phases() {
        assert_relative_eq!(two_phase_protocol().total_duration_secs(), 300.0);
    }

    #[test]
    fn test_empty_protocol_rejected() {
        let mut p = two_phase_protocol();
        p.phases.clear();
        assert_eq!(p.validate().unwrap_err().error_code(), "EMPTY_PROTOCOL");
    }

    #[test]
    fn test_negative_phase_duration_rejected() {
        let mut p = two_phase_protocol();
        p.phases[0].duration_secs = -1.0;
        assert_eq!(
            p.validate().unwrap_err().error_code(),
            "INVALID_PHASE_DURATION"
        );
    }

    #[test]
    fn test_zero_phase_duration_allowed() {
        let mut p = two_phase_protocol();
        p.phases[0].duration_secs = 0.0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_phase_beat_rejected() {
        let mut p = two_phase_protocol();
        p.phases[1].beat_hz = 500.0;
        assert_eq!(
            p.validate().unwrap_err().error_code(),
            "FREQUENCY_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_phase_inherits_unspecified_fields() {
        let protocol = two_phase_protocol();
        let mut base = FrequencyLayerConfig::default();
        base.carrier_hz = 250.0;
        base.volume = 0.7;

        let a = protocol.phases[0].effective_config(&base);
        assert_relative_eq!(a.carrier_hz, 250.0);
        assert_relative_eq!(a.beat_hz, 10.0);
        assert_relative_eq!(a.volume, 0.7);
        assert!(a.has_solfeggio(528.0));

        // Phase B names a carrier and no solfeggio set, so the carrier
        // changes and the tones from A are cleared
        let b = protocol.phases[1].effective_config(&a);
        assert_relative_eq!(b.carrier_hz, 300.0);
        assert!(b.solfeggio_hz.is_empty());
        assert_relative_eq!(b.isochronic_rate, 4.0);
    }

    #[test]
    fn test_explicit_zero_isochronic_disables_layer() {
        let mut base = FrequencyLayerConfig::default();
        base.isochronic_rate = 4.0;

        let keep = Phase::new("keep", 60.0, 8.0);
        assert_relative_eq!(keep.effective_config(&base).isochronic_rate, 4.0);

        let off = Phase::new("off", 60.0, 8.0).isochronic(0.0);
        assert_relative_eq!(off.effective_config(&base).isochronic_rate, 0.0);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in ProtocolCategory::ALL {
            assert_eq!(
                category.to_string().parse::<ProtocolCategory>().unwrap(),
                category
            );
        }
        assert!("mystery".parse::<ProtocolCategory>().is_err());
    }

    #[test]
    fn test_protocol_serde_round_trip() {
        let protocol = two_phase_protocol();
        let json = serde_json::to_string(&protocol).unwrap();
        let back: Protocol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, protocol);
    }
}
