//! Frequency layer configuration
//!
//! [`FrequencyLayerConfig`] describes the desired audio state at an instant:
//! the binaural pair, layered solfeggio tones, the isochronic pulse, and the
//! noise bed. [`ConfigPatch`] is the sparse companion type used for partial
//! updates — a missing field always means "retain the previous value".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Lowest accepted carrier/tone frequency in Hz
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

/// Highest accepted carrier/tone frequency in Hz
pub const MAX_FREQUENCY_HZ: f32 = 1500.0;

/// Highest accepted binaural beat frequency in Hz
pub const MAX_BEAT_HZ: f32 = 100.0;

/// Highest accepted isochronic pulse rate in pulses/sec
pub const MAX_ISOCHRONIC_RATE: f32 = 40.0;

/// Default carrier frequency in Hz (a warm, centered tone)
pub const DEFAULT_CARRIER_HZ: f32 = 200.0;

/// Default binaural beat frequency in Hz (alpha band)
pub const DEFAULT_BEAT_HZ: f32 = 10.0;

/// Default master volume
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Two solfeggio frequencies closer than this are considered the same tone
pub(crate) const FREQUENCY_EPSILON: f32 = 1e-3;

// ============================================================================
// Noise Type
// ============================================================================

/// Colored-noise selection for the background noise layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    White,
    Pink,
    Brown,
    #[default]
    None,
}

impl NoiseType {
    /// True when no noise layer should exist
    pub fn is_none(&self) -> bool {
        matches!(self, NoiseType::None)
    }
}

impl fmt::Display for NoiseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseType::White => write!(f, "white"),
            NoiseType::Pink => write!(f, "pink"),
            NoiseType::Brown => write!(f, "brown"),
            NoiseType::None => write!(f, "none"),
        }
    }
}

// ============================================================================
// Brainwave Band
// ============================================================================

/// Nominal brainwave band implied by a binaural beat frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveBand {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl BrainwaveBand {
    /// Classify a beat frequency into its band
    pub fn from_beat_hz(beat_hz: f32) -> Self {
        if beat_hz <= 4.0 {
            BrainwaveBand::Delta
        } else if beat_hz <= 8.0 {
            BrainwaveBand::Theta
        } else if beat_hz <= 13.0 {
            BrainwaveBand::Alpha
        } else if beat_hz <= 30.0 {
            BrainwaveBand::Beta
        } else {
            BrainwaveBand::Gamma
        }
    }

    /// Inclusive (low, high) beat range for this band in Hz
    pub fn range(&self) -> (f32, f32) {
        match self {
            BrainwaveBand::Delta => (0.5, 4.0),
            BrainwaveBand::Theta => (4.0, 8.0),
            BrainwaveBand::Alpha => (8.0, 13.0),
            BrainwaveBand::Beta => (13.0, 30.0),
            BrainwaveBand::Gamma => (30.0, 100.0),
        }
    }
}

impl fmt::Display for BrainwaveBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrainwaveBand::Delta => write!(f, "Delta"),
            BrainwaveBand::Theta => write!(f, "Theta"),
            BrainwaveBand::Alpha => write!(f, "Alpha"),
            BrainwaveBand::Beta => write!(f, "Beta"),
            BrainwaveBand::Gamma => write!(f, "Gamma"),
        }
    }
}

// ============================================================================
// Frequency Layer Config
// ============================================================================

/// The effective audio state of the synthesis graph at an instant
///
/// Binaural convention: the beat is centered on the carrier. The left ear
/// receives `carrier - beat/2` and the right ear `carrier + beat/2`, so the
/// audible center frequency is always the configured carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyLayerConfig {
    /// Base tone of the binaural pair in Hz
    pub carrier_hz: f32,
    /// Left/right difference perceived as the binaural beat, in Hz
    pub beat_hz: f32,
    /// Master output level, 0-1
    pub volume: f32,
    /// Additional pure tones layered at low volume (unique, order irrelevant)
    pub solfeggio_hz: Vec<f32>,
    /// Amplitude-gating rate of the isochronic layer in pulses/sec; 0 disables
    pub isochronic_rate: f32,
    /// Colored-noise selection for the background layer
    pub noise: NoiseType,
    /// Noise layer level, 0-1
    pub noise_volume: f32,
}

impl Default for FrequencyLayerConfig {
    fn default() -> Self {
        Self {
            carrier_hz: DEFAULT_CARRIER_HZ,
            beat_hz: DEFAULT_BEAT_HZ,
            volume: DEFAULT_VOLUME,
            solfeggio_hz: Vec::new(),
            isochronic_rate: 0.0,
            noise: NoiseType::None,
            noise_volume: 0.0,
        }
    }
}

/// Widest beat a carrier can support with both ears of the centered pair
/// still inside [`MIN_FREQUENCY_HZ`]..=[`MAX_FREQUENCY_HZ`]
pub fn max_beat_for_carrier(carrier_hz: f32) -> f32 {
    let headroom = (carrier_hz - MIN_FREQUENCY_HZ).min(MAX_FREQUENCY_HZ - carrier_hz);
    (2.0 * headroom).clamp(0.0, MAX_BEAT_HZ)
}

impl FrequencyLayerConfig {
    /// The (left, right) oscillator frequencies implied by carrier and beat
    pub fn binaural_pair(&self) -> (f32, f32) {
        let half_beat = self.beat_hz / 2.0;
        (self.carrier_hz - half_beat, self.carrier_hz + half_beat)
    }

    /// The brainwave band implied by the beat frequency
    pub fn band(&self) -> BrainwaveBand {
        BrainwaveBand::from_beat_hz(self.beat_hz)
    }

    /// True when the solfeggio set contains `hz`
    pub fn has_solfeggio(&self, hz: f32) -> bool {
        self.solfeggio_hz
            .iter()
            .any(|&f| (f - hz).abs() < FREQUENCY_EPSILON)
    }

    /// Apply a sparse patch atomically. Missing fields retain their previous
    /// values; the solfeggio set is replaced wholesale and deduplicated.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(carrier) = patch.carrier_hz {
            self.carrier_hz = carrier;
        }
        if let Some(beat) = patch.beat_hz {
            self.beat_hz = beat;
        }
        if let Some(volume) = patch.volume {
            self.volume = volume;
        }
        if let Some(ref tones) = patch.solfeggio_hz {
            self.solfeggio_hz.clear();
            for &hz in tones {
                if !self.has_solfeggio(hz) {
                    self.solfeggio_hz.push(hz);
                }
            }
        }
        if let Some(rate) = patch.isochronic_rate {
            self.isochronic_rate = rate;
        }
        if let Some(noise) = patch.noise {
            self.noise = noise;
        }
        if let Some(noise_volume) = patch.noise_volume {
            self.noise_volume = noise_volume;
        }
        self.clamp_levels();
    }

    /// Clamp volumes into [0, 1]. Levels originate from continuous UI
    /// controls and are always clamped rather than rejected.
    pub fn clamp_levels(&mut self) {
        self.volume = self.volume.clamp(0.0, 1.0);
        self.noise_volume = self.noise_volume.clamp(0.0, 1.0);
    }

    /// Clamp every field into its documented range. Used for values arriving
    /// from continuous UI controls, where clamping beats rejecting.
    pub fn clamp_ranges(&mut self) {
        self.carrier_hz = self.carrier_hz.clamp(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ);
        self.beat_hz = self
            .beat_hz
            .clamp(0.0, max_beat_for_carrier(self.carrier_hz));
        self.isochronic_rate = self.isochronic_rate.clamp(0.0, MAX_ISOCHRONIC_RATE);
        self.solfeggio_hz
            .retain(|hz| (MIN_FREQUENCY_HZ..=MAX_FREQUENCY_HZ).contains(hz));
        self.clamp_levels();
    }

    /// Validate frequency fields against the documented audible ranges,
    /// including the derived binaural pair: a carrier and beat that are each
    /// in range can still push an ear below [`MIN_FREQUENCY_HZ`]
    pub fn validate(&self) -> Result<()> {
        check_range("carrier_hz", self.carrier_hz, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)?;
        check_range(
            "beat_hz",
            self.beat_hz,
            0.0,
            max_beat_for_carrier(self.carrier_hz),
        )?;
        check_range("isochronic_rate", self.isochronic_rate, 0.0, MAX_ISOCHRONIC_RATE)?;
        for &hz in &self.solfeggio_hz {
            check_range("solfeggio_hz", hz, MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ)?;
        }
        Ok(())
    }

    /// Express this full config as a patch (every field present)
    pub fn to_patch(&self) -> ConfigPatch {
        ConfigPatch {
            carrier_hz: Some(self.carrier_hz),
            beat_hz: Some(self.beat_hz),
            volume: Some(self.volume),
            solfeggio_hz: Some(self.solfeggio_hz.clone()),
            isochronic_rate: Some(self.isochronic_rate),
            noise: Some(self.noise),
            noise_volume: Some(self.noise_volume),
        }
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(EngineError::FrequencyOutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

// ============================================================================
// Config Patch
// ============================================================================

/// A sparse set of config updates applied atomically over the current state
///
/// The merge rule is a contract: a `None` field means "retain the previous
/// value", never "reset to default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub carrier_hz: Option<f32>,
    pub beat_hz: Option<f32>,
    pub volume: Option<f32>,
    pub solfeggio_hz: Option<Vec<f32>>,
    pub isochronic_rate: Option<f32>,
    pub noise: Option<NoiseType>,
    pub noise_volume: Option<f32>,
}

impl ConfigPatch {
    /// A patch that changes nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// True when applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn carrier(mut self, hz: f32) -> Self {
        self.carrier_hz = Some(hz);
        self
    }

    pub fn beat(mut self, hz: f32) -> Self {
        self.beat_hz = Some(hz);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn solfeggio(mut self, tones: Vec<f32>) -> Self {
        self.solfeggio_hz = Some(tones);
        self
    }

    pub fn isochronic(mut self, rate: f32) -> Self {
        self.isochronic_rate = Some(rate);
        self
    }

    pub fn with_noise(mut self, noise: NoiseType, volume: f32) -> Self {
        self.noise = Some(noise);
        self.noise_volume = Some(volume);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
