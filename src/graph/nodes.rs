//! Synthesis graph nodes
//!
//! Small node types the signal graph is wired from: oscillators with ramped
//! frequency, gain stages, and looping buffer sources. Teardown is defensive
//! everywhere — stopping an already-stopped node is a silent no-op.

use std::f64::consts::TAU;

use crate::graph::param::AudioParam;

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    /// 50% duty square, used for isochronic amplitude gating
    Square,
}

/// A phase-accumulating oscillator with a ramped frequency parameter
///
/// Phase is integrated sample by sample against the instantaneous frequency,
/// so frequency ramps glide without phase discontinuities.
#[derive(Debug, Clone)]
pub struct Oscillator {
    pub frequency: AudioParam,
    waveform: Waveform,
    phase: f64,
    stopped: bool,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency_hz: f32) -> Self {
        Self {
            frequency: AudioParam::new(frequency_hz),
            waveform,
            phase: 0.0,
            stopped: false,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Stop the oscillator. Idempotent.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Produce one sample at `time`, advancing phase by `dt` seconds
    pub fn sample(&mut self, time: f64, dt: f64) -> f32 {
        if self.stopped {
            return 0.0;
        }
        let value = match self.waveform {
            Waveform::Sine => self.phase.sin() as f32,
            Waveform::Square => {
                if self.phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        let frequency = self.frequency.value_at(time) as f64;
        self.phase = (self.phase + TAU * frequency * dt) % TAU;
        value
    }
}

/// A gain stage with a ramped level parameter
#[derive(Debug, Clone)]
pub struct GainNode {
    pub gain: AudioParam,
}

impl GainNode {
    pub fn new(level: f32) -> Self {
        Self {
            gain: AudioParam::new(level),
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.gain.value_at(time)
    }
}

/// A looping sample-buffer source (the noise bed)
#[derive(Debug, Clone)]
pub struct BufferSource {
    buffer: Vec<f32>,
    position: usize,
    looping: bool,
    stopped: bool,
}

impl BufferSource {
    pub fn looping(buffer: Vec<f32>) -> Self {
        Self {
            buffer,
            position: 0,
            looping: true,
            stopped: false,
        }
    }

    /// Stop the source. Idempotent.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Produce the next sample, wrapping at the buffer end when looping
    pub fn sample(&mut self) -> f32 {
        if self.stopped || self.buffer.is_empty() {
            return 0.0;
        }
        let value = self.buffer[self.position];
        self.position += 1;
        if self.position >= self.buffer.len() {
            if self.looping {
                self.position = 0;
            } else {
                self.stopped = true;
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sine_starts_at_zero_phase() {
        let mut osc = Oscillator::new(Waveform::Sine, 100.0);
        assert_relative_eq!(osc.sample(0.0, 1.0 / 44_100.0), 0.0);
    }

    #[test]
    fn test_sine_period_at_1hz() {
        // 1 Hz at 1000 samples/sec: quarter period peaks near 1.0
        let mut osc = Oscillator::new(Waveform::Sine, 1.0);
        let dt = 1.0 / 1000.0;
        let mut peak = 0.0f32;
        for i in 0..250 {
            peak = peak.max(osc.sample(i as f64 * dt, dt));
        }
        assert!(peak > 0.99);
    }

    #[test]
    fn test_square_is_bipolar() {
        let mut osc = Oscillator::new(Waveform::Square, 4.0);
        let dt = 1.0 / 1000.0;
        let samples: Vec<f32> = (0..1000).map(|i| osc.sample(i as f64 * dt, dt)).collect();
        assert!(samples.iter().any(|&s| s == 1.0));
        assert!(samples.iter().any(|&s| s == -1.0));
        assert!(samples.iter().all(|&s| s == 1.0 || s == -1.0));
    }

    #[test]
    fn test_stopped_oscillator_is_silent() {
        let mut osc = Oscillator::new(Waveform::Sine, 100.0);
        osc.stop();
        osc.stop(); // double stop tolerated
        assert!(osc.is_stopped());
        for i in 0..100 {
            assert_relative_eq!(osc.sample(i as f64 * 0.001, 0.001), 0.0);
        }
    }

    #[test]
    fn test_buffer_source_loops() {
        let mut source = BufferSource::looping(vec![0.1, 0.2, 0.3]);
        let out: Vec<f32> = (0..7).map(|_| source.sample()).collect();
        assert_eq!(out, vec![0.1, 0.2, 0.3, 0.1, 0.2, 0.3, 0.1]);
        assert!(!source.is_stopped());
    }

    #[test]
    fn test_buffer_source_stop_is_idempotent() {
        let mut source = BufferSource::looping(vec![0.5; 8]);
        source.stop();
        source.stop();
        assert_relative_eq!(source.sample(), 0.0);
    }

    #[test]
    fn test_gain_node_tracks_ramp() {
        let mut gain = GainNode::new(0.0);
        gain.gain.linear_ramp_to(1.0, 0.0, 0.5);
        assert_relative_eq!(gain.value_at(0.25), 0.5);
        assert_relative_eq!(gain.value_at(0.5), 1.0);
    }
}
