//! Layered signal graph
//!
//! [`SignalGraph`] wires the full synthesis topology: a binaural oscillator
//! pair routed to discrete left/right channels, optional solfeggio voices,
//! an optional isochronic layer (tone gated by a square LFO), and an optional
//! looping noise bed — all summed through a master gain.
//!
//! Continuously tunable parameters (frequencies, gains, pulse rate) morph via
//! linear ramps. Parameters that cannot be ramped — the noise color, the
//! presence of a solfeggio tone or the isochronic layer — are swapped by
//! crossfade: the old sub-layer fades to silence and is retired, while the
//! replacement fades in. Brief overlap of old and new is allowed.

use log::{debug, warn};

use crate::config::{FrequencyLayerConfig, NoiseType};
use crate::graph::context::AudioContext;
use crate::graph::noise;
use crate::graph::nodes::{BufferSource, GainNode, Oscillator, Waveform};

// ============================================================================
// Constants
// ============================================================================

/// Gain of each solfeggio voice (background texture level)
pub const SOLFEGGIO_GAIN: f32 = 0.15;

/// Base gain of the isochronic layer; the LFO swings it between 0 and 2x
pub const ISOCHRONIC_GAIN: f32 = 0.2;

/// Per-channel gain of the binaural pair
pub const CHANNEL_GAIN: f32 = 0.5;

/// Crossfade length for sub-layer replacement, in seconds
pub const CROSSFADE_SECS: f64 = 0.5;

/// The isochronic tone sits a fifth-and-a-bit above the carrier
const ISOCHRONIC_CARRIER_RATIO: f32 = 1.5;

/// Two tones closer than this are the same solfeggio frequency
const TONE_EPSILON: f32 = 1e-3;

fn same_tone(a: f32, b: f32) -> bool {
    (a - b).abs() < TONE_EPSILON
}

// ============================================================================
// Sub-layers
// ============================================================================

/// The stereo binaural pair: one oscillator per ear
#[derive(Debug, Clone)]
pub struct BinauralPair {
    pub left: Oscillator,
    pub right: Oscillator,
    pub left_gain: GainNode,
    pub right_gain: GainNode,
}

impl BinauralPair {
    fn build(config: &FrequencyLayerConfig) -> Self {
        let (left_hz, right_hz) = config.binaural_pair();
        Self {
            left: Oscillator::new(Waveform::Sine, left_hz),
            right: Oscillator::new(Waveform::Sine, right_hz),
            left_gain: GainNode::new(CHANNEL_GAIN),
            right_gain: GainNode::new(CHANNEL_GAIN),
        }
    }
}

/// One low-volume pure tone layered under the binaural pair
#[derive(Debug, Clone)]
pub struct SolfeggioVoice {
    pub frequency_hz: f32,
    pub osc: Oscillator,
    pub gain: GainNode,
}

impl SolfeggioVoice {
    fn build(hz: f32, now: f64, fade_secs: f64) -> Self {
        let mut gain = GainNode::new(0.0);
        gain.gain.linear_ramp_to(SOLFEGGIO_GAIN, now, fade_secs);
        Self {
            frequency_hz: hz,
            osc: Oscillator::new(Waveform::Sine, hz),
            gain,
        }
    }

    fn sample(&mut self, time: f64, dt: f64) -> f32 {
        self.osc.sample(time, dt) * self.gain.value_at(time)
    }
}

/// A tone amplitude-gated on/off by a square LFO
#[derive(Debug, Clone)]
pub struct IsochronicLayer {
    pub osc: Oscillator,
    pub lfo: Oscillator,
    pub gain: GainNode,
    depth: f32,
}

impl IsochronicLayer {
    fn build(config: &FrequencyLayerConfig, now: f64, fade_secs: f64) -> Self {
        let mut gain = GainNode::new(0.0);
        gain.gain.linear_ramp_to(ISOCHRONIC_GAIN, now, fade_secs);
        Self {
            osc: Oscillator::new(
                Waveform::Sine,
                config.carrier_hz * ISOCHRONIC_CARRIER_RATIO,
            ),
            lfo: Oscillator::new(Waveform::Square, config.isochronic_rate),
            gain,
            depth: ISOCHRONIC_GAIN,
        }
    }

    /// The LFO swings the gate between 0 and base + depth, never negative
    fn sample(&mut self, time: f64, dt: f64) -> f32 {
        let gate = (self.gain.value_at(time) + self.lfo.sample(time, dt) * self.depth).max(0.0);
        self.osc.sample(time, dt) * gate
    }
}

/// The looping colored-noise bed
#[derive(Debug, Clone)]
pub struct NoiseLayer {
    pub noise: NoiseType,
    pub source: BufferSource,
    pub gain: GainNode,
}

impl NoiseLayer {
    fn build(
        noise_type: NoiseType,
        volume: f32,
        sample_rate: u32,
        now: f64,
        fade_secs: f64,
    ) -> Option<Self> {
        let buffer = match noise::generate(noise_type, noise::buffer_len(sample_rate)) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("noise layer skipped: {err}");
                return None;
            }
        };
        let mut gain = GainNode::new(0.0);
        gain.gain.linear_ramp_to(volume, now, fade_secs);
        Some(Self {
            noise: noise_type,
            source: BufferSource::looping(buffer),
            gain,
        })
    }

    fn sample(&mut self, time: f64) -> f32 {
        self.source.sample() * self.gain.value_at(time)
    }
}

// ============================================================================
// Retired layers (crossfade teardown)
// ============================================================================

#[derive(Debug, Clone)]
enum RetiredNodes {
    Solfeggio(SolfeggioVoice),
    Isochronic(IsochronicLayer),
    Noise(NoiseLayer),
}

impl RetiredNodes {
    fn fade_out(&mut self, now: f64) {
        let gain = match self {
            RetiredNodes::Solfeggio(voice) => &mut voice.gain,
            RetiredNodes::Isochronic(layer) => &mut layer.gain,
            RetiredNodes::Noise(layer) => &mut layer.gain,
        };
        gain.gain.linear_ramp_to(0.0, now, CROSSFADE_SECS);
    }

    fn shutdown(&mut self) {
        match self {
            RetiredNodes::Solfeggio(voice) => voice.osc.stop(),
            RetiredNodes::Isochronic(layer) => {
                layer.osc.stop();
                layer.lfo.stop();
            }
            RetiredNodes::Noise(layer) => layer.source.stop(),
        }
    }

    fn sample(&mut self, time: f64, dt: f64) -> f32 {
        match self {
            RetiredNodes::Solfeggio(voice) => voice.sample(time, dt),
            RetiredNodes::Isochronic(layer) => layer.sample(time, dt),
            RetiredNodes::Noise(layer) => layer.sample(time),
        }
    }

    fn node_count(&self) -> usize {
        match self {
            RetiredNodes::Solfeggio(_) => 2,
            RetiredNodes::Isochronic(_) => 3,
            RetiredNodes::Noise(_) => 2,
        }
    }
}

/// A sub-layer fading to silence ahead of teardown
#[derive(Debug, Clone)]
struct RetiredLayer {
    nodes: RetiredNodes,
    /// Context time after which the layer is silent and safe to drop
    silent_at: f64,
}

// ============================================================================
// Signal Graph
// ============================================================================

/// The live synthesis graph: at most one exists per engine
#[derive(Debug, Clone)]
pub struct SignalGraph {
    sample_rate: u32,
    pub master: GainNode,
    binaural: BinauralPair,
    solfeggio: Vec<SolfeggioVoice>,
    isochronic: Option<IsochronicLayer>,
    noise: Option<NoiseLayer>,
    retired: Vec<RetiredLayer>,
}

impl SignalGraph {
    /// Build the full graph for `config`, fading the master in from silence
    pub fn build(config: &FrequencyLayerConfig, ctx: &AudioContext, fade_in_secs: f64) -> Self {
        let now = ctx.current_time();
        let sample_rate = ctx.sample_rate();

        let mut master = GainNode::new(0.0);
        master.gain.linear_ramp_to(config.volume, now, fade_in_secs);

        let solfeggio = config
            .solfeggio_hz
            .iter()
            .map(|&hz| SolfeggioVoice::build(hz, now, fade_in_secs))
            .collect();

        let isochronic = (config.isochronic_rate > 0.0)
            .then(|| IsochronicLayer::build(config, now, fade_in_secs));

        let noise = if config.noise.is_none() || config.noise_volume <= 0.0 {
            None
        } else {
            NoiseLayer::build(
                config.noise,
                config.noise_volume,
                sample_rate,
                now,
                fade_in_secs,
            )
        };

        debug!(
            "graph built: carrier {} Hz, beat {} Hz, {} solfeggio voice(s), noise {}",
            config.carrier_hz,
            config.beat_hz,
            config.solfeggio_hz.len(),
            config.noise
        );

        Self {
            sample_rate,
            master,
            binaural: BinauralPair::build(config),
            solfeggio,
            isochronic,
            noise,
            retired: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Morphing
    // ------------------------------------------------------------------------

    /// Retarget every tunable parameter toward `target` over `duration_secs`;
    /// swap non-rampable sub-layers by crossfade.
    pub fn morph(&mut self, target: &FrequencyLayerConfig, now: f64, duration_secs: f64) {
        let (left_hz, right_hz) = target.binaural_pair();
        self.binaural
            .left
            .frequency
            .linear_ramp_to(left_hz, now, duration_secs);
        self.binaural
            .right
            .frequency
            .linear_ramp_to(right_hz, now, duration_secs);
        self.master
            .gain
            .linear_ramp_to(target.volume, now, duration_secs);

        self.morph_isochronic(target, now, duration_secs);
        self.morph_solfeggio(target, now);
        self.morph_noise(target, now, duration_secs);
    }

    fn morph_isochronic(&mut self, target: &FrequencyLayerConfig, now: f64, duration_secs: f64) {
        let wants_layer = target.isochronic_rate > 0.0;
        match (&mut self.isochronic, wants_layer) {
            (Some(layer), true) => {
                layer
                    .lfo
                    .frequency
                    .linear_ramp_to(target.isochronic_rate, now, duration_secs);
                layer.osc.frequency.linear_ramp_to(
                    target.carrier_hz * ISOCHRONIC_CARRIER_RATIO,
                    now,
                    duration_secs,
                );
            }
            (Some(_), false) => {
                if let Some(layer) = self.isochronic.take() {
                    self.retire(RetiredNodes::Isochronic(layer), now);
                }
            }
            (None, true) => {
                self.isochronic = Some(IsochronicLayer::build(target, now, CROSSFADE_SECS));
            }
            (None, false) => {}
        }
    }

    fn morph_solfeggio(&mut self, target: &FrequencyLayerConfig, now: f64) {
        let dropped: Vec<f32> = self
            .solfeggio
            .iter()
            .map(|voice| voice.frequency_hz)
            .filter(|&hz| !target.has_solfeggio(hz))
            .collect();
        for hz in dropped {
            self.remove_solfeggio(hz, now);
        }
        for &hz in &target.solfeggio_hz {
            if !self.has_solfeggio(hz) {
                self.add_solfeggio(hz, now);
            }
        }
    }

    fn morph_noise(&mut self, target: &FrequencyLayerConfig, now: f64, duration_secs: f64) {
        let same_color = self
            .noise
            .as_ref()
            .map(|layer| layer.noise == target.noise)
            .unwrap_or(false);
        if same_color {
            if let Some(layer) = &mut self.noise {
                layer
                    .gain
                    .gain
                    .linear_ramp_to(target.noise_volume, now, duration_secs);
            }
            return;
        }
        // Color change: crossfade the old bed out and the new one in
        if let Some(layer) = self.noise.take() {
            self.retire(RetiredNodes::Noise(layer), now);
        }
        if !target.noise.is_none() && target.noise_volume > 0.0 {
            self.noise = NoiseLayer::build(
                target.noise,
                target.noise_volume,
                self.sample_rate,
                now,
                CROSSFADE_SECS,
            );
        }
    }

    // ------------------------------------------------------------------------
    // Solfeggio voices
    // ------------------------------------------------------------------------

    /// True when a live (non-retired) voice plays `hz`
    pub fn has_solfeggio(&self, hz: f32) -> bool {
        self.solfeggio
            .iter()
            .any(|voice| same_tone(voice.frequency_hz, hz))
    }

    /// Fade a new voice in without disturbing other layers
    pub fn add_solfeggio(&mut self, hz: f32, now: f64) {
        if self.has_solfeggio(hz) {
            return;
        }
        self.solfeggio
            .push(SolfeggioVoice::build(hz, now, CROSSFADE_SECS));
        debug!("solfeggio {hz} Hz fading in");
    }

    /// Fade a voice out and retire it for teardown
    pub fn remove_solfeggio(&mut self, hz: f32, now: f64) {
        let Some(index) = self
            .solfeggio
            .iter()
            .position(|voice| same_tone(voice.frequency_hz, hz))
        else {
            return;
        };
        let voice = self.solfeggio.remove(index);
        self.retire(RetiredNodes::Solfeggio(voice), now);
        debug!("solfeggio {hz} Hz fading out");
    }

    /// Count every oscillator playing `hz` as a solfeggio tone, including
    /// voices still fading out
    pub fn solfeggio_voice_count(&self, hz: f32) -> usize {
        let live = self
            .solfeggio
            .iter()
            .filter(|voice| same_tone(voice.frequency_hz, hz))
            .count();
        let fading = self
            .retired
            .iter()
            .filter(|layer| {
                matches!(&layer.nodes, RetiredNodes::Solfeggio(voice) if same_tone(voice.frequency_hz, hz))
            })
            .count();
        live + fading
    }

    // ------------------------------------------------------------------------
    // Levels and lifecycle
    // ------------------------------------------------------------------------

    /// Retarget only the binaural pair (breath sync and similar nudges)
    pub fn ramp_binaural(&mut self, left_hz: f32, right_hz: f32, now: f64, duration_secs: f64) {
        self.binaural
            .left
            .frequency
            .linear_ramp_to(left_hz, now, duration_secs);
        self.binaural
            .right
            .frequency
            .linear_ramp_to(right_hz, now, duration_secs);
    }

    /// Quick master level ramp (independent of morphs)
    pub fn set_master_volume(&mut self, volume: f32, now: f64, ramp_secs: f64) {
        self.master.gain.linear_ramp_to(volume, now, ramp_secs);
    }

    /// Quick noise level ramp; no-op when no noise layer exists
    pub fn set_noise_volume(&mut self, volume: f32, now: f64, ramp_secs: f64) {
        if let Some(layer) = &mut self.noise {
            layer.gain.gain.linear_ramp_to(volume, now, ramp_secs);
        }
    }

    /// Begin the release fade toward silence
    pub fn release(&mut self, now: f64, release_secs: f64) {
        self.master.gain.linear_ramp_to(0.0, now, release_secs);
    }

    /// Stop every node. Defensive: already-stopped nodes are left alone.
    pub fn shutdown(&mut self) {
        self.binaural.left.stop();
        self.binaural.right.stop();
        for voice in &mut self.solfeggio {
            voice.osc.stop();
        }
        if let Some(layer) = &mut self.isochronic {
            layer.osc.stop();
            layer.lfo.stop();
        }
        if let Some(layer) = &mut self.noise {
            layer.source.stop();
        }
        for retired in &mut self.retired {
            retired.nodes.shutdown();
        }
        self.retired.clear();
    }

    fn retire(&mut self, mut nodes: RetiredNodes, now: f64) {
        nodes.fade_out(now);
        self.retired.push(RetiredLayer {
            nodes,
            silent_at: now + CROSSFADE_SECS,
        });
    }

    /// Drop retired layers whose fade-out has completed. Returns the number
    /// of layers torn down.
    pub fn purge_retired(&mut self, now: f64) -> usize {
        let before = self.retired.len();
        self.retired.retain_mut(|layer| {
            if now >= layer.silent_at {
                layer.nodes.shutdown();
                false
            } else {
                true
            }
        });
        before - self.retired.len()
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// Number of nodes wired into the graph (retired layers included until
    /// purged)
    pub fn node_count(&self) -> usize {
        let mut count = 1 + 4; // master + binaural pair
        count += self.solfeggio.len() * 2;
        if self.isochronic.is_some() {
            count += 3;
        }
        if self.noise.is_some() {
            count += 2;
        }
        count += self
            .retired
            .iter()
            .map(|layer| layer.nodes.node_count())
            .sum::<usize>();
        count
    }

    /// Live (possibly mid-ramp) left/right oscillator frequencies
    pub fn binaural_frequencies(&self, now: f64) -> (f32, f32) {
        (
            self.binaural.left.frequency.value_at(now),
            self.binaural.right.frequency.value_at(now),
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // ------------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------------

    /// Synthesize `frames` stereo samples starting at `now`
    ///
    /// The binaural pair stays on discrete channels; every other layer is
    /// mixed equally into both ears. Doubles as the visualization tap.
    pub fn render(&mut self, now: f64, frames: usize) -> Vec<[f32; 2]> {
        let dt = 1.0 / self.sample_rate as f64;
        let mut out = Vec::with_capacity(frames);
        for i in 0..frames {
            let t = now + i as f64 * dt;
            let left = self.binaural.left.sample(t, dt) * self.binaural.left_gain.value_at(t);
            let right = self.binaural.right.sample(t, dt) * self.binaural.right_gain.value_at(t);

            let mut center = 0.0f32;
            for voice in &mut self.solfeggio {
                center += voice.sample(t, dt);
            }
            if let Some(layer) = &mut self.isochronic {
                center += layer.sample(t, dt);
            }
            if let Some(layer) = &mut self.noise {
                center += layer.sample(t);
            }
            for retired in &mut self.retired {
                center += retired.nodes.sample(t, dt);
            }

            let master = self.master.value_at(t);
            out.push([(left + center) * master, (right + center) * master]);
        }
        out
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn running_ctx() -> AudioContext {
        let mut ctx = AudioContext::manual(44_100);
        ctx.unlock_output();
        ctx.resume();
        ctx
    }

    fn base_config() -> FrequencyLayerConfig {
        FrequencyLayerConfig {
            carrier_hz: 200.0,
            beat_hz: 10.0,
            volume: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_minimal_graph() {
        let ctx = running_ctx();
        let graph = SignalGraph::build(&base_config(), &ctx, 0.5);
        // master + 2 oscillators + 2 channel gains
        assert_eq!(graph.node_count(), 5);
        let (left, right) = graph.binaural_frequencies(0.0);
        assert_relative_eq!(left, 195.0);
        assert_relative_eq!(right, 205.0);
    }

    #[test]
    fn test_build_full_graph_node_count() {
        let ctx = running_ctx();
        let config = FrequencyLayerConfig {
            solfeggio_hz: vec![528.0, 639.0],
            isochronic_rate: 4.0,
            noise: NoiseType::Pink,
            noise_volume: 0.3,
            ..base_config()
        };
        let graph = SignalGraph::build(&config, &ctx, 0.5);
        // 5 core + 2*2 solfeggio + 3 isochronic + 2 noise
        assert_eq!(graph.node_count(), 14);
    }

    #[test]
    fn test_master_fades_in_from_silence() {
        let ctx = running_ctx();
        let graph = SignalGraph::build(&base_config(), &ctx, 0.5);
        assert_relative_eq!(graph.master.value_at(0.0), 0.0);
        assert_relative_eq!(graph.master.value_at(0.25), 0.25);
        assert_relative_eq!(graph.master.value_at(0.5), 0.5);
    }

    #[test]
    fn test_morph_ramps_binaural_pair_linearly() {
        let ctx = running_ctx();
        let mut graph = SignalGraph::build(&base_config(), &ctx, 0.0);
        let mut target = base_config();
        target.beat_hz = 4.0;
        graph.morph(&target, 0.0, 1.0);

        let (l0, r0) = graph.binaural_frequencies(0.0);
        let (l5, r5) = graph.binaural_frequencies(0.5);
        let (l1, r1) = graph.binaural_frequencies(1.0);
        assert_relative_eq!(l0, 195.0);
        assert_relative_eq!(r0, 205.0);
        assert_relative_eq!(l5, 196.5);
        assert_relative_eq!(r5, 203.5);
        assert_relative_eq!(l1, 198.0);
        assert_relative_eq!(r1, 202.0);
        assert_relative_eq!(r1 - l1, 4.0);
    }

    #[test]
    fn test_noise_color_change_crossfades() {
        let ctx = running_ctx();
        let config = FrequencyLayerConfig {
            noise: NoiseType::White,
            noise_volume: 0.4,
            ..base_config()
        };
        let mut graph = SignalGraph::build(&config, &ctx, 0.0);
        let base_count = graph.node_count();

        let mut target = config.clone();
        target.noise = NoiseType::Brown;
        graph.morph(&target, 1.0, 10.0);
        // Old bed retired but still fading; new bed attached
        assert_eq!(graph.node_count(), base_count + 2);

        assert_eq!(graph.purge_retired(1.0 + CROSSFADE_SECS), 1);
        assert_eq!(graph.node_count(), base_count);
    }

    #[test]
    fn test_same_color_noise_ramps_in_place() {
        let ctx = running_ctx();
        let config = FrequencyLayerConfig {
            noise: NoiseType::Pink,
            noise_volume: 0.2,
            ..base_config()
        };
        let mut graph = SignalGraph::build(&config, &ctx, 0.0);
        let count = graph.node_count();
        let mut target = config.clone();
        target.noise_volume = 0.6;
        graph.morph(&target, 0.0, 1.0);
        assert_eq!(graph.node_count(), count);
    }

    #[test]
    fn test_solfeggio_toggle_twice_leaves_no_leak() {
        let ctx = running_ctx();
        let mut graph = SignalGraph::build(&base_config(), &ctx, 0.0);

        graph.add_solfeggio(528.0, 0.0);
        assert_eq!(graph.solfeggio_voice_count(528.0), 1);

        // Remove before the fade-in completes
        graph.remove_solfeggio(528.0, 0.1);
        assert_eq!(graph.solfeggio_voice_count(528.0), 1); // still fading out
        assert!(!graph.has_solfeggio(528.0));

        graph.purge_retired(0.1 + CROSSFADE_SECS);
        assert_eq!(graph.solfeggio_voice_count(528.0), 0);
    }

    #[test]
    fn test_release_ramps_master_to_silence() {
        let ctx = running_ctx();
        let mut graph = SignalGraph::build(&base_config(), &ctx, 0.0);
        graph.release(0.0, 0.5);
        assert_relative_eq!(graph.master.value_at(0.5), 0.0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let ctx = running_ctx();
        let mut graph = SignalGraph::build(&base_config(), &ctx, 0.0);
        graph.shutdown();
        graph.shutdown(); // stopping stopped nodes must not panic
        let frames = graph.render(1.0, 64);
        assert!(frames.iter().all(|f| f[0] == 0.0 && f[1] == 0.0));
    }

    #[test]
    fn test_render_routes_binaural_to_discrete_channels() {
        let ctx = running_ctx();
        let mut config = base_config();
        config.beat_hz = 40.0; // widely separated ears
        config.volume = 1.0;
        let mut graph = SignalGraph::build(&config, &ctx, 0.0);

        let frames = graph.render(0.0, 4_410); // 100 ms
        // Both channels carry signal
        assert!(frames.iter().any(|f| f[0].abs() > 0.1));
        assert!(frames.iter().any(|f| f[1].abs() > 0.1));
        // And they are not the same mono signal
        let diff_energy: f32 = frames.iter().map(|f| (f[0] - f[1]).abs()).sum();
        assert!(diff_energy > 1.0, "channels look mono: {diff_energy}");
    }

    #[test]
    fn test_render_output_is_bounded() {
        let ctx = running_ctx();
        let config = FrequencyLayerConfig {
            solfeggio_hz: vec![396.0, 528.0, 639.0],
            isochronic_rate: 6.0,
            noise: NoiseType::White,
            noise_volume: 0.5,
            volume: 1.0,
            ..base_config()
        };
        let mut graph = SignalGraph::build(&config, &ctx, 0.0);
        let frames = graph.render(0.0, 44_100);
        assert!(frames
            .iter()
            .all(|f| f[0].abs() <= 4.0 && f[1].abs() <= 4.0));
    }
}
