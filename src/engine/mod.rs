//! Audio engine lifecycle
//!
//! [`AudioEngine`] owns the output context and the single live signal graph,
//! and exposes the imperative surface the UI and scheduler drive:
//! start/stop/morph, quick level ramps, solfeggio toggling, and breath sync.
//!
//! Correctness invariant: at most one graph is live at a time. `start` while
//! playing morphs the existing graph instead of building a second one, and a
//! stopping graph drains (fade to silence, then teardown) off to the side
//! where a subsequent `start` cannot resurrect it.
//!
//! Invalid-state calls (`morph_to` while stopped, `set_volume` before
//! `initialize`) are no-ops rather than errors: UI callers routinely race
//! user input against asynchronous audio state.

use log::{debug, warn};

use crate::config::{ConfigPatch, FrequencyLayerConfig, FREQUENCY_EPSILON};
use crate::error::Result;
use crate::graph::{AudioContext, SignalGraph};

// ============================================================================
// Constants
// ============================================================================

/// Master fade-in after `start`, in seconds (click avoidance)
pub const FADE_IN_SECS: f64 = 0.5;

/// Master release fade on `stop`, in seconds; teardown runs after it
pub const RELEASE_SECS: f64 = 0.5;

/// Quick ramp used by the volume setters, in seconds
pub const QUICK_RAMP_SECS: f64 = 0.1;

/// Morph duration applied when `start` is called on a playing engine
pub const DEFAULT_MORPH_SECS: f64 = 30.0;

/// Breath sync modulates the carrier by +/-2%
const BREATH_PITCH_SHIFT: f32 = 0.02;

// ============================================================================
// Audio Engine
// ============================================================================

/// Single-owner service over the output context and the live signal graph
#[derive(Debug)]
pub struct AudioEngine {
    ctx: AudioContext,
    graph: Option<SignalGraph>,
    /// A released graph fading to silence, and the time teardown is due
    draining: Option<(SignalGraph, f64)>,
    config: FrequencyLayerConfig,
    playing: bool,
}

impl AudioEngine {
    /// Create an engine over an explicit context (inject a manual-clock
    /// context for tests and offline rendering)
    pub fn new(ctx: AudioContext) -> Self {
        Self {
            ctx,
            graph: None,
            draining: None,
            config: FrequencyLayerConfig::default(),
            playing: false,
        }
    }

    /// Create an engine on the wall clock at the default sample rate
    pub fn realtime() -> Self {
        Self::new(AudioContext::default())
    }

    pub fn context(&self) -> &AudioContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AudioContext {
        &mut self.ctx
    }

    /// Acquire/resume the output device. Idempotent, and fails soft while
    /// the output is still locked pending a user gesture — callers retry on
    /// the next interaction.
    pub fn initialize(&mut self) -> Result<()> {
        if !self.ctx.resume() {
            warn!("audio output not yet unlocked; engine stays idle");
        }
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Snapshot of the effective configuration (defensive copy)
    pub fn current_config(&self) -> FrequencyLayerConfig {
        self.config.clone()
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Start playback with the current config updated by `patch`
    ///
    /// Starting while already playing morphs into the new config over
    /// [`DEFAULT_MORPH_SECS`] — it never builds a second graph. Returns an
    /// error only for invalid input; a locked output fails soft.
    pub fn start(&mut self, patch: &ConfigPatch) -> Result<()> {
        self.poll();
        let mut next = self.config.clone();
        next.apply(patch);
        next.validate()?;

        self.initialize()?;
        if !self.ctx.is_running() {
            // Autoplay gate: config is kept so a retry plays what was asked
            self.config = next;
            return Ok(());
        }

        if self.playing {
            debug!("start while playing: morphing instead");
            self.morph_to(patch, DEFAULT_MORPH_SECS);
            return Ok(());
        }

        self.config = next;
        self.graph = Some(SignalGraph::build(&self.config, &self.ctx, FADE_IN_SECS));
        self.playing = true;
        debug!("engine started");
        Ok(())
    }

    /// Fade to silence over [`RELEASE_SECS`], then tear the graph down
    ///
    /// `is_playing()` turns false immediately; the released graph drains in
    /// the background and is disposed by a later [`poll`](Self::poll).
    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        let now = self.ctx.current_time();
        if let Some(mut graph) = self.graph.take() {
            graph.release(now, RELEASE_SECS);
            if let Some((mut old, _)) = self.draining.replace((graph, now + RELEASE_SECS)) {
                // A second stop arrived before the first drain finished
                old.shutdown();
            }
        }
        debug!("engine stopping (release {}s)", RELEASE_SECS);
    }

    /// Finish deferred teardown: dispose drained graphs, purge sub-layers
    /// whose crossfade has completed, and suspend the output device once
    /// nothing is left to play. Driven by the scheduler tick; safe to call
    /// at any time.
    pub fn poll(&mut self) {
        let now = self.ctx.current_time();
        if let Some((_, deadline)) = &self.draining {
            if now >= *deadline {
                if let Some((mut graph, _)) = self.draining.take() {
                    graph.shutdown();
                    debug!("drained graph torn down");
                }
            }
        }
        if let Some(graph) = &mut self.graph {
            graph.purge_retired(now);
        }
        if !self.playing && self.graph.is_none() && self.draining.is_none() && self.ctx.is_running()
        {
            self.ctx.suspend();
            debug!("idle output suspended");
        }
    }

    // ------------------------------------------------------------------------
    // Morphing and live tweaks
    // ------------------------------------------------------------------------

    /// Linearly retarget all tunable parameters toward the patched config
    /// over `duration_secs`; non-rampable changes crossfade. No-op while
    /// stopped. Out-of-range slider values are clamped, not rejected.
    pub fn morph_to(&mut self, patch: &ConfigPatch, duration_secs: f64) {
        if !self.playing {
            return;
        }
        let mut next = self.config.clone();
        next.apply(patch);
        next.clamp_ranges();
        let now = self.ctx.current_time();
        if let Some(graph) = &mut self.graph {
            graph.morph(&next, now, duration_secs.max(0.0));
        }
        self.config = next;
    }

    /// Quick master volume ramp, independent of any morph in flight
    pub fn set_volume(&mut self, volume: f32) {
        if !self.playing {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let now = self.ctx.current_time();
        if let Some(graph) = &mut self.graph {
            graph.set_master_volume(volume, now, QUICK_RAMP_SECS);
        }
        self.config.volume = volume;
    }

    /// Quick noise level ramp; no-op when no noise layer is active
    pub fn set_noise_volume(&mut self, volume: f32) {
        if !self.playing {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let now = self.ctx.current_time();
        if let Some(graph) = &mut self.graph {
            graph.set_noise_volume(volume, now, QUICK_RAMP_SECS);
        }
        self.config.noise_volume = volume;
    }

    /// Add or remove one solfeggio tone with its own fade, leaving every
    /// other layer untouched
    pub fn toggle_solfeggio(&mut self, hz: f32) {
        if !self.playing {
            return;
        }
        let now = self.ctx.current_time();
        let Some(graph) = &mut self.graph else {
            return;
        };
        if self.config.has_solfeggio(hz) {
            graph.remove_solfeggio(hz, now);
            self.config
                .solfeggio_hz
                .retain(|&f| (f - hz).abs() >= FREQUENCY_EPSILON);
        } else {
            let mut probe = self.config.clone();
            probe.solfeggio_hz.push(hz);
            if probe.validate().is_err() {
                warn!("ignoring out-of-range solfeggio tone: {hz} Hz");
                return;
            }
            graph.add_solfeggio(hz, now);
            self.config.solfeggio_hz.push(hz);
        }
    }

    /// Subtle pitch modulation toward the breath: +2% carrier on inhale,
    /// -2% on exhale. Does not alter the stored config.
    pub fn breath_sync(&mut self, inhale: bool, duration_secs: f64) {
        if !self.playing {
            return;
        }
        let shift = if inhale {
            1.0 + BREATH_PITCH_SHIFT
        } else {
            1.0 - BREATH_PITCH_SHIFT
        };
        let half_beat = self.config.beat_hz / 2.0;
        let center = self.config.carrier_hz * shift;
        let now = self.ctx.current_time();
        if let Some(graph) = &mut self.graph {
            graph.ramp_binaural(center - half_beat, center + half_beat, now, duration_secs);
        }
    }

    /// Glide the binaural pair back to the configured carrier
    pub fn reset_breath_sync(&mut self) {
        if !self.playing {
            return;
        }
        let (left, right) = self.config.binaural_pair();
        let now = self.ctx.current_time();
        if let Some(graph) = &mut self.graph {
            graph.ramp_binaural(left, right, now, 0.5);
        }
    }

    // ------------------------------------------------------------------------
    // Introspection and rendering
    // ------------------------------------------------------------------------

    /// Nodes wired into the live graph (0 while stopped)
    pub fn active_node_count(&self) -> usize {
        self.graph.as_ref().map(SignalGraph::node_count).unwrap_or(0)
    }

    /// Nodes of a released graph still draining toward teardown
    pub fn draining_node_count(&self) -> usize {
        self.draining
            .as_ref()
            .map(|(graph, _)| graph.node_count())
            .unwrap_or(0)
    }

    /// Live (possibly mid-ramp) left/right oscillator frequencies
    pub fn binaural_frequencies(&self) -> Option<(f32, f32)> {
        let now = self.ctx.current_time();
        self.graph
            .as_ref()
            .map(|graph| graph.binaural_frequencies(now))
    }

    /// Solfeggio oscillators (live plus fading) playing `hz`; test and
    /// leak-detection hook
    pub fn solfeggio_voice_count(&self, hz: f32) -> usize {
        self.graph
            .as_ref()
            .map(|graph| graph.solfeggio_voice_count(hz))
            .unwrap_or(0)
    }

    /// Synthesize stereo frames from the live graph starting at the current
    /// context time; silence while stopped. Doubles as the visualization tap.
    pub fn render(&mut self, frames: usize) -> Vec<[f32; 2]> {
        let now = self.ctx.current_time();
        match &mut self.graph {
            Some(graph) => graph.render(now, frames),
            None => vec![[0.0, 0.0]; frames],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
