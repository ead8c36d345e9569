//! Integration Tests
//!
//! End-to-end tests for the synthesis engine: graph lifecycle, morphing,
//! layer toggling, and rendered output.

use approx::assert_relative_eq;
use neuroharmonic::{AudioContext, AudioEngine, ConfigPatch, NoiseType};

/// Helper to create an engine on an unlocked manual clock
fn test_engine() -> AudioEngine {
    let mut ctx = AudioContext::manual(44_100);
    ctx.unlock_output();
    AudioEngine::new(ctx)
}

fn rms(frames: &[[f32; 2]]) -> f32 {
    let energy: f32 = frames.iter().map(|f| f[0] * f[0] + f[1] * f[1]).sum();
    (energy / (frames.len() * 2) as f32).sqrt()
}

// === Lifecycle ===

#[test]
fn test_start_stop_start_never_stacks_graphs() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none()).unwrap();
    let baseline = engine.active_node_count();

    for _ in 0..5 {
        engine.stop();
        engine.context_mut().advance(0.05);
        engine.start(&ConfigPatch::none()).unwrap();
    }
    assert_eq!(engine.active_node_count(), baseline);

    // All abandoned drains eventually clean up
    engine.context_mut().advance(1.0);
    engine.poll();
    assert_eq!(engine.draining_node_count(), 0);
}

#[test]
fn test_full_config_builds_all_layers() {
    let mut engine = test_engine();
    engine
        .start(
            &ConfigPatch::none()
                .carrier(250.0)
                .beat(7.0)
                .solfeggio(vec![528.0, 639.0])
                .isochronic(4.0)
                .with_noise(NoiseType::Pink, 0.3),
        )
        .unwrap();
    // 1 master + 4 binaural + 2 per solfeggio tone + 3 isochronic + 2 noise
    assert_eq!(engine.active_node_count(), 14);
}

// === Morphing ===

#[test]
fn test_morph_glides_frequencies_linearly() {
    let mut engine = test_engine();
    engine
        .start(&ConfigPatch::none().carrier(200.0).beat(10.0))
        .unwrap();

    engine.morph_to(&ConfigPatch::none().carrier(300.0).beat(4.0), 1.0);

    let (l, r) = engine.binaural_frequencies().unwrap();
    assert_relative_eq!(l, 195.0);
    assert_relative_eq!(r, 205.0);

    engine.context_mut().advance(0.5);
    let (l, r) = engine.binaural_frequencies().unwrap();
    assert_relative_eq!(l, 246.5, epsilon = 1e-3);
    assert_relative_eq!(r, 253.5, epsilon = 1e-3);

    engine.context_mut().advance(0.5);
    let (l, r) = engine.binaural_frequencies().unwrap();
    assert_relative_eq!(l, 298.0);
    assert_relative_eq!(r, 302.0);

    // Past the end the targets hold
    engine.context_mut().advance(10.0);
    let (l, r) = engine.binaural_frequencies().unwrap();
    assert_relative_eq!(l, 298.0);
    assert_relative_eq!(r, 302.0);
}

#[test]
fn test_morph_keeps_binaural_pair_audible() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none()).unwrap();

    // Carrier and beat are each in range on their own, but an uncapped
    // beat would put the left ear at -30 Hz
    engine.morph_to(&ConfigPatch::none().carrier(20.0).beat(100.0), 0.0);
    let (left, right) = engine.binaural_frequencies().unwrap();
    assert!(left >= 20.0, "left ear below audible range: {left} Hz");
    assert!(right <= 1500.0);

    // The stored config reflects the capped beat
    let config = engine.current_config();
    let (left, _) = config.binaural_pair();
    assert!(left >= 20.0);
}

#[test]
fn test_noise_swap_crossfades_and_settles() {
    let mut engine = test_engine();
    engine
        .start(&ConfigPatch::none().with_noise(NoiseType::White, 0.4))
        .unwrap();
    let with_noise = engine.active_node_count();

    // Swapping noise color retires the old bed and builds a new one
    engine.morph_to(&ConfigPatch::none().with_noise(NoiseType::Brown, 0.4), 10.0);
    assert_eq!(engine.active_node_count(), with_noise + 2);

    engine.context_mut().advance(1.0);
    engine.poll();
    assert_eq!(engine.active_node_count(), with_noise);

    // Dropping noise entirely removes the bed
    engine.morph_to(&ConfigPatch::none().with_noise(NoiseType::None, 0.0), 0.0);
    engine.context_mut().advance(1.0);
    engine.poll();
    assert_eq!(engine.active_node_count(), with_noise - 2);
}

// === Layer toggling ===

#[test]
fn test_rapid_solfeggio_toggling_leaks_nothing() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none()).unwrap();
    let baseline = engine.active_node_count();

    for _ in 0..10 {
        engine.toggle_solfeggio(528.0);
        engine.context_mut().advance(0.01);
        engine.toggle_solfeggio(528.0);
        engine.context_mut().advance(0.01);
    }
    engine.context_mut().advance(2.0);
    engine.poll();

    assert_eq!(engine.solfeggio_voice_count(528.0), 0);
    assert_eq!(engine.active_node_count(), baseline);
}

#[test]
fn test_independent_tones_toggle_independently() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none()).unwrap();
    engine.toggle_solfeggio(396.0);
    engine.toggle_solfeggio(528.0);
    engine.toggle_solfeggio(852.0);

    engine.toggle_solfeggio(528.0);
    engine.context_mut().advance(2.0);
    engine.poll();

    let config = engine.current_config();
    assert!(config.has_solfeggio(396.0));
    assert!(!config.has_solfeggio(528.0));
    assert!(config.has_solfeggio(852.0));
    assert_eq!(engine.solfeggio_voice_count(528.0), 0);
    assert_eq!(engine.solfeggio_voice_count(396.0), 1);
}

// === Rendered output ===

#[test]
fn test_render_fades_in_from_silence() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none()).unwrap();

    let early = engine.render(441); // first 10ms of the 500ms fade
    engine.context_mut().advance(1.0);
    let settled = engine.render(4_410);

    assert!(rms(&early) < rms(&settled) * 0.2, "fade-in missing");
}

#[test]
fn test_render_output_is_bounded() {
    let mut engine = test_engine();
    engine
        .start(
            &ConfigPatch::none()
                .with_volume(1.0)
                .solfeggio(vec![396.0, 528.0, 639.0])
                .isochronic(10.0)
                .with_noise(NoiseType::White, 1.0),
        )
        .unwrap();
    engine.context_mut().advance(1.0);

    // The mix headroom bound: every layer at full tilt stays well inside
    // the graph's worst-case sum
    let frames = engine.render(44_100);
    for frame in &frames {
        assert!(frame[0].abs() <= 4.0 && frame[1].abs() <= 4.0);
        assert!(frame[0].is_finite() && frame[1].is_finite());
    }
}

#[test]
fn test_stereo_channels_differ_with_binaural_beat() {
    let mut engine = test_engine();
    engine
        .start(&ConfigPatch::none().carrier(200.0).beat(10.0))
        .unwrap();
    engine.context_mut().advance(1.0);

    let frames = engine.render(4_410);
    let diff_energy: f32 = frames.iter().map(|f| (f[0] - f[1]).powi(2)).sum();
    assert!(diff_energy > 1.0, "channels identical: no beat present");
}

#[test]
fn test_volume_zero_renders_silence() {
    let mut engine = test_engine();
    engine.start(&ConfigPatch::none().with_volume(0.0)).unwrap();
    engine.context_mut().advance(1.0);

    let frames = engine.render(4_410);
    assert!(rms(&frames) < 1e-6);
}
