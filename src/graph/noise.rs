//! Colored noise generation
//!
//! Produces fixed-length noise buffers that loop seamlessly for playback.
//! Buffers are a pure function of the noise color, sample count, and RNG, so
//! they can be cached and reused across sessions.

use rand::Rng;

use crate::config::NoiseType;
use crate::error::{EngineError, Result};

/// Length of the looped noise buffer in seconds
pub const NOISE_BUFFER_SECS: f64 = 2.0;

/// Pink noise one-pole bank coefficients (Paul Kellet's refined method)
const PINK_GAIN: f32 = 0.11;

/// Brown noise normalization after leaky integration
const BROWN_GAIN: f32 = 3.5;

/// Generate a noise buffer of `sample_count` samples using the thread RNG
pub fn generate(noise: NoiseType, sample_count: usize) -> Result<Vec<f32>> {
    generate_with(noise, sample_count, &mut rand::thread_rng())
}

/// Generate a noise buffer with a caller-supplied RNG (deterministic in tests)
pub fn generate_with<R: Rng>(noise: NoiseType, sample_count: usize, rng: &mut R) -> Result<Vec<f32>> {
    if sample_count == 0 {
        return Err(EngineError::InvalidSampleCount {
            count: sample_count,
        });
    }
    let mut buffer = vec![0.0f32; sample_count];
    match noise {
        NoiseType::White => fill_white(&mut buffer, rng),
        NoiseType::Pink => fill_pink(&mut buffer, rng),
        NoiseType::Brown => fill_brown(&mut buffer, rng),
        NoiseType::None => return Err(EngineError::NoiselessBuffer),
    }
    Ok(buffer)
}

/// Sample count for a standard looped buffer at the given rate
pub fn buffer_len(sample_rate: u32) -> usize {
    (sample_rate as f64 * NOISE_BUFFER_SECS) as usize
}

fn fill_white<R: Rng>(buffer: &mut [f32], rng: &mut R) {
    for sample in buffer.iter_mut() {
        *sample = rng.gen_range(-1.0..1.0);
    }
}

fn fill_pink<R: Rng>(buffer: &mut [f32], rng: &mut R) {
    let (mut b0, mut b1, mut b2, mut b3, mut b4, mut b5, mut b6) =
        (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for sample in buffer.iter_mut() {
        let white: f32 = rng.gen_range(-1.0..1.0);
        b0 = 0.99886 * b0 + white * 0.0555179;
        b1 = 0.99332 * b1 + white * 0.0750759;
        b2 = 0.96900 * b2 + white * 0.1538520;
        b3 = 0.86650 * b3 + white * 0.3104856;
        b4 = 0.55000 * b4 + white * 0.5329522;
        b5 = -0.7616 * b5 - white * 0.0168980;
        *sample = (b0 + b1 + b2 + b3 + b4 + b5 + b6 + white * 0.5362) * PINK_GAIN;
        b6 = white * 0.115926;
    }
}

fn fill_brown<R: Rng>(buffer: &mut [f32], rng: &mut R) {
    let mut last_out = 0.0f32;
    for sample in buffer.iter_mut() {
        let white: f32 = rng.gen_range(-1.0..1.0);
        last_out = (last_out + 0.02 * white) / 1.02;
        *sample = last_out * BROWN_GAIN;
    }
}
