//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;

use crate::config::BrainwaveBand;
use crate::engine::AudioEngine;
use crate::error::{EngineError, Result};
use crate::graph::{AudioContext, DEFAULT_SAMPLE_RATE};
use crate::protocol::{builtin_protocols, find_protocol, protocols_by_category, Phase, Protocol};
use crate::session::{SessionObserver, SessionProgress, SessionScheduler, SessionState};

/// List the protocol library, optionally filtered by category.
pub fn list(category: Option<&str>) -> Result<()> {
    let protocols = match category {
        Some(name) => protocols_by_category(name.parse()?),
        None => builtin_protocols(),
    };

    println!(
        "{:<24} {:<24} {:<10} {:>5}  {}",
        "ID", "NAME", "CATEGORY", "MIN", "INTENSITY"
    );
    println!("{:-<75}", "");
    for protocol in &protocols {
        println!(
            "{:<24} {:<24} {:<10} {:>5.0}  {}",
            protocol.id,
            protocol.name,
            protocol.category.to_string(),
            protocol.total_duration_secs() / 60.0,
            protocol.intensity
        );
    }
    println!("\n{} protocols", protocols.len());

    Ok(())
}

/// Show one protocol in detail.
pub fn show_info(id: &str) -> Result<()> {
    let protocol = lookup(id)?;

    println!("{} ({})", protocol.name, protocol.id);
    println!(
        "Category:  {} / {}",
        protocol.category, protocol.subcategory
    );
    println!("Intensity: {}", protocol.intensity);
    println!(
        "Duration:  {:.0} minutes",
        protocol.total_duration_secs() / 60.0
    );
    println!("\n{}", protocol.description);

    println!("\nBenefits:");
    for benefit in &protocol.benefits {
        println!("  - {benefit}");
    }

    println!("\nPhases:");
    for (i, phase) in protocol.phases.iter().enumerate() {
        let band = BrainwaveBand::from_beat_hz(phase.beat_hz);
        let mut extras = Vec::new();
        if !phase.solfeggio_hz.is_empty() {
            let tones: Vec<String> = phase
                .solfeggio_hz
                .iter()
                .map(|hz| format!("{hz:.0}Hz"))
                .collect();
            extras.push(format!("solfeggio {}", tones.join("+")));
        }
        if let Some(rate) = phase.isochronic_rate {
            if rate > 0.0 {
                extras.push(format!("isochronic {rate} pps"));
            }
        }
        let extras = if extras.is_empty() {
            String::new()
        } else {
            format!(" [{}]", extras.join(", "))
        };
        println!(
            "  {}. {:<14} {:>5.0}s  {:>5.1} Hz beat ({band}){extras}",
            i + 1,
            phase.name,
            phase.duration_secs,
            phase.beat_hz,
        );
    }

    Ok(())
}

/// Play a protocol session in real time on this thread.
pub fn play(id: &str, volume: f32) -> Result<()> {
    let protocol = lookup(id)?;
    info!("playing protocol: {}", protocol.id);

    println!(
        "Playing '{}' ({:.0} minutes). Ctrl-C to stop.",
        protocol.name,
        protocol.total_duration_secs() / 60.0
    );

    let mut scheduler = SessionScheduler::realtime();
    scheduler.subscribe(Box::new(ConsoleReporter::default()));
    scheduler.start_session(protocol)?;
    scheduler.engine_mut().set_volume(volume);
    scheduler.drive();

    Ok(())
}

/// Render a protocol session to a stereo 16-bit WAV, faster than real time.
pub fn render(id: &str, out: &Path, seconds: Option<f64>) -> Result<()> {
    let protocol = lookup(id)?;
    let total = protocol.total_duration_secs();
    let limit = seconds.unwrap_or(total).min(total);
    info!("rendering {} ({limit:.0}s) to {}", protocol.id, out.display());

    let mut ctx = AudioContext::manual(DEFAULT_SAMPLE_RATE);
    ctx.unlock_output();
    let mut scheduler = SessionScheduler::new(AudioEngine::new(ctx));
    scheduler.start_session(protocol)?;

    let spec = WavSpec {
        channels: 2,
        sample_rate: DEFAULT_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(out, spec).map_err(wav_err)?;

    // Advance in scheduler-tick sized chunks so phase boundaries land on
    // the same 100ms grid as live playback
    let chunk_secs = 0.1;
    let chunk_frames = (DEFAULT_SAMPLE_RATE as f64 * chunk_secs) as usize;
    let mut rendered_secs = 0.0;
    while scheduler.state().is_active() && rendered_secs < limit {
        for frame in scheduler.engine_mut().render(chunk_frames) {
            writer.write_sample(to_i16(frame[0])).map_err(wav_err)?;
            writer.write_sample(to_i16(frame[1])).map_err(wav_err)?;
        }
        scheduler.engine_mut().context_mut().advance(chunk_secs);
        scheduler.tick();
        rendered_secs += chunk_secs;
    }
    writer.finalize().map_err(wav_err)?;

    println!("Rendered {rendered_secs:.1}s to {}", out.display());

    Ok(())
}

fn lookup(id: &str) -> Result<Protocol> {
    find_protocol(id).ok_or_else(|| EngineError::UnknownProtocol { id: id.to_string() })
}

fn wav_err(e: hound::Error) -> EngineError {
    EngineError::WavExport {
        reason: e.to_string(),
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Prints session milestones to stdout during `play`
#[derive(Default)]
struct ConsoleReporter {
    last_reported_secs: f64,
}

impl SessionObserver for ConsoleReporter {
    fn on_state_change(&mut self, state: SessionState) {
        info!("session state: {state}");
    }

    fn on_phase_change(&mut self, phase: &Phase, index: usize) {
        let band = BrainwaveBand::from_beat_hz(phase.beat_hz);
        match &phase.description {
            Some(text) => println!(
                "Phase {}: {} - {:.1} Hz ({band}) - {text}",
                index + 1,
                phase.name,
                phase.beat_hz
            ),
            None => println!(
                "Phase {}: {} - {:.1} Hz ({band})",
                index + 1,
                phase.name,
                phase.beat_hz
            ),
        }
    }

    fn on_progress(&mut self, progress: &SessionProgress) {
        // One line a minute is plenty on a console
        if progress.elapsed_secs - self.last_reported_secs >= 60.0 {
            self.last_reported_secs = progress.elapsed_secs;
            println!(
                "  {:.0}% - {:.0}s remaining ({:.1} Hz)",
                progress.total_progress * 100.0,
                progress.remaining_secs,
                progress.current_beat_hz
            );
        }
    }

    fn on_complete(&mut self) {
        println!("Session complete.");
    }
}
