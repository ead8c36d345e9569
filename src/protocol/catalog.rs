//! Built-in protocol library and frequency reference tables

use crate::protocol::{Intensity, Phase, Protocol, ProtocolCategory, TimeOfDay};

// ============================================================================
// Reference tables
// ============================================================================

/// One tone of the solfeggio scale with its traditional associations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolfeggioTone {
    pub hz: f32,
    pub name: &'static str,
    pub intention: &'static str,
    pub chakra: Option<&'static str>,
}

/// The nine-tone solfeggio scale, low to high
pub fn solfeggio_tones() -> &'static [SolfeggioTone] {
    &[
        SolfeggioTone { hz: 174.0, name: "Foundation", intention: "Pain Reduction", chakra: None },
        SolfeggioTone { hz: 285.0, name: "Quantum", intention: "Tissue Regeneration", chakra: None },
        SolfeggioTone { hz: 396.0, name: "Liberation", intention: "Release Fear", chakra: Some("Root") },
        SolfeggioTone { hz: 417.0, name: "Change", intention: "Facilitate Change", chakra: Some("Sacral") },
        SolfeggioTone { hz: 528.0, name: "Miracle", intention: "DNA Repair", chakra: Some("Solar Plexus") },
        SolfeggioTone { hz: 639.0, name: "Connection", intention: "Relationships", chakra: Some("Heart") },
        SolfeggioTone { hz: 741.0, name: "Awakening", intention: "Expression", chakra: Some("Throat") },
        SolfeggioTone { hz: 852.0, name: "Intuition", intention: "Third Eye", chakra: Some("Third Eye") },
        SolfeggioTone { hz: 963.0, name: "Divine", intention: "Oneness", chakra: Some("Crown") },
    ]
}

/// A recommended carrier frequency with its perceived character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierPreset {
    pub hz: f32,
    pub name: &'static str,
    pub quality: &'static str,
}

pub fn carrier_presets() -> &'static [CarrierPreset] {
    &[
        CarrierPreset { hz: 100.0, name: "Deep Base", quality: "Very low, grounding" },
        CarrierPreset { hz: 150.0, name: "Foundation", quality: "Warm, embodied" },
        CarrierPreset { hz: 200.0, name: "Heart", quality: "Balanced, centered" },
        CarrierPreset { hz: 250.0, name: "Solar", quality: "Energizing" },
        CarrierPreset { hz: 300.0, name: "Standard", quality: "Clear, neutral" },
        CarrierPreset { hz: 350.0, name: "Bright", quality: "Uplifting" },
        CarrierPreset { hz: 400.0, name: "Mental", quality: "Sharp, focused" },
        CarrierPreset { hz: 432.0, name: "Universal", quality: "Natural harmony" },
        CarrierPreset { hz: 440.0, name: "Concert", quality: "Standard pitch" },
        CarrierPreset { hz: 500.0, name: "Ethereal", quality: "Light, transcendent" },
    ]
}

// ============================================================================
// Protocol library
// ============================================================================

fn phase(name: &str, duration_secs: f64, beat_hz: f32) -> Phase {
    Phase::new(name, duration_secs, beat_hz)
}

#[allow(clippy::too_many_arguments)]
fn protocol(
    id: &str,
    name: &str,
    category: ProtocolCategory,
    subcategory: &str,
    description: &str,
    intensity: Intensity,
    time_of_day: TimeOfDay,
    benefits: &[&str],
    phases: Vec<Phase>,
) -> Protocol {
    Protocol {
        id: id.to_string(),
        name: name.to_string(),
        category,
        subcategory: subcategory.to_string(),
        description: description.to_string(),
        benefits: benefits.iter().map(|b| b.to_string()).collect(),
        phases,
        intensity,
        time_of_day: Some(time_of_day),
    }
}

/// The complete built-in library, grouped by category
pub fn builtin_protocols() -> Vec<Protocol> {
    use Intensity::{Deep, Gentle, Moderate};
    use ProtocolCategory::{Adhd, Cognitive, Emotional, Physical, Spiritual};
    use TimeOfDay::{Anytime, Evening, Morning, Night};

    vec![
        // -- Emotional ---------------------------------------------------
        protocol(
            "anxiety-relief", "Anxiety Relief", Emotional, "Anxiety",
            "Alpha waves combined with the 528Hz love frequency to dissolve anxious thoughts and restore inner peace.",
            Moderate, Anytime,
            &["Reduces anxiety", "Calms racing thoughts", "Lowers cortisol", "Promotes relaxation"],
            vec![
                phase("Grounding", 180.0, 12.0).solfeggio(&[396.0]).describe("Establish a calm baseline"),
                phase("Release", 420.0, 10.0).solfeggio(&[528.0]).describe("Let go of tension"),
                phase("Calm", 480.0, 8.0).solfeggio(&[528.0, 639.0]).describe("Deep relaxation"),
                phase("Peace", 120.0, 10.0).solfeggio(&[528.0]).describe("Gentle return"),
            ],
        ),
        protocol(
            "depression-support", "Depression Support", Emotional, "Depression",
            "Theta waves with the 396Hz liberation frequency to lift mood and release stagnant emotional energy.",
            Moderate, Morning,
            &["Lifts mood", "Releases emotional blocks", "Promotes hope", "Increases energy"],
            vec![
                phase("Acknowledge", 300.0, 8.0).solfeggio(&[396.0]).describe("Honor current feelings"),
                phase("Release", 600.0, 6.0).solfeggio(&[396.0, 417.0]).describe("Let go of heaviness"),
                phase("Transform", 600.0, 5.0).solfeggio(&[417.0, 528.0]).describe("Shift perspective"),
                phase("Uplift", 300.0, 10.0).solfeggio(&[528.0]).describe("Rise into lightness"),
            ],
        ),
        protocol(
            "anger-release", "Anger Release", Emotional, "Anger",
            "Progressive alpha-theta journey to safely process and release pent-up anger and frustration.",
            Moderate, Anytime,
            &["Releases anger safely", "Reduces irritability", "Promotes forgiveness", "Restores calm"],
            vec![
                phase("Acknowledge", 180.0, 12.0).solfeggio(&[396.0]).describe("Recognize the anger"),
                phase("Express", 300.0, 10.0).solfeggio(&[417.0]).describe("Allow the energy to move"),
                phase("Transform", 300.0, 7.0).solfeggio(&[528.0]).describe("Convert to understanding"),
                phase("Peace", 120.0, 10.0).solfeggio(&[639.0]).describe("Return to harmony"),
            ],
        ),
        protocol(
            "grief-processing", "Grief Processing", Emotional, "Grief",
            "Gentle theta waves with 741Hz awakening frequency for safe emotional processing and healing.",
            Gentle, Evening,
            &["Honors grief", "Promotes healing", "Supports acceptance", "Opens the heart"],
            vec![
                phase("Hold Space", 300.0, 8.0).solfeggio(&[639.0]).describe("Create safe container"),
                phase("Feel", 600.0, 5.0).solfeggio(&[741.0]).describe("Allow emotions to flow"),
                phase("Release", 450.0, 6.0).solfeggio(&[741.0, 528.0]).describe("Let go with love"),
                phase("Integrate", 150.0, 10.0).solfeggio(&[528.0]).describe("Find peace"),
            ],
        ),
        protocol(
            "self-compassion", "Self-Compassion", Emotional, "Self-Love",
            "Heart-centered theta session with 639Hz connection frequency to cultivate deep self-love.",
            Gentle, Anytime,
            &["Builds self-love", "Reduces self-criticism", "Heals inner child", "Promotes acceptance"],
            vec![
                phase("Open Heart", 240.0, 8.0).solfeggio(&[639.0]).describe("Soften into receiving"),
                phase("Self-Love", 600.0, 6.0).solfeggio(&[528.0, 639.0]).describe("Embrace yourself fully"),
                phase("Forgiveness", 240.0, 7.0).solfeggio(&[639.0]).describe("Release judgment"),
                phase("Integration", 120.0, 10.0).solfeggio(&[528.0]).describe("Embody compassion"),
            ],
        ),
        // -- Physical ----------------------------------------------------
        protocol(
            "pain-management", "Pain Management", Physical, "Pain",
            "Deep delta waves combined with 174Hz foundation frequency for natural endorphin release and pain relief.",
            Deep, Anytime,
            &["Reduces pain perception", "Releases endorphins", "Deep relaxation", "Promotes healing"],
            vec![
                phase("Relax", 300.0, 8.0).solfeggio(&[174.0]).describe("Release muscle tension"),
                phase("Deepen", 600.0, 4.0).solfeggio(&[174.0, 285.0]).describe("Enter deep relaxation"),
                phase("Heal", 720.0, 2.0).solfeggio(&[285.0]).describe("Endorphin release"),
                phase("Emerge", 180.0, 8.0).solfeggio(&[528.0]).describe("Gentle return"),
            ],
        ),
        protocol(
            "sleep-induction", "Sleep Induction", Physical, "Sleep",
            "Progressive delta descent for natural, deep sleep without grogginess.",
            Deep, Night,
            &["Falls asleep naturally", "Deeper sleep", "Reduces insomnia", "Wakes refreshed"],
            vec![
                phase("Unwind", 600.0, 10.0).solfeggio(&[528.0]).describe("Release the day"),
                phase("Descend", 900.0, 6.0).solfeggio(&[396.0]).describe("Slow down"),
                phase("Pre-Sleep", 600.0, 3.0).solfeggio(&[174.0]).describe("Approach sleep"),
                phase("Sleep", 600.0, 1.5).solfeggio(&[174.0]).describe("Deep delta"),
            ],
        ),
        protocol(
            "immune-boost", "Immune Boost", Physical, "Immunity",
            "Theta-alpha bridge with 285Hz quantum healing frequency to support immune function.",
            Moderate, Morning,
            &["Supports immune system", "Reduces inflammation", "Promotes healing", "Stress reduction"],
            vec![
                phase("Calm", 300.0, 10.0).solfeggio(&[285.0]).describe("Reduce stress hormones"),
                phase("Activate", 600.0, 7.0).solfeggio(&[285.0, 528.0]).describe("Stimulate healing"),
                phase("Integrate", 300.0, 10.0).solfeggio(&[528.0]).describe("Balance restored"),
            ],
        ),
        protocol(
            "energy-restoration", "Energy Restoration", Physical, "Energy",
            "Alpha-beta bridge to naturally boost energy without caffeine.",
            Moderate, TimeOfDay::Afternoon,
            &["Natural energy boost", "Mental clarity", "Reduces fatigue", "Improves vitality"],
            vec![
                phase("Ground", 180.0, 10.0).solfeggio(&[417.0]).describe("Center yourself"),
                phase("Energize", 480.0, 14.0).solfeggio(&[417.0]).describe("Build energy"),
                phase("Sustain", 240.0, 12.0).solfeggio(&[528.0]).describe("Maintain vitality"),
            ],
        ),
        protocol(
            "inflammation-reduction", "Inflammation Reduction", Physical, "Inflammation",
            "Delta waves with 174Hz and 285Hz frequencies for cellular healing.",
            Deep, Evening,
            &["Reduces inflammation", "Cellular repair", "Pain relief", "Accelerates recovery"],
            vec![
                phase("Prepare", 300.0, 8.0).solfeggio(&[174.0]).describe("Relax deeply"),
                phase("Heal", 900.0, 3.0).solfeggio(&[174.0, 285.0]).describe("Cellular regeneration"),
                phase("Restore", 300.0, 8.0).solfeggio(&[285.0]).describe("Integration"),
            ],
        ),
        // -- Cognitive ---------------------------------------------------
        protocol(
            "study-focus", "Study Focus", Cognitive, "Focus",
            "Sustained beta waves with 417Hz for extended periods of concentrated study.",
            Moderate, Morning,
            &["Enhanced concentration", "Better retention", "Reduced distraction", "Mental stamina"],
            vec![
                phase("Prepare", 300.0, 12.0).solfeggio(&[417.0]).describe("Settle into focus"),
                phase("Focus", 2100.0, 15.0).solfeggio(&[417.0]).describe("Deep concentration"),
                phase("Rest", 300.0, 10.0).solfeggio(&[528.0]).describe("Mental break"),
            ],
        ),
        protocol(
            "memory-consolidation", "Memory Consolidation", Cognitive, "Memory",
            "Theta waves to strengthen memory encoding and consolidation.",
            Moderate, Evening,
            &["Stronger memory", "Better recall", "Enhanced learning", "Information retention"],
            vec![
                phase("Relax", 240.0, 10.0).describe("Calm the mind"),
                phase("Encode", 720.0, 6.0).solfeggio(&[852.0]).describe("Memory processing"),
                phase("Integrate", 240.0, 10.0).describe("Consolidation"),
            ],
        ),
        protocol(
            "creative-breakthrough", "Creative Breakthrough", Cognitive, "Creativity",
            "Theta waves with 852Hz intuition frequency for creative inspiration.",
            Moderate, Morning,
            &["Unlocks creativity", "Novel ideas", "Artistic flow", "Problem-solving"],
            vec![
                phase("Open", 360.0, 10.0).solfeggio(&[741.0]).describe("Release blocks"),
                phase("Create", 960.0, 7.5).solfeggio(&[852.0]).describe("Creative flow"),
                phase("Capture", 480.0, 10.0).solfeggio(&[741.0]).describe("Solidify ideas"),
            ],
        ),
        protocol(
            "mental-clarity", "Mental Clarity", Cognitive, "Clarity",
            "Alpha waves with 963Hz divine frequency for crystal-clear thinking.",
            Gentle, Anytime,
            &["Clear thinking", "Cuts through fog", "Better decisions", "Mental sharpness"],
            vec![
                phase("Clear", 300.0, 12.0).solfeggio(&[741.0]).describe("Dissolve confusion"),
                phase("Sharpen", 480.0, 10.0).solfeggio(&[963.0]).describe("Enhance clarity"),
                phase("Stabilize", 120.0, 10.0).solfeggio(&[528.0]).describe("Ground insights"),
            ],
        ),
        protocol(
            "learning-boost", "Learning Boost", Cognitive, "Learning",
            "Alpha-beta transition for optimal learning state.",
            Moderate, Morning,
            &["Faster learning", "Better absorption", "Enhanced focus", "Improved retention"],
            vec![
                phase("Ready", 300.0, 10.0).solfeggio(&[417.0]).describe("Prepare to learn"),
                phase("Absorb", 900.0, 12.0).solfeggio(&[417.0]).describe("Optimal learning"),
                phase("Integrate", 600.0, 8.0).solfeggio(&[528.0]).describe("Process information"),
            ],
        ),
        // -- Spiritual ---------------------------------------------------
        protocol(
            "chakra-journey", "Chakra Journey", Spiritual, "Chakras",
            "Progressive journey through all seven chakras with corresponding Solfeggio frequencies.",
            Moderate, Morning,
            &["Energy balancing", "Chakra alignment", "Spiritual healing", "Wholeness"],
            vec![
                phase("Root", 300.0, 7.83).solfeggio(&[396.0]).describe("Grounding & security"),
                phase("Sacral", 300.0, 7.83).solfeggio(&[417.0]).describe("Creativity & emotion"),
                phase("Solar Plexus", 300.0, 7.83).solfeggio(&[528.0]).describe("Power & will"),
                phase("Heart", 420.0, 7.83).solfeggio(&[639.0]).describe("Love & connection"),
                phase("Throat", 300.0, 7.83).solfeggio(&[741.0]).describe("Expression & truth"),
                phase("Third Eye", 420.0, 7.83).solfeggio(&[852.0]).describe("Intuition & insight"),
                phase("Crown", 360.0, 7.83).solfeggio(&[963.0]).describe("Divine connection"),
            ],
        ),
        protocol(
            "third-eye-activation", "Third Eye Activation", Spiritual, "Third Eye",
            "Theta waves with 852Hz and 963Hz for third eye opening and intuition enhancement.",
            Deep, Evening,
            &["Enhanced intuition", "Inner vision", "Expanded perception", "Spiritual insight"],
            vec![
                phase("Prepare", 300.0, 8.0).solfeggio(&[741.0]).describe("Clear the channel"),
                phase("Activate", 900.0, 6.5).solfeggio(&[852.0]).describe("Third eye opening"),
                phase("Expand", 240.0, 5.0).solfeggio(&[852.0, 963.0]).describe("Higher vision"),
                phase("Ground", 60.0, 10.0).solfeggio(&[396.0]).describe("Return safely"),
            ],
        ),
        protocol(
            "heart-coherence", "Heart Coherence", Spiritual, "Heart",
            "Alpha waves with heart-opening frequencies for coherence and love.",
            Gentle, Morning,
            &["Heart-brain coherence", "Emotional balance", "Increased compassion", "Inner peace"],
            vec![
                phase("Center", 240.0, 10.0).solfeggio(&[528.0]).describe("Find your center"),
                phase("Open", 660.0, 10.0).solfeggio(&[528.0, 639.0]).describe("Heart opening"),
                phase("Radiate", 300.0, 10.0).solfeggio(&[639.0]).describe("Share love"),
            ],
        ),
        protocol(
            "shamanic-journey", "Shamanic Journey", Spiritual, "Shamanic",
            "Deep theta with rhythmic isochronic pulses simulating shamanic drumming.",
            Deep, Evening,
            &["Altered states", "Vision quests", "Spirit connection", "Inner wisdom"],
            vec![
                phase("Descent", 420.0, 6.0).isochronic(4.0).describe("Enter the journey"),
                phase("Journey", 1080.0, 4.5).isochronic(4.5).solfeggio(&[852.0]).describe("Spirit world"),
                phase("Return", 300.0, 8.0).isochronic(0.0).describe("Come back safely"),
            ],
        ),
        protocol(
            "lucid-dream-prep", "Lucid Dream Prep", Spiritual, "Dreams",
            "Theta waves with isochronic pulses to induce lucid dreaming awareness.",
            Deep, Night,
            &["Lucid dreaming", "Dream recall", "Consciousness in sleep", "Night exploration"],
            vec![
                phase("Relax", 360.0, 8.0).describe("Release the day"),
                phase("Theta Gate", 540.0, 5.0).isochronic(5.0).solfeggio(&[852.0]).describe("Approach dream state"),
                phase("Lucid Zone", 300.0, 4.0).isochronic(6.0).describe("Awareness threshold"),
            ],
        ),
        // -- ADHD support ------------------------------------------------
        protocol(
            "focus-boost", "Focus Boost", Adhd, "Focus",
            "2-minute gamma burst for instant task initiation and focus activation.",
            Moderate, Anytime,
            &["Instant focus", "Task initiation", "Mental clarity", "Activation energy"],
            vec![
                phase("Activate", 30.0, 20.0).describe("Quick activation"),
                phase("Peak", 60.0, 40.0).describe("Gamma burst"),
                phase("Sustain", 30.0, 18.0).describe("Maintain focus"),
            ],
        ),
        protocol(
            "overwhelm-reset", "Overwhelm Reset", Adhd, "Regulation",
            "Instant alpha drop with breathing guide for emotional regulation.",
            Gentle, Anytime,
            &["Reduces overwhelm", "Emotional reset", "Calms nervous system", "Restores control"],
            vec![
                phase("Ground", 45.0, 10.0).solfeggio(&[396.0]).describe("Find your ground"),
                phase("Stabilize", 90.0, 7.83).solfeggio(&[528.0]).describe("Earth resonance"),
                phase("Reset", 45.0, 10.0).describe("Return balanced"),
            ],
        ),
        protocol(
            "transition-help", "Transition Helper", Adhd, "Transitions",
            "Smooth frequency shift for easier task switching and mental flexibility.",
            Gentle, Anytime,
            &["Easier transitions", "Mental flexibility", "Reduced friction", "Flow between tasks"],
            vec![
                phase("Release", 90.0, 14.0).describe("Let go of last task"),
                phase("Neutral", 120.0, 10.0).solfeggio(&[417.0]).describe("Clear space"),
                phase("Prepare", 90.0, 16.0).describe("Ready for next"),
            ],
        ),
        protocol(
            "wind-down", "Wind Down", Adhd, "Transitions",
            "Gradual descent from any state to calm for end of day or work session.",
            Gentle, Evening,
            &["Gentle deactivation", "Stress release", "Prepares for rest", "Prevents burnout"],
            vec![
                phase("Slow", 180.0, 12.0).describe("Begin slowing"),
                phase("Calm", 300.0, 9.0).solfeggio(&[528.0]).describe("Deeper relaxation"),
                phase("Peace", 120.0, 7.0).solfeggio(&[528.0]).describe("Quiet mind"),
            ],
        ),
        protocol(
            "deep-work-session", "Deep Work Session", Adhd, "Focus",
            "Full 45-minute focus session with built-in warm-up and cool-down.",
            Moderate, Morning,
            &["Extended focus", "Flow state", "Productive work", "Healthy transitions"],
            vec![
                phase("Settle", 180.0, 10.0).describe("Calm the mind"),
                phase("Ramp Up", 300.0, 14.0).describe("Build focus"),
                phase("Deep Focus", 1800.0, 18.0).solfeggio(&[417.0]).describe("Peak concentration"),
                phase("Wind Down", 300.0, 12.0).describe("Gentle exit"),
                phase("Complete", 120.0, 10.0).solfeggio(&[528.0]).describe("Integration"),
            ],
        ),
        protocol(
            "morning-activation", "Morning Activation", Adhd, "Routines",
            "Wake up your brain gently and effectively, overcoming sleep inertia.",
            Moderate, Morning,
            &["Overcomes sleep inertia", "Natural awakening", "Mental alertness", "Ready for day"],
            vec![
                phase("Wake", 120.0, 8.0).describe("Gentle waking"),
                phase("Energize", 240.0, 12.0).solfeggio(&[417.0]).describe("Building energy"),
                phase("Activate", 180.0, 16.0).describe("Full alertness"),
                phase("Ready", 60.0, 14.0).describe("Sustained energy"),
            ],
        ),
    ]
}

/// Look up one built-in protocol by id
pub fn find_protocol(id: &str) -> Option<Protocol> {
    builtin_protocols().into_iter().find(|p| p.id == id)
}

/// All built-in protocols in `category`
pub fn protocols_by_category(category: ProtocolCategory) -> Vec<Protocol> {
    builtin_protocols()
        .into_iter()
        .filter(|p| p.category == category)
        .collect()
}
