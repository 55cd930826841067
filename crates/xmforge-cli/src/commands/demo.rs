//! Demo command implementation
//!
//! Builds a short two-instrument song entirely in code and writes it as XM.

use anyhow::Result;
use std::f64::consts::TAU;
use std::process::ExitCode;

use xmforge::note::calculate_pitch_correction;
use xmforge::xm::{
    effects, volume, XmEnvelope, XmInstrument, XmLoopType, XmModule, XmNote, XmPattern, XmSample,
};

use super::reporting::{encode_to_file, print_summary};

/// Rate the demo waveforms are generated at.
const DEMO_SAMPLE_RATE: u32 = 22050;

/// Frames in one cycle of each demo waveform.
const CYCLE_FRAMES: usize = 64;

const CHANNELS: u16 = 4;
const ROWS: u16 = 64;

/// Run the demo command
///
/// # Arguments
/// * `output` - Path of the XM file to write
/// * `json` - Print the summary as JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(output: &str, json: bool) -> Result<ExitCode> {
    let module = demo_song();
    let summary = encode_to_file(&module, output)?;
    print_summary(&summary, json)?;
    Ok(ExitCode::SUCCESS)
}

/// Build the demo song: a looping 16-bit sine lead over an 8-bit square bass.
pub fn demo_song() -> XmModule {
    let mut module = XmModule::new("xmforge demo", CHANNELS, 6, 125);

    let (finetune, relative_note) = calculate_pitch_correction(DEMO_SAMPLE_RATE);

    let sine: Vec<i16> = (0..CYCLE_FRAMES)
        .map(|i| ((i as f64 / CYCLE_FRAMES as f64 * TAU).sin() * 24000.0).round() as i16)
        .collect();
    let lead = XmInstrument::new("Sine Lead")
        .with_volume_envelope(XmEnvelope::adsr(4, 12, 40, 24))
        .with_sample(
            XmSample::pcm16("sine", sine)
                .with_loop(0, CYCLE_FRAMES as u32, XmLoopType::Forward)
                .with_pitch_correction(finetune, relative_note),
        );

    let square: Vec<i8> = (0..CYCLE_FRAMES)
        .map(|i| if i < CYCLE_FRAMES / 2 { 96 } else { -96 })
        .collect();
    let bass = XmInstrument::new("Square Bass").with_sample(
        XmSample::pcm8("square", square)
            .with_loop(0, CYCLE_FRAMES as u32, XmLoopType::Forward)
            .with_pitch_correction(finetune, relative_note),
    );

    module.add_instrument(lead);
    module.add_instrument(bass);

    module.add_pattern(intro_pattern());
    module.add_pattern(main_pattern());
    module.set_order_table(&[0, 1, 1]);
    module.set_restart_position(1);
    module
}

/// Bass line alone, fading in.
fn intro_pattern() -> XmPattern {
    let mut pattern = XmPattern::sparse(ROWS);
    for (step, row) in (0..ROWS).step_by(8).enumerate() {
        let level = (16 + step * 6).min(64) as u8;
        pattern.set_note(row, 1, XmNote::from_name("C-2", 2, Some(level)));
        pattern.set_note(row + 4, 1, XmNote::note_off());
    }
    pattern
}

/// Arpeggiated lead over the bass, with a volume slide on the last bar.
fn main_pattern() -> XmPattern {
    const MELODY: [&str; 8] = ["C-4", "E-4", "G-4", "C-5", "A-4", "F-4", "D-4", "G-4"];
    const ROOTS: [&str; 4] = ["C-2", "A-1", "F-1", "G-1"];

    let mut pattern = XmPattern::empty(ROWS, CHANNELS);
    for (i, name) in MELODY.iter().enumerate() {
        let row = i as u16 * 8;
        pattern.set_note(
            row,
            0,
            XmNote::from_name(name, 1, Some(56)).with_effect(effects::VIBRATO, 0x24),
        );
        pattern.set_note(
            row + 4,
            0,
            XmNote::empty().with_volume_effect(volume::SLIDE_DOWN | 0x2),
        );
    }
    for (i, name) in ROOTS.iter().enumerate() {
        let row = i as u16 * 16;
        pattern.set_note(row, 1, XmNote::from_name(name, 2, Some(48)));
        pattern.set_note(
            row + 8,
            2,
            XmNote::from_name(name, 2, None).with_effect(effects::ARPEGGIO, 0x37),
        );
    }
    pattern.set_note(
        56,
        3,
        XmNote::empty().with_effect(effects::VOL_SLIDE, 0x04),
    );
    pattern.set_note(63, 3, XmNote::empty().with_effect(effects::PATTERN_BREAK, 0));
    pattern
}
