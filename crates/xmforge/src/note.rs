//! Note-name conversion and pitch correction for XM modules.
//!
//! XM numbers notes 1..=96 starting at C-0, with 97 reserved for note-off and
//! 0 meaning "no note".

/// Reference frequency at which an untuned sample plays C-4.
pub const XM_BASE_FREQ: f64 = 8363.0;

/// Note values for XM format.
pub mod xm {
    /// No note present.
    pub const NOTE_NONE: u8 = 0;
    /// Note off command.
    pub const NOTE_OFF: u8 = 97;
    /// Minimum valid note (C-0).
    pub const NOTE_MIN: u8 = 1;
    /// Maximum valid note (B-7).
    pub const NOTE_MAX: u8 = 96;
}

/// Semitone offsets for note names (C=0, D=2, E=4, F=5, G=7, A=9, B=11).
const SEMITONE_MAP: [(char, i32); 7] = [
    ('C', 0),
    ('D', 2),
    ('E', 4),
    ('F', 5),
    ('G', 7),
    ('A', 9),
    ('B', 11),
];

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

/// Convert a note name (e.g., "C4", "C-4", "A#3", "Bb5") to an XM note value.
///
/// Returns 0 for empty cells ("", "---", "...") and unparseable input, 97 for
/// note-off ("OFF", "==="). Octaves outside 0..=7 are clamped to the valid
/// note range.
///
/// # Examples
/// ```
/// use xmforge::note::note_name_to_xm;
///
/// assert_eq!(note_name_to_xm("C4"), 49);
/// assert_eq!(note_name_to_xm("A#3"), 47);
/// assert_eq!(note_name_to_xm("---"), 0);
/// assert_eq!(note_name_to_xm("OFF"), 97);
/// ```
pub fn note_name_to_xm(name: &str) -> u8 {
    let name = name.trim();
    if name.is_empty() || name == "---" || name == "..." {
        return xm::NOTE_NONE;
    }
    if name == "===" || name.eq_ignore_ascii_case("off") {
        return xm::NOTE_OFF;
    }

    // "C-4" and "C4" are the same note
    let name = name.replace('-', "");

    parse_note_name(&name)
        .map(|(semitone, octave)| {
            // Any octave past this range clamps to the same end note
            let note = octave.clamp(-1, 8) * 12 + semitone + 1;
            note.clamp(xm::NOTE_MIN as i32, xm::NOTE_MAX as i32) as u8
        })
        .unwrap_or(xm::NOTE_NONE)
}

/// Parse a note name into semitone offset and octave.
fn parse_note_name(name: &str) -> Option<(i32, i32)> {
    let mut chars = name.chars().peekable();

    let letter = chars.next()?.to_ascii_uppercase();
    let mut semitone = SEMITONE_MAP
        .iter()
        .find(|(c, _)| *c == letter)
        .map(|(_, s)| *s)?;

    match chars.peek() {
        Some('#') => {
            chars.next();
            semitone += 1;
        }
        Some('b') | Some('B') => {
            chars.next();
            semitone -= 1;
        }
        _ => {}
    }

    let octave: i32 = chars.collect::<String>().parse().ok()?;
    Some((semitone, octave))
}

/// Convert an XM note value back to a tracker-style name ("C-4", "A#3").
///
/// # Examples
/// ```
/// use xmforge::note::xm_note_to_name;
///
/// assert_eq!(xm_note_to_name(49), "C-4");
/// assert_eq!(xm_note_to_name(0), "---");
/// assert_eq!(xm_note_to_name(97), "===");
/// ```
pub fn xm_note_to_name(note: u8) -> String {
    match note {
        xm::NOTE_NONE => "---".to_string(),
        xm::NOTE_OFF => "===".to_string(),
        xm::NOTE_MIN..=xm::NOTE_MAX => {
            let index = (note - 1) as usize;
            format!("{}{}", NOTE_NAMES[index % 12], index / 12)
        }
        _ => "???".to_string(),
    }
}

/// Calculate (finetune, relative note) for a sample recorded at `sample_rate`
/// so that it plays at its natural pitch on C-4.
///
/// # Examples
/// ```
/// use xmforge::note::calculate_pitch_correction;
///
/// let (finetune, relative_note) = calculate_pitch_correction(22050);
/// assert_eq!(relative_note, 16);
/// assert_eq!(finetune, 100);
/// ```
pub fn calculate_pitch_correction(sample_rate: u32) -> (i8, i8) {
    let semitones = 12.0 * (sample_rate as f64 / XM_BASE_FREQ).log2();
    let mut relative_note = semitones.floor() as i32;
    let mut finetune = ((semitones - relative_note as f64) * 128.0).round() as i32;

    if finetune >= 128 {
        finetune -= 128;
        relative_note += 1;
    }

    (
        finetune.clamp(-128, 127) as i8,
        relative_note.clamp(-128, 127) as i8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_names() {
        assert_eq!(note_name_to_xm("C0"), 1);
        assert_eq!(note_name_to_xm("C-4"), 49);
        assert_eq!(note_name_to_xm("c4"), 49);
        assert_eq!(note_name_to_xm("Bb3"), 47);
        assert_eq!(note_name_to_xm("B7"), 96);
        assert_eq!(note_name_to_xm("B9"), 96);
        assert_eq!(note_name_to_xm("==="), 97);
        assert_eq!(note_name_to_xm("H4"), 0);
        assert_eq!(note_name_to_xm("C"), 0);
    }

    #[test]
    fn test_extreme_octaves_clamp() {
        assert_eq!(note_name_to_xm("C999999999"), xm::NOTE_MAX);
        assert_eq!(note_name_to_xm("B#2147483647"), xm::NOTE_MAX);
        assert_eq!(note_name_to_xm("Cb0"), xm::NOTE_MIN);
    }

    #[test]
    fn test_name_roundtrip() {
        for note in xm::NOTE_MIN..=xm::NOTE_MAX {
            assert_eq!(note_name_to_xm(&xm_note_to_name(note)), note);
        }
    }

    #[test]
    fn test_pitch_correction_at_base_rate() {
        assert_eq!(calculate_pitch_correction(8363), (0, 0));
        assert_eq!(calculate_pitch_correction(16726), (0, 12));
    }
}
