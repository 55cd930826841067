//! Integration tests for the XM encoder: format limits, note conflicts,
//! JSON module descriptions and complete file layout.

use pretty_assertions::assert_eq;
use xmforge::xm::effects;
use xmforge::xm::{
    EncodeError, SampleData, SampleOverflow, VolumeConflict, XmEncoder, XmEnvelope, XmInstrument,
    XmLoopType, XmModule, XmNote, XmPattern, XmSample, XM_MAX_CHANNELS, XM_MAX_INSTRUMENTS,
    XM_MAX_PACKED_PATTERN_SIZE, XM_MAX_PATTERNS,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn module_with(channels: u16, patterns: usize, instruments: usize) -> XmModule {
    let mut module = XmModule::new("Limits", channels, 6, 125);
    for _ in 0..patterns {
        module.add_pattern(XmPattern::sparse(1));
    }
    for i in 0..instruments {
        module.add_instrument(XmInstrument::new(&format!("Inst {}", i)));
    }
    module
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_limit_constants() {
    assert_eq!(XM_MAX_CHANNELS, 32);
    assert_eq!(XM_MAX_PATTERNS, 256);
    assert_eq!(XM_MAX_INSTRUMENTS, 128);
}

#[test]
fn test_limits_at_maximum_are_accepted() {
    let module = module_with(32, 256, 128);
    let xm = module.to_bytes().unwrap();
    assert_eq!(u16::from_le_bytes([xm[70], xm[71]]), 256);
    assert_eq!(u16::from_le_bytes([xm[72], xm[73]]), 128);
}

#[test]
fn test_too_many_channels() {
    assert_eq!(
        module_with(33, 1, 0).to_bytes(),
        Err(EncodeError::TooManyChannels { count: 33, max: 32 })
    );
}

#[test]
fn test_too_many_patterns() {
    assert_eq!(
        module_with(4, 257, 0).to_bytes(),
        Err(EncodeError::TooManyPatterns {
            count: 257,
            max: 256
        })
    );
}

#[test]
fn test_too_many_instruments() {
    assert_eq!(
        module_with(4, 1, 129).to_bytes(),
        Err(EncodeError::TooManyInstruments {
            count: 129,
            max: 128
        })
    );
}

#[test]
fn test_limit_error_messages() {
    let err = module_with(4, 257, 0).to_bytes().unwrap_err();
    assert_eq!(err.to_string(), "too many patterns: 257 (max 256)");
    assert_eq!(err.code(), "XM002");
}

// =============================================================================
// Note Conflict Tests
// =============================================================================

#[test]
fn test_volume_conflict_reports_cell() {
    let mut module = XmModule::new("Conflict", 4, 6, 125);
    module.add_pattern(XmPattern::empty(64, 4));

    let mut pattern = XmPattern::sparse(64);
    pattern.set_note(40, 2, XmNote::from_name("C4", 1, Some(10)).with_volume_effect(0x65));
    module.add_pattern(pattern);

    let err = XmEncoder::new().encode(&module).unwrap_err();
    assert_eq!(
        err,
        EncodeError::VolumeConflict {
            pattern: 1,
            row: 40,
            channel: 2,
            source: VolumeConflict,
        }
    );
    assert_eq!(
        std::error::Error::source(&err).map(|e| e.to_string()),
        Some("note sets both a volume level and a volume-column effect".to_string())
    );
}

#[test]
fn test_conflict_outside_channel_range_is_ignored() {
    let mut module = XmModule::new("Narrow", 2, 6, 125);
    let mut pattern = XmPattern::sparse(4);
    pattern.set_note(0, 3, XmNote::empty().with_volume(1).with_volume_effect(0x61));
    module.add_pattern(pattern);

    assert!(module.to_bytes().is_ok());
}

// =============================================================================
// Size Field Tests
// =============================================================================

#[test]
fn test_pattern_too_large_for_size_field() {
    // 3000 rows x 32 channels of note-offs pack to 192000 bytes
    let mut pattern = XmPattern::sparse(3000);
    for row in 0..3000 {
        for channel in 0..32 {
            pattern.set_note(row, channel, XmNote::note_off());
        }
    }
    let mut module = XmModule::new("Huge", 32, 6, 125);
    module.add_pattern(XmPattern::sparse(1));
    module.add_pattern(pattern);

    let err = module.to_bytes().unwrap_err();
    assert_eq!(
        err,
        EncodeError::PatternTooLarge {
            pattern: 1,
            size: 192000,
            max: XM_MAX_PACKED_PATTERN_SIZE,
        }
    );
    assert_eq!(err.code(), "XM005");
}

#[test]
fn test_sample_loop_overflow_from_json() {
    let json = r#"{
        "instruments": [
            { "name": "Fine" },
            {
                "name": "Far",
                "samples": [{ "data": { "pcm16": [1, 2] }, "loop_start": 3000000000 }]
            }
        ]
    }"#;
    let module: XmModule = serde_json::from_str(json).unwrap();

    assert_eq!(
        module.to_bytes(),
        Err(EncodeError::SampleTooLarge {
            instrument: 1,
            sample: 0,
            source: SampleOverflow {
                field: "loop start",
                frames: 3_000_000_000,
            },
        })
    );
}

// =============================================================================
// JSON Module Tests
// =============================================================================

#[test]
fn test_module_from_sparse_json() {
    let json = r#"{
        "header": { "name": "From JSON", "num_channels": 2, "order_table": [0] , "song_length": 1 },
        "patterns": [
            { "num_rows": 4, "notes": [[{ "note": 49, "instrument": 1, "volume": 64 }]] }
        ],
        "instruments": [
            {
                "name": "Square",
                "samples": [
                    {
                        "name": "sq",
                        "data": { "pcm8": [64, 64, -64, -64] },
                        "loop_type": "forward",
                        "loop_length": 4
                    }
                ]
            }
        ]
    }"#;

    let module: XmModule = serde_json::from_str(json).unwrap();
    assert_eq!((module.header.default_tempo, module.header.default_bpm), (6, 125));
    assert_eq!(module.instruments[0].samples[0].volume, 64);
    assert_eq!(module.instruments[0].samples[0].loop_type, XmLoopType::Forward);
    assert_eq!(
        module.instruments[0].samples[0].data,
        SampleData::Pcm8(vec![64, 64, -64, -64])
    );

    let xm = module.to_bytes().unwrap();
    let pattern = &xm[336..];
    assert_eq!(u16::from_le_bytes([pattern[7], pattern[8]]), 4 + 7);
    assert_eq!(&pattern[9..13], &[0x87, 49, 1, 0x50]);
}

#[test]
fn test_json_roundtrip_preserves_encoding() {
    let module = demo_module();
    let json = serde_json::to_string(&module).unwrap();
    let parsed: XmModule = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, module);
    assert_eq!(parsed.compute_hash().unwrap(), module.compute_hash().unwrap());
}

// =============================================================================
// Complete File Tests
// =============================================================================

fn demo_module() -> XmModule {
    let mut module = XmModule::new("Complete", 2, 6, 125);

    let mut pattern = XmPattern::sparse(8);
    pattern.set_note(
        0,
        0,
        XmNote::from_name("C-4", 1, Some(64)).with_effect(effects::VIBRATO, 0x24),
    );
    pattern.set_note(0, 1, XmNote::from_name("G-4", 2, None));
    pattern.set_note(4, 0, XmNote::note_off());
    module.add_pattern(pattern);

    let saw: Vec<i8> = (0..32).map(|i| (i * 8 - 128) as i8).collect();
    let lead = XmInstrument::new("Lead")
        .with_volume_envelope(XmEnvelope::adsr(2, 8, 40, 16))
        .with_sample(XmSample::pcm8("saw", saw).with_loop(0, 32, XmLoopType::Forward));
    let sine = vec![0, 12000, 16000, 12000, 0, -12000, -16000, -12000];
    let bass = XmInstrument::new("Bass").with_sample(XmSample::pcm16("sine", sine));
    module.add_instrument(lead);
    module.add_instrument(bass);
    module.set_order_table(&[0, 0]);
    module
}

#[test]
fn test_complete_file_layout() {
    let xm = demo_module().to_bytes().unwrap();

    // 16 cells: raw 5 + note/instrument 3 + note-off 2 + 13 empty
    let body = 5 + 3 + 2 + 13;
    let pattern_end = 336 + 9 + body;
    assert_eq!(u16::from_le_bytes([xm[336 + 7], xm[336 + 8]]), body as u16);
    assert_eq!(&xm[345..350], &[49, 1, 0x50, effects::VIBRATO, 0x24]);

    let lead_end = pattern_end + 243 + 40 + 32;
    let bass_end = lead_end + 243 + 40 + 16;
    assert_eq!(xm.len(), bass_end);
    assert_eq!(&xm[pattern_end + 4..pattern_end + 8], b"Lead");
    assert_eq!(&xm[lead_end + 4..lead_end + 8], b"Bass");

    // Saw ramp deltas: first -128, then +8
    let lead_data = &xm[lead_end - 32..lead_end];
    assert_eq!(lead_data[0] as i8, -128);
    assert!(lead_data[1..].iter().all(|&b| b == 8));
}

#[test]
fn test_encoding_is_deterministic() {
    let a = demo_module().to_bytes().unwrap();
    let b = XmEncoder::new().encode(&demo_module()).unwrap();
    assert_eq!(a, b);
    assert_eq!(demo_module().compute_hash().unwrap().len(), 64);
}
