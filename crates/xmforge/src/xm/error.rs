//! Error types for XM encoding.

use thiserror::Error;

/// A note sets both a volume level and a raw volume-column effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("note sets both a volume level and a volume-column effect")]
pub struct VolumeConflict;

/// A sample length or loop field does not fit the 32-bit byte count once
/// scaled to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("sample {field} of {frames} frames does not fit in 32 bits as bytes")]
pub struct SampleOverflow {
    pub field: &'static str,
    pub frames: u64,
}

/// Errors that abort an encode. Any bytes produced before the error are
/// discarded with the encoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("too many channels: {count} (max {max})")]
    TooManyChannels { count: usize, max: usize },
    #[error("too many patterns: {count} (max {max})")]
    TooManyPatterns { count: usize, max: usize },
    #[error("too many instruments: {count} (max {max})")]
    TooManyInstruments { count: usize, max: usize },
    #[error("invalid note at pattern {pattern}, row {row}, channel {channel}")]
    VolumeConflict {
        pattern: usize,
        row: u16,
        channel: u16,
        #[source]
        source: VolumeConflict,
    },
    #[error("pattern {pattern} packs to {size} bytes (max {max})")]
    PatternTooLarge {
        pattern: usize,
        size: usize,
        max: usize,
    },
    #[error("invalid sample {sample} in instrument {instrument}")]
    SampleTooLarge {
        instrument: usize,
        sample: usize,
        #[source]
        source: SampleOverflow,
    },
}

impl EncodeError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            EncodeError::TooManyChannels { .. } => "XM001",
            EncodeError::TooManyPatterns { .. } => "XM002",
            EncodeError::TooManyInstruments { .. } => "XM003",
            EncodeError::VolumeConflict { .. } => "XM004",
            EncodeError::PatternTooLarge { .. } => "XM005",
            EncodeError::SampleTooLarge { .. } => "XM006",
        }
    }
}
