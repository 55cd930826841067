//! XM samples and delta encoding of their PCM payloads.
//!
//! XM stores sample data as running differences: the first value relative to
//! 0, every following value relative to its predecessor, wrapping in the
//! sample's own width. Players rebuild the waveform with a running sum.

use serde::{Deserialize, Serialize};

use super::error::SampleOverflow;
use crate::buffer::ByteBuffer;

/// XM sample header size.
pub const XM_SAMPLE_HEADER_SIZE: u32 = 40;

/// Type byte bit marking 16-bit sample data.
pub const SAMPLE_TYPE_16BIT: u8 = 0x10;

/// Signed PCM value that can be delta-encoded with wraparound.
pub trait DeltaSample: Copy + Default {
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_add(self, rhs: Self) -> Self;
}

impl DeltaSample for i8 {
    fn wrapping_sub(self, rhs: Self) -> Self {
        i8::wrapping_sub(self, rhs)
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        i8::wrapping_add(self, rhs)
    }
}

impl DeltaSample for i16 {
    fn wrapping_sub(self, rhs: Self) -> Self {
        i16::wrapping_sub(self, rhs)
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        i16::wrapping_add(self, rhs)
    }
}

/// Convert absolute PCM values into running differences.
pub fn delta_encode<T: DeltaSample>(samples: &[T]) -> Vec<T> {
    let mut prev = T::default();
    samples
        .iter()
        .map(|&sample| {
            let delta = sample.wrapping_sub(prev);
            prev = sample;
            delta
        })
        .collect()
}

/// Rebuild absolute PCM values from running differences.
pub fn delta_decode<T: DeltaSample>(deltas: &[T]) -> Vec<T> {
    let mut acc = T::default();
    deltas
        .iter()
        .map(|&delta| {
            acc = acc.wrapping_add(delta);
            acc
        })
        .collect()
}

/// Sample loop mode (type byte bits 0-1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XmLoopType {
    #[default]
    None = 0,
    Forward = 1,
    PingPong = 2,
}

/// Signed PCM payload of a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleData {
    Pcm8(Vec<i8>),
    Pcm16(Vec<i16>),
}

impl Default for SampleData {
    fn default() -> Self {
        SampleData::Pcm8(Vec::new())
    }
}

impl SampleData {
    /// Number of sample frames.
    pub fn frames(&self) -> usize {
        match self {
            SampleData::Pcm8(data) => data.len(),
            SampleData::Pcm16(data) => data.len(),
        }
    }

    pub fn is_16bit(&self) -> bool {
        matches!(self, SampleData::Pcm16(_))
    }

    /// Bytes per frame on disk.
    pub fn bytes_per_frame(&self) -> u32 {
        if self.is_16bit() {
            2
        } else {
            1
        }
    }

    /// Append the delta-encoded payload.
    pub fn write_delta(&self, buf: &mut ByteBuffer) {
        match self {
            SampleData::Pcm8(data) => {
                for delta in delta_encode(data) {
                    buf.write_i8(delta);
                }
            }
            SampleData::Pcm16(data) => {
                for delta in delta_encode(data) {
                    buf.write_i16(delta);
                }
            }
        }
    }
}

/// XM sample: header fields plus PCM data.
///
/// Length and loop fields are kept in frames; they are converted to bytes
/// when written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmSample {
    /// Sample name (22 bytes max).
    pub name: String,
    /// PCM data, absolute values.
    pub data: SampleData,
    /// Loop start (in frames).
    pub loop_start: u32,
    /// Loop length (in frames).
    pub loop_length: u32,
    pub loop_type: XmLoopType,
    /// Default volume (0-64).
    pub volume: u8,
    /// Finetune (-128 to 127).
    pub finetune: i8,
    /// Panning (0-255, 128=center).
    pub panning: u8,
    /// Relative note (semitones from C-4).
    pub relative_note: i8,
}

impl Default for XmSample {
    fn default() -> Self {
        Self {
            name: String::new(),
            data: SampleData::default(),
            loop_start: 0,
            loop_length: 0,
            loop_type: XmLoopType::None,
            volume: 64,
            finetune: 0,
            panning: 128,
            relative_note: 0,
        }
    }
}

impl XmSample {
    /// Create a sample from 8-bit signed PCM.
    pub fn pcm8(name: &str, data: Vec<i8>) -> Self {
        Self {
            name: name.to_string(),
            data: SampleData::Pcm8(data),
            ..Default::default()
        }
    }

    /// Create a sample from 16-bit signed PCM.
    pub fn pcm16(name: &str, data: Vec<i16>) -> Self {
        Self {
            name: name.to_string(),
            data: SampleData::Pcm16(data),
            ..Default::default()
        }
    }

    /// Set loop parameters (in frames).
    pub fn with_loop(mut self, start: u32, length: u32, loop_type: XmLoopType) -> Self {
        self.loop_start = start;
        self.loop_length = length;
        self.loop_type = loop_type;
        self
    }

    /// Set pitch correction.
    pub fn with_pitch_correction(mut self, finetune: i8, relative_note: i8) -> Self {
        self.finetune = finetune;
        self.relative_note = relative_note;
        self
    }

    /// Type byte: loop type in bits 0-1, 16-bit flag in bit 4.
    pub fn type_byte(&self) -> u8 {
        let width = if self.data.is_16bit() {
            SAMPLE_TYPE_16BIT
        } else {
            0
        };
        (self.loop_type as u8 & 0x03) | width
    }

    /// Scale a frame count to the on-disk byte count.
    fn byte_count(&self, field: &'static str, frames: u64) -> Result<u32, SampleOverflow> {
        frames
            .checked_mul(u64::from(self.data.bytes_per_frame()))
            .and_then(|bytes| u32::try_from(bytes).ok())
            .ok_or(SampleOverflow { field, frames })
    }

    /// Write the 40-byte sample header.
    ///
    /// Fails without writing when a length or loop field overflows 32 bits
    /// once scaled to bytes.
    pub fn write_header(&self, buf: &mut ByteBuffer) -> Result<(), SampleOverflow> {
        let length = self.byte_count("length", self.data.frames() as u64)?;
        let loop_start = self.byte_count("loop start", u64::from(self.loop_start))?;
        let loop_length = self.byte_count("loop length", u64::from(self.loop_length))?;

        buf.write_u32(length);
        buf.write_u32(loop_start);
        buf.write_u32(loop_length);
        buf.write_u8(self.volume);
        buf.write_i8(self.finetune);
        buf.write_u8(self.type_byte());
        buf.write_u8(self.panning);
        buf.write_i8(self.relative_note);
        buf.write_u8(0); // Reserved
        buf.write_string(&self.name, 22);
        Ok(())
    }

    /// Write the sample data (delta-encoded).
    pub fn write_data(&self, buf: &mut ByteBuffer) {
        self.data.write_delta(buf);
    }
}
