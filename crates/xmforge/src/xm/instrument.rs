//! XM instrument structures and writing.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::EncodeError;
use super::sample::{XmSample, XM_SAMPLE_HEADER_SIZE};
use crate::buffer::ByteBuffer;

/// Instrument header size without the extended block (size field, name,
/// type byte, sample count).
pub const XM_INSTRUMENT_BASE_SIZE: u32 = 29;

/// Size of the extended block written for instruments that own samples.
pub const XM_INSTRUMENT_EXTENDED_SIZE: u32 = 214;

/// Envelope table length in points.
pub const XM_ENVELOPE_POINTS: usize = 12;

/// Per-note sample table length.
pub const XM_NOTE_MAP_SIZE: usize = 96;

/// Envelope point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmEnvelopePoint {
    /// Frame number (0-65535).
    pub frame: u16,
    /// Value (0-64).
    pub value: u16,
}

/// Volume or panning envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmEnvelope {
    /// Envelope points (up to 12).
    pub points: Vec<XmEnvelopePoint>,
    /// Sustain point index.
    pub sustain_point: u8,
    /// Loop start point index.
    pub loop_start: u8,
    /// Loop end point index.
    pub loop_end: u8,
    /// Envelope enabled.
    pub enabled: bool,
    /// Sustain enabled.
    pub sustain_enabled: bool,
    /// Loop enabled.
    pub loop_enabled: bool,
}

impl XmEnvelope {
    /// Create a simple ADSR-style volume envelope.
    pub fn adsr(
        attack_frames: u16,
        decay_frames: u16,
        sustain_level: u8,
        release_frames: u16,
    ) -> Self {
        let sustain = sustain_level.min(64) as u16;
        let decay_end = attack_frames.saturating_add(decay_frames);
        let release_start = decay_end.saturating_add(100);

        Self {
            points: vec![
                XmEnvelopePoint { frame: 0, value: 0 },
                XmEnvelopePoint {
                    frame: attack_frames,
                    value: 64,
                },
                XmEnvelopePoint {
                    frame: decay_end,
                    value: sustain,
                },
                XmEnvelopePoint {
                    frame: release_start,
                    value: sustain,
                },
                XmEnvelopePoint {
                    frame: release_start.saturating_add(release_frames),
                    value: 0,
                },
            ],
            sustain_point: 2,
            loop_start: 0,
            loop_end: 0,
            enabled: true,
            sustain_enabled: true,
            loop_enabled: false,
        }
    }

    /// Get the flags byte for this envelope.
    pub fn flags(&self) -> u8 {
        let mut flags = 0u8;
        if self.enabled {
            flags |= 1;
        }
        if self.sustain_enabled {
            flags |= 2;
        }
        if self.loop_enabled {
            flags |= 4;
        }
        flags
    }

    /// Number of points written to the file.
    pub fn point_count(&self) -> u8 {
        self.points.len().min(XM_ENVELOPE_POINTS) as u8
    }

    /// Write the 12-point table; unused points are (0, 0).
    fn write_points(&self, buf: &mut ByteBuffer) {
        for i in 0..XM_ENVELOPE_POINTS {
            let point = self.points.get(i).copied().unwrap_or_default();
            buf.write_u16(point.frame);
            buf.write_u16(point.value);
        }
    }
}

/// XM instrument and the samples it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmInstrument {
    /// Instrument name (22 bytes max).
    pub name: String,
    /// Sample index for each of the 96 notes. Missing entries map to sample 0.
    pub sample_map: Vec<u8>,
    /// Volume envelope.
    pub volume_envelope: XmEnvelope,
    /// Panning envelope.
    pub panning_envelope: XmEnvelope,
    /// Vibrato type (0=sine, 1=square, 2=ramp down, 3=ramp up).
    pub vibrato_type: u8,
    /// Vibrato sweep (ticks to reach full depth).
    pub vibrato_sweep: u8,
    /// Vibrato depth (0-15).
    pub vibrato_depth: u8,
    /// Vibrato rate (0-63).
    pub vibrato_rate: u8,
    /// Volume fadeout (0-4095).
    pub volume_fadeout: u16,
    /// Samples owned by this instrument, in sample-map order.
    pub samples: Vec<XmSample>,
}

impl Default for XmInstrument {
    fn default() -> Self {
        Self {
            name: String::new(),
            sample_map: vec![0; XM_NOTE_MAP_SIZE],
            volume_envelope: XmEnvelope::default(),
            panning_envelope: XmEnvelope::default(),
            vibrato_type: 0,
            vibrato_sweep: 0,
            vibrato_depth: 0,
            vibrato_rate: 0,
            volume_fadeout: 0,
            samples: Vec::new(),
        }
    }
}

impl XmInstrument {
    /// Create a new instrument with no samples.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a sample.
    pub fn with_sample(mut self, sample: XmSample) -> Self {
        self.samples.push(sample);
        self
    }

    /// Set the volume envelope.
    pub fn with_volume_envelope(mut self, envelope: XmEnvelope) -> Self {
        self.volume_envelope = envelope;
        self
    }

    /// Set the panning envelope.
    pub fn with_panning_envelope(mut self, envelope: XmEnvelope) -> Self {
        self.panning_envelope = envelope;
        self
    }

    /// Route every note to one sample.
    pub fn map_all_notes(mut self, sample_index: u8) -> Self {
        self.sample_map = vec![sample_index; XM_NOTE_MAP_SIZE];
        self
    }

    /// Value of the header size field.
    pub fn header_size(&self) -> u32 {
        if self.samples.is_empty() {
            XM_INSTRUMENT_BASE_SIZE
        } else {
            XM_INSTRUMENT_BASE_SIZE + XM_INSTRUMENT_EXTENDED_SIZE
        }
    }

    /// Write the instrument header, sample headers and sample data.
    ///
    /// Instruments without samples only get the 29-byte base header.
    /// `index` is only used for error reporting.
    pub fn write(&self, buf: &mut ByteBuffer, index: usize) -> Result<(), EncodeError> {
        buf.write_u32(self.header_size());
        buf.write_string(&self.name, 22);
        buf.write_u8(0); // Instrument type (always 0)
        buf.write_u16(self.samples.len() as u16);

        if self.samples.is_empty() {
            return Ok(());
        }

        for (kind, envelope) in [
            ("volume", &self.volume_envelope),
            ("panning", &self.panning_envelope),
        ] {
            if envelope.points.len() > XM_ENVELOPE_POINTS {
                warn!(
                    instrument = %self.name,
                    envelope = kind,
                    points = envelope.points.len(),
                    "envelope has more than {} points; extra points dropped",
                    XM_ENVELOPE_POINTS
                );
            }
        }

        buf.write_u32(XM_SAMPLE_HEADER_SIZE);

        let map = &self.sample_map[..self.sample_map.len().min(XM_NOTE_MAP_SIZE)];
        buf.write_bytes(map);
        buf.write_zeros(XM_NOTE_MAP_SIZE - map.len());

        self.volume_envelope.write_points(buf);
        self.panning_envelope.write_points(buf);

        buf.write_u8(self.volume_envelope.point_count());
        buf.write_u8(self.panning_envelope.point_count());

        buf.write_u8(self.volume_envelope.sustain_point);
        buf.write_u8(self.volume_envelope.loop_start);
        buf.write_u8(self.volume_envelope.loop_end);
        buf.write_u8(self.panning_envelope.sustain_point);
        buf.write_u8(self.panning_envelope.loop_start);
        buf.write_u8(self.panning_envelope.loop_end);

        buf.write_u8(self.volume_envelope.flags());
        buf.write_u8(self.panning_envelope.flags());

        buf.write_u8(self.vibrato_type);
        buf.write_u8(self.vibrato_sweep);
        buf.write_u8(self.vibrato_depth);
        buf.write_u8(self.vibrato_rate);

        buf.write_u16(self.volume_fadeout);
        buf.write_u16(0); // Reserved

        for (sample_index, sample) in self.samples.iter().enumerate() {
            sample
                .write_header(buf)
                .map_err(|source| EncodeError::SampleTooLarge {
                    instrument: index,
                    sample: sample_index,
                    source,
                })?;
        }
        for sample in &self.samples {
            sample.write_data(buf);
        }
        Ok(())
    }
}
