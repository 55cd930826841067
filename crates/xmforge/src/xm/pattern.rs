//! XM pattern data structures and note packing.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::error::{EncodeError, VolumeConflict};
use crate::buffer::ByteBuffer;
use crate::note::{note_name_to_xm, xm};

/// Pattern header length field value.
pub const XM_PATTERN_HEADER_SIZE: u32 = 9;

/// Largest packed body the 16-bit size field can describe.
pub const XM_MAX_PACKED_PATTERN_SIZE: usize = u16::MAX as usize;

/// Packing byte flags.
pub mod packing {
    /// Set on every packed cell; distinguishes it from a raw 5-byte cell.
    pub const MARKER: u8 = 0x80;
    pub const NOTE: u8 = 0x01;
    pub const INSTRUMENT: u8 = 0x02;
    pub const VOLUME: u8 = 0x04;
    pub const EFFECT: u8 = 0x08;
    pub const EFFECT_PARAM: u8 = 0x10;
    /// All five fields present.
    pub const ALL: u8 = NOTE | INSTRUMENT | VOLUME | EFFECT | EFFECT_PARAM;
}

/// Volume column values.
pub mod volume {
    /// Volume column byte for level 0.
    pub const SET_VOLUME_MIN: u8 = 0x10;
    /// Volume column byte for level 64.
    pub const SET_VOLUME_MAX: u8 = 0x50;
    /// Highest volume level.
    pub const MAX_LEVEL: u8 = 64;
    /// Volume slide down (6x).
    pub const SLIDE_DOWN: u8 = 0x60;
    /// Volume slide up (7x).
    pub const SLIDE_UP: u8 = 0x70;
    /// Fine volume slide down (8x).
    pub const FINE_SLIDE_DOWN: u8 = 0x80;
    /// Fine volume slide up (9x).
    pub const FINE_SLIDE_UP: u8 = 0x90;
    /// Set vibrato speed (Ax).
    pub const VIBRATO_SPEED: u8 = 0xA0;
    /// Vibrato (Bx).
    pub const VIBRATO: u8 = 0xB0;
    /// Set panning (Cx).
    pub const SET_PANNING: u8 = 0xC0;
    /// Panning slide left (Dx).
    pub const PAN_SLIDE_LEFT: u8 = 0xD0;
    /// Panning slide right (Ex).
    pub const PAN_SLIDE_RIGHT: u8 = 0xE0;
    /// Tone portamento (Fx).
    pub const TONE_PORTA: u8 = 0xF0;

    /// Map a volume level (0-64) onto the set-volume range 0x10..=0x50.
    /// Levels above 64 are clamped.
    pub fn level_to_byte(level: u8) -> u8 {
        SET_VOLUME_MIN + level.min(MAX_LEVEL)
    }
}

/// A single note event in an XM pattern cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmNote {
    /// Note value (0=none, 1-96=C-0..B-7, 97=note-off).
    pub note: u8,
    /// Instrument number (0=none, 1-128=instrument).
    pub instrument: u8,
    /// Volume level 0-64, written as 0x10-0x50.
    pub volume: Option<u8>,
    /// Raw volume-column byte (slides, panning, ...). Exclusive with `volume`.
    pub volume_effect: Option<u8>,
    /// Effect type.
    pub effect: u8,
    /// Effect parameter.
    pub effect_param: u8,
}

impl XmNote {
    /// Create a new empty note.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a note-off event.
    pub fn note_off() -> Self {
        Self {
            note: xm::NOTE_OFF,
            ..Default::default()
        }
    }

    /// Create a note from a note name string.
    pub fn from_name(name: &str, instrument: u8, volume: Option<u8>) -> Self {
        Self {
            note: note_name_to_xm(name),
            instrument,
            volume,
            ..Default::default()
        }
    }

    /// Set the volume level (0-64).
    pub fn with_volume(mut self, level: u8) -> Self {
        self.volume = Some(level);
        self
    }

    /// Set a raw volume-column byte.
    pub fn with_volume_effect(mut self, value: u8) -> Self {
        self.volume_effect = Some(value);
        self
    }

    /// Set the effect on this note.
    pub fn with_effect(mut self, effect: u8, param: u8) -> Self {
        self.effect = effect;
        self.effect_param = param;
        self
    }

    /// Check if this note is completely empty.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    /// Resolve the volume-column byte (0 when absent).
    pub fn volume_byte(&self) -> Result<u8, VolumeConflict> {
        match (self.volume, self.volume_effect) {
            (Some(_), Some(_)) => Err(VolumeConflict),
            (None, Some(raw)) => Ok(raw),
            (Some(level), None) => Ok(volume::level_to_byte(level)),
            (None, None) => Ok(0),
        }
    }

    /// Append this note in packed form and return the number of bytes written.
    ///
    /// A cell with note, instrument, volume and effect type all present is
    /// written as the raw 5 bytes; anything else gets a leading flag byte
    /// followed by the present fields.
    pub fn write_packed(&self, buf: &mut ByteBuffer) -> Result<usize, VolumeConflict> {
        let volume = self.volume_byte()?;

        let mut flags = 0u8;
        if self.note != 0 {
            flags |= packing::NOTE;
        }
        if self.instrument != 0 {
            flags |= packing::INSTRUMENT;
        }
        if volume != 0 {
            flags |= packing::VOLUME;
        }
        if self.effect != 0 {
            flags |= packing::EFFECT;
        }
        // A nonzero effect type always carries its parameter byte
        if self.effect_param != 0 || self.effect != 0 {
            flags |= packing::EFFECT_PARAM;
        }

        if flags == packing::ALL {
            buf.write_bytes(&[
                self.note,
                self.instrument,
                volume,
                self.effect,
                self.effect_param,
            ]);
            return Ok(5);
        }

        let start = buf.position();
        buf.write_u8(packing::MARKER | flags);
        if flags & packing::NOTE != 0 {
            buf.write_u8(self.note);
        }
        if flags & packing::INSTRUMENT != 0 {
            buf.write_u8(self.instrument);
        }
        if flags & packing::VOLUME != 0 {
            buf.write_u8(volume);
        }
        if flags & packing::EFFECT != 0 {
            buf.write_u8(self.effect);
        }
        if flags & packing::EFFECT_PARAM != 0 {
            buf.write_u8(self.effect_param);
        }
        Ok(buf.position() - start)
    }

    /// Pack this note into a standalone byte vector.
    pub fn pack(&self) -> Result<Vec<u8>, VolumeConflict> {
        let mut buf = ByteBuffer::with_capacity(5);
        self.write_packed(&mut buf)?;
        Ok(buf.into_bytes())
    }
}

/// XM pattern containing rows of note data.
///
/// The grid may be sparse: rows can be shorter than the channel count and
/// the row list shorter than `num_rows`. Missing cells encode as empty notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmPattern {
    /// Number of rows in this pattern.
    pub num_rows: u16,
    /// Note data: notes[row][channel].
    pub notes: Vec<Vec<XmNote>>,
}

impl XmPattern {
    /// Create an empty pattern with every cell filled in.
    pub fn empty(num_rows: u16, num_channels: u16) -> Self {
        let notes = (0..num_rows)
            .map(|_| vec![XmNote::empty(); num_channels as usize])
            .collect();
        Self { num_rows, notes }
    }

    /// Create a pattern with no stored cells.
    pub fn sparse(num_rows: u16) -> Self {
        Self {
            num_rows,
            notes: Vec::new(),
        }
    }

    /// Set a note at the given position, growing the grid as needed.
    /// Positions at or past `num_rows` are ignored.
    pub fn set_note(&mut self, row: u16, channel: u16, note: XmNote) {
        if row >= self.num_rows {
            return;
        }
        let (row, channel) = (row as usize, channel as usize);
        if self.notes.len() <= row {
            self.notes.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.notes[row];
        if cells.len() <= channel {
            cells.resize(channel + 1, XmNote::empty());
        }
        cells[channel] = note;
    }

    /// Get the stored note at the given position, if any.
    pub fn get_note(&self, row: u16, channel: u16) -> Option<&XmNote> {
        self.notes
            .get(row as usize)
            .and_then(|r| r.get(channel as usize))
    }

    /// Note at the given position, or an empty note where none is stored.
    pub fn note_at(&self, row: u16, channel: u16) -> XmNote {
        self.get_note(row, channel).copied().unwrap_or_default()
    }

    /// Append the packed cell data, row-major, and return its length.
    ///
    /// `index` is only used for error reporting.
    pub fn write_body(
        &self,
        buf: &mut ByteBuffer,
        index: usize,
        num_channels: u16,
    ) -> Result<usize, EncodeError> {
        let start = buf.position();
        for row in 0..self.num_rows {
            for channel in 0..num_channels {
                self.note_at(row, channel)
                    .write_packed(buf)
                    .map_err(|source| EncodeError::VolumeConflict {
                        pattern: index,
                        row,
                        channel,
                        source,
                    })?;
            }
        }
        Ok(buf.position() - start)
    }

    /// Pack the pattern cells without the pattern header.
    pub fn pack(&self, num_channels: u16) -> Result<Vec<u8>, EncodeError> {
        let mut buf = ByteBuffer::new();
        self.write_body(&mut buf, 0, num_channels)?;
        Ok(buf.into_bytes())
    }

    /// Write the 9-byte pattern header followed by the packed cells.
    ///
    /// The packed size field is reserved first and patched once the body has
    /// been written. A body larger than the field can hold is an error.
    pub fn write(
        &self,
        buf: &mut ByteBuffer,
        index: usize,
        num_channels: u16,
    ) -> Result<(), EncodeError> {
        buf.write_u32(XM_PATTERN_HEADER_SIZE);
        buf.write_u8(0); // Packing type (always 0)
        buf.write_u16(self.num_rows);
        let size_offset = buf.position();
        buf.write_u16(0);

        let packed_size = self.write_body(buf, index, num_channels)?;
        trace!(pattern = index, rows = self.num_rows, packed_size, "packed pattern");
        let size_field = u16::try_from(packed_size).map_err(|_| EncodeError::PatternTooLarge {
            pattern: index,
            size: packed_size,
            max: XM_MAX_PACKED_PATTERN_SIZE,
        })?;
        buf.patch_u16(size_offset, size_field);
        Ok(())
    }
}

/// XM effect types.
pub mod effects {
    /// Arpeggio effect (0xy).
    pub const ARPEGGIO: u8 = 0x0;
    /// Portamento up (1xx).
    pub const PORTA_UP: u8 = 0x1;
    /// Portamento down (2xx).
    pub const PORTA_DOWN: u8 = 0x2;
    /// Tone portamento (3xx).
    pub const TONE_PORTA: u8 = 0x3;
    /// Vibrato (4xy).
    pub const VIBRATO: u8 = 0x4;
    /// Tone portamento + volume slide (5xy).
    pub const TONE_PORTA_VOL_SLIDE: u8 = 0x5;
    /// Vibrato + volume slide (6xy).
    pub const VIBRATO_VOL_SLIDE: u8 = 0x6;
    /// Tremolo (7xy).
    pub const TREMOLO: u8 = 0x7;
    /// Set panning (8xx).
    pub const SET_PANNING: u8 = 0x8;
    /// Sample offset (9xx).
    pub const SAMPLE_OFFSET: u8 = 0x9;
    /// Volume slide (Axy).
    pub const VOL_SLIDE: u8 = 0xA;
    /// Position jump (Bxx).
    pub const POSITION_JUMP: u8 = 0xB;
    /// Set volume (Cxx).
    pub const SET_VOLUME: u8 = 0xC;
    /// Pattern break (Dxx).
    pub const PATTERN_BREAK: u8 = 0xD;
    /// Extended effects (Exy).
    pub const EXTENDED: u8 = 0xE;
    /// Set speed/tempo (Fxx).
    pub const SET_SPEED_TEMPO: u8 = 0xF;
    /// Set global volume (Gxx).
    pub const GLOBAL_VOL: u8 = 0x10;
    /// Global volume slide (Hxy).
    pub const GLOBAL_VOL_SLIDE: u8 = 0x11;
    /// Key off (Kxx).
    pub const KEY_OFF: u8 = 0x14;
    /// Set envelope position (Lxx).
    pub const SET_ENV_POS: u8 = 0x15;
    /// Panning slide (Pxy).
    pub const PAN_SLIDE: u8 = 0x19;
    /// Multi retrigger note (Rxy).
    pub const RETRIGGER: u8 = 0x1B;
    /// Tremor (Txy).
    pub const TREMOR: u8 = 0x1D;
    /// Extra fine portamento (Xxy).
    pub const EXTRA_FINE_PORTA: u8 = 0x21;
}
