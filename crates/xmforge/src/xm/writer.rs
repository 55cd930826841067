//! XM file writer - assembles all components into a complete XM file.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::EncodeError;
use super::header::{XmHeader, XM_MAX_CHANNELS, XM_MAX_INSTRUMENTS, XM_MAX_PATTERNS};
use super::instrument::XmInstrument;
use super::pattern::XmPattern;
use crate::buffer::ByteBuffer;

/// XM module containing all song data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmModule {
    /// Module header.
    pub header: XmHeader,
    /// Patterns.
    pub patterns: Vec<XmPattern>,
    /// Instruments.
    pub instruments: Vec<XmInstrument>,
}

impl XmModule {
    /// Create a new XM module with the given parameters.
    pub fn new(name: &str, num_channels: u16, tempo: u16, bpm: u16) -> Self {
        Self {
            header: XmHeader::new(name, num_channels, tempo, bpm),
            patterns: Vec::new(),
            instruments: Vec::new(),
        }
    }

    /// Add a pattern to the module.
    pub fn add_pattern(&mut self, pattern: XmPattern) {
        self.patterns.push(pattern);
    }

    /// Add an instrument to the module.
    pub fn add_instrument(&mut self, instrument: XmInstrument) {
        self.instruments.push(instrument);
    }

    /// Set the order table (pattern playback order).
    pub fn set_order_table(&mut self, orders: &[u8]) {
        self.header.set_order_table(orders);
    }

    /// Set the restart position for looping.
    pub fn set_restart_position(&mut self, position: u16) {
        self.header.restart_position = position;
    }

    /// Check the format's channel, instrument and pattern limits.
    pub fn validate_limits(&self) -> Result<(), EncodeError> {
        let channels = self.header.num_channels as usize;
        if channels > XM_MAX_CHANNELS {
            return Err(EncodeError::TooManyChannels {
                count: channels,
                max: XM_MAX_CHANNELS,
            });
        }
        if self.instruments.len() > XM_MAX_INSTRUMENTS {
            return Err(EncodeError::TooManyInstruments {
                count: self.instruments.len(),
                max: XM_MAX_INSTRUMENTS,
            });
        }
        if self.patterns.len() > XM_MAX_PATTERNS {
            return Err(EncodeError::TooManyPatterns {
                count: self.patterns.len(),
                max: XM_MAX_PATTERNS,
            });
        }
        Ok(())
    }

    /// Encode the module to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        XmEncoder::new().encode(self)
    }

    /// Compute the BLAKE3 hash of the module bytes.
    pub fn compute_hash(&self) -> Result<String, EncodeError> {
        Ok(hash_bytes(&self.to_bytes()?))
    }
}

/// BLAKE3 hex digest of encoded module bytes.
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Single-use XM encoder owning its output buffer.
///
/// `encode` consumes the encoder, so one instance produces exactly one file.
#[derive(Debug, Default)]
pub struct XmEncoder {
    buf: ByteBuffer,
}

impl XmEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `module`: header, then every pattern, then every instrument.
    ///
    /// Limits are checked before anything is written. A note that sets both a
    /// volume level and a volume effect aborts the encode when its cell is
    /// reached, as does a pattern body or sample field too large for its size
    /// field.
    pub fn encode(mut self, module: &XmModule) -> Result<Vec<u8>, EncodeError> {
        module.validate_limits()?;

        let num_channels = module.header.num_channels;
        debug!(
            name = %module.header.name,
            channels = num_channels,
            patterns = module.patterns.len(),
            instruments = module.instruments.len(),
            "encoding XM module"
        );

        module.header.write(
            &mut self.buf,
            module.patterns.len() as u16,
            module.instruments.len() as u16,
        );

        for (index, pattern) in module.patterns.iter().enumerate() {
            pattern.write(&mut self.buf, index, num_channels)?;
        }

        for (index, instrument) in module.instruments.iter().enumerate() {
            instrument.write(&mut self.buf, index)?;
        }

        debug!(bytes = self.buf.len(), "encoded XM module");
        Ok(self.buf.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xm::instrument::XmInstrument;
    use crate::xm::pattern::{XmNote, XmPattern};
    use crate::xm::sample::XmSample;

    #[test]
    fn test_module_creation() {
        let mut module = XmModule::new("Test Song", 4, 6, 125);
        module.add_pattern(XmPattern::empty(64, 4));
        module.add_instrument(
            XmInstrument::new("Lead").with_sample(XmSample::pcm16("Test", vec![])),
        );
        module.set_order_table(&[0]);

        let bytes = module.to_bytes().unwrap();

        // header + pattern (9 + 256) + instrument (243 + 40)
        assert_eq!(bytes.len(), 336 + 265 + 283);
    }

    #[test]
    fn test_module_with_notes() {
        let mut module = XmModule::new("Note Test", 2, 6, 120);

        let mut pattern = XmPattern::empty(16, 2);
        pattern.set_note(0, 0, XmNote::from_name("C4", 1, Some(64)));
        pattern.set_note(4, 0, XmNote::from_name("E4", 1, Some(64)));
        pattern.set_note(8, 0, XmNote::from_name("G4", 1, Some(64)));
        pattern.set_note(12, 0, XmNote::note_off());
        module.add_pattern(pattern);

        module.add_instrument(
            XmInstrument::new("Lead").with_sample(XmSample::pcm8("Lead", vec![0; 1000])),
        );
        module.set_order_table(&[0]);

        let bytes = module.to_bytes().unwrap();
        // 28 empty cells + 3 * 4 bytes + 2 bytes for the note-off
        assert_eq!(u16::from_le_bytes([bytes[343], bytes[344]]), 42);
    }

    #[test]
    fn test_limits_checked_first() {
        let mut module = XmModule::new("Too Wide", 33, 6, 125);
        module.add_pattern(XmPattern::empty(1, 1));
        assert_eq!(
            module.to_bytes(),
            Err(EncodeError::TooManyChannels { count: 33, max: 32 })
        );
    }

    #[test]
    fn test_hash_determinism() {
        let mut module1 = XmModule::new("Hash Test", 4, 6, 125);
        module1.add_pattern(XmPattern::empty(64, 4));
        module1.set_order_table(&[0]);

        let mut module2 = XmModule::new("Hash Test", 4, 6, 125);
        module2.add_pattern(XmPattern::sparse(64));
        module2.set_order_table(&[0]);

        assert_eq!(module1.compute_hash().unwrap(), module2.compute_hash().unwrap());
    }
}
