//! XM file header structures and constants.

use serde::{Deserialize, Serialize};

use crate::buffer::ByteBuffer;

/// XM file magic identifier.
pub const XM_MAGIC: &[u8; 17] = b"Extended Module: ";

/// Marker byte following the module name.
pub const XM_MARKER: u8 = 0x1A;

/// XM format version (1.04).
pub const XM_VERSION: u16 = 0x0104;

/// Header size (fixed at 276 bytes for version 1.04).
pub const XM_HEADER_SIZE: u32 = 276;

/// Maximum number of channels in XM format.
pub const XM_MAX_CHANNELS: usize = 32;

/// Maximum number of patterns in XM format.
pub const XM_MAX_PATTERNS: usize = 256;

/// Maximum number of instruments in XM format.
pub const XM_MAX_INSTRUMENTS: usize = 128;

/// Length of the pattern order table.
pub const XM_ORDER_TABLE_SIZE: usize = 256;

/// Tracker name written when none is given.
pub const DEFAULT_TRACKER_NAME: &str = "xmforge";

/// XM module header data.
///
/// Pattern and instrument counts are not stored here; they are taken from the
/// module's pattern and instrument lists at encode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmHeader {
    /// Song name (20 bytes max).
    pub name: String,
    /// Tracker name (20 bytes max).
    pub tracker_name: String,
    /// Format version.
    pub version: u16,
    /// Number of positions in the order table.
    pub song_length: u16,
    /// Restart position for looping.
    pub restart_position: u16,
    /// Number of channels.
    pub num_channels: u16,
    /// Flags (bit 0: linear frequency table).
    pub flags: u16,
    /// Default tempo (ticks per row).
    pub default_tempo: u16,
    /// Default BPM.
    pub default_bpm: u16,
    /// Pattern order table. Entries past the end are written as 0.
    pub order_table: Vec<u8>,
}

impl Default for XmHeader {
    fn default() -> Self {
        Self {
            name: String::new(),
            tracker_name: DEFAULT_TRACKER_NAME.to_string(),
            version: XM_VERSION,
            song_length: 1,
            restart_position: 0,
            num_channels: 4,
            flags: 1, // Linear frequency table enabled
            default_tempo: 6,
            default_bpm: 125,
            order_table: Vec::new(),
        }
    }
}

impl XmHeader {
    /// Create a new XM header with the given parameters.
    pub fn new(name: &str, num_channels: u16, tempo: u16, bpm: u16) -> Self {
        Self {
            name: name.to_string(),
            num_channels,
            default_tempo: tempo,
            default_bpm: bpm,
            ..Default::default()
        }
    }

    /// Set the order table from a slice; also sets the song length.
    pub fn set_order_table(&mut self, orders: &[u8]) {
        let len = orders.len().min(XM_ORDER_TABLE_SIZE);
        self.order_table = orders[..len].to_vec();
        self.song_length = len as u16;
    }

    /// Write the fixed 336-byte header block.
    pub fn write(&self, buf: &mut ByteBuffer, num_patterns: u16, num_instruments: u16) {
        buf.write_bytes(XM_MAGIC);
        buf.write_string(&self.name, 20);
        buf.write_u8(XM_MARKER);
        buf.write_string(&self.tracker_name, 20);
        buf.write_u16(self.version);
        buf.write_u32(XM_HEADER_SIZE);
        buf.write_u16(self.song_length);
        buf.write_u16(self.restart_position);
        buf.write_u16(self.num_channels);
        buf.write_u16(num_patterns);
        buf.write_u16(num_instruments);
        buf.write_u16(self.flags);
        buf.write_u16(self.default_tempo);
        buf.write_u16(self.default_bpm);

        let orders = &self.order_table[..self.order_table.len().min(XM_ORDER_TABLE_SIZE)];
        buf.write_bytes(orders);
        buf.write_zeros(XM_ORDER_TABLE_SIZE - orders.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_write() {
        let header = XmHeader {
            name: "Test Song".to_string(),
            num_channels: 8,
            ..Default::default()
        };

        let mut buf = ByteBuffer::new();
        header.write(&mut buf, 4, 2);

        // 17 magic + 20 name + 1 marker + 20 tracker + 2 version + 4 header_size
        // + 2 song_length + 2 restart + 2 channels + 2 patterns + 2 instruments
        // + 2 flags + 2 tempo + 2 bpm + 256 order = 336 bytes
        assert_eq!(buf.len(), 336);
        assert_eq!(&buf.as_slice()[0..17], XM_MAGIC);
        assert_eq!(buf.read_u16(68), Some(8));
        assert_eq!(buf.read_u16(70), Some(4));
        assert_eq!(buf.read_u16(72), Some(2));
    }

    #[test]
    fn test_order_table_is_capped() {
        let mut header = XmHeader::default();
        header.set_order_table(&[1; 300]);
        assert_eq!(header.song_length, 256);
        assert_eq!(header.order_table.len(), 256);
    }
}
