//! xmforge - byte-exact FastTracker II Extended Module (XM) encoder
//!
//! This crate turns an in-memory tracker module (patterns of notes plus
//! instruments with PCM samples) into an XM file. Output is deterministic:
//! the same module always encodes to the same bytes.
//!
//! # Module Structure
//!
//! - [`buffer`]: growable little-endian byte buffer with backpatching
//! - [`note`]: note-name and pitch-correction helpers
//! - [`xm`]: XM data model and encoder
//!
//! Writing the produced bytes anywhere is left to the caller.

pub mod buffer;
pub mod note;
pub mod xm;

pub use buffer::ByteBuffer;
pub use xm::{EncodeError, XmEncoder, XmModule};

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
