//! XM (FastTracker II Extended Module) format encoder.
//!
//! # XM Format Overview
//!
//! XM is a module format created by Triton for FastTracker II. Key features:
//! - Up to 32 channels
//! - Up to 128 instruments with embedded samples
//! - Up to 256 patterns
//! - Volume and panning envelopes
//! - Linear frequency table for precise pitch control
//!
//! # Layout
//!
//! A file is the 336-byte header, then every pattern (9-byte header plus
//! packed cells), then every instrument (header, optional extended block,
//! sample headers, delta-encoded sample data). All integers are
//! little-endian.
//!
//! ```rust
//! use xmforge::xm::{XmModule, XmNote, XmPattern};
//!
//! let mut module = XmModule::new("Song", 4, 6, 125);
//! let mut pattern = XmPattern::sparse(64);
//! pattern.set_note(0, 0, XmNote::from_name("C-4", 1, Some(64)));
//! module.add_pattern(pattern);
//! module.set_order_table(&[0]);
//!
//! let bytes = module.to_bytes().unwrap();
//! assert_eq!(&bytes[0..17], b"Extended Module: ");
//! ```

mod error;
mod header;
mod instrument;
mod pattern;
mod sample;
mod writer;

pub use error::*;
pub use header::*;
pub use instrument::*;
pub use pattern::*;
pub use sample::*;
pub use writer::*;
