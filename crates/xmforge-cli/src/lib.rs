//! xmforge CLI library.
//!
//! Command implementations for the `xmforge` binary: encoding JSON module
//! descriptions to XM and producing a demo song. This crate is the only
//! place encoded bytes are written to disk.

pub mod commands;
