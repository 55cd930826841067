//! CLI command implementations

pub mod demo;
pub mod encode;
pub mod template;

mod reporting;
