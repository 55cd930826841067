//! Encode command implementation
//!
//! Reads a JSON module description and writes the encoded XM file.

use anyhow::{Context, Result};
use std::fs;
use std::process::ExitCode;
use tracing::debug;

use xmforge::XmModule;

use super::reporting::{encode_to_file, print_summary};

/// Run the encode command
///
/// # Arguments
/// * `input` - Path to the JSON module description
/// * `output` - Path of the XM file to write
/// * `json` - Print the summary as JSON
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(input: &str, output: &str, json: bool) -> Result<ExitCode> {
    let module = load_module(input)?;
    let summary = encode_to_file(&module, output)?;
    print_summary(&summary, json)?;
    Ok(ExitCode::SUCCESS)
}

/// Parse a module description file.
pub fn load_module(input: &str) -> Result<XmModule> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read module file: {}", input))?;
    let module: XmModule = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse module file: {}", input))?;
    debug!(
        input,
        patterns = module.patterns.len(),
        instruments = module.instruments.len(),
        "loaded module description"
    );
    Ok(module)
}
