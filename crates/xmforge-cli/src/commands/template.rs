//! Template command implementation
//!
//! Writes the demo song as a JSON module description to start editing from.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::demo::demo_song;

/// Run the template command
///
/// # Arguments
/// * `output` - Path of the JSON file to write
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(output: &str) -> Result<ExitCode> {
    let text = serde_json::to_string_pretty(&demo_song()).context("Failed to serialize template")?;

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(output, text).with_context(|| format!("Failed to write to: {}", output))?;

    println!("{} {}", "SUCCESS".green().bold(), output);
    println!(
        "  {} xmforge encode --input {} --output song.xm",
        "Next:".dimmed(),
        output
    );
    Ok(ExitCode::SUCCESS)
}
