use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

use xmforge::xm::hash_bytes;
use xmforge::XmModule;

/// Summary of one encoded module, printed after a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct EncodeSummary {
    pub output: String,
    pub name: String,
    pub bytes: usize,
    pub channels: u16,
    pub patterns: usize,
    pub instruments: usize,
    pub samples: usize,
    pub blake3: String,
}

/// Encode `module` and write the bytes to `output`.
pub(crate) fn encode_to_file(module: &XmModule, output: &str) -> Result<EncodeSummary> {
    let bytes = module
        .to_bytes()
        .with_context(|| format!("Failed to encode module '{}'", module.header.name))?;

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(output, &bytes).with_context(|| format!("Failed to write to: {}", output))?;
    info!(output, bytes = bytes.len(), "wrote XM module");

    Ok(EncodeSummary {
        output: output.to_string(),
        name: module.header.name.clone(),
        bytes: bytes.len(),
        channels: module.header.num_channels,
        patterns: module.patterns.len(),
        instruments: module.instruments.len(),
        samples: module.instruments.iter().map(|i| i.samples.len()).sum(),
        blake3: hash_bytes(&bytes),
    })
}

/// Print a summary as coloured text or as a JSON document.
pub(crate) fn print_summary(summary: &EncodeSummary, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(summary).context("Failed to format JSON")?;
        println!("{}", text);
        return Ok(());
    }

    println!("{} {}", "SUCCESS".green().bold(), summary.output);
    println!("  {:<12} {}", "Name:".dimmed(), summary.name);
    println!("  {:<12} {} bytes", "Size:".dimmed(), summary.bytes);
    println!("  {:<12} {}", "Channels:".dimmed(), summary.channels);
    println!("  {:<12} {}", "Patterns:".dimmed(), summary.patterns);
    println!(
        "  {:<12} {} ({} samples)",
        "Instruments:".dimmed(),
        summary.instruments,
        summary.samples
    );
    println!("  {:<12} {}", "BLAKE3:".dimmed(), summary.blake3);
    Ok(())
}
