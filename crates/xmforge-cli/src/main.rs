//! xmforge CLI - Command-line interface for writing FastTracker II modules
//!
//! This binary encodes JSON module descriptions to XM files and can write a
//! built-in demo song or a JSON template to start from.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use xmforge_cli::commands;

/// xmforge - Extended Module (XM) encoder
#[derive(Parser)]
#[command(name = "xmforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log encoder progress (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON module description to an XM file
    Encode {
        /// Path to the JSON module description
        #[arg(short, long)]
        input: String,

        /// Path of the XM file to write
        #[arg(short, long)]
        output: String,

        /// Output machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in demo song as an XM file
    Demo {
        /// Path of the XM file to write
        #[arg(short, long, default_value = "demo.xm")]
        output: String,

        /// Output machine-readable JSON summary (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Write the demo song as a JSON module description
    Template {
        /// Path of the JSON file to write
        #[arg(short, long, default_value = "module.json")]
        output: String,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            json,
        } => commands::encode::run(&input, &output, json),
        Commands::Demo { output, json } => commands::demo::run(&output, json),
        Commands::Template { output } => commands::template::run(&output),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
