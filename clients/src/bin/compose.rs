//! `compose-mappings` — Composes Mojang's client and server ProGuard tables
//! with an intermediary Tiny v2 file into `intermediary → named` mappings.
//!
//! **Usage:**
//! ```text
//! compose-mappings --client client.txt --server server.txt \
//!     --intermediary intermediary.tiny [--out mappings.tiny] \
//!     [--name-synthetic-members] [--escape-names] [--format tiny|json]
//! ```
//!
//! Writes to stdout when `--out` is omitted.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use layered_mappings::serializer::{json, tiny};
use layered_mappings::{
    ComposeOptions, FileSource, MojangMappingLayer, TreeBuilder, INTERMEDIARY, NAMED, OFFICIAL,
};
use tracing::info;

/// Output encodings.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Tiny v2.
    Tiny,
    /// Pretty-printed JSON.
    Json,
}

/// Compose layered mappings.
#[derive(Parser)]
#[command(
    name = "compose-mappings",
    about = "Compose ProGuard client/server mappings with intermediary names"
)]
struct Args {
    /// Client ProGuard mappings.
    #[arg(long)]
    client: PathBuf,

    /// Server ProGuard mappings.
    #[arg(long)]
    server: PathBuf,

    /// Intermediary mappings in Tiny v2 format.
    #[arg(long)]
    intermediary: PathBuf,

    /// Output file (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep names of compiler-generated members.
    #[arg(long)]
    name_synthetic_members: bool,

    /// Escape tabs, line breaks and backslashes in Tiny names.
    #[arg(long)]
    escape_names: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Tiny)]
    format: Format,

    /// Label of the obfuscated namespace.
    #[arg(long, default_value = OFFICIAL)]
    official_ns: String,

    /// Label of the intermediary namespace.
    #[arg(long, default_value = INTERMEDIARY)]
    intermediary_ns: String,

    /// Label of the named namespace.
    #[arg(long, default_value = NAMED)]
    named_ns: String,
}

fn main() -> Result<()> {
    layered_mappings_clients::init_logging();
    let args = Args::parse();

    let intermediary_file = File::open(&args.intermediary)
        .with_context(|| format!("Failed to open {}", args.intermediary.display()))?;
    let intermediary = tiny::read(BufReader::new(intermediary_file))
        .with_context(|| format!("Failed to read {}", args.intermediary.display()))?;
    info!(
        classes = intermediary.class_count(),
        members = intermediary.member_count(),
        "loaded intermediary mappings"
    );

    let options = ComposeOptions {
        retain_synthetic_names: args.name_synthetic_members,
        official: args.official_ns,
        intermediary: args.intermediary_ns,
        named: args.named_ns,
        ..ComposeOptions::default()
    };
    let client = FileSource::new(&args.client);
    let server = FileSource::new(&args.server);
    let layer = MojangMappingLayer::new(&client, &server, &intermediary, options);

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
            Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create {}", path.display())
            })?))
        }
        None => Box::new(io::stdout().lock()),
    };

    match args.format {
        Format::Tiny => {
            let mut writer = if args.escape_names {
                tiny::TinyWriter::escaped(&mut out)
            } else {
                tiny::TinyWriter::new(&mut out)
            };
            layer
                .visit(&mut writer)
                .context("Failed to compose mappings")?;
        }
        Format::Json => {
            let mut builder = TreeBuilder::new();
            layer
                .visit(&mut builder)
                .context("Failed to compose mappings")?;
            let tree = builder.finish()?;
            serde_json::to_writer_pretty(&mut out, &json::to_json(&tree))
                .context("Failed to serialize mappings to JSON")?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if let Some(path) = &args.out {
        info!("written: {}", path.display());
    }
    Ok(())
}
