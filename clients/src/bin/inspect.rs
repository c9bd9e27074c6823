//! `inspect-mappings` — Summarizes a Tiny v2 mapping file and resolves
//! class names across its namespaces.
//!
//! **Usage:**
//! ```text
//! inspect-mappings <file.tiny> [--class <name> --namespace <ns>] [--json]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use layered_mappings::serializer::{json, tiny};
use layered_mappings::Symbol;

/// Inspect a Tiny v2 mapping file.
#[derive(Parser)]
#[command(
    name = "inspect-mappings",
    about = "Summarize a Tiny v2 mapping file"
)]
struct Args {
    /// Tiny v2 mapping file.
    file: PathBuf,

    /// Source-namespace class name to resolve.
    #[arg(long, requires = "namespace")]
    class: Option<String>,

    /// Namespace to resolve `--class` into.
    #[arg(long)]
    namespace: Option<String>,

    /// Dump the whole tree as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    layered_mappings_clients::init_logging();
    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let tree = tiny::read(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    if args.json {
        let text = serde_json::to_string_pretty(&json::to_json(&tree))
            .context("Failed to serialize mappings to JSON")?;
        println!("{text}");
        return Ok(());
    }

    if let (Some(class), Some(namespace)) = (&args.class, &args.namespace) {
        if tree.namespace_index(namespace).is_none() {
            bail!(
                "Unknown namespace `{namespace}` (have: {})",
                tree.namespaces().join(", ")
            );
        }
        let Some(entry) = tree.class(class) else {
            bail!("{} not found", Symbol::Class(class.as_str()));
        };
        let resolved = tree.class_name(class, namespace).unwrap_or(class.as_str());
        println!("{class} -> {resolved}");
        for key in entry.members.keys() {
            let name = tree
                .member_name(class, key, namespace)
                .unwrap_or(key.name.as_str());
            let symbol = Symbol::Member {
                owner: class.as_str(),
                key,
            };
            println!("  {symbol} -> {name}");
        }
        return Ok(());
    }

    println!("Namespaces: {}", tree.namespaces().join(" -> "));
    println!("Classes:    {}", tree.class_count());
    println!("Members:    {}", tree.member_count());
    println!("Total:      {}", tree.descriptor_count());
    Ok(())
}
