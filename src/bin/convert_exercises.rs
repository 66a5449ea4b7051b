use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use liftboard::import::{convert_exercises, ConversionOptions};

/// Convert a `name,video` exercise list into a CSV for bulk import.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Source CSV with exercise names and video URLs
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the import-ready CSV
    #[arg(short, long)]
    output: PathBuf,

    /// Category to assign to every exercise
    #[arg(short, long)]
    category: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let input = File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let options = ConversionOptions {
        category: args.category,
    };
    let report = convert_exercises(BufReader::new(input), BufWriter::new(output), &options)?;

    println!(
        "Wrote {} exercises to {} (skipped {} blank, {} duplicate; dropped {} invalid video URLs)",
        report.written,
        args.output.display(),
        report.skipped_blank,
        report.skipped_duplicate,
        report.dropped_urls
    );

    Ok(())
}
