//! di-extract - Diablo Immortal sprite asset extractor

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

mod cli;

use cli::Args;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let args = Args::parse();

    let mpkinfo_path = args.mpks_dir.join("Resources.mpkinfo");
    if !mpkinfo_path.is_file() {
        eprintln!(
            "Error: Resources.mpkinfo not found in {}",
            args.mpks_dir.display()
        );
        eprintln!("\nMake sure the directory contains Resources.mpkinfo and .mpk files.");
        std::process::exit(1);
    }

    println!("Diablo Immortal Asset Extractor v{VERSION}");
    println!("Source: {}", args.mpks_dir.display());
    println!("Output: {}", args.output_dir.display());
    println!();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} atlases")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut tick = |current: usize, total: usize| {
        pb.set_length(total as u64);
        pb.set_position(current as u64);
    };

    let summary = di_extract_core::extract_sprites(&mpkinfo_path, &args.output_dir, Some(&mut tick))
        .with_context(|| format!("failed to extract sprites from {}", args.mpks_dir.display()))?;

    pb.finish_and_clear();

    println!();
    println!("Extraction complete!");
    println!("  Sprites extracted: {}", summary.extracted);
    if summary.failed > 0 {
        println!("  Failed: {}", summary.failed);
    }
    println!("  Output: {}", args.output_dir.display());

    Ok(())
}
