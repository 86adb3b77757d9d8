//! di-search - perceptual-hash sprite similarity search

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod index;
mod search;

use cli::Args;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let args = Args::parse();

    if !args.screenshot.is_file() {
        eprintln!("Error: Screenshot not found: {}", args.screenshot.display());
        std::process::exit(1);
    }
    if !args.sprites_dir.is_dir() {
        eprintln!(
            "Error: Sprites directory not found: {}",
            args.sprites_dir.display()
        );
        std::process::exit(1);
    }
    let has_png = fs::read_dir(&args.sprites_dir)?
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().and_then(|x| x.to_str()) == Some("png"));
    if !has_png {
        eprintln!(
            "Error: No PNG files found in {}",
            args.sprites_dir.display()
        );
        std::process::exit(1);
    }

    println!("Diablo Immortal Sprite Search v{VERSION}");
    println!("Query: {}", args.screenshot.display());
    println!("Sprites: {}", args.sprites_dir.display());
    println!();

    let results = search::search(&args.screenshot, &args.sprites_dir, args.top, args.rebuild)
        .context("search failed")?;

    println!();
    println!("Top {} matches:", results.len());
    for (i, (filename, distance)) in results.iter().enumerate() {
        let note = if *distance == 0 { " <- exact match" } else { "" };
        println!("  {:2}. {filename} (distance: {distance}){note}", i + 1);
    }

    let results_dir = args
        .sprites_dir
        .canonicalize()
        .unwrap_or_else(|_| args.sprites_dir.clone())
        .parent()
        .context("sprites directory has no parent")?
        .join("search-results");

    if results_dir.is_dir() {
        fs::remove_dir_all(&results_dir)?;
    }
    fs::create_dir(&results_dir)?;

    for (i, (filename, _)) in results.iter().enumerate() {
        let src = args.sprites_dir.join(filename);
        let dst = results_dir.join(format!("{:02}_{filename}", i + 1));
        fs::copy(&src, &dst)
            .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    }

    println!();
    println!("Results saved to: {}/", results_dir.display());

    Ok(())
}
