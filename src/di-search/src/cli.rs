//! CLI argument definitions for di-search.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "di-search")]
#[command(about = "Find similar sprites using perceptual image hashing")]
#[command(version)]
pub struct Args {
    /// Path to screenshot/image to search for
    #[arg(value_name = "SCREENSHOT")]
    pub screenshot: PathBuf,

    /// Directory containing extracted sprites
    #[arg(value_name = "SPRITES_DIR", default_value = "./sprites")]
    pub sprites_dir: PathBuf,

    /// Number of results to return
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub top: usize,

    /// Force rebuild the search index
    #[arg(long)]
    pub rebuild: bool,
}
