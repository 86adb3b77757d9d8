//! CLI argument definitions for di-extract.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "di-extract")]
#[command(about = "Extract sprite images from Diablo Immortal game files")]
#[command(version)]
pub struct Args {
    /// Directory containing Resources.mpkinfo and .mpk files
    #[arg(value_name = "MPKS_DIR")]
    pub mpks_dir: PathBuf,

    /// Directory to save extracted sprite PNGs
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,
}
