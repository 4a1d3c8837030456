use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::{Interpolation, WarpParams};

#[derive(Parser, Debug)]
#[command(name = "board-rectify")]
#[command(
    version,
    about = "Find the outer grid of an 8x8 board in a photo and rectify it to a top-down view"
)]
pub struct Cli {
    /// Input photograph
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output path [default: input_board.png]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON file with pipeline and detector settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Side of the rectified inner board in pixels
    #[arg(long)]
    pub inner_length: Option<u32>,

    /// Margin above the board in pixels
    #[arg(long)]
    pub top_margin: Option<u32>,

    /// Left, right and bottom margin in pixels
    #[arg(long)]
    pub margin: Option<u32>,

    /// Resampling kernel
    #[arg(long, value_enum)]
    pub interpolation: Option<Interpolation>,

    /// Also write the 64 square tiles into this directory
    #[arg(long)]
    pub squares: Option<PathBuf>,

    /// Context around each square tile in pixels [default: the side margin]
    #[arg(long)]
    pub square_context: Option<u32>,

    /// Show detection details
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self.input.file_stem().unwrap_or_default().to_string_lossy();
            let parent = self.input.parent().unwrap_or(Path::new("."));
            parent.join(format!("{}_board.png", stem))
        })
    }

    /// Pixels of context around each square tile. Defaults to the side
    /// margin, which makes every tile twice the square size.
    pub fn square_context(&self, warp: &WarpParams) -> u32 {
        self.square_context.unwrap_or(warp.margin)
    }
}
