use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageReader;
use log::{debug, info};
use serde::Deserialize;

use board_rectify::{
    detect_board_lines, rectify_board, split_squares, BoardConfig, Cli, DetectorParams,
};

/// Layout of the `--config` JSON file; missing sections keep their defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    board: BoardConfig,
    detector: DetectorParams,
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config file: {:?}", path))
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(inner_length) = cli.inner_length {
        config.board.warp.inner_length = inner_length;
    }
    if let Some(top_margin) = cli.top_margin {
        config.board.warp.top_margin = top_margin;
    }
    if let Some(margin) = cli.margin {
        config.board.warp.margin = margin;
    }
    if let Some(interpolation) = cli.interpolation {
        config.board.warp.interpolation = interpolation;
    }

    // Load input image
    let img = ImageReader::open(&cli.input)
        .with_context(|| format!("Failed to open input file: {:?}", cli.input))?
        .decode()
        .with_context(|| format!("Failed to decode image: {:?}", cli.input))?;
    info!("Loaded image: {:?} ({}x{})", cli.input, img.width(), img.height());

    let lines = detect_board_lines(&img, &config.detector);
    info!("Detected {} candidate lines", lines.len());

    let recognition = rectify_board(&img.to_rgb8(), &lines, &config.board)
        .context("Failed to locate the board")?;

    info!(
        "Grid lines: {} horizontal, {} vertical",
        recognition.board.horizontal.len(),
        recognition.board.vertical.len()
    );
    for grid in [&recognition.board.horizontal, &recognition.board.vertical] {
        debug!("{}", serde_json::to_string(grid)?);
    }
    let h = recognition.rectified.homography.to_array();
    debug!("Homography:");
    for row in h {
        debug!("  [{:10.4}, {:10.4}, {:10.4}]", row[0], row[1], row[2]);
    }

    // Save result
    let output_path = cli.output_path();
    recognition
        .rectified
        .image
        .save(&output_path)
        .with_context(|| format!("Failed to save output: {:?}", output_path))?;
    info!(
        "Saved rectified board: {:?} ({}x{})",
        output_path,
        recognition.rectified.image.width(),
        recognition.rectified.image.height()
    );

    if let Some(dir) = &cli.squares {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create squares directory: {:?}", dir))?;
        let stem = cli.input.file_stem().unwrap_or_default().to_string_lossy();
        let tiles = split_squares(&recognition.rectified, cli.square_context(&config.board.warp));
        for (i, tile) in tiles.iter().enumerate() {
            let path = dir.join(format!("{}_{:02}.png", stem, i));
            tile.save(&path)
                .with_context(|| format!("Failed to save square: {:?}", path))?;
        }
        info!("Saved {} squares to {:?}", tiles.len(), dir);
    }

    Ok(())
}
