//! Renders a palette JSON file to PNG in file order.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colorsort::color::load_colors;
use colorsort::render::{colors_to_image, save_png};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "palette2png")]
#[command(version)]
#[command(about = "Tool for converting colors.json to png", long_about = None)]
struct Cli {
    /// Palette JSON file
    input_json: PathBuf,

    /// Output PNG file
    output_png: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let colors = load_colors(&cli.input_json)
        .with_context(|| format!("failed to load palette {}", cli.input_json.display()))?;
    save_png(&colors_to_image(&colors, None), &cli.output_png)
        .with_context(|| format!("failed to write {}", cli.output_png.display()))?;
    info!("wrote {} colors to {}", colors.len(), cli.output_png.display());
    Ok(())
}
