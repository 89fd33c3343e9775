//! Sorts a palette into a smooth circular gradient and renders it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use colorsort::color::{dump_colors, load_colors, ColorDistance, DeltaE, Palette};
use colorsort::render::{arrangement_to_image, save_png};
use colorsort::sa::{SaConfig, SaRunner};
use colorsort::sort::{ArrangementConfig, ColorArrangement, DistanceCache, NeighborIndex};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "colorsort")]
#[command(version)]
#[command(about = "Sort given colors using simulated annealing", long_about = None)]
struct Cli {
    /// Palette JSON file
    colors_json: PathBuf,

    /// Output PNG file
    output_png: PathBuf,

    /// Initial temperature
    #[arg(long, default_value_t = 1000.0)]
    t0: f64,

    /// End temperature
    #[arg(long, default_value_t = 0.001)]
    t_end: f64,

    /// Draw the per-color energy below the strip
    #[arg(short = 'd', long)]
    draw_energy: bool,

    /// Use CIEDE2000 instead of CIE76 as color distance
    #[arg(long)]
    use_cie2000: bool,

    /// Random seed (drawn at random and logged when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Neighborhood radius scored around every color
    #[arg(long, default_value_t = 7)]
    radius: usize,

    /// Write a checkpoint image and JSON every N iterations (0 disables)
    #[arg(long, default_value_t = 1000)]
    checkpoint_every: u64,

    /// Also write the sorted palette as JSON
    #[arg(long)]
    dump_json: Option<PathBuf>,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn checkpoint<D: ColorDistance>(
    state: &ColorArrangement<'_, D>,
    png: &Path,
    json: &Path,
    with_energy: bool,
) -> colorsort::Result<()> {
    save_png(&arrangement_to_image(state, with_energy), png)?;
    dump_colors(json, state.colors())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let metric = if cli.use_cie2000 {
        info!("Using cie2000 function as color distance");
        DeltaE::Ciede2000
    } else {
        info!("Using cie1976 function as color distance");
        DeltaE::Cie76
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    let sa_config = SaConfig::default()
        .with_initial_temperature(cli.t0)
        .with_final_temperature(cli.t_end)
        .with_seed(seed);
    sa_config.validate()?;
    let arrangement_config = ArrangementConfig::default().with_radius(cli.radius);
    arrangement_config.validate()?;

    let colors = load_colors(&cli.colors_json)
        .with_context(|| format!("failed to load palette {}", cli.colors_json.display()))?;
    ensure!(!colors.is_empty(), "palette {} is empty", cli.colors_json.display());
    let palette = Palette::new(colors);
    info!(
        "Data loaded: {} colors, {} distinct. Heating color distance cache",
        palette.len(),
        palette.unique_len()
    );

    let cache = DistanceCache::new(&palette, metric);
    let index = NeighborIndex::build(&cache);

    info!("Computing energy first time");
    let mut initial =
        ColorArrangement::new(&cache, &index, palette.entries().to_vec(), arrangement_config)?;
    let initial_energy = initial.energy();
    info!("Energy computed: {initial_energy:.4}. Starting annealing with seed {seed}");

    let progress = ProgressBar::new(sa_config.expected_iterations());
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );

    let checkpoint_png = with_suffix(&cli.output_png, ".tmp.png");
    let checkpoint_json = with_suffix(&cli.output_png, ".tmp.json");
    let mut step = 0u64;
    let mut checkpoints_enabled = cli.checkpoint_every > 0;

    let mut rng = StdRng::seed_from_u64(seed);
    let result = SaRunner::run_with(initial, &sa_config, &mut rng, |state| {
        step += 1;
        progress.inc(1);
        if checkpoints_enabled && step % cli.checkpoint_every == 0 {
            if let Some(energy) = state.cached_energy() {
                progress.set_message(format!("E={energy:.2}"));
            }
            if let Err(err) = checkpoint(state, &checkpoint_png, &checkpoint_json, cli.draw_energy) {
                warn!("checkpoint failed, disabling further checkpoints: {err}");
                checkpoints_enabled = false;
            }
        }
    })?;
    progress.finish_and_clear();

    info!(
        "Best energy {:.4} (initial {initial_energy:.4}) after {} iterations",
        result.best_energy, result.iterations
    );

    save_png(&arrangement_to_image(&result.best, cli.draw_energy), &cli.output_png)
        .with_context(|| format!("failed to write {}", cli.output_png.display()))?;
    if let Some(path) = &cli.dump_json {
        dump_colors(path, result.best.colors())
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
