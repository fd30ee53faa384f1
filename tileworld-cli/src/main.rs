//! Command-line front end: generate a tile world, print a summary and
//! optionally write a PNG preview.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use tileworld_core::export::export_world;
use tileworld_core::{generate, BiomeId, GenerationParams, MapSizePreset, Season};

#[derive(Parser)]
#[command(name = "tileworld")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with generation parameters; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Preset map size.
    #[arg(long, value_enum)]
    size: Option<SizeArg>,

    /// Custom width in tiles (requires --height).
    #[arg(long, requires = "height", conflicts_with = "size")]
    width: Option<usize>,

    /// Custom height in tiles (requires --width).
    #[arg(long, requires = "width", conflicts_with = "size")]
    height: Option<usize>,

    /// Season used to pick tiles.
    #[arg(long, value_enum)]
    season: Option<SeasonArg>,

    /// Directory to write PNG previews and meta.json into.
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print this many random passable positions.
    #[arg(long, default_value = "0")]
    sample: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeArg {
    #[value(name = "128")]
    S128,
    #[value(name = "256")]
    S256,
    #[value(name = "512")]
    S512,
}

impl From<SizeArg> for MapSizePreset {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::S128 => MapSizePreset::S128,
            SizeArg::S256 => MapSizePreset::S256,
            SizeArg::S512 => MapSizePreset::S512,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SeasonArg {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl From<SeasonArg> for Season {
    fn from(season: SeasonArg) -> Self {
        match season {
            SeasonArg::Spring => Season::Spring,
            SeasonArg::Summer => Season::Summer,
            SeasonArg::Autumn => Season::Autumn,
            SeasonArg::Winter => Season::Winter,
        }
    }
}

impl Cli {
    fn params(&self) -> Result<GenerationParams> {
        let mut params = match &self.config {
            Some(path) => GenerationParams::from_json_file(path)?,
            None => GenerationParams::default(),
        };
        if let Some(seed) = self.seed {
            params.seed = seed;
        }
        if let Some(size) = self.size {
            params.size = size.into();
        }
        if let (Some(width), Some(height)) = (self.width, self.height) {
            params.size = MapSizePreset::Custom { width, height };
        }
        if let Some(season) = self.season {
            params.season = season.into();
        }
        Ok(params)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli.params()?;
    let world = generate(&params).context("generating world")?;

    println!(
        "{}x{} world, seed {}, season {}",
        world.width(),
        world.height(),
        world.seed(),
        world.season().name()
    );
    println!("checksum: {}", world.checksum());
    for (step, ms) in world.timings_ms() {
        println!("  {:<9} {ms:>8.2} ms", step.name());
    }

    let total = (world.width() * world.height()) as f64;
    for (biome, count) in world.biome_counts() {
        let name = world.catalog().biomes.get(biome).name;
        println!(
            "  {name:<13} {count:>7}  {:>5.1}%",
            count as f64 * 100.0 / total
        );
    }

    if cli.sample > 0 {
        let mut rng = world.sampling_rng();
        let passable = |b: BiomeId| world.catalog().biomes.get(b).passable;
        for (x, y) in world.random_positions(passable, cli.sample, &mut rng) {
            let tile = world
                .tile_at(x, y)
                .and_then(|t| world.tile_name(t))
                .unwrap_or("?");
            println!("  ({x}, {y}) {tile}");
        }
    }

    if let Some(dir) = &cli.export {
        export_world(&world, dir)
            .with_context(|| format!("exporting to {}", dir.display()))?;
        log::info!("exported preview to {}", dir.display());
    }
    Ok(())
}
