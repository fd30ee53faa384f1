use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use image::{ImageBuffer, Rgb};
use serde::Serialize;

use crate::biome::BiomeTable;
use crate::grid::Grid2D;
use crate::layer::BiomeLayer;
use crate::state::{Step, WorldState};
use crate::tileset::Season;
use crate::world::World;

#[derive(Serialize)]
struct ExportMeta<'a> {
    seed: u64,
    width: usize,
    height: usize,
    season: Season,
    step_state: Option<Step>,
    timings_ms: &'a BTreeMap<Step, f64>,
    checksum: &'a str,
    layer_hashes: &'a BTreeMap<String, String>,
    biome_counts: BTreeMap<&'static str, usize>,
    timestamp_unix_s: u64,
}

/// Debug preview of a finished world: one PNG per field, the biome map,
/// autotile indices and a `meta.json` summary.
pub fn export_world(world: &World, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating export dir {}", dir.display()))?;

    write_float_layer_png(world.elevation(), dir.join("elevation.png"))?;
    write_float_layer_png(world.moisture(), dir.join("moisture.png"))?;
    write_float_layer_png(world.temperature(), dir.join("temperature.png"))?;
    write_float_layer_png(world.magnetism(), dir.join("magnetism.png"))?;
    write_biome_png(world.biomes(), &world.catalog().biomes, dir.join("biomes.png"))?;
    write_autotile_png(world.autotile(), dir.join("autotile.png"))?;

    let meta = ExportMeta {
        seed: world.seed(),
        width: world.width(),
        height: world.height(),
        season: world.season(),
        step_state: Some(Step::Tiles),
        timings_ms: world.timings_ms(),
        checksum: world.checksum(),
        layer_hashes: &world.diagnostics().layer_hashes,
        biome_counts: named_counts(world.biomes(), &world.catalog().biomes),
        timestamp_unix_s: now_unix_s(),
    };
    write_meta(&meta, dir)
}

/// Same as [`export_world`] for a state that may be partway through the
/// pipeline; layers not produced yet are skipped.
pub fn export_snapshot(state: &WorldState, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating export dir {}", dir.display()))?;

    write_float_layer_png(&state.elevation, dir.join("elevation.png"))?;
    write_float_layer_png(&state.moisture, dir.join("moisture.png"))?;
    write_float_layer_png(&state.temperature, dir.join("temperature.png"))?;
    write_float_layer_png(&state.magnetism, dir.join("magnetism.png"))?;

    let biomes = &state.catalog.biomes;
    if let Some(terrain) = &state.terrain {
        write_biome_png(terrain, biomes, dir.join("terrain.png"))?;
    }
    let latest = state.refined.as_ref().or(state.biomes.as_ref());
    if let Some(layer) = latest {
        write_biome_png(layer, biomes, dir.join("biomes.png"))?;
    }
    if let Some(autotile) = &state.autotile {
        write_autotile_png(autotile, dir.join("autotile.png"))?;
    }

    let meta = ExportMeta {
        seed: state.params.seed,
        width: state.width,
        height: state.height,
        season: state.params.season,
        step_state: state.current_step,
        timings_ms: &state.step_timings_ms,
        checksum: &state.diagnostics.checksum,
        layer_hashes: &state.diagnostics.layer_hashes,
        biome_counts: latest
            .map(|layer| named_counts(layer, biomes))
            .unwrap_or_default(),
        timestamp_unix_s: now_unix_s(),
    };
    write_meta(&meta, dir)
}

fn write_meta(meta: &ExportMeta<'_>, dir: &Path) -> Result<()> {
    let meta_json = serde_json::to_string_pretty(meta)?;
    fs::write(dir.join("meta.json"), meta_json)?;
    Ok(())
}

fn now_unix_s() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn named_counts(layer: &BiomeLayer, biomes: &BiomeTable) -> BTreeMap<&'static str, usize> {
    let counts = layer.counts();
    biomes
        .iter()
        .filter(|def| counts[def.id.index()] > 0)
        .map(|def| (def.name, counts[def.id.index()]))
        .collect()
}

fn write_float_layer_png(grid: &Grid2D<f32>, path: impl AsRef<Path>) -> Result<()> {
    let mut img = ImageBuffer::new(grid.width() as u32, grid.height() as u32);
    for (x, y) in grid.iter_coords() {
        let c = ((*grid.get(x, y)).clamp(0.0, 1.0) * 255.0) as u8;
        img.put_pixel(x as u32, y as u32, Rgb([c, c, c]));
    }
    img.save(path)?;
    Ok(())
}

fn write_biome_png(layer: &BiomeLayer, biomes: &BiomeTable, path: impl AsRef<Path>) -> Result<()> {
    let mut img = ImageBuffer::new(layer.width() as u32, layer.height() as u32);
    for (x, y) in layer.grid().iter_coords() {
        let c = biomes.get(layer.get(x, y)).color;
        img.put_pixel(x as u32, y as u32, Rgb(c));
    }
    img.save(path)?;
    Ok(())
}

/// Autotile indices as grey levels; tiles without an index are red.
fn write_autotile_png(grid: &Grid2D<Option<u8>>, path: impl AsRef<Path>) -> Result<()> {
    let mut img = ImageBuffer::new(grid.width() as u32, grid.height() as u32);
    for (x, y) in grid.iter_coords() {
        let c = match *grid.get(x, y) {
            Some(i) => {
                let v = i.saturating_mul(5);
                [v, v, v]
            }
            None => [200, 30, 30],
        };
        img.put_pixel(x as u32, y as u32, Rgb(c));
    }
    img.save(path)?;
    Ok(())
}
