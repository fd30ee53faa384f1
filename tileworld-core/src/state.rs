use std::collections::BTreeMap;
use std::sync::Arc;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::grid::Grid2D;
use crate::layer::BiomeLayer;
use crate::params::GenerationParams;
use crate::tileset::TileRef;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Fields,
    Terrain,
    Moisture,
    Biomes,
    Refine,
    Autotile,
    Tiles,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Fields,
        Step::Terrain,
        Step::Moisture,
        Step::Biomes,
        Step::Refine,
        Step::Autotile,
        Step::Tiles,
    ];

    pub fn index(self) -> usize {
        match self {
            Step::Fields => 1,
            Step::Terrain => 2,
            Step::Moisture => 3,
            Step::Biomes => 4,
            Step::Refine => 5,
            Step::Autotile => 6,
            Step::Tiles => 7,
        }
    }

    pub fn next(self) -> Option<Step> {
        Self::ALL.get(self.index()).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::Fields => "fields",
            Step::Terrain => "terrain",
            Step::Moisture => "moisture",
            Step::Biomes => "biomes",
            Step::Refine => "refine",
            Step::Autotile => "autotile",
            Step::Tiles => "tiles",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostics {
    pub layer_hashes: BTreeMap<String, String>,
    pub checksum: String,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            layer_hashes: BTreeMap::new(),
            checksum: String::from("unset"),
        }
    }
}

/// Working buffers for one generation run.
///
/// The scalar fields exist from the start; each biome layer appears once the
/// step producing it has run over the whole grid. `raw_elevation` and
/// `raw_moisture` hold the noise exactly as the fields step produced it;
/// later steps derive `elevation` and `moisture` from them, so any step can
/// be re-run without compounding its own adjustments.
#[derive(Clone, Debug)]
pub struct WorldState {
    pub width: usize,
    pub height: usize,

    pub elevation: Grid2D<f32>,
    pub moisture: Grid2D<f32>,
    pub temperature: Grid2D<f32>,
    pub magnetism: Grid2D<f32>,
    pub raw_elevation: Grid2D<f32>,
    pub raw_moisture: Grid2D<f32>,

    pub terrain: Option<BiomeLayer>,
    pub biomes: Option<BiomeLayer>,
    pub refined: Option<BiomeLayer>,
    pub autotile: Option<Grid2D<Option<u8>>>,
    pub tiles: Option<Grid2D<TileRef>>,

    pub current_step: Option<Step>,
    pub step_timings_ms: BTreeMap<Step, f64>,
    pub params: GenerationParams,
    pub diagnostics: Diagnostics,
    pub catalog: Arc<Catalog>,
}

impl WorldState {
    pub fn new(params: GenerationParams) -> Self {
        Self::with_catalog(params, Arc::new(Catalog::standard()))
    }

    pub fn with_catalog(params: GenerationParams, catalog: Arc<Catalog>) -> Self {
        let (width, height) = params.dimensions();
        Self {
            width,
            height,
            elevation: Grid2D::new(width, height, 0.0),
            moisture: Grid2D::new(width, height, 0.0),
            temperature: Grid2D::new(width, height, 0.0),
            magnetism: Grid2D::new(width, height, 0.0),
            raw_elevation: Grid2D::new(width, height, 0.0),
            raw_moisture: Grid2D::new(width, height, 0.0),
            terrain: None,
            biomes: None,
            refined: None,
            autotile: None,
            tiles: None,
            current_step: None,
            step_timings_ms: BTreeMap::new(),
            params,
            diagnostics: Diagnostics::default(),
            catalog,
        }
    }

    pub fn update_diagnostics(&mut self) {
        let mut hashes = BTreeMap::new();
        hashes.insert("elevation".to_string(), hash_f32(&self.elevation));
        hashes.insert("moisture".to_string(), hash_f32(&self.moisture));
        hashes.insert("temperature".to_string(), hash_f32(&self.temperature));
        hashes.insert("magnetism".to_string(), hash_f32(&self.magnetism));
        for (name, layer) in [
            ("terrain", &self.terrain),
            ("biomes", &self.biomes),
            ("refined", &self.refined),
        ] {
            if let Some(layer) = layer {
                hashes.insert(name.to_string(), hash_layer(layer));
            }
        }
        if let Some(autotile) = &self.autotile {
            hashes.insert("autotile".to_string(), hash_autotile(autotile));
        }
        if let Some(tiles) = &self.tiles {
            hashes.insert("tiles".to_string(), hash_tiles(tiles));
        }

        self.diagnostics.checksum = combine(&hashes);
        self.diagnostics.layer_hashes = hashes;
    }
}

pub(crate) fn combine(hashes: &BTreeMap<String, String>) -> String {
    let mut combined = Hasher::new();
    for (name, hash) in hashes {
        combined.update(name.as_bytes());
        combined.update(hash.as_bytes());
    }
    combined.finalize().to_hex().to_string()
}

fn hash_f32(grid: &Grid2D<f32>) -> String {
    let mut h = Hasher::new();
    for v in grid.as_slice() {
        h.update(&v.to_bits().to_le_bytes());
    }
    h.finalize().to_hex().to_string()
}

fn hash_layer(layer: &BiomeLayer) -> String {
    let bytes = layer.grid().map(|b| b.as_u8());
    blake3::hash(bytes.as_slice()).to_hex().to_string()
}

fn hash_autotile(grid: &Grid2D<Option<u8>>) -> String {
    let bytes: Vec<u8> = grid.as_slice().iter().map(|v| v.unwrap_or(u8::MAX)).collect();
    blake3::hash(&bytes).to_hex().to_string()
}

fn hash_tiles(grid: &Grid2D<TileRef>) -> String {
    let mut h = Hasher::new();
    for t in grid.as_slice() {
        h.update(&t.id().to_le_bytes());
    }
    h.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::Step;

    #[test]
    fn steps_chain_in_order() {
        let mut chain = vec![Step::Fields];
        while let Some(next) = chain.last().and_then(|s| s.next()) {
            chain.push(next);
        }
        assert_eq!(chain, Step::ALL.to_vec());
    }
}
