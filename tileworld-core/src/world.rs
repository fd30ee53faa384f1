//! The finished, read-only world and the handle it is published through.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::biome::{BiomeDefinition, BiomeId};
use crate::catalog::Catalog;
use crate::error::WorldError;
use crate::grid::Grid2D;
use crate::layer::BiomeLayer;
use crate::rng::{seeded_rng, Stream};
use crate::state::{Diagnostics, Step, WorldState};
use crate::tileset::{Season, TileRef, TileResolver};

/// A fully generated world. Every tile has a biome and a tile; nothing in
/// here changes after construction.
#[derive(Debug)]
pub struct World {
    width: usize,
    height: usize,
    seed: u64,
    season: Season,
    elevation: Grid2D<f32>,
    moisture: Grid2D<f32>,
    temperature: Grid2D<f32>,
    magnetism: Grid2D<f32>,
    biomes: BiomeLayer,
    autotile: Grid2D<Option<u8>>,
    tiles: Grid2D<TileRef>,
    diagnostics: Diagnostics,
    timings_ms: BTreeMap<Step, f64>,
    catalog: Arc<Catalog>,
}

impl World {
    /// Freezes a state whose pipeline has run to completion.
    pub fn from_state(state: WorldState) -> Result<Self, WorldError> {
        let biomes = state
            .refined
            .ok_or(WorldError::Incomplete { missing: "refine" })?;
        let autotile = state
            .autotile
            .ok_or(WorldError::Incomplete { missing: "autotile" })?;
        let tiles = state
            .tiles
            .ok_or(WorldError::Incomplete { missing: "tiles" })?;
        biomes.ensure_size(state.width, state.height)?;

        Ok(Self {
            width: state.width,
            height: state.height,
            seed: state.params.seed,
            season: state.params.season,
            elevation: state.elevation,
            moisture: state.moisture,
            temperature: state.temperature,
            magnetism: state.magnetism,
            biomes,
            autotile,
            tiles,
            diagnostics: state.diagnostics,
            timings_ms: state.step_timings_ms,
            catalog: state.catalog,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn checksum(&self) -> &str {
        &self.diagnostics.checksum
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn timings_ms(&self) -> &BTreeMap<Step, f64> {
        &self.timings_ms
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn biomes(&self) -> &BiomeLayer {
        &self.biomes
    }

    pub fn tiles(&self) -> &Grid2D<TileRef> {
        &self.tiles
    }

    pub fn autotile(&self) -> &Grid2D<Option<u8>> {
        &self.autotile
    }

    pub fn elevation(&self) -> &Grid2D<f32> {
        &self.elevation
    }

    pub fn moisture(&self) -> &Grid2D<f32> {
        &self.moisture
    }

    pub fn temperature(&self) -> &Grid2D<f32> {
        &self.temperature
    }

    pub fn magnetism(&self) -> &Grid2D<f32> {
        &self.magnetism
    }

    pub fn biome_at(&self, x: usize, y: usize) -> Option<BiomeId> {
        self.biomes.grid().at(x, y).copied()
    }

    pub fn definition_at(&self, x: usize, y: usize) -> Option<&BiomeDefinition> {
        self.biome_at(x, y).map(|b| self.catalog.biomes.get(b))
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.definition_at(x, y).is_some_and(|d| d.passable)
    }

    pub fn tile_at(&self, x: usize, y: usize) -> Option<TileRef> {
        self.tiles.at(x, y).copied()
    }

    /// Tile for another season, resolved on demand from the stored
    /// autotile indices.
    pub fn tile_at_season(&self, x: usize, y: usize, season: Season) -> Option<TileRef> {
        if season == self.season {
            return self.tile_at(x, y);
        }
        let biome = self.biome_at(x, y)?;
        let index = *self.autotile.at(x, y)?;
        let resolver = TileResolver::new(&self.catalog.biomes, &self.catalog.tiles);
        Some(resolver.resolve(biome, season, index))
    }

    pub fn tile_name(&self, tile: TileRef) -> Option<&str> {
        self.catalog.tiles.name(tile)
    }

    pub fn height_at(&self, x: usize, y: usize) -> Option<f32> {
        self.elevation.at(x, y).copied()
    }

    pub fn moisture_at(&self, x: usize, y: usize) -> Option<f32> {
        self.moisture.at(x, y).copied()
    }

    pub fn temperature_at(&self, x: usize, y: usize) -> Option<f32> {
        self.temperature.at(x, y).copied()
    }

    pub fn magnetism_at(&self, x: usize, y: usize) -> Option<f32> {
        self.magnetism.at(x, y).copied()
    }

    /// Up to `count` distinct tiles whose biome satisfies `filter`, drawn
    /// uniformly without replacement.
    pub fn random_positions<R: Rng + ?Sized>(
        &self,
        filter: impl Fn(BiomeId) -> bool,
        count: usize,
        rng: &mut R,
    ) -> Vec<(usize, usize)> {
        let matching: Vec<(usize, usize)> = self
            .biomes
            .grid()
            .iter_coords()
            .filter(|&(x, y)| filter(self.biomes.get(x, y)))
            .collect();
        let amount = count.min(matching.len());
        rand::seq::index::sample(rng, matching.len(), amount)
            .into_iter()
            .map(|i| matching[i])
            .collect()
    }

    /// RNG derived from the world seed, for callers that want reproducible
    /// sampling without managing their own seed.
    pub fn sampling_rng(&self) -> ChaCha8Rng {
        seeded_rng(self.seed, Stream::Sampling)
    }

    pub fn biome_counts(&self) -> Vec<(BiomeId, usize)> {
        let counts = self.biomes.counts();
        BiomeId::ALL
            .iter()
            .map(|&b| (b, counts[b.index()]))
            .filter(|&(_, n)| n > 0)
            .collect()
    }
}

/// Shared slot holding the current world. Readers take a cheap `Arc` clone
/// and keep a consistent snapshot; publishing swaps in a whole new world.
#[derive(Clone, Debug)]
pub struct WorldHandle {
    current: Arc<RwLock<Arc<World>>>,
}

impl WorldHandle {
    pub fn new(world: World) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(world))),
        }
    }

    pub fn snapshot(&self) -> Arc<World> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the published world; returns the one it displaced.
    pub fn publish(&self, world: World) -> Arc<World> {
        let next = Arc::new(world);
        std::mem::replace(&mut *self.current.write(), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{GenerationParams, MapSizePreset};
    use crate::scheduler::generate;

    fn world(seed: u64) -> World {
        let p = GenerationParams {
            seed,
            size: MapSizePreset::Custom {
                width: 32,
                height: 32,
            },
            ..GenerationParams::default()
        };
        generate(&p).expect("generate")
    }

    #[test]
    fn queries_outside_grid_are_empty() {
        let w = world(1);
        assert_eq!(w.biome_at(32, 0), None);
        assert_eq!(w.tile_at(0, 32), None);
        assert_eq!(w.height_at(99, 99), None);
        assert_eq!(w.magnetism_at(32, 32), None);
        assert!(!w.is_passable(32, 5));
        assert_eq!(w.tile_at_season(40, 0, Season::Winter), None);
    }

    #[test]
    fn border_is_impassable_water() {
        let w = world(2);
        assert_eq!(w.biome_at(0, 0), Some(BiomeId::DeepOcean));
        assert!(!w.is_passable(0, 0));
    }

    #[test]
    fn random_positions_are_distinct_and_match() {
        let w = world(4);
        let mut rng = w.sampling_rng();
        let picks = w.random_positions(|b| b.is_water(), 25, &mut rng);
        assert_eq!(picks.len(), 25);
        let mut unique = picks.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), picks.len());
        for (x, y) in picks {
            assert!(w.biome_at(x, y).is_some_and(BiomeId::is_water));
        }
    }

    #[test]
    fn random_positions_cap_at_matches() {
        let w = world(4);
        let water = w
            .biome_counts()
            .iter()
            .filter(|(b, _)| b.is_water())
            .map(|(_, n)| n)
            .sum::<usize>();
        let mut rng = w.sampling_rng();
        let picks = w.random_positions(BiomeId::is_water, usize::MAX, &mut rng);
        assert_eq!(picks.len(), water);
    }

    #[test]
    fn winter_tiles_differ_from_summer() {
        let w = world(6);
        let summer = w.tile_at(0, 0).expect("tile");
        let winter = w.tile_at_season(0, 0, Season::Winter).expect("tile");
        assert_ne!(summer, winter);
        assert!(w.tile_name(winter).is_some_and(|n| n.contains("winter")));
    }

    #[test]
    fn publish_swaps_whole_world() {
        let handle = WorldHandle::new(world(7));
        let before = handle.snapshot();
        let old = handle.publish(world(8));
        assert_eq!(old.seed(), 7);
        assert_eq!(before.seed(), 7);
        assert_eq!(handle.snapshot().seed(), 8);
    }
}
