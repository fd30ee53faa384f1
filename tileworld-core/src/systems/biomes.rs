use anyhow::Result;

use crate::adjacency::AdjacencyIndex;
use crate::biome::{BiomeId, BiomeTable};
use crate::error::WorldError;
use crate::layer::BiomeLayer;
use crate::state::WorldState;

/// Rules tried, in order, for tiles whose terrain is moist dirt. Earlier
/// entries are narrower and win over the broad grass bands below them.
const MOIST_ORDER: [BiomeId; 9] = [
    BiomeId::Swamp,
    BiomeId::Valley,
    BiomeId::Peak,
    BiomeId::HighHills,
    BiomeId::MidHills,
    BiomeId::LowHills,
    BiomeId::ForestGrass,
    BiomeId::Grass,
    BiomeId::DryGrass,
];

pub fn run_assign(state: &mut WorldState) -> Result<()> {
    let terrain = state
        .terrain
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "terrain" })?;
    let biomes = &state.catalog.biomes;
    let index = AdjacencyIndex::build(terrain);
    let layer = BiomeLayer::from_fn(state.width, state.height, |x, y| {
        assign(
            biomes,
            index.biome(x, y),
            *state.elevation.get(x, y),
            *state.moisture.get(x, y),
            *state.temperature.get(x, y),
        )
    });
    state.biomes = Some(layer);
    Ok(())
}

pub fn run_refine(state: &mut WorldState) -> Result<()> {
    let first = state
        .biomes
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "biomes" })?;
    let index = AdjacencyIndex::build(first);
    let mut changed = 0usize;
    let layer = BiomeLayer::from_fn(state.width, state.height, |x, y| {
        let b = refine(&index, x, y);
        if b != index.biome(x, y) {
            changed += 1;
        }
        b
    });
    log::debug!("refine pass revised {changed} tiles");
    state.refined = Some(layer);
    Ok(())
}

/// Final biome for a tile given its coarse terrain and field values.
pub fn assign(
    biomes: &BiomeTable,
    terrain: BiomeId,
    height: f32,
    moisture: f32,
    temperature: f32,
) -> BiomeId {
    let in_height = |id: BiomeId| biomes.rule(id).height.is_some_and(|r| r.contains(height));
    match terrain {
        BiomeId::Ocean => {
            if in_height(BiomeId::DeepOcean) {
                BiomeId::DeepOcean
            } else {
                BiomeId::Ocean
            }
        }
        BiomeId::SandyDirt => {
            if in_height(BiomeId::Beach) {
                BiomeId::Beach
            } else {
                BiomeId::SandyDirt
            }
        }
        BiomeId::MoistDirt => {
            let land = MOIST_ORDER
                .iter()
                .copied()
                .find(|&id| biomes.rule(id).matches(height, moisture, temperature))
                .unwrap_or(BiomeId::MoistDirt);
            frost(biomes, land, temperature)
        }
        other => other,
    }
}

/// Cold variants of vegetated and hilly land.
fn frost(biomes: &BiomeTable, biome: BiomeId, temperature: f32) -> BiomeId {
    let cold = |id: BiomeId| {
        biomes
            .rule(id)
            .temperature
            .is_some_and(|r| r.contains(temperature))
    };
    match biome {
        BiomeId::Grass | BiomeId::DryGrass if cold(BiomeId::Snow) => BiomeId::Snow,
        BiomeId::ForestGrass if cold(BiomeId::SnowForest) => BiomeId::SnowForest,
        BiomeId::LowHills | BiomeId::MidHills | BiomeId::HighHills if cold(BiomeId::SnowHills) => {
            BiomeId::SnowHills
        }
        other => other,
    }
}

/// Cosmetic second pass: a beach touching moist dirt would pinch into a
/// one-tile strip that cannot autotile, so it becomes sandy dirt.
pub fn refine(index: &AdjacencyIndex<'_>, x: usize, y: usize) -> BiomeId {
    match index.biome(x, y) {
        BiomeId::Beach if index.near().is_adjacent_to(x, y, &[BiomeId::MoistDirt]) => {
            BiomeId::SandyDirt
        }
        other => other,
    }
}
