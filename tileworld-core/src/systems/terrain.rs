//! Coarse terrain pass: ocean / moist dirt / sandy dirt from height alone,
//! then a repair sweep that seals the grid edge and lays a sandy buffer
//! between land and sea.

use anyhow::Result;

use crate::adjacency::AdjacencyIndex;
use crate::biome::{BiomeId, BiomeTable, TERRAIN_ORDER};
use crate::error::WorldError;
use crate::grid::Grid2D;
use crate::layer::BiomeLayer;
use crate::params::GenerationParams;
use crate::state::WorldState;

/// Classifies from the untouched field heights; the sealed edge is written
/// into a fresh copy of them.
pub fn run(state: &mut WorldState, params: &GenerationParams) -> Result<()> {
    let raw_heights = &state.raw_elevation;
    if (raw_heights.width(), raw_heights.height()) != (state.width, state.height) {
        return Err(WorldError::SizeMismatch {
            got_w: raw_heights.width(),
            got_h: raw_heights.height(),
            want_w: state.width,
            want_h: state.height,
        }
        .into());
    }
    let mut elevation = raw_heights.clone();
    let raw = classify(&state.catalog.biomes, &elevation);
    let repaired = repair_layer(&raw, &mut elevation, params.height.edge_height);
    state.elevation = elevation;
    state.terrain = Some(repaired);
    Ok(())
}

/// First terrain rule whose height range contains `height`.
pub fn assign(biomes: &BiomeTable, height: f32) -> Option<BiomeId> {
    TERRAIN_ORDER
        .iter()
        .copied()
        .find(|&id| biomes.rule(id).height.is_some_and(|r| r.contains(height)))
}

pub fn classify(biomes: &BiomeTable, elevation: &Grid2D<f32>) -> BiomeLayer {
    let mut unclassified = 0usize;
    let layer = BiomeLayer::from_fn(elevation.width(), elevation.height(), |x, y| {
        assign(biomes, *elevation.get(x, y)).unwrap_or_else(|| {
            unclassified += 1;
            BiomeId::Ocean
        })
    });
    if unclassified > 0 {
        log::warn!("{unclassified} tiles matched no terrain rule and were set to ocean");
    }
    layer
}

/// Revised terrain for one tile, read through an index built on the raw layer.
pub fn repair(index: &AdjacencyIndex<'_>, x: usize, y: usize) -> BiomeId {
    let far = index.far();
    if far.touches_void(x, y) {
        return BiomeId::Ocean;
    }
    match index.biome(x, y) {
        BiomeId::MoistDirt if far.is_adjacent_to(x, y, &[BiomeId::Ocean]) => BiomeId::SandyDirt,
        other => other,
    }
}

/// Applies [`repair`] to every tile. Tiles sealed at the grid edge also have
/// their height lowered to `edge_height` so fields and biomes agree.
pub fn repair_layer(raw: &BiomeLayer, elevation: &mut Grid2D<f32>, edge_height: f32) -> BiomeLayer {
    let index = AdjacencyIndex::build(raw);
    let mut sealed = 0usize;
    let layer = BiomeLayer::from_fn(raw.width(), raw.height(), |x, y| {
        if index.far().touches_void(x, y) {
            let h = elevation.get_mut(x, y);
            if *h > edge_height {
                *h = edge_height;
                sealed += 1;
            }
        }
        repair(&index, x, y)
    });
    if sealed > 0 {
        log::debug!("lowered {sealed} edge tiles to sea level");
    }
    layer
}
