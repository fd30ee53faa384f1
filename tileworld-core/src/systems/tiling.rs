use anyhow::Result;

use crate::autotile::AutotileEngine;
use crate::error::WorldError;
use crate::grid::Grid2D;
use crate::params::GenerationParams;
use crate::state::WorldState;
use crate::tileset::TileResolver;

pub fn run_autotile(state: &mut WorldState) -> Result<()> {
    let layer = state
        .refined
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "refine" })?;
    let engine = AutotileEngine::new(&state.catalog.biomes, &state.catalog.bitmasks);
    let indices = engine.run(layer);
    let failed = indices.as_slice().iter().filter(|i| i.is_none()).count();
    if failed > 0 {
        log::warn!("{failed} tiles could not be autotiled and will use base tiles");
    }
    state.autotile = Some(indices);
    Ok(())
}

pub fn run_tiles(state: &mut WorldState, params: &GenerationParams) -> Result<()> {
    let layer = state
        .refined
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "refine" })?;
    let indices = state
        .autotile
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "autotile" })?;
    let resolver = TileResolver::new(&state.catalog.biomes, &state.catalog.tiles);
    let tiles = Grid2D::from_fn(state.width, state.height, |x, y| {
        resolver.resolve(layer.get(x, y), params.season, *indices.get(x, y))
    });
    state.tiles = Some(tiles);
    Ok(())
}
