use anyhow::Result;

use crate::adjacency::AdjacencyMap;
use crate::error::WorldError;
use crate::params::GenerationParams;
use crate::state::WorldState;
use crate::systems::fields::apply_coastal_humidity;

/// Coastal humidity, read against the repaired terrain so the sandy buffer
/// and sealed edge are already in place.
pub fn run(state: &mut WorldState, params: &GenerationParams) -> Result<()> {
    let terrain = state
        .terrain
        .as_ref()
        .ok_or(WorldError::Incomplete { missing: "terrain" })?;
    let near_water = AdjacencyMap::build(terrain, 2);
    let mut moisture = state.raw_moisture.clone();
    let boosted = apply_coastal_humidity(&mut moisture, &near_water, &params.moisture);
    state.moisture = moisture;
    log::debug!("coastal humidity raised moisture on {boosted} tiles");
    Ok(())
}
