use std::sync::Arc;

use anyhow::{Context, Result};

use crate::catalog::Catalog;
use crate::error::WorldError;
use crate::params::GenerationParams;
use crate::state::{Step, WorldState};
use crate::systems;
use crate::time::StepTimer;
use crate::world::World;

/// Runs one step over the whole grid. Outputs of later steps are discarded
/// first, so re-running an early step never leaves stale layers behind.
pub fn run_step(state: &mut WorldState, step: Step, params: &GenerationParams) -> Result<()> {
    let (width, height) = params.dimensions();
    if (width, height) != (state.width, state.height) {
        return Err(WorldError::SizeMismatch {
            got_w: width,
            got_h: height,
            want_w: state.width,
            want_h: state.height,
        }
        .into());
    }

    state.params = params.clone();
    invalidate_from(state, step);
    let timer = StepTimer::start(step.name());
    match step {
        Step::Fields => systems::fields::run(state, params)?,
        Step::Terrain => systems::terrain::run(state, params)?,
        Step::Moisture => systems::moisture::run(state, params)?,
        Step::Biomes => systems::biomes::run_assign(state)?,
        Step::Refine => systems::biomes::run_refine(state)?,
        Step::Autotile => systems::tiling::run_autotile(state)?,
        Step::Tiles => systems::tiling::run_tiles(state, params)?,
    }
    state.current_step = Some(step);
    state.step_timings_ms.insert(step, timer.finish());
    state.update_diagnostics();
    Ok(())
}

fn invalidate_from(state: &mut WorldState, step: Step) {
    if step <= Step::Terrain {
        state.terrain = None;
    }
    if step <= Step::Biomes {
        state.biomes = None;
    }
    if step <= Step::Refine {
        state.refined = None;
    }
    if step <= Step::Autotile {
        state.autotile = None;
    }
    state.tiles = None;
    state.step_timings_ms.retain(|s, _| *s < step);
}

pub fn run_next_step(state: &mut WorldState, params: &GenerationParams) -> Result<Option<Step>> {
    let next = match state.current_step {
        None => Some(Step::Fields),
        Some(step) => step.next(),
    };

    if let Some(step) = next {
        run_step(state, step, params)?;
    }
    Ok(next)
}

pub fn run_all_steps(state: &mut WorldState, params: &GenerationParams) -> Result<()> {
    run_steps_from(state, Step::Fields, params)
}

/// Runs `first` and every step after it.
pub fn run_steps_from(state: &mut WorldState, first: Step, params: &GenerationParams) -> Result<()> {
    for step in Step::ALL.into_iter().filter(|s| *s >= first) {
        run_step(state, step, params).with_context(|| format!("running step {}", step.name()))?;
    }
    Ok(())
}

/// Generates a complete world with the standard catalog.
pub fn generate(params: &GenerationParams) -> Result<World> {
    generate_with_catalog(params, Arc::new(Catalog::standard()))
}

pub fn generate_with_catalog(params: &GenerationParams, catalog: Arc<Catalog>) -> Result<World> {
    params.validate()?;
    catalog.biomes.audit(params.height.edge_height);

    let (width, height) = params.dimensions();
    log::info!(
        "generating {width}x{height} world, seed {}, season {:?}",
        params.seed,
        params.season
    );
    let mut state = WorldState::with_catalog(params.clone(), catalog);
    run_all_steps(&mut state, params)?;
    let world = World::from_state(state)?;
    log::info!("world ready, checksum {}", world.checksum());
    Ok(world)
}
