use std::sync::Arc;

use tileworld_core::adjacency::AdjacencyIndex;
use tileworld_core::autotile::AUTOTILE_COUNT;
use tileworld_core::grid::Grid2D;
use tileworld_core::systems::fields::FieldNoise;
use tileworld_core::systems::terrain::repair;
use tileworld_core::tileset::TileSlot;
use tileworld_core::{
    generate, generate_with_catalog, run_all_steps, run_step, run_steps_from, BiomeId, BiomeTable,
    Catalog, GenerationParams, MapSizePreset, Season, Step, TileRef, Tileset, WorldHandle,
    WorldState,
};

fn params(seed: u64, width: usize, height: usize) -> GenerationParams {
    GenerationParams {
        seed,
        size: MapSizePreset::Custom { width, height },
        ..GenerationParams::default()
    }
}

#[test]
fn same_seed_reproduces_every_layer() {
    let p = params(2024, 64, 48);
    let mut a = WorldState::new(p.clone());
    let mut b = WorldState::new(p.clone());
    run_all_steps(&mut a, &p).expect("run a");
    run_all_steps(&mut b, &p).expect("run b");

    assert_eq!(a.diagnostics.layer_hashes, b.diagnostics.layer_hashes);
    assert_eq!(a.elevation, b.elevation);
    assert_eq!(a.refined.as_ref().map(|l| l.grid()), b.refined.as_ref().map(|l| l.grid()));
    assert_eq!(a.tiles, b.tiles);
}

#[test]
fn every_tile_has_a_biome_and_a_tile() {
    let world = generate(&params(5, 40, 30)).expect("generate");
    for y in 0..30 {
        for x in 0..40 {
            assert!(world.biome_at(x, y).is_some());
            let tile = world.tile_at(x, y).expect("tile");
            assert_ne!(tile, TileRef::MISSING, "({x}, {y})");
            assert!(world.tile_name(tile).is_some());
        }
    }
    let total: usize = world.biome_counts().iter().map(|(_, n)| n).sum();
    assert_eq!(total, 40 * 30);
}

#[test]
fn edge_padding_is_always_water() {
    for seed in [1, 77, 9001] {
        let p = params(seed, 48, 48);
        let world = generate(&p).expect("generate");
        let noise = FieldNoise::new(seed);
        for y in 0..48 {
            for x in 0..48 {
                let border = x < 2 || y < 2 || x >= 46 || y >= 46;
                if border || noise.in_edge_padding(x, y, 48, 48, &p.height) {
                    let b = world.biome_at(x, y).expect("in bounds");
                    assert!(b.is_water(), "seed {seed}: ({x}, {y}) is {b:?}");
                    assert!(!world.is_passable(x, y));
                }
            }
        }
    }
}

#[test]
fn coastal_sandy_dirt_is_stable_under_repair() {
    let p = params(31, 64, 64);
    let mut state = WorldState::new(p.clone());
    run_all_steps(&mut state, &p).expect("run");
    let terrain = state.terrain.as_ref().expect("terrain");
    let index = AdjacencyIndex::build(terrain);

    let mut coastal = 0;
    for y in 0..terrain.height() {
        for x in 0..terrain.width() {
            if terrain.get(x, y) == BiomeId::SandyDirt {
                coastal += 1;
                assert_eq!(repair(&index, x, y), BiomeId::SandyDirt, "({x}, {y})");
            }
        }
    }
    assert!(coastal > 0);
}

#[test]
fn rerunning_moisture_matches_a_fresh_run() {
    let p = params(2024, 64, 48);
    let mut rerun = WorldState::new(p.clone());
    run_all_steps(&mut rerun, &p).expect("run");
    run_steps_from(&mut rerun, Step::Moisture, &p).expect("rerun");

    let mut fresh = WorldState::new(p.clone());
    run_all_steps(&mut fresh, &p).expect("fresh");

    assert_eq!(rerun.moisture, fresh.moisture);
    assert_eq!(rerun.diagnostics.checksum, fresh.diagnostics.checksum);
}

#[test]
fn rerunning_terrain_matches_a_fresh_run() {
    let p = params(31, 64, 64);
    let mut rerun = WorldState::new(p.clone());
    run_all_steps(&mut rerun, &p).expect("run");
    run_steps_from(&mut rerun, Step::Terrain, &p).expect("rerun");
    run_steps_from(&mut rerun, Step::Terrain, &p).expect("rerun twice");

    let mut fresh = WorldState::new(p.clone());
    run_all_steps(&mut fresh, &p).expect("fresh");

    assert_eq!(rerun.elevation, fresh.elevation);
    assert_eq!(rerun.diagnostics.layer_hashes, fresh.diagnostics.layer_hashes);
}

#[test]
fn walled_island_centre_is_fully_surrounded() {
    let ring = |x: usize, y: usize| x < 2 || y < 2 || x >= 8 || y >= 8;
    for seed in [0, 1, 2, 3, 42] {
        let p = params(seed, 10, 10);
        let mut state = WorldState::new(p.clone());
        run_step(&mut state, Step::Fields, &p).expect("fields");
        state.raw_elevation =
            Grid2D::from_fn(10, 10, |x, y| if ring(x, y) { 0.1 } else { 0.9 });

        run_steps_from(&mut state, Step::Terrain, &p).expect("run");

        let biomes = state.refined.as_ref().expect("refined");
        for y in 0..10 {
            for x in 0..10 {
                let b = biomes.get(x, y);
                assert_eq!(ring(x, y), b.is_water(), "seed {seed}: ({x}, {y}) is {b:?}");
            }
        }
        assert_eq!(biomes.get(2, 2), BiomeId::SandyDirt);

        let autotile = state.autotile.as_ref().expect("autotile");
        for y in 4..6 {
            for x in 4..6 {
                assert_eq!(
                    *autotile.get(x, y),
                    Some(AUTOTILE_COUNT - 1),
                    "seed {seed}: ({x}, {y}) is {:?}",
                    biomes.get(x, y)
                );
            }
        }
    }
}

#[test]
fn sparse_tileset_falls_back_to_base_tiles() {
    let biomes = BiomeTable::standard();
    let mut tiles = Tileset::from_biomes(&biomes);
    for i in 0..AUTOTILE_COUNT {
        tiles.remove(BiomeId::DeepOcean, Season::Summer, TileSlot::Auto(i));
    }
    let catalog = Arc::new(Catalog::with_tiles(biomes, tiles));
    let world = generate_with_catalog(&params(8, 24, 24), catalog).expect("generate");

    let corner = world.tile_at(0, 0).expect("tile");
    assert_eq!(world.tile_name(corner), Some("deep-ocean@summer"));
}

#[test]
fn handle_readers_keep_their_snapshot() {
    let handle = WorldHandle::new(generate(&params(1, 16, 16)).expect("first"));
    let reader = handle.clone();
    let held = reader.snapshot();

    handle.publish(generate(&params(2, 16, 16)).expect("second"));

    assert_eq!(held.seed(), 1);
    assert_eq!(reader.snapshot().seed(), 2);
    assert_ne!(held.checksum(), reader.snapshot().checksum());
}

#[test]
fn invalid_params_are_rejected_before_generation() {
    let mut p = params(1, 16, 16);
    p.height.edge_padding_min = 5;
    p.height.edge_padding_max = 3;
    assert!(generate(&p).is_err());

    assert!(generate(&params(1, 0, 16)).is_err());
}
