pub mod adjacency;
pub mod autotile;
pub mod biome;
pub mod catalog;
pub mod error;
pub mod export;
pub mod grid;
pub mod layer;
pub mod params;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod systems;
pub mod tileset;
pub mod time;
pub mod world;

pub use biome::{BiomeDefinition, BiomeId, BiomeTable};
pub use catalog::Catalog;
pub use error::{AutotileError, WorldError};
pub use layer::BiomeLayer;
pub use params::{GenerationParams, MapSizePreset};
pub use scheduler::{
    generate, generate_with_catalog, run_all_steps, run_next_step, run_step, run_steps_from,
};
pub use state::{Step, WorldState};
pub use tileset::{Season, TileRef, Tileset};
pub use world::{World, WorldHandle};
