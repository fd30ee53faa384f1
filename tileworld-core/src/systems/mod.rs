pub mod biomes;
pub mod fields;
pub mod moisture;
pub mod terrain;
pub mod tiling;
