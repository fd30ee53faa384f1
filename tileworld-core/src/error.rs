use thiserror::Error;

use crate::biome::BiomeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),

    #[error("generation incomplete: step {missing} has not run")]
    Incomplete { missing: &'static str },

    #[error("layer is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    SizeMismatch {
        got_w: usize,
        got_h: usize,
        want_w: usize,
        want_h: usize,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutotileError {
    #[error("neighbour bitmask {mask:#010b} for {biome:?} has no table entry")]
    UnmappedBitmask { biome: BiomeId, mask: u8 },
}
