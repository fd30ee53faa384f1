//! 8-neighbour bitmask autotiling (the 47-tile "blob" layout).

use crate::biome::{BiomeId, BiomeTable};
use crate::error::AutotileError;
use crate::grid::Grid2D;
use crate::layer::BiomeLayer;

pub const NW: u8 = 1;
pub const N: u8 = 2;
pub const NE: u8 = 4;
pub const W: u8 = 8;
pub const E: u8 = 16;
pub const SW: u8 = 32;
pub const S: u8 = 64;
pub const SE: u8 = 128;

/// Number of transition tiles per biome and season.
pub const AUTOTILE_COUNT: u8 = 47;

/// Biomes drawn as solid blocks, never as transitions.
pub const NEVER_AUTOTILE: [BiomeId; 1] = [BiomeId::Peak];

/// Every mask reachable after diagonal gating, in ascending order. The
/// position of a mask in this list is its tile index.
const VALID_MASKS: [u8; AUTOTILE_COUNT as usize] = [
    0, 2, 8, 10, 11, 16, 18, 22, 24, 26, 27, 30, 31, 64, 66, 72, 74, 75, 80, 82, 86, 88, 90, 91,
    94, 95, 104, 106, 107, 120, 122, 123, 126, 127, 208, 210, 214, 216, 218, 219, 222, 223, 248,
    250, 251, 254, 255,
];

const CARDINALS: [(u8, isize, isize); 4] = [(N, 0, -1), (W, -1, 0), (E, 1, 0), (S, 0, 1)];

/// Diagonal bit, the two cardinals gating it, and its offset.
const DIAGONALS: [(u8, u8, isize, isize); 4] = [
    (NW, N | W, -1, -1),
    (NE, N | E, 1, -1),
    (SW, S | W, -1, 1),
    (SE, S | E, 1, 1),
];

/// Drops every diagonal bit whose two neighbouring cardinal bits are not both set.
pub fn reduce(raw: u8) -> u8 {
    let mut mask = raw & (N | W | E | S);
    for (bit, gate, _, _) in DIAGONALS {
        if raw & gate == gate {
            mask |= raw & bit;
        }
    }
    mask
}

/// Immutable mask -> tile index lookup, built once and shared by reference.
#[derive(Clone, Debug)]
pub struct BitmaskTable {
    lookup: [Option<u8>; 256],
}

impl Default for BitmaskTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmaskTable {
    pub fn new() -> Self {
        let mut lookup = [None; 256];
        for (index, &mask) in VALID_MASKS.iter().enumerate() {
            lookup[usize::from(mask)] = Some(index as u8);
        }
        Self { lookup }
    }

    #[inline]
    pub fn index(&self, mask: u8) -> Option<u8> {
        self.lookup[usize::from(mask)]
    }

    /// Index of the tile with no same-surface neighbours.
    pub fn isolated(&self) -> u8 {
        0
    }

    /// Index of the tile surrounded on all eight sides.
    pub fn surrounded(&self) -> u8 {
        AUTOTILE_COUNT - 1
    }
}

pub struct AutotileEngine<'a> {
    biomes: &'a BiomeTable,
    table: &'a BitmaskTable,
}

impl<'a> AutotileEngine<'a> {
    pub fn new(biomes: &'a BiomeTable, table: &'a BitmaskTable) -> Self {
        Self { biomes, table }
    }

    fn occupied(&self, layer: &BiomeLayer, centre: BiomeId, x: isize, y: isize) -> bool {
        layer
            .get_checked(x, y)
            .is_some_and(|n| self.biomes.get(centre).neighbours.accepts(n))
    }

    /// Gated neighbour mask for `(x, y)`; 0 for never-autotiled biomes.
    pub fn bitmask(&self, layer: &BiomeLayer, x: usize, y: usize) -> u8 {
        let centre = layer.get(x, y);
        if NEVER_AUTOTILE.contains(&centre) {
            return 0;
        }
        let (x, y) = (x as isize, y as isize);

        let mut mask = 0u8;
        for (bit, dx, dy) in CARDINALS {
            if self.occupied(layer, centre, x + dx, y + dy) {
                mask |= bit;
            }
        }
        for (bit, gate, dx, dy) in DIAGONALS {
            if mask & gate == gate && self.occupied(layer, centre, x + dx, y + dy) {
                mask |= bit;
            }
        }
        mask
    }

    pub fn index(&self, layer: &BiomeLayer, x: usize, y: usize) -> Result<u8, AutotileError> {
        let mask = self.bitmask(layer, x, y);
        self.table
            .index(mask)
            .ok_or(AutotileError::UnmappedBitmask {
                biome: layer.get(x, y),
                mask,
            })
    }

    /// Autotile indices for a whole layer. Failures are logged and left as
    /// `None`, which the tile resolver turns into the base tile.
    pub fn run(&self, layer: &BiomeLayer) -> Grid2D<Option<u8>> {
        Grid2D::from_fn(layer.width(), layer.height(), |x, y| {
            match self.index(layer, x, y) {
                Ok(index) => Some(index),
                Err(e) => {
                    log::error!("autotile ({x}, {y}): {e}");
                    None
                }
            }
        })
    }
}
