use crate::autotile::BitmaskTable;
use crate::biome::BiomeTable;
use crate::tileset::Tileset;

/// Static lookup data loaded once at startup and shared (via `Arc`) by every
/// generation run and every published world.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub biomes: BiomeTable,
    pub tiles: Tileset,
    pub bitmasks: BitmaskTable,
}

impl Catalog {
    pub fn standard() -> Self {
        let biomes = BiomeTable::standard();
        let tiles = Tileset::from_biomes(&biomes);
        Self {
            biomes,
            tiles,
            bitmasks: BitmaskTable::new(),
        }
    }

    pub fn with_tiles(biomes: BiomeTable, tiles: Tileset) -> Self {
        Self {
            biomes,
            tiles,
            bitmasks: BitmaskTable::new(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
