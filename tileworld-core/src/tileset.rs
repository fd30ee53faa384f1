//! Sprite lookup: biome x season x slot -> tile reference.

use std::cell::RefCell;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::autotile::AUTOTILE_COUNT;
use crate::biome::{BiomeId, BiomeTable};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const COUNT: usize = 4;

    pub const ALL: [Season; Self::COUNT] = [
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Spring => 0,
            Self::Summer => 1,
            Self::Autumn => 2,
            Self::Winter => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileSlot {
    Base,
    Auto(u8),
}

impl TileSlot {
    const COUNT: usize = 1 + AUTOTILE_COUNT as usize;

    fn offset(self) -> Option<usize> {
        match self {
            Self::Base => Some(0),
            Self::Auto(i) if i < AUTOTILE_COUNT => Some(1 + usize::from(i)),
            Self::Auto(_) => None,
        }
    }
}

/// Handle into a [`Tileset`]'s sprite-name table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileRef(u32);

impl TileRef {
    /// Placeholder every tileset carries; used only when even base tiles are absent.
    pub const MISSING: TileRef = TileRef(0);

    pub fn id(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Tileset {
    names: Vec<String>,
    entries: Vec<Option<TileRef>>,
}

impl Default for Tileset {
    fn default() -> Self {
        Self::empty()
    }
}

impl Tileset {
    const PER_BIOME: usize = Season::COUNT * TileSlot::COUNT;

    pub fn empty() -> Self {
        Self {
            names: vec![String::from("missing")],
            entries: vec![None; BiomeId::COUNT * Self::PER_BIOME],
        }
    }

    /// Every biome gets a base tile per season; biomes with an autotile
    /// prefix additionally get the full set of transition tiles.
    pub fn from_biomes(biomes: &BiomeTable) -> Self {
        let mut set = Self::empty();
        for def in biomes.iter() {
            for season in Season::ALL {
                set.insert(
                    def.id,
                    season,
                    TileSlot::Base,
                    format!("{}@{}", def.base_tile, season.name()),
                );
                if let Some(prefix) = def.autotile_prefix {
                    for i in 0..AUTOTILE_COUNT {
                        set.insert(
                            def.id,
                            season,
                            TileSlot::Auto(i),
                            format!("{prefix}@{}#{i:02}", season.name()),
                        );
                    }
                }
            }
        }
        set
    }

    fn slot_index(biome: BiomeId, season: Season, slot: TileSlot) -> Option<usize> {
        let offset = slot.offset()?;
        Some(biome.index() * Self::PER_BIOME + season.index() * TileSlot::COUNT + offset)
    }

    /// Registers a sprite name. Out-of-range autotile slots are ignored.
    pub fn insert(
        &mut self,
        biome: BiomeId,
        season: Season,
        slot: TileSlot,
        name: impl Into<String>,
    ) -> Option<TileRef> {
        let idx = Self::slot_index(biome, season, slot)?;
        let tile = TileRef(self.names.len() as u32);
        self.names.push(name.into());
        self.entries[idx] = Some(tile);
        Some(tile)
    }

    pub fn remove(&mut self, biome: BiomeId, season: Season, slot: TileSlot) {
        if let Some(idx) = Self::slot_index(biome, season, slot) {
            self.entries[idx] = None;
        }
    }

    pub fn get(&self, biome: BiomeId, season: Season, slot: TileSlot) -> Option<TileRef> {
        Self::slot_index(biome, season, slot).and_then(|idx| self.entries[idx])
    }

    pub fn name(&self, tile: TileRef) -> Option<&str> {
        self.names.get(tile.0 as usize).map(String::as_str)
    }

    /// Number of registered sprite names, the placeholder included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

/// Turns a biome and autotile index into a concrete tile, degrading to the
/// base tile whenever the tileset lacks an entry.
pub struct TileResolver<'a> {
    biomes: &'a BiomeTable,
    tiles: &'a Tileset,
    reported: RefCell<BTreeSet<(BiomeId, Season, TileSlot)>>,
}

impl<'a> TileResolver<'a> {
    pub fn new(biomes: &'a BiomeTable, tiles: &'a Tileset) -> Self {
        Self {
            biomes,
            tiles,
            reported: RefCell::new(BTreeSet::new()),
        }
    }

    /// `autotile` is `None` when the autotile pass could not produce an index.
    pub fn resolve(&self, biome: BiomeId, season: Season, autotile: Option<u8>) -> TileRef {
        let def = self.biomes.get(biome);
        if def.autotile_prefix.is_some() {
            if let Some(index) = autotile {
                let slot = TileSlot::Auto(index);
                if let Some(tile) = self.tiles.get(biome, season, slot) {
                    return tile;
                }
                self.report(biome, season, slot);
            }
        }
        self.base(biome, season)
    }

    fn base(&self, biome: BiomeId, season: Season) -> TileRef {
        if let Some(tile) = self.tiles.get(biome, season, TileSlot::Base) {
            return tile;
        }
        self.report(biome, season, TileSlot::Base);
        self.tiles
            .get(biome, Season::Summer, TileSlot::Base)
            .unwrap_or(TileRef::MISSING)
    }

    fn report(&self, biome: BiomeId, season: Season, slot: TileSlot) {
        if self.reported.borrow_mut().insert((biome, season, slot)) {
            log::warn!("tileset has no {slot:?} tile for {biome:?} in {season:?}; using base tile");
        }
    }
}
