//! Biome identifiers and the static definition table that drives both
//! classification and autotiling.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BiomeId {
    Ocean,
    DeepOcean,
    Beach,
    SandyDirt,
    MoistDirt,
    Swamp,
    Valley,
    LowHills,
    MidHills,
    HighHills,
    Peak,
    Grass,
    ForestGrass,
    DryGrass,
    Snow,
    SnowForest,
    SnowHills,
}

impl BiomeId {
    pub const COUNT: usize = 17;

    pub const ALL: [BiomeId; Self::COUNT] = [
        BiomeId::Ocean,
        BiomeId::DeepOcean,
        BiomeId::Beach,
        BiomeId::SandyDirt,
        BiomeId::MoistDirt,
        BiomeId::Swamp,
        BiomeId::Valley,
        BiomeId::LowHills,
        BiomeId::MidHills,
        BiomeId::HighHills,
        BiomeId::Peak,
        BiomeId::Grass,
        BiomeId::ForestGrass,
        BiomeId::DryGrass,
        BiomeId::Snow,
        BiomeId::SnowForest,
        BiomeId::SnowHills,
    ];

    pub const WATER: [BiomeId; 2] = [BiomeId::Ocean, BiomeId::DeepOcean];

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Ocean => 0,
            Self::DeepOcean => 1,
            Self::Beach => 2,
            Self::SandyDirt => 3,
            Self::MoistDirt => 4,
            Self::Swamp => 5,
            Self::Valley => 6,
            Self::LowHills => 7,
            Self::MidHills => 8,
            Self::HighHills => 9,
            Self::Peak => 10,
            Self::Grass => 11,
            Self::ForestGrass => 12,
            Self::DryGrass => 13,
            Self::Snow => 14,
            Self::SnowForest => 15,
            Self::SnowHills => 16,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.as_u8())
    }

    pub fn is_water(self) -> bool {
        matches!(self, Self::Ocean | Self::DeepOcean)
    }
}

/// Half-open interval `[min, max)`; a missing bound is unconstrained.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl Range {
    pub const fn between(min: f32, max: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn below(max: f32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub const fn from(min: f32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        self.min.map_or(true, |min| v >= min) && self.max.map_or(true, |max| v < max)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationRule {
    pub height: Option<Range>,
    pub moisture: Option<Range>,
    pub temperature: Option<Range>,
}

impl GenerationRule {
    const NONE: Self = Self {
        height: None,
        moisture: None,
        temperature: None,
    };

    const fn height(r: Range) -> Self {
        Self {
            height: Some(r),
            ..Self::NONE
        }
    }

    const fn height_moisture(h: Range, m: Range) -> Self {
        Self {
            height: Some(h),
            moisture: Some(m),
            temperature: None,
        }
    }

    const fn moisture(r: Range) -> Self {
        Self {
            moisture: Some(r),
            ..Self::NONE
        }
    }

    const fn temperature(r: Range) -> Self {
        Self {
            temperature: Some(r),
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height.is_none() && self.moisture.is_none() && self.temperature.is_none()
    }

    pub fn matches_height(&self, height: f32) -> bool {
        self.height.map_or(true, |r| r.contains(height))
    }

    pub fn matches_moisture(&self, moisture: f32) -> bool {
        self.moisture.map_or(true, |r| r.contains(moisture))
    }

    pub fn matches_temperature(&self, temperature: f32) -> bool {
        self.temperature.map_or(true, |r| r.contains(temperature))
    }

    /// A rule with no ranges at all never matches.
    pub fn matches(&self, height: f32, moisture: f32, temperature: f32) -> bool {
        !self.is_empty()
            && self.matches_height(height)
            && self.matches_moisture(moisture)
            && self.matches_temperature(temperature)
    }
}

/// Which neighbours count as "same surface" when autotiling a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourFilter {
    Any,
    Skip(&'static [BiomeId]),
    Only(&'static [BiomeId]),
}

impl NeighbourFilter {
    #[inline]
    pub fn accepts(&self, neighbour: BiomeId) -> bool {
        match self {
            Self::Any => true,
            Self::Skip(list) => !list.contains(&neighbour),
            Self::Only(list) => list.contains(&neighbour),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDefinition {
    pub id: BiomeId,
    pub name: &'static str,
    pub color: [u8; 3],
    pub base_tile: &'static str,
    pub autotile_prefix: Option<&'static str>,
    pub passable: bool,
    pub neighbours: NeighbourFilter,
    pub rule: GenerationRule,
}

const WATER: &[BiomeId] = &[BiomeId::Ocean, BiomeId::DeepOcean];
const WATER_AND_BEACH: &[BiomeId] = &[BiomeId::Ocean, BiomeId::DeepOcean, BiomeId::Beach];
const SHORE: &[BiomeId] = &[
    BiomeId::Ocean,
    BiomeId::DeepOcean,
    BiomeId::Beach,
    BiomeId::SandyDirt,
];

/// Immutable per-biome data, indexed by [`BiomeId::index`].
#[derive(Clone, Debug)]
pub struct BiomeTable {
    defs: Vec<BiomeDefinition>,
}

impl Default for BiomeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl BiomeTable {
    pub fn standard() -> Self {
        let defs = BiomeId::ALL.iter().map(|&id| definition(id)).collect();
        Self { defs }
    }

    #[inline]
    pub fn get(&self, id: BiomeId) -> &BiomeDefinition {
        &self.defs[id.index()]
    }

    #[inline]
    pub fn rule(&self, id: BiomeId) -> &GenerationRule {
        &self.get(id).rule
    }

    pub fn iter(&self) -> impl Iterator<Item = &BiomeDefinition> + '_ {
        self.defs.iter()
    }

    /// Sample heights across `[0, 1]` and return those no terrain rule covers.
    pub fn terrain_gaps(&self) -> Vec<f32> {
        const STEPS: u32 = 1000;
        (0..=STEPS)
            .map(|i| i as f32 / STEPS as f32)
            .filter(|&h| {
                !TERRAIN_ORDER
                    .iter()
                    .any(|&id| self.rule(id).matches_height(h) && self.rule(id).height.is_some())
            })
            .collect()
    }

    /// Logs configuration defects in the table. Returns true when none were found.
    pub fn audit(&self, edge_height: f32) -> bool {
        let mut clean = true;
        let gaps = self.terrain_gaps();
        if let (Some(first), Some(last)) = (gaps.first(), gaps.last()) {
            log::warn!(
                "terrain rules leave {} sampled heights unclassified ({first:.3}..={last:.3}); they will fall back to ocean",
                gaps.len()
            );
            clean = false;
        }
        if !self.rule(BiomeId::Ocean).matches_height(edge_height) {
            log::warn!("edge height {edge_height} is outside the ocean range");
            clean = false;
        }
        clean
    }
}

/// Priority order in which the coarse terrain rules are tried.
pub const TERRAIN_ORDER: [BiomeId; 3] = [BiomeId::Ocean, BiomeId::MoistDirt, BiomeId::SandyDirt];

fn definition(id: BiomeId) -> BiomeDefinition {
    use BiomeId as B;
    use NeighbourFilter::{Any, Only, Skip};

    let (name, color, base_tile, prefix, passable, neighbours, rule): (
        _,
        [u8; 3],
        _,
        Option<&'static str>,
        _,
        _,
        _,
    ) = match id {
        B::Ocean => (
            "Ocean",
            [28, 92, 168],
            "ocean",
            None,
            false,
            Any,
            GenerationRule::height(Range::below(0.3)),
        ),
        B::DeepOcean => (
            "Deep Ocean",
            [14, 50, 120],
            "deep-ocean",
            Some("deep-ocean"),
            false,
            Only(&[B::DeepOcean]),
            GenerationRule::height(Range::below(0.18)),
        ),
        B::Beach => (
            "Beach",
            [236, 222, 160],
            "beach",
            Some("beach"),
            true,
            Skip(WATER),
            GenerationRule::height(Range::between(0.3, 0.325)),
        ),
        B::SandyDirt => (
            "Sandy Dirt",
            [204, 180, 122],
            "sandy-dirt",
            Some("sandy-dirt"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::height(Range::between(0.3, 0.34)),
        ),
        B::MoistDirt => (
            "Moist Dirt",
            [122, 94, 62],
            "moist-dirt",
            Some("moist-dirt"),
            true,
            Skip(SHORE),
            GenerationRule::height(Range::from(0.34)),
        ),
        B::Swamp => (
            "Swamp",
            [70, 96, 72],
            "swamp",
            Some("swamp"),
            true,
            Only(&[B::Swamp]),
            GenerationRule::height_moisture(Range::between(0.34, 0.42), Range::from(0.72)),
        ),
        B::Valley => (
            "Valley",
            [132, 170, 96],
            "valley",
            None,
            true,
            Any,
            GenerationRule::height_moisture(Range::between(0.34, 0.45), Range::between(0.45, 0.72)),
        ),
        B::LowHills => (
            "Low Hills",
            [140, 150, 98],
            "low-hills",
            Some("low-hills"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::height_moisture(Range::between(0.62, 0.72), Range::below(0.7)),
        ),
        B::MidHills => (
            "Mid Hills",
            [132, 126, 96],
            "mid-hills",
            Some("mid-hills"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::height_moisture(Range::between(0.72, 0.82), Range::below(0.75)),
        ),
        B::HighHills => (
            "High Hills",
            [118, 108, 100],
            "high-hills",
            Some("high-hills"),
            false,
            Skip(WATER_AND_BEACH),
            GenerationRule::height_moisture(Range::between(0.82, 0.95), Range::below(0.8)),
        ),
        B::Peak => (
            "Peak",
            [96, 92, 92],
            "peak",
            None,
            false,
            Any,
            GenerationRule::height_moisture(Range::from(0.95), Range::below(0.8)),
        ),
        B::Grass => (
            "Grass",
            [110, 170, 80],
            "grass",
            Some("grass"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::moisture(Range::between(0.38, 0.62)),
        ),
        B::ForestGrass => (
            "Forest Grass",
            [58, 122, 62],
            "forest-grass",
            Some("forest-grass"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::moisture(Range::from(0.62)),
        ),
        B::DryGrass => (
            "Dry Grass",
            [176, 176, 98],
            "dry-grass",
            Some("dry-grass"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::moisture(Range::between(0.22, 0.38)),
        ),
        B::Snow => (
            "Snow",
            [236, 240, 244],
            "snow",
            Some("snow"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::temperature(Range::below(0.18)),
        ),
        B::SnowForest => (
            "Snow Forest",
            [190, 210, 206],
            "snow-forest",
            Some("snow-forest"),
            true,
            Skip(WATER_AND_BEACH),
            GenerationRule::temperature(Range::below(0.18)),
        ),
        B::SnowHills => (
            "Snow Hills",
            [212, 214, 222],
            "snow-hills",
            Some("snow-hills"),
            false,
            Skip(WATER_AND_BEACH),
            GenerationRule::temperature(Range::below(0.22)),
        ),
    };

    BiomeDefinition {
        id,
        name,
        color,
        base_tile,
        autotile_prefix: prefix,
        passable,
        neighbours,
        rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_id() {
        let table = BiomeTable::standard();
        for id in BiomeId::ALL {
            assert_eq!(table.get(id).id, id);
        }
        assert_eq!(BiomeId::ALL.len(), BiomeId::COUNT);
    }

    #[test]
    fn terrain_rules_span_unit_interval() {
        let table = BiomeTable::standard();
        assert!(table.terrain_gaps().is_empty());
        assert!(table.audit(0.05));
    }

    #[test]
    fn range_is_half_open() {
        let r = Range::between(0.3, 0.34);
        assert!(r.contains(0.3));
        assert!(!r.contains(0.34));
        assert!(Range::from(0.34).contains(1.0));
        assert!(Range::default().contains(-5.0));
    }

    #[test]
    fn empty_rule_never_matches() {
        assert!(!GenerationRule::default().matches(0.5, 0.5, 0.5));
    }

    #[test]
    fn filters_follow_lists() {
        let table = BiomeTable::standard();
        let deep = table.get(BiomeId::DeepOcean).neighbours;
        assert!(deep.accepts(BiomeId::DeepOcean));
        assert!(!deep.accepts(BiomeId::Ocean));

        let grass = table.get(BiomeId::Grass).neighbours;
        assert!(grass.accepts(BiomeId::SandyDirt));
        assert!(!grass.accepts(BiomeId::Ocean));
    }

    #[test]
    fn upland_shares_a_surface_with_the_coastal_rim() {
        let table = BiomeTable::standard();
        let upland = [
            BiomeId::LowHills,
            BiomeId::MidHills,
            BiomeId::HighHills,
            BiomeId::ForestGrass,
            BiomeId::Snow,
            BiomeId::SnowForest,
            BiomeId::SnowHills,
        ];
        for id in upland {
            let filter = table.get(id).neighbours;
            for other in upland {
                assert!(filter.accepts(other), "{id:?} rejects {other:?}");
            }
            assert!(filter.accepts(BiomeId::SandyDirt), "{id:?}");
            assert!(!filter.accepts(BiomeId::DeepOcean), "{id:?}");
        }
    }
}
