//! Cached square neighbourhoods over a [`BiomeLayer`].

use crate::biome::BiomeId;
use crate::layer::BiomeLayer;

/// For every tile, the biomes of all cells within Chebyshev distance
/// `distance`, centre excluded, scanned row-major from `(-d, -d)` to `(d, d)`.
/// Out-of-bounds cells are recorded as `None`.
#[derive(Clone, Debug)]
pub struct AdjacencyMap {
    distance: usize,
    stride: usize,
    width: usize,
    cells: Vec<Option<BiomeId>>,
}

impl AdjacencyMap {
    pub fn build(layer: &BiomeLayer, distance: usize) -> Self {
        let stride = Self::neighbour_count(distance);
        let mut cells = Vec::with_capacity(layer.width() * layer.height() * stride);
        for y in 0..layer.height() {
            for x in 0..layer.width() {
                for (dx, dy) in Self::offsets(distance) {
                    cells.push(layer.get_checked(x as isize + dx, y as isize + dy));
                }
            }
        }
        Self {
            distance,
            stride,
            width: layer.width(),
            cells,
        }
    }

    pub fn neighbour_count(distance: usize) -> usize {
        let side = 2 * distance + 1;
        side * side - 1
    }

    /// Neighbour offsets in scan order.
    pub fn offsets(distance: usize) -> impl Iterator<Item = (isize, isize)> {
        let d = distance as isize;
        (-d..=d)
            .flat_map(move |dy| (-d..=d).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
    }

    #[inline]
    pub fn distance(&self) -> usize {
        self.distance
    }

    #[inline]
    pub fn neighbours(&self, x: usize, y: usize) -> &[Option<BiomeId>] {
        let start = (y * self.width + x) * self.stride;
        &self.cells[start..start + self.stride]
    }

    /// True iff some in-bounds neighbour is one of `candidates`.
    pub fn is_adjacent_to(&self, x: usize, y: usize, candidates: &[BiomeId]) -> bool {
        self.neighbours(x, y)
            .iter()
            .flatten()
            .any(|b| candidates.contains(b))
    }

    /// True iff the neighbourhood reaches past the grid edge.
    pub fn touches_void(&self, x: usize, y: usize) -> bool {
        self.neighbours(x, y).iter().any(Option::is_none)
    }
}

/// A layer together with its distance-1 and distance-2 adjacency, built
/// from that exact layer. Classification passes read biomes only through
/// this type.
pub struct AdjacencyIndex<'a> {
    layer: &'a BiomeLayer,
    near: AdjacencyMap,
    far: AdjacencyMap,
}

impl<'a> AdjacencyIndex<'a> {
    pub fn build(layer: &'a BiomeLayer) -> Self {
        Self {
            layer,
            near: AdjacencyMap::build(layer, 1),
            far: AdjacencyMap::build(layer, 2),
        }
    }

    #[inline]
    pub fn biome(&self, x: usize, y: usize) -> BiomeId {
        self.layer.get(x, y)
    }

    #[inline]
    pub fn near(&self) -> &AdjacencyMap {
        &self.near
    }

    #[inline]
    pub fn far(&self) -> &AdjacencyMap {
        &self.far
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbour_counts() {
        assert_eq!(AdjacencyMap::neighbour_count(1), 8);
        assert_eq!(AdjacencyMap::neighbour_count(2), 24);
        assert_eq!(AdjacencyMap::offsets(2).count(), 24);
    }

    #[test]
    fn scan_order_is_row_major() {
        let offsets: Vec<_> = AdjacencyMap::offsets(1).collect();
        assert_eq!(
            offsets,
            vec![
                (-1, -1),
                (0, -1),
                (1, -1),
                (-1, 0),
                (1, 0),
                (-1, 1),
                (0, 1),
                (1, 1)
            ]
        );
    }

    #[test]
    fn corner_tile_sees_void() {
        let layer = BiomeLayer::filled(5, 5, BiomeId::Grass);
        let map = AdjacencyMap::build(&layer, 1);
        assert!(map.touches_void(0, 0));
        assert!(!map.touches_void(2, 2));
        let none = map.neighbours(0, 0).iter().filter(|b| b.is_none()).count();
        assert_eq!(none, 5);
    }

    #[test]
    fn adjacency_ignores_void_and_centre() {
        let layer = BiomeLayer::from_fn(5, 5, |x, y| {
            if (x, y) == (2, 2) {
                BiomeId::Ocean
            } else {
                BiomeId::Grass
            }
        });
        let index = AdjacencyIndex::build(&layer);
        assert!(!index.near().is_adjacent_to(2, 2, &[BiomeId::Ocean]));
        assert!(index.near().is_adjacent_to(1, 1, &[BiomeId::Ocean]));
        assert!(!index.near().is_adjacent_to(0, 0, &[BiomeId::Ocean]));
        assert!(index.far().is_adjacent_to(0, 0, &[BiomeId::Ocean]));
    }
}
