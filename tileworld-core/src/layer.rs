use crate::biome::BiomeId;
use crate::error::WorldError;
use crate::grid::Grid2D;

/// A fully populated biome grid produced by one classification pass.
///
/// Layers are never edited after construction; a pass that revises biomes
/// builds a new layer, so anything derived from an older layer (adjacency in
/// particular) cannot silently go stale.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeLayer {
    grid: Grid2D<BiomeId>,
}

impl BiomeLayer {
    pub fn from_fn(width: usize, height: usize, f: impl FnMut(usize, usize) -> BiomeId) -> Self {
        Self {
            grid: Grid2D::from_fn(width, height, f),
        }
    }

    pub fn filled(width: usize, height: usize, biome: BiomeId) -> Self {
        Self {
            grid: Grid2D::new(width, height, biome),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> BiomeId {
        *self.grid.get(x, y)
    }

    #[inline]
    pub fn get_checked(&self, x: isize, y: isize) -> Option<BiomeId> {
        self.grid.get_checked(x, y).copied()
    }

    pub fn grid(&self) -> &Grid2D<BiomeId> {
        &self.grid
    }

    pub fn counts(&self) -> [usize; BiomeId::COUNT] {
        let mut counts = [0usize; BiomeId::COUNT];
        for b in self.grid.as_slice() {
            counts[b.index()] += 1;
        }
        counts
    }

    pub fn ensure_size(&self, width: usize, height: usize) -> Result<(), WorldError> {
        if self.width() == width && self.height() == height {
            Ok(())
        } else {
            Err(WorldError::SizeMismatch {
                got_w: self.width(),
                got_h: self.height(),
                want_w: width,
                want_h: height,
            })
        }
    }
}
