//! Per-tile scalar fields: height, magnetism, temperature and moisture.
//!
//! Every value is a pure function of the tile coordinate, the world seed,
//! the parameters and (for temperature) the fields computed before it.

use anyhow::Result;
use noise::{NoiseFn, Perlin};

use crate::adjacency::AdjacencyMap;
use crate::biome::BiomeId;
use crate::grid::Grid2D;
use crate::params::{GenerationParams, HeightParams, MoistureParams, PoleParams, TemperatureParams};
use crate::rng::{hash_2d, noise_seed, sub_seed, Stream};
use crate::state::WorldState;

/// `(frequency, weight)` per height octave.
const HEIGHT_OCTAVES: [(f64, f32); 4] = [(3.0, 0.7), (4.0, 0.5), (8.0, 0.3), (15.0, 0.3)];

/// `(frequency multiplier, weight)` per temperature octave.
const TEMPERATURE_OCTAVES: [(f64, f32); 3] = [(1.0, 1.0), (2.0, 0.5), (4.0, 0.25)];

pub fn run(state: &mut WorldState, params: &GenerationParams) -> Result<()> {
    params.validate()?;
    let noise = FieldNoise::new(params.seed);
    let (w, h) = (state.width, state.height);

    state.raw_elevation = Grid2D::from_fn(w, h, |x, y| noise.height(x, y, w, h, params));
    state.elevation = state.raw_elevation.clone();
    state.magnetism = Grid2D::from_fn(w, h, |x, y| noise.magnetism(x, y, w, h, params));

    let elevation = &state.elevation;
    let magnetism = &state.magnetism;
    state.temperature = Grid2D::from_fn(w, h, |x, y| {
        noise.temperature(
            x,
            y,
            w,
            h,
            *elevation.get(x, y),
            *magnetism.get(x, y),
            &params.temperature,
        )
    });
    state.raw_moisture = Grid2D::from_fn(w, h, |x, y| noise.moisture(x, y, w, h, &params.moisture));
    state.moisture = state.raw_moisture.clone();
    Ok(())
}

/// The seeded noise sources for every field of one world.
pub struct FieldNoise {
    seed: u64,
    height: [Perlin; 4],
    poles: [Perlin; 2],
    temperature: [Perlin; 3],
    moisture: Perlin,
}

impl FieldNoise {
    pub fn new(seed: u64) -> Self {
        let perlin = |stream| Perlin::new(noise_seed(seed, stream));
        Self {
            seed,
            height: [0u8, 1, 2, 3].map(|i| perlin(Stream::Height(i))),
            poles: [0u8, 1].map(|i| perlin(Stream::Magnetism(i))),
            temperature: [0u8, 1, 2].map(|i| perlin(Stream::Temperature(i))),
            moisture: perlin(Stream::Moisture),
        }
    }

    pub fn height(&self, x: usize, y: usize, w: usize, h: usize, params: &GenerationParams) -> f32 {
        let p = &params.height;
        if self.in_edge_padding(x, y, w, h, p) {
            return p.edge_height.clamp(0.0, 1.0);
        }

        let (nx, ny) = normalized(x, y, w, h);
        let mut sum = 0.0;
        let mut weights = 0.0;
        for (noise, (freq, weight)) in self.height.iter().zip(HEIGHT_OCTAVES) {
            sum += unit(noise.get([nx * freq, ny * freq])) * weight;
            weights += weight;
        }
        let mut v = (sum / weights).powf(p.exponent);

        let (dx, dy) = centred(x, y, w, h);
        let d = 1.0 - (1.0 - dx * dx) * (1.0 - dy * dy);
        let t = (d * p.mask_strength).clamp(0.0, 1.0);
        v += (p.mask_floor - v) * t;

        v.clamp(0.0, 1.0)
    }

    /// Width of the forced-ocean border at this tile. Jittered per tile so
    /// the coastline never runs in a straight line along the grid edge.
    pub fn edge_padding(&self, x: usize, y: usize, p: &HeightParams) -> usize {
        let min = p.edge_padding_min;
        let span = p.edge_padding_max.saturating_sub(min);
        let jitter = hash_2d(sub_seed(self.seed, Stream::EdgeJitter), x as i32, y as i32);
        let extra = ((jitter * (span + 1) as f32) as u32).min(span);
        (min + extra) as usize
    }

    pub fn in_edge_padding(&self, x: usize, y: usize, w: usize, h: usize, p: &HeightParams) -> bool {
        let pad = self.edge_padding(x, y, p);
        x < pad || y < pad || x + pad >= w || y + pad >= h
    }

    pub fn magnetism(&self, x: usize, y: usize, w: usize, h: usize, params: &GenerationParams) -> f32 {
        let m = &params.magnetism;
        let centre_y = (h as f32 - 1.0) * 0.5;
        let north = centre_y - m.north.offset * h as f32;
        let south = centre_y + m.south.offset * h as f32;

        let a = self.pole(&self.poles[0], &m.north, north, x, y, w, h);
        let b = self.pole(&self.poles[1], &m.south, south, x, y, w, h);
        a.max(b).clamp(0.0, 1.0)
    }

    #[allow(clippy::too_many_arguments)]
    fn pole(
        &self,
        noise: &Perlin,
        pole: &PoleParams,
        pole_y: f32,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> f32 {
        let pole_x = (w as f32 - 1.0) * 0.5;
        let rx = (pole.radius_x * w as f32).max(1.0);
        let ry = (pole.radius_y * h as f32).max(1.0);
        let ax = (x as f32 - pole_x).abs();
        let ay = (y as f32 - pole_y).abs();
        if ax >= rx || ay >= ry {
            return 0.0;
        }

        let (nx, ny) = normalized(x, y, w, h);
        let freq = f64::from(pole.frequency);
        let base = unit(noise.get([nx * freq, ny * freq])).powf(pole.exponent);
        base * (1.0 - ax / rx) * (1.0 - ay / ry)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn temperature(
        &self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        elevation: f32,
        magnetism: f32,
        p: &TemperatureParams,
    ) -> f32 {
        let (nx, ny) = normalized(x, y, w, h);
        let base = f64::from(p.frequency);
        let mut sum = 0.0;
        let mut weights = 0.0;
        for (noise, (mult, weight)) in self.temperature.iter().zip(TEMPERATURE_OCTAVES) {
            let freq = base * mult;
            sum += unit(noise.get([nx * freq, ny * freq])) * weight;
            weights += weight;
        }
        let n = sum / weights;

        let h_eff = effective_height(elevation, p);
        let mut t = n * (1.0 - h_eff * p.height_influence);
        t -= magnetism * p.magnet_influence;
        t = (t + p.magnet_influence) / (1.0 + p.magnet_influence);
        t.clamp(0.0, 1.0)
    }

    pub fn moisture(&self, x: usize, y: usize, w: usize, h: usize, p: &MoistureParams) -> f32 {
        let (nx, ny) = normalized(x, y, w, h);
        let freq = f64::from(p.frequency);
        unit(self.moisture.get([nx * freq, ny * freq]))
    }
}

/// Height as seen by the temperature model: pinned to a band's plateau once
/// it rises above that band's threshold.
pub fn effective_height(elevation: f32, p: &TemperatureParams) -> f32 {
    if elevation > p.alpine.threshold {
        p.alpine.effective
    } else if elevation > p.highland.threshold {
        p.highland.effective
    } else {
        elevation
    }
}

/// Raises moisture near the coast. `near_water` must be the distance-2
/// adjacency of the repaired terrain. Returns the number of boosted tiles.
pub fn apply_coastal_humidity(
    moisture: &mut Grid2D<f32>,
    near_water: &AdjacencyMap,
    p: &MoistureParams,
) -> usize {
    let mut boosted = 0;
    for y in 0..moisture.height() {
        for x in 0..moisture.width() {
            let m = moisture.get_mut(x, y);
            if *m > p.balanced && near_water.is_adjacent_to(x, y, &BiomeId::WATER) {
                *m = (*m * p.coastal_boost).min(1.0);
                boosted += 1;
            }
        }
    }
    boosted
}

#[inline]
fn unit(v: f64) -> f32 {
    ((v as f32 + 1.0) * 0.5).clamp(0.0, 1.0)
}

#[inline]
fn normalized(x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
    (x as f64 / w as f64, y as f64 / h as f64)
}

/// Tile centre mapped into `[-1, 1]` on both axes.
#[inline]
fn centred(x: usize, y: usize, w: usize, h: usize) -> (f32, f32) {
    (
        (x as f32 + 0.5) / w as f32 * 2.0 - 1.0,
        (y as f32 + 0.5) / h as f32 * 2.0 - 1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::BiomeLayer;
    use crate::params::MapSizePreset;

    fn small() -> GenerationParams {
        GenerationParams {
            seed: 77,
            size: MapSizePreset::Custom {
                width: 48,
                height: 40,
            },
            ..GenerationParams::default()
        }
    }

    #[test]
    fn fields_stay_in_unit_range() {
        let p = small();
        let mut state = WorldState::new(p.clone());
        run(&mut state, &p).expect("fields");
        for grid in [
            &state.elevation,
            &state.moisture,
            &state.temperature,
            &state.magnetism,
        ] {
            assert!(grid.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn padding_band_is_flat() {
        let p = small();
        let noise = FieldNoise::new(p.seed);
        let (w, h) = p.dimensions();
        for y in 0..h {
            for x in 0..w {
                if x < 2 || y < 2 || x + 2 >= w || y + 2 >= h {
                    assert_eq!(noise.height(x, y, w, h, &p), p.height.edge_height);
                }
            }
        }
    }

    #[test]
    fn padding_stays_within_configured_range() {
        let p = small();
        let noise = FieldNoise::new(p.seed);
        for y in 0..20 {
            for x in 0..20 {
                let pad = noise.edge_padding(x, y, &p.height);
                assert!((2..=4).contains(&pad));
            }
        }
    }

    #[test]
    fn magnetism_vanishes_far_from_poles() {
        let p = small();
        let noise = FieldNoise::new(p.seed);
        let (w, h) = p.dimensions();
        assert_eq!(noise.magnetism(0, 0, w, h, &p), 0.0);
        assert_eq!(noise.magnetism(w - 1, h / 2, w, h, &p), 0.0);
    }

    #[test]
    fn high_ground_uses_plateau_height() {
        let p = GenerationParams::default().temperature;
        assert_eq!(effective_height(0.3, &p), 0.3);
        assert_eq!(effective_height(0.7, &p), p.highland.effective);
        assert_eq!(effective_height(0.95, &p), p.alpine.effective);
    }

    #[test]
    fn cooler_with_magnetism() {
        let p = GenerationParams::default().temperature;
        let noise = FieldNoise::new(5);
        let calm = noise.temperature(10, 10, 32, 32, 0.4, 0.0, &p);
        let charged = noise.temperature(10, 10, 32, 32, 0.4, 0.9, &p);
        assert!(charged < calm);
    }

    #[test]
    fn coast_boosts_only_humid_tiles() {
        let terrain = BiomeLayer::from_fn(6, 1, |x, _| {
            if x == 0 {
                BiomeId::Ocean
            } else {
                BiomeId::MoistDirt
            }
        });
        let near = AdjacencyMap::build(&terrain, 2);
        let mut moisture = Grid2D::from_fn(6, 1, |x, _| if x == 1 { 0.3 } else { 0.95 });
        let p = GenerationParams::default().moisture;

        let boosted = apply_coastal_humidity(&mut moisture, &near, &p);

        assert_eq!(boosted, 1);
        assert_eq!(*moisture.get(1, 0), 0.3);
        assert_eq!(*moisture.get(2, 0), 1.0);
        assert_eq!(*moisture.get(4, 0), 0.95);
    }
}
