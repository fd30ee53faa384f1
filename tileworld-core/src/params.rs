use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::WorldError;
use crate::tileset::Season;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum MapSizePreset {
    S128,
    S256,
    S512,
    Custom { width: usize, height: usize },
}

impl MapSizePreset {
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Self::S128 => (128, 128),
            Self::S256 => (256, 256),
            Self::S512 => (512, 512),
            Self::Custom { width, height } => (width, height),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HeightParams {
    /// Applied to the blended octaves; values above 1 sharpen peaks and valleys.
    pub exponent: f32,
    pub mask_strength: f32,
    /// Value the island mask pulls height toward.
    pub mask_floor: f32,
    /// Height forced onto the border band. Must fall in the ocean height range.
    pub edge_height: f32,
    pub edge_padding_min: u32,
    pub edge_padding_max: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PoleParams {
    /// Vertical distance from the grid centre, as a fraction of grid height.
    pub offset: f32,
    /// Horizontal reach, as a fraction of grid width.
    pub radius_x: f32,
    /// Vertical reach, as a fraction of grid height.
    pub radius_y: f32,
    /// Fractional exponent flattening the noise peaks inside the radius.
    pub exponent: f32,
    pub frequency: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MagnetismParams {
    pub north: PoleParams,
    pub south: PoleParams,
}

/// Above `threshold` the temperature model treats height as `effective`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct HeightBand {
    pub threshold: f32,
    pub effective: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemperatureParams {
    pub frequency: f32,
    pub height_influence: f32,
    pub magnet_influence: f32,
    pub highland: HeightBand,
    pub alpine: HeightBand,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MoistureParams {
    pub frequency: f32,
    /// Raw moisture above this counts as humid enough to pick up sea air.
    pub balanced: f32,
    pub coastal_boost: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    pub seed: u64,
    pub size: MapSizePreset,
    pub season: Season,
    pub height: HeightParams,
    pub magnetism: MagnetismParams,
    pub temperature: TemperatureParams,
    pub moisture: MoistureParams,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            seed: 42,
            size: MapSizePreset::S256,
            season: Season::Summer,
            height: HeightParams {
                exponent: 1.35,
                mask_strength: 0.85,
                mask_floor: 0.05,
                edge_height: 0.05,
                edge_padding_min: 2,
                edge_padding_max: 4,
            },
            magnetism: MagnetismParams {
                north: PoleParams {
                    offset: 0.3,
                    radius_x: 0.3,
                    radius_y: 0.15,
                    exponent: 0.35,
                    frequency: 6.0,
                },
                south: PoleParams {
                    offset: 0.32,
                    radius_x: 0.25,
                    radius_y: 0.12,
                    exponent: 0.3,
                    frequency: 7.0,
                },
            },
            temperature: TemperatureParams {
                frequency: 2.5,
                height_influence: 0.6,
                magnet_influence: 0.5,
                highland: HeightBand {
                    threshold: 0.65,
                    effective: 0.6,
                },
                alpine: HeightBand {
                    threshold: 0.8,
                    effective: 0.7,
                },
            },
            moisture: MoistureParams {
                frequency: 5.0,
                balanced: 0.5,
                coastal_boost: 1.1,
            },
        }
    }
}

impl GenerationParams {
    pub fn dimensions(&self) -> (usize, usize) {
        self.size.dimensions()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?;
        let params: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing parameters in {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyGrid { width, height });
        }
        if self.height.edge_padding_min > self.height.edge_padding_max {
            return Err(WorldError::InvalidParams(format!(
                "edge padding range {}..={} is inverted",
                self.height.edge_padding_min, self.height.edge_padding_max
            )));
        }
        if self.height.exponent <= 0.0 {
            return Err(WorldError::InvalidParams(format!(
                "height exponent must be positive, got {}",
                self.height.exponent
            )));
        }
        if self.temperature.highland.threshold > self.temperature.alpine.threshold {
            return Err(WorldError::InvalidParams(format!(
                "highland threshold {} lies above alpine threshold {}",
                self.temperature.highland.threshold, self.temperature.alpine.threshold
            )));
        }
        for (name, pole) in [
            ("north", &self.magnetism.north),
            ("south", &self.magnetism.south),
        ] {
            if pole.radius_x <= 0.0 || pole.radius_y <= 0.0 {
                return Err(WorldError::InvalidParams(format!(
                    "{name} pole radius must be positive"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        GenerationParams::default().validate().expect("defaults are valid");
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let p = GenerationParams {
            size: MapSizePreset::Custom {
                width: 0,
                height: 12,
            },
            ..GenerationParams::default()
        };
        assert!(matches!(p.validate(), Err(WorldError::EmptyGrid { .. })));
    }

    #[test]
    fn json_round_trip_keeps_custom_size() {
        let p = GenerationParams {
            seed: 9,
            size: MapSizePreset::Custom {
                width: 40,
                height: 30,
            },
            ..GenerationParams::default()
        };
        let text = serde_json::to_string(&p).expect("serialize");
        let back: GenerationParams = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back.dimensions(), (40, 30));
        assert_eq!(back, p);
    }
}
