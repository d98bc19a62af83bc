//! RON planet presets.
//!
//! A preset file holds one [`PlanetPreset`]; every field is optional and
//! falls back to the defaults baked into the generator. See
//! `presets/terra.ron` for a full example.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tellus_mesh::Topology;
use tellus_planet::{GenerationSettings, Shape};
use tellus_terrain::TerrainParams;

/// Errors loading or parsing a preset file.
#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("failed to read preset: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to parse preset: {0}")]
    ParseError(#[source] ron::error::SpannedError),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub enum PresetShape {
    Cube,
    Sphere { radius: f32 },
    Terrain,
}

impl Default for PresetShape {
    fn default() -> Self {
        PresetShape::Sphere { radius: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub enum PresetTopology {
    #[default]
    Triangles,
    TriangleStrip,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetTerrain {
    pub seed: u32,
    pub elevation: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub scale: f32,
}

impl Default for PresetTerrain {
    fn default() -> Self {
        let params = TerrainParams::default();
        Self {
            seed: params.seed,
            elevation: params.elevation,
            octaves: params.octaves,
            persistence: params.persistence,
            scale: params.scale,
        }
    }
}

/// One planet described in a file.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetPreset {
    pub shape: PresetShape,
    pub topology: PresetTopology,
    pub resolution: Option<u32>,
    pub color: Option<[f32; 3]>,
    pub terrain: PresetTerrain,
}

impl PlanetPreset {
    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let contents = std::fs::read_to_string(path).map_err(PresetError::ReadError)?;
        ron::from_str(&contents).map_err(PresetError::ParseError)
    }

    /// Expands the preset into full generation settings, filling anything
    /// unspecified from the generator defaults.
    pub fn into_settings(self) -> GenerationSettings {
        let defaults = GenerationSettings::default();
        GenerationSettings {
            shape: match self.shape {
                PresetShape::Cube => Shape::Cube,
                PresetShape::Sphere { radius } => Shape::Sphere { radius },
                PresetShape::Terrain => Shape::Terrain,
            },
            topology: match self.topology {
                PresetTopology::Triangles => Topology::Triangles,
                PresetTopology::TriangleStrip => Topology::TriangleStrip,
            },
            resolution: self.resolution.unwrap_or(defaults.resolution),
            color: self.color.unwrap_or(defaults.color),
            terrain: TerrainParams {
                seed: self.terrain.seed,
                elevation: self.terrain.elevation,
                octaves: self.terrain.octaves,
                persistence: self.terrain.persistence,
                scale: self.terrain.scale,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_preset_parses() {
        let text = r#"(
            shape: Terrain,
            topology: TriangleStrip,
            resolution: Some(128),
            color: Some((0.2, 0.55, 0.3)),
            terrain: (
                seed: 42,
                elevation: 0.3,
                octaves: 6,
                persistence: 0.5,
                scale: 2.5,
            ),
        )"#;
        let preset: PlanetPreset = ron::from_str(text).unwrap();
        let settings = preset.into_settings();
        assert_eq!(settings.shape, Shape::Terrain);
        assert_eq!(settings.topology, Topology::TriangleStrip);
        assert_eq!(settings.resolution, 128);
        assert_eq!(settings.terrain.seed, 42);
        assert_eq!(settings.terrain.octaves, 6);
    }

    #[test]
    fn test_empty_preset_falls_back_to_defaults() {
        let preset: PlanetPreset = ron::from_str("()").unwrap();
        let settings = preset.into_settings();
        assert_eq!(settings, GenerationSettings::default());
    }

    #[test]
    fn test_partial_preset_keeps_unmentioned_defaults() {
        let preset: PlanetPreset = ron::from_str("(resolution: Some(8))").unwrap();
        let settings = preset.into_settings();
        assert_eq!(settings.resolution, 8);
        assert_eq!(settings.shape, Shape::Sphere { radius: 1.0 });
    }

    #[test]
    fn test_malformed_preset_is_a_parse_error() {
        let result: Result<PlanetPreset, _> = ron::from_str("{{not a preset}}");
        assert!(result.is_err());
    }

    #[test]
    fn test_preset_round_trips_through_ron() {
        let preset = PlanetPreset {
            shape: PresetShape::Sphere { radius: 3.0 },
            resolution: Some(32),
            ..PlanetPreset::default()
        };
        let text = ron::to_string(&preset).unwrap();
        let reparsed: PlanetPreset = ron::from_str(&text).unwrap();
        assert_eq!(
            reparsed.into_settings(),
            preset.into_settings()
        );
    }
}
