//! What to generate: shape, topology, resolution, tuning.

use tellus_mesh::Topology;
use tellus_terrain::TerrainParams;

use crate::generator::GenError;

/// The body's overall silhouette.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// The raw subdivided cube, unprojected. Mostly a debugging aid.
    Cube,
    /// Sphere of the given radius.
    Sphere { radius: f32 },
    /// Unit sphere displaced by fractal terrain.
    Terrain,
}

/// Full description of one generation run.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub shape: Shape,
    pub topology: Topology,
    /// Grid steps per cube-face edge.
    pub resolution: u32,
    /// Base albedo handed through to the renderer, linear RGB.
    pub color: [f32; 3],
    /// Used only when `shape` is [`Shape::Terrain`].
    pub terrain: TerrainParams,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            shape: Shape::Sphere { radius: 1.0 },
            topology: Topology::Triangles,
            resolution: 16,
            color: [1.0, 1.0, 1.0],
            terrain: TerrainParams::default(),
        }
    }
}

impl GenerationSettings {
    /// Checks the settings against the target buffer's limits. Terrain
    /// parameters are only validated when the terrain shape uses them.
    pub fn validate(&self, max_resolution: u32) -> Result<(), GenError> {
        if self.resolution < tellus_cubesphere::MIN_RESOLUTION {
            return Err(GenError::InvalidSettings(format!(
                "resolution {} below minimum {}",
                self.resolution,
                tellus_cubesphere::MIN_RESOLUTION
            )));
        }
        if self.resolution > max_resolution {
            return Err(GenError::InvalidSettings(format!(
                "resolution {} exceeds the buffer's max resolution {max_resolution}",
                self.resolution
            )));
        }
        if let Shape::Sphere { radius } = self.shape {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(GenError::InvalidSettings(format!(
                    "sphere radius {radius} must be finite and positive"
                )));
            }
        }
        if self.shape == Shape::Terrain {
            let t = &self.terrain;
            if t.octaves == 0 {
                return Err(GenError::InvalidSettings(
                    "terrain octaves must be at least 1".to_string(),
                ));
            }
            if !t.persistence.is_finite() || t.persistence <= 0.0 || t.persistence > 1.0 {
                return Err(GenError::InvalidSettings(format!(
                    "terrain persistence {} must lie in (0, 1]",
                    t.persistence
                )));
            }
            if !t.scale.is_finite() || t.scale <= 0.0 {
                return Err(GenError::InvalidSettings(format!(
                    "terrain scale {} must be finite and positive",
                    t.scale
                )));
            }
            if !t.elevation.is_finite() || !(0.0..=1.0).contains(&t.elevation) {
                return Err(GenError::InvalidSettings(format!(
                    "terrain elevation {} must lie in [0, 1]",
                    t.elevation
                )));
            }
        }
        Ok(())
    }
}
