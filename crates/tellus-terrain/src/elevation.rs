//! Fractal terrain elevation and the profile enum the generator samples.

use std::fmt;

use glam::Vec3;

use crate::noise3::{Noise3, SimplexNoise3};

/// Octave frequency multiplier. Fixed; exposing it has never been needed.
pub const LACUNARITY: f32 = 2.0;

/// Tuning knobs for fractal terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainParams {
    /// Noise seed. The same seed always reproduces the same planet.
    pub seed: u32,
    /// Peak-to-trough surface variation as a fraction of the radius,
    /// in `[0, 1]`.
    pub elevation: f32,
    /// Number of noise octaves summed. At least 1.
    pub octaves: u32,
    /// Per-octave amplitude falloff, in `(0, 1]`.
    pub persistence: f32,
    /// Feature frequency: directions are scaled by this before sampling.
    pub scale: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            elevation: 0.25,
            octaves: 5,
            persistence: 0.55,
            scale: 2.0,
        }
    }
}

/// Seeded fractal elevation field over the unit sphere.
///
/// The octave sum is renormalized by the total possible amplitude, so the
/// composite stays in `[-1, 1]` regardless of octave count.
pub struct TerrainElevation {
    noise: Box<dyn Noise3>,
    params: TerrainParams,
    amplitude_norm: f32,
}

impl TerrainElevation {
    #[must_use]
    pub fn new(params: TerrainParams) -> Self {
        Self::with_noise(Box::new(SimplexNoise3::new(params.seed)), params)
    }

    /// Builds the field over a caller-supplied noise source.
    #[must_use]
    pub fn with_noise(noise: Box<dyn Noise3>, params: TerrainParams) -> Self {
        let mut total = 0.0_f32;
        let mut amplitude = 1.0_f32;
        for _ in 0..params.octaves {
            total += amplitude;
            amplitude *= params.persistence;
        }
        // Guards the degenerate octaves == 0 case; validated callers never
        // hit it.
        let amplitude_norm = if total > 0.0 { 1.0 / total } else { 1.0 };
        Self {
            noise,
            params,
            amplitude_norm,
        }
    }

    #[must_use]
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Octave-summed noise at `point`, renormalized to `[-1, 1]`.
    #[must_use]
    pub fn fractal(&self, point: Vec3) -> f32 {
        let mut total = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;
        for _ in 0..self.params.octaves {
            total += self.noise.sample(point * frequency) * amplitude;
            frequency *= LACUNARITY;
            amplitude *= self.params.persistence;
        }
        total * self.amplitude_norm
    }

    /// Surface radius along a unit `direction`.
    ///
    /// The band `[1 - elevation, 1]` is centered so that noise value zero
    /// sits halfway between the deepest valley and the highest peak.
    #[must_use]
    pub fn radius(&self, direction: Vec3) -> f32 {
        let half_band = self.params.elevation * 0.5;
        1.0 - half_band + self.fractal(direction * self.params.scale) * half_band
    }
}

impl fmt::Debug for TerrainElevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainElevation")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// How far from the planet center the surface sits, per direction.
#[derive(Debug)]
pub enum ElevationProfile {
    /// Constant radius everywhere.
    Sphere(f32),
    /// Fractal-noise displaced radius.
    Terrain(TerrainElevation),
}

impl ElevationProfile {
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        ElevationProfile::Sphere(radius)
    }

    #[must_use]
    pub fn terrain(params: TerrainParams) -> Self {
        ElevationProfile::Terrain(TerrainElevation::new(params))
    }

    /// Surface radius along a unit `direction`.
    #[inline]
    #[must_use]
    pub fn radius(&self, direction: Vec3) -> f32 {
        match self {
            ElevationProfile::Sphere(radius) => *radius,
            ElevationProfile::Terrain(terrain) => terrain.radius(direction),
        }
    }
}
