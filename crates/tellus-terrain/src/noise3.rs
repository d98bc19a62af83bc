//! The 3D noise primitive behind fractal terrain.

use glam::Vec3;
use noise::{NoiseFn, Simplex};

/// A seeded, deterministic 3D noise source with output in `[-1, 1]`.
///
/// The trait seam exists so tests can substitute a predictable source for
/// the simplex implementation.
pub trait Noise3 {
    fn sample(&self, point: Vec3) -> f32;
}

/// Simplex noise seeded once at construction.
pub struct SimplexNoise3 {
    simplex: Simplex,
}

impl SimplexNoise3 {
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            simplex: Simplex::new(seed),
        }
    }
}

impl Noise3 for SimplexNoise3 {
    #[inline]
    fn sample(&self, point: Vec3) -> f32 {
        self.simplex
            .get([point.x as f64, point.y as f64, point.z as f64]) as f32
    }
}
