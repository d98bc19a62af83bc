//! Radial elevation profiles for planet surfaces.
//!
//! A profile answers one question: given a unit direction from the planet
//! center, how far out does the surface sit? The trivial profile is a
//! constant-radius sphere; the interesting one displaces the radius with
//! seeded fractal noise sampled directly in 3D, so the result is continuous
//! across cube-face seams with no projection artifacts.

mod elevation;
mod noise3;

pub use elevation::{ElevationProfile, LACUNARITY, TerrainElevation, TerrainParams};
pub use noise3::{Noise3, SimplexNoise3};
