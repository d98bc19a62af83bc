//! Cube-sphere face geometry and seam-shared vertex addressing.
//!
//! A planet surface is a cube subdivided into `resolution x resolution`
//! quads per face and projected onto the unit sphere. Faces are arranged as
//! a belt of four side faces ringing the Y axis plus two polar caps, and
//! every vertex on a shared edge or corner resolves to a single canonical
//! storage index, so meshes built from this addressing are watertight by
//! construction.

mod cube_face;
mod grid;

pub use cube_face::{CubeFace, cube_point};
pub use grid::{
    GridError, MAX_RESOLUTION, MIN_RESOLUTION, VertexGrid, list_index_count, strip_index_count,
    triangle_count, vertex_count,
};
