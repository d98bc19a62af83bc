//! Reusable mesh storage in the interleaved layout GPUs consume.
//!
//! A [`MeshBuffer`] is allocated once for the largest planet it will ever
//! hold and refilled in place on every regeneration, so steady-state mesh
//! rebuilds allocate nothing. Vertices are interleaved `position / normal /
//! uv` floats; indices are either a triangle list or a triangle strip with
//! restart sentinels, and [`MeshBuffer::triangles`] walks both through one
//! iterator.

mod buffer;
mod triangles;
mod vertex;

pub use buffer::{MeshBuffer, MeshError};
pub use triangles::{RESTART_INDEX, Topology, TriangleCursor, TriangleIter};
pub use vertex::{FLOATS_PER_VERTEX, Vertex};
