//! Cooperative planet mesh generation.
//!
//! [`GeneratorTask`] fills a shared [`tellus_mesh::MeshBuffer`] with a
//! complete cube-sphere planet over as many scheduler slices as it needs:
//! vertices first, then indices, then two normal passes, then a validated
//! commit. The task is resumable at row, triangle and vertex granularity,
//! so a frame loop can run it through a [`tellus_task::TickRunner`] without
//! ever blocking past its slice budget, and cancel it mid-build.

mod generator;
mod settings;

pub use generator::{GenError, GenerationReport, GeneratorTask, SharedMeshBuffer, generate};
pub use settings::{GenerationSettings, Shape};
