//! The resumable five-phase planet builder.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use tellus_cubesphere::{CubeFace, GridError, VertexGrid, cube_point, triangle_count};
use tellus_mesh::{MeshBuffer, MeshError, Topology, TriangleCursor};
use tellus_task::{Resumable, StepResult, StopProbe, TaskHandle, TickRunner};
use tellus_terrain::ElevationProfile;

use crate::settings::{GenerationSettings, Shape};

/// A mesh buffer owned by the caller and lent to generators one at a time.
pub type SharedMeshBuffer = Rc<RefCell<MeshBuffer>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("invalid generation settings: {0}")]
    InvalidSettings(String),
    #[error("mesh buffer already claimed by a generation in flight")]
    BufferInUse,
    #[error("vertex addressing failed: {0}")]
    Grid(#[from] GridError),
    #[error("mesh buffer rejected a write: {0}")]
    Mesh(#[from] MeshError),
}

/// Stats of one finished generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    pub resolution: u32,
    pub topology: Topology,
    pub vertex_count: u32,
    pub index_count: u32,
    pub triangle_count: u32,
    /// Wall time from the first slice to commit, gaps included.
    pub elapsed: Duration,
}

/// Where vertices sit along their radial direction.
#[derive(Debug)]
enum SurfacePlacement {
    /// Raw cube surface.
    Cube,
    /// Projected onto the sphere and pushed to the profile's radius.
    Radial(ElevationProfile),
}

/// Where the build stands between slices. Each variant stores exactly the
/// loop position needed to continue, so a task survives any number of
/// yields at row, triangle or vertex granularity.
#[derive(Clone, Copy, Debug)]
enum Phase {
    Vertices { face_slot: u32, row: u32 },
    Indices { face_slot: u32, row: u32 },
    AccumulateNormals { cursor: TriangleCursor },
    Normalize { vertex: u32 },
    Commit,
}

/// Fills a [`SharedMeshBuffer`] with one planet mesh, cooperatively.
///
/// Construction validates the settings and claims the buffer; the claim is
/// released when the task settles, whichever way it settles. The phases run
/// in fixed order: vertex emission, index emission, triangle-normal
/// accumulation, per-vertex normalization, commit.
pub struct GeneratorTask {
    settings: GenerationSettings,
    buffer: SharedMeshBuffer,
    grid: VertexGrid,
    placement: SurfacePlacement,
    phase: Phase,
    started: Option<Instant>,
}

impl GeneratorTask {
    pub fn new(settings: GenerationSettings, buffer: SharedMeshBuffer) -> Result<Self, GenError> {
        let grid = {
            let mut shared = buffer
                .try_borrow_mut()
                .map_err(|_| GenError::BufferInUse)?;
            settings.validate(shared.max_resolution())?;
            if shared.is_generating() {
                return Err(GenError::BufferInUse);
            }
            let grid = VertexGrid::new(settings.resolution)?;
            shared.begin_generation(settings.topology);
            grid
        };
        let placement = match settings.shape {
            Shape::Cube => SurfacePlacement::Cube,
            Shape::Sphere { radius } => SurfacePlacement::Radial(ElevationProfile::sphere(radius)),
            Shape::Terrain => {
                SurfacePlacement::Radial(ElevationProfile::terrain(settings.terrain))
            }
        };
        debug!(
            "generation claimed: resolution {}, {:?}, {:?}",
            settings.resolution, settings.shape, settings.topology
        );
        Ok(Self {
            settings,
            buffer,
            grid,
            placement,
            phase: Phase::Vertices {
                face_slot: 0,
                row: 0,
            },
            started: None,
        })
    }

    fn advance(
        &mut self,
        started: Instant,
        probe: &mut StopProbe,
        buffer: &mut MeshBuffer,
    ) -> Result<Option<GenerationReport>, GenError> {
        let r = self.grid.resolution();
        loop {
            match self.phase {
                Phase::Vertices {
                    mut face_slot,
                    mut row,
                } => {
                    while face_slot < 6 {
                        let face = CubeFace::ALL[face_slot as usize];
                        if row >= r {
                            face_slot += 1;
                            // Caps own only their interior rows.
                            row = match CubeFace::ALL.get(face_slot as usize) {
                                Some(next) if next.is_cap() => 1,
                                _ => 0,
                            };
                            continue;
                        }
                        self.emit_vertex_row(buffer, face, row)?;
                        row += 1;
                        if probe.should_stop() {
                            self.phase = Phase::Vertices { face_slot, row };
                            return Ok(None);
                        }
                    }
                    debug!("vertex phase done: {} vertices", buffer.vertex_count());
                    self.phase = Phase::Indices {
                        face_slot: 0,
                        row: 0,
                    };
                }
                Phase::Indices {
                    mut face_slot,
                    mut row,
                } => {
                    while face_slot < 6 {
                        let face = CubeFace::ALL[face_slot as usize];
                        if row >= r {
                            face_slot += 1;
                            row = 0;
                            continue;
                        }
                        self.emit_index_row(buffer, face, row)?;
                        row += 1;
                        if probe.should_stop() {
                            self.phase = Phase::Indices { face_slot, row };
                            return Ok(None);
                        }
                    }
                    debug!("index phase done: {} indices", buffer.index_count());
                    self.phase = Phase::AccumulateNormals {
                        cursor: TriangleCursor::default(),
                    };
                }
                Phase::AccumulateNormals { mut cursor } => {
                    loop {
                        // The walk borrows the buffer, so it is re-opened
                        // per triangle to let the normal writes through.
                        let mut walk = buffer.triangles_from(cursor);
                        let Some((a, b, c)) = walk.next() else {
                            self.phase = Phase::Normalize { vertex: 0 };
                            break;
                        };
                        cursor = walk.cursor();
                        let pa = buffer.position(a);
                        let pb = buffer.position(b);
                        let pc = buffer.position(c);
                        // Unnormalized, so larger triangles weigh more.
                        let weighted = (pb - pa).cross(pc - pa);
                        buffer.add_normal(a, weighted);
                        buffer.add_normal(b, weighted);
                        buffer.add_normal(c, weighted);
                        if probe.should_stop() {
                            self.phase = Phase::AccumulateNormals { cursor };
                            return Ok(None);
                        }
                    }
                    debug!("normal accumulation done");
                }
                Phase::Normalize { mut vertex } => {
                    let total = buffer.vertex_count();
                    while vertex < total {
                        let accumulated = buffer.normal(vertex);
                        debug_assert!(
                            accumulated.length_squared() > 0.0,
                            "vertex {vertex} untouched by any triangle"
                        );
                        buffer.set_normal(vertex, accumulated.normalize_or_zero());
                        vertex += 1;
                        if probe.should_stop() {
                            self.phase = Phase::Normalize { vertex };
                            return Ok(None);
                        }
                    }
                    self.phase = Phase::Commit;
                }
                Phase::Commit => {
                    buffer.commit(r, self.settings.topology)?;
                    let report = GenerationReport {
                        resolution: r,
                        topology: self.settings.topology,
                        vertex_count: buffer.vertex_count(),
                        index_count: buffer.index_count(),
                        triangle_count: triangle_count(r),
                        elapsed: started.elapsed(),
                    };
                    info!(
                        "planet mesh committed: resolution {}, {} vertices, {} indices, {:?}",
                        r, report.vertex_count, report.index_count, report.elapsed
                    );
                    return Ok(Some(report));
                }
            }
        }
    }

    /// Emits the vertices a face owns in one grid row, in storage order.
    fn emit_vertex_row(
        &self,
        buffer: &mut MeshBuffer,
        face: CubeFace,
        row: u32,
    ) -> Result<(), GenError> {
        let r = self.grid.resolution();
        let (first_col, last_col) = if face.is_belt() { (0, r) } else { (1, r - 1) };
        for col in first_col..=last_col {
            let cube = cube_point(face, row, col, r);
            let direction = cube.normalize();
            let uv = sphere_uv(direction);
            let position = match &self.placement {
                SurfacePlacement::Cube => cube,
                SurfacePlacement::Radial(profile) => direction * profile.radius(direction),
            };
            let pushed = buffer.push_vertex(position, uv)?;
            debug_assert_eq!(Ok(pushed), self.grid.index(face, row, col));
        }
        Ok(())
    }

    /// Emits the indices for one row band of quads on `face`.
    fn emit_index_row(
        &self,
        buffer: &mut MeshBuffer,
        face: CubeFace,
        row: u32,
    ) -> Result<(), GenError> {
        let r = self.grid.resolution();
        match self.settings.topology {
            Topology::Triangles => {
                for col in 0..r {
                    let near = self.grid.index(face, row, col)?;
                    let far = self.grid.index(face, row + 1, col)?;
                    let near_right = self.grid.index(face, row, col + 1)?;
                    let far_right = self.grid.index(face, row + 1, col + 1)?;
                    // Both triangles wind outward; they share the
                    // far/near-right diagonal, same as the strip decode.
                    buffer.push_indices(&[far, near, far_right])?;
                    buffer.push_indices(&[far_right, near, near_right])?;
                }
            }
            Topology::TriangleStrip => {
                for col in 0..=r {
                    let far = self.grid.index(face, row + 1, col)?;
                    let near = self.grid.index(face, row, col)?;
                    buffer.push_indices(&[far, near])?;
                }
                buffer.push_restart()?;
            }
        }
        Ok(())
    }
}

/// Releases the buffer claim when the task settles; the runner drops the
/// task at settlement, including cancellation before the first slice.
impl Drop for GeneratorTask {
    fn drop(&mut self) {
        // Tasks drop between slices, so no borrow of the buffer is live
        // here. A release skipped on this path would leak the claim.
        match self.buffer.try_borrow_mut() {
            Ok(mut shared) => shared.end_generation(),
            Err(_) => debug_assert!(false, "mesh buffer borrowed while its task drops"),
        }
    }
}

impl Resumable for GeneratorTask {
    type Output = GenerationReport;
    type Error = GenError;

    fn resume(&mut self, probe: &mut StopProbe) -> StepResult<GenerationReport, GenError> {
        let started = *self.started.get_or_insert_with(Instant::now);
        let buffer = Rc::clone(&self.buffer);
        let mut shared = match buffer.try_borrow_mut() {
            Ok(shared) => shared,
            Err(_) => return StepResult::Failed(GenError::BufferInUse),
        };
        match self.advance(started, probe, &mut shared) {
            Ok(Some(report)) => StepResult::Complete(report),
            Ok(None) => StepResult::Yielded,
            Err(err) => StepResult::Failed(err),
        }
    }
}

/// Spawns a generation task on `runner`, claiming `buffer` until it
/// settles. Returns the handle to observe, chain, or cancel.
pub fn generate(
    runner: &mut TickRunner,
    settings: GenerationSettings,
    buffer: &SharedMeshBuffer,
) -> Result<TaskHandle<GenerationReport, GenError>, GenError> {
    let task = GeneratorTask::new(settings, Rc::clone(buffer))?;
    Ok(runner.spawn(task))
}

/// Texture coordinates from a unit direction: equirectangular, u wrapping
/// around the Y axis, v running 0 at the -Y pole to 1 at the +Y pole.
fn sphere_uv(direction: Vec3) -> Vec2 {
    use std::f32::consts::{PI, TAU};
    let theta = (-direction.z).atan2(direction.x);
    let phi = (-direction.y).clamp(-1.0, 1.0).acos();
    Vec2::new(0.5 + theta / TAU, phi / PI)
}
