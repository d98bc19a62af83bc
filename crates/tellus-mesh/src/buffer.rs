//! The fixed-capacity, refillable mesh buffer.

use glam::{Vec2, Vec3};
use thiserror::Error;

use tellus_cubesphere::{MAX_RESOLUTION, MIN_RESOLUTION, list_index_count, vertex_count};

use crate::triangles::{RESTART_INDEX, Topology, TriangleCursor, TriangleIter};
use crate::vertex::{FLOATS_PER_VERTEX, Vertex};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("max resolution {0} outside supported range {MIN_RESOLUTION}..={MAX_RESOLUTION}")]
    UnsupportedResolution(u32),
    #[error("vertex buffer full: capacity {capacity} vertices")]
    VertexOverflow { capacity: u32 },
    #[error("index buffer full: capacity {capacity} indices")]
    IndexOverflow { capacity: u32 },
    #[error("commit of incomplete mesh: expected {expected} {kind}, found {actual}")]
    IncompleteGeneration {
        kind: &'static str,
        expected: u32,
        actual: u32,
    },
}

/// Where the buffer content stands in its fill cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BufferState {
    /// Empty, normals zeroed. Fresh or after `clear`.
    Idle,
    /// Partially filled. Content is not renderable.
    Writing,
    /// Fill finished and validated. Content is renderable.
    Committed,
}

/// Interleaved vertex storage plus an index buffer, sized once for the
/// largest supported resolution and reused across regenerations.
///
/// The vertex region is a flat `f32` array with [`FLOATS_PER_VERTEX`]
/// floats per vertex. The index region is sized for list topology, which
/// needs more room than strips at every resolution, so one allocation
/// serves both. Writers fill via the `push` methods, fix normals up through
/// [`MeshBuffer::add_normal`] and [`MeshBuffer::set_normal`], then seal the
/// content with [`MeshBuffer::commit`].
#[derive(Debug)]
pub struct MeshBuffer {
    vertex_data: Vec<f32>,
    index_data: Vec<u32>,
    vertex_count: u32,
    index_count: u32,
    vertex_capacity: u32,
    index_capacity: u32,
    topology: Topology,
    max_resolution: u32,
    state: BufferState,
    generating: bool,
}

impl MeshBuffer {
    /// Allocates storage for every resolution up to `max_resolution`.
    pub fn new(max_resolution: u32) -> Result<Self, MeshError> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&max_resolution) {
            return Err(MeshError::UnsupportedResolution(max_resolution));
        }
        let vertex_capacity = vertex_count(max_resolution);
        let index_capacity = list_index_count(max_resolution);
        Ok(Self {
            vertex_data: vec![0.0; vertex_capacity as usize * FLOATS_PER_VERTEX],
            index_data: vec![0; index_capacity as usize],
            vertex_count: 0,
            index_count: 0,
            vertex_capacity,
            index_capacity,
            topology: Topology::default(),
            max_resolution,
            state: BufferState::Idle,
            generating: false,
        })
    }

    // ---------------------------------------------------------------- state

    #[must_use]
    pub fn max_resolution(&self) -> u32 {
        self.max_resolution
    }

    #[must_use]
    pub fn vertex_capacity(&self) -> u32 {
        self.vertex_capacity
    }

    #[must_use]
    pub fn index_capacity(&self) -> u32 {
        self.index_capacity
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.state == BufferState::Committed
    }

    /// True while a generator holds the buffer for filling.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    /// Claims the buffer for one generation pass: clears leftover content,
    /// sets the topology, and marks the buffer busy until
    /// [`MeshBuffer::end_generation`]. Callers check
    /// [`MeshBuffer::is_generating`] first; claiming a busy buffer is a bug.
    pub fn begin_generation(&mut self, topology: Topology) {
        debug_assert!(!self.generating, "buffer already claimed by a generator");
        self.clear();
        self.topology = topology;
        self.state = BufferState::Writing;
        self.generating = true;
    }

    /// Releases the generation claim. Leaves the content state untouched:
    /// a cancelled fill stays `Writing` (unrenderable) until cleared.
    pub fn end_generation(&mut self) {
        self.generating = false;
    }

    /// Empties the buffer for reuse. Counts reset and the normal channel is
    /// zeroed so the next accumulation starts from scratch; positions, uvs
    /// and indices are left stale since refills overwrite them.
    pub fn clear(&mut self) {
        debug_assert!(!self.generating, "clear while a generation is in flight");
        if self.state != BufferState::Idle {
            for vertex in 0..self.vertex_count as usize {
                let normal_at = vertex * FLOATS_PER_VERTEX + 3;
                self.vertex_data[normal_at..normal_at + 3].fill(0.0);
            }
        }
        self.vertex_count = 0;
        self.index_count = 0;
        self.state = BufferState::Idle;
    }

    // ---------------------------------------------------------------- write

    /// Appends a vertex with zeroed normal. Returns its index.
    pub fn push_vertex(&mut self, position: Vec3, uv: Vec2) -> Result<u32, MeshError> {
        if self.vertex_count == self.vertex_capacity {
            return Err(MeshError::VertexOverflow {
                capacity: self.vertex_capacity,
            });
        }
        let at = self.vertex_count as usize * FLOATS_PER_VERTEX;
        let slot = &mut self.vertex_data[at..at + FLOATS_PER_VERTEX];
        slot[0] = position.x;
        slot[1] = position.y;
        slot[2] = position.z;
        slot[3] = 0.0;
        slot[4] = 0.0;
        slot[5] = 0.0;
        slot[6] = uv.x;
        slot[7] = uv.y;
        let index = self.vertex_count;
        self.vertex_count += 1;
        self.state = BufferState::Writing;
        Ok(index)
    }

    pub fn push_index(&mut self, index: u32) -> Result<(), MeshError> {
        if self.index_count == self.index_capacity {
            return Err(MeshError::IndexOverflow {
                capacity: self.index_capacity,
            });
        }
        self.index_data[self.index_count as usize] = index;
        self.index_count += 1;
        self.state = BufferState::Writing;
        Ok(())
    }

    pub fn push_indices(&mut self, indices: &[u32]) -> Result<(), MeshError> {
        for &index in indices {
            self.push_index(index)?;
        }
        Ok(())
    }

    /// Appends the strip restart sentinel.
    pub fn push_restart(&mut self) -> Result<(), MeshError> {
        self.push_index(RESTART_INDEX)
    }

    // -------------------------------------------------------------- normals

    /// Position of vertex `index`. `index` must be below `vertex_count`.
    #[inline]
    #[must_use]
    pub fn position(&self, index: u32) -> Vec3 {
        debug_assert!(index < self.vertex_count);
        let at = index as usize * FLOATS_PER_VERTEX;
        Vec3::new(
            self.vertex_data[at],
            self.vertex_data[at + 1],
            self.vertex_data[at + 2],
        )
    }

    /// Normal of vertex `index`. `index` must be below `vertex_count`.
    #[inline]
    #[must_use]
    pub fn normal(&self, index: u32) -> Vec3 {
        debug_assert!(index < self.vertex_count);
        let at = index as usize * FLOATS_PER_VERTEX + 3;
        Vec3::new(
            self.vertex_data[at],
            self.vertex_data[at + 1],
            self.vertex_data[at + 2],
        )
    }

    #[inline]
    pub fn set_normal(&mut self, index: u32, normal: Vec3) {
        debug_assert!(index < self.vertex_count);
        let at = index as usize * FLOATS_PER_VERTEX + 3;
        self.vertex_data[at] = normal.x;
        self.vertex_data[at + 1] = normal.y;
        self.vertex_data[at + 2] = normal.z;
    }

    /// Adds `delta` onto the stored normal. The accumulation half of
    /// two-pass smooth normals; unnormalized triangle normals weight the
    /// average by triangle area.
    #[inline]
    pub fn add_normal(&mut self, index: u32, delta: Vec3) {
        debug_assert!(index < self.vertex_count);
        let at = index as usize * FLOATS_PER_VERTEX + 3;
        self.vertex_data[at] += delta.x;
        self.vertex_data[at + 1] += delta.y;
        self.vertex_data[at + 2] += delta.z;
    }

    // ---------------------------------------------------------------- read

    /// Interleaved floats of the vertices written so far.
    #[must_use]
    pub fn vertex_data(&self) -> &[f32] {
        &self.vertex_data[..self.vertex_count as usize * FLOATS_PER_VERTEX]
    }

    /// Written vertices viewed through the structured layout.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        bytemuck::cast_slice(self.vertex_data())
    }

    /// Indices written so far.
    #[must_use]
    pub fn index_data(&self) -> &[u32] {
        &self.index_data[..self.index_count as usize]
    }

    /// Written vertices as raw bytes, ready for GPU upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertex_data())
    }

    /// Written indices as raw bytes, ready for GPU upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.index_data())
    }

    /// Walks the written indices as triangles under the current topology.
    #[must_use]
    pub fn triangles(&self) -> TriangleIter<'_> {
        TriangleIter::new(self.index_data(), self.topology)
    }

    /// Resumes a triangle walk from a cursor taken earlier. The cursor is
    /// only meaningful while the index content is unchanged.
    #[must_use]
    pub fn triangles_from(&self, cursor: TriangleCursor) -> TriangleIter<'_> {
        TriangleIter::resume(self.index_data(), self.topology, cursor)
    }

    // --------------------------------------------------------------- commit

    /// Validates that the buffer holds exactly one complete planet mesh at
    /// `resolution` under `topology`, then marks the content renderable.
    pub fn commit(&mut self, resolution: u32, topology: Topology) -> Result<(), MeshError> {
        debug_assert_eq!(self.topology, topology, "commit under a different topology");
        let expected_vertices = vertex_count(resolution);
        if self.vertex_count != expected_vertices {
            return Err(MeshError::IncompleteGeneration {
                kind: "vertices",
                expected: expected_vertices,
                actual: self.vertex_count,
            });
        }
        let expected_indices = match topology {
            Topology::Triangles => list_index_count(resolution),
            Topology::TriangleStrip => tellus_cubesphere::strip_index_count(resolution),
        };
        if self.index_count != expected_indices {
            return Err(MeshError::IncompleteGeneration {
                kind: "indices",
                expected: expected_indices,
                actual: self.index_count,
            });
        }
        self.state = BufferState::Committed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellus_cubesphere::strip_index_count;

    const EPSILON: f32 = 1e-6;

    fn tiny_buffer() -> MeshBuffer {
        // Smallest legal buffer: 26 vertices, 144 indices.
        MeshBuffer::new(2).unwrap()
    }

    #[test]
    fn test_capacities_match_count_formulas() {
        let buffer = tiny_buffer();
        assert_eq!(buffer.vertex_capacity(), vertex_count(2));
        assert_eq!(buffer.index_capacity(), list_index_count(2));
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.index_count(), 0);
        assert!(!buffer.is_committed());
    }

    #[test]
    fn test_new_rejects_out_of_range_resolution() {
        assert_eq!(
            MeshBuffer::new(1).err(),
            Some(MeshError::UnsupportedResolution(1))
        );
        assert_eq!(
            MeshBuffer::new(MAX_RESOLUTION + 1).err(),
            Some(MeshError::UnsupportedResolution(MAX_RESOLUTION + 1))
        );
    }

    #[test]
    fn test_push_vertex_writes_interleaved_layout() {
        let mut buffer = tiny_buffer();
        let index = buffer
            .push_vertex(Vec3::new(1.0, 2.0, 3.0), Vec2::new(0.25, 0.75))
            .unwrap();
        assert_eq!(index, 0);
        assert_eq!(
            buffer.vertex_data(),
            &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.25, 0.75]
        );
        let vertex = buffer.vertices()[0];
        assert_eq!(vertex.position, [1.0, 2.0, 3.0]);
        assert_eq!(vertex.normal, [0.0, 0.0, 0.0]);
        assert_eq!(vertex.uv, [0.25, 0.75]);
    }

    #[test]
    fn test_vertex_overflow_is_reported() {
        let mut buffer = tiny_buffer();
        for _ in 0..buffer.vertex_capacity() {
            buffer.push_vertex(Vec3::ZERO, Vec2::ZERO).unwrap();
        }
        assert_eq!(
            buffer.push_vertex(Vec3::ZERO, Vec2::ZERO),
            Err(MeshError::VertexOverflow { capacity: 26 })
        );
    }

    #[test]
    fn test_index_overflow_is_reported() {
        let mut buffer = tiny_buffer();
        for _ in 0..buffer.index_capacity() {
            buffer.push_index(0).unwrap();
        }
        assert_eq!(
            buffer.push_index(0),
            Err(MeshError::IndexOverflow { capacity: 144 })
        );
    }

    #[test]
    fn test_normal_accumulation_round_trip() {
        let mut buffer = tiny_buffer();
        let index = buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
        buffer.add_normal(index, Vec3::new(0.0, 2.0, 0.0));
        buffer.add_normal(index, Vec3::new(0.0, 0.0, 1.0));
        assert!((buffer.normal(index) - Vec3::new(0.0, 2.0, 1.0)).length() < EPSILON);
        buffer.set_normal(index, Vec3::Y);
        assert_eq!(buffer.normal(index), Vec3::Y);
        assert_eq!(buffer.position(index), Vec3::X);
    }

    #[test]
    fn test_clear_zeroes_normals_and_resets_counts() {
        let mut buffer = tiny_buffer();
        let index = buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
        buffer.set_normal(index, Vec3::new(9.0, 9.0, 9.0));
        buffer.push_index(0).unwrap();

        buffer.clear();
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.index_count(), 0);

        // The refilled vertex must not see the stale normal.
        let index = buffer.push_vertex(Vec3::Y, Vec2::ZERO).unwrap();
        assert_eq!(buffer.normal(index), Vec3::ZERO);
    }

    #[test]
    fn test_commit_rejects_wrong_counts() {
        let mut buffer = tiny_buffer();
        buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
        let err = buffer.commit(2, Topology::Triangles).unwrap_err();
        assert_eq!(
            err,
            MeshError::IncompleteGeneration {
                kind: "vertices",
                expected: 26,
                actual: 1
            }
        );
        assert!(!buffer.is_committed());
    }

    #[test]
    fn test_commit_accepts_exact_counts_per_topology() {
        for (topology, index_total) in [
            (Topology::Triangles, list_index_count(2)),
            (Topology::TriangleStrip, strip_index_count(2)),
        ] {
            let mut buffer = tiny_buffer();
            buffer.set_topology(topology);
            for _ in 0..vertex_count(2) {
                buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
            }
            for _ in 0..index_total {
                buffer.push_index(0).unwrap();
            }
            buffer.commit(2, topology).unwrap();
            assert!(buffer.is_committed());
        }
    }

    #[test]
    fn test_generation_claim_cycle() {
        let mut buffer = tiny_buffer();
        assert!(!buffer.is_generating());
        buffer.begin_generation(Topology::TriangleStrip);
        assert!(buffer.is_generating());
        assert_eq!(buffer.topology(), Topology::TriangleStrip);
        buffer.end_generation();
        assert!(!buffer.is_generating());
    }

    #[test]
    fn test_begin_generation_clears_previous_content() {
        let mut buffer = tiny_buffer();
        buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
        buffer.push_index(0).unwrap();
        buffer.begin_generation(Topology::Triangles);
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.index_count(), 0);
        buffer.end_generation();
    }

    #[test]
    fn test_triangle_walk_over_buffer_contents() {
        let mut buffer = tiny_buffer();
        buffer.set_topology(Topology::TriangleStrip);
        buffer.push_indices(&[0, 1, 2, 3]).unwrap();
        buffer.push_restart().unwrap();
        buffer.push_indices(&[4, 5, 6]).unwrap();
        let triangles: Vec<_> = buffer.triangles().collect();
        assert_eq!(triangles, vec![(0, 1, 2), (2, 1, 3), (4, 5, 6)]);
    }

    #[test]
    fn test_byte_views_cover_exactly_the_written_region() {
        let mut buffer = tiny_buffer();
        assert!(buffer.vertex_bytes().is_empty());
        assert!(buffer.index_bytes().is_empty());
        buffer.push_vertex(Vec3::X, Vec2::ZERO).unwrap();
        buffer.push_index(7).unwrap();
        assert_eq!(buffer.vertex_bytes().len(), FLOATS_PER_VERTEX * 4);
        assert_eq!(buffer.index_bytes().len(), 4);
    }
}
