//! The interleaved vertex format.

use bytemuck::{Pod, Zeroable};

/// Floats per interleaved vertex: 3 position, 3 normal, 2 uv.
pub const FLOATS_PER_VERTEX: usize = 8;

/// One mesh vertex as it sits in the buffer.
///
/// Layout is guaranteed: 32 bytes, position at offset 0, normal at 12,
/// uv at 24. Uploading the raw float array to a GPU relies on this.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(Vertex, [f32; FLOATS_PER_VERTEX]);
const _: () = assert!(std::mem::offset_of!(Vertex, position) == 0);
const _: () = assert!(std::mem::offset_of!(Vertex, normal) == 12);
const _: () = assert!(std::mem::offset_of!(Vertex, uv) == 24);
