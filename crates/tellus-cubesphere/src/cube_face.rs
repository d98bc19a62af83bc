//! The six cube faces and their in-face basis vectors.

use glam::Vec3;

/// One face of the planet cube.
///
/// The discriminants are the face's storage order: the four belt faces ring
/// the Y axis so that face `(f + 1) % 4` lies in the +row direction of face
/// `f`, followed by the two polar caps. Several seam rules lean on this
/// ordering, so it is part of the contract, not an implementation detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CubeFace {
    PosX = 0,
    PosZ = 1,
    NegX = 2,
    NegZ = 3,
    PosY = 4,
    NegY = 5,
}

impl CubeFace {
    /// All faces in storage order: belt ring first, then the caps.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::PosZ,
        CubeFace::NegX,
        CubeFace::NegZ,
        CubeFace::PosY,
        CubeFace::NegY,
    ];

    /// The four side faces ringing the Y axis, in +row order.
    pub const BELT: [CubeFace; 4] = [
        CubeFace::PosX,
        CubeFace::PosZ,
        CubeFace::NegX,
        CubeFace::NegZ,
    ];

    #[must_use]
    pub fn index(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn from_index(index: u32) -> Option<CubeFace> {
        CubeFace::ALL.get(index as usize).copied()
    }

    #[must_use]
    pub fn is_belt(self) -> bool {
        (self as u32) < 4
    }

    #[must_use]
    pub fn is_cap(self) -> bool {
        !self.is_belt()
    }

    /// The belt face one step in the +row direction. Belt faces only.
    #[must_use]
    pub fn next_belt(self) -> CubeFace {
        debug_assert!(self.is_belt(), "next_belt on cap face {self:?}");
        CubeFace::BELT[(self as usize + 1) % 4]
    }

    /// Outward unit normal of the face plane.
    #[must_use]
    pub fn normal(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::X,
            CubeFace::PosZ => Vec3::Z,
            CubeFace::NegX => Vec3::NEG_X,
            CubeFace::NegZ => Vec3::NEG_Z,
            CubeFace::PosY => Vec3::Y,
            CubeFace::NegY => Vec3::NEG_Y,
        }
    }

    /// Unit direction of increasing `row` within the face plane.
    ///
    /// For a belt face this is the normal of the next belt face, which is
    /// what makes the belt seams line up row-to-row.
    #[must_use]
    pub fn row_axis(self) -> Vec3 {
        match self {
            CubeFace::PosX => Vec3::Z,
            CubeFace::PosZ => Vec3::NEG_X,
            CubeFace::NegX => Vec3::NEG_Z,
            CubeFace::NegZ => Vec3::X,
            CubeFace::PosY => Vec3::X,
            CubeFace::NegY => Vec3::X,
        }
    }

    /// Unit direction of increasing `col` within the face plane.
    /// `row_axis x col_axis == -normal` on every face.
    #[must_use]
    pub fn col_axis(self) -> Vec3 {
        match self {
            CubeFace::PosX | CubeFace::PosZ | CubeFace::NegX | CubeFace::NegZ => Vec3::Y,
            CubeFace::PosY => Vec3::Z,
            CubeFace::NegY => Vec3::NEG_Z,
        }
    }
}

/// Maps a face-grid coordinate to its point on the surface of the unit cube
/// (max-norm 1). `row` and `col` run `0..=resolution`.
#[must_use]
pub fn cube_point(face: CubeFace, row: u32, col: u32, resolution: u32) -> Vec3 {
    debug_assert!(resolution > 0);
    debug_assert!(row <= resolution && col <= resolution);
    let s = 2.0 * row as f32 / resolution as f32 - 1.0;
    let t = 2.0 * col as f32 / resolution as f32 - 1.0;
    face.normal() + face.row_axis() * s + face.col_axis() * t
}
