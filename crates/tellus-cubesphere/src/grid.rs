//! Canonical vertex addressing across face seams.
//!
//! Storage puts the four belt faces first, each owning `resolution` rows of
//! `resolution + 1` columns (the last row of a belt face is the first row of
//! the next one, so it is not stored). The caps own only their interior
//! vertices; every cap boundary vertex lives on some belt face's `col 0` or
//! `col resolution` column. [`VertexGrid::index`] folds all of those aliases
//! onto the owning address, which is what makes generated meshes seam-free.

use thiserror::Error;

use crate::cube_face::CubeFace;

/// Smallest grid that still gives the caps an interior vertex.
pub const MIN_RESOLUTION: u32 = 2;
/// Upper bound keeping index math comfortably inside `u32`.
pub const MAX_RESOLUTION: u32 = 4096;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("resolution {resolution} outside supported range {MIN_RESOLUTION}..={MAX_RESOLUTION}")]
    UnsupportedResolution { resolution: u32 },
    #[error("face index {face} out of range (must be < 6)")]
    FaceOutOfRange { face: u32 },
    #[error("grid coordinate ({row}, {col}) out of range for resolution {resolution}")]
    CoordOutOfRange { row: u32, col: u32, resolution: u32 },
}

/// Unique vertices of a cube-sphere at a given resolution.
///
/// Four belt faces of `r * (r + 1)` vertices plus two cap interiors of
/// `(r - 1)^2`. Equals `6r^2 + 2`, the subdivided cube with every seam
/// vertex counted once.
#[must_use]
pub fn vertex_count(resolution: u32) -> u32 {
    debug_assert!(resolution >= 1);
    4 * resolution * (resolution + 1) + 2 * (resolution - 1) * (resolution - 1)
}

/// Triangles in the full planet mesh: two per quad, `6r^2` quads.
#[must_use]
pub fn triangle_count(resolution: u32) -> u32 {
    12 * resolution * resolution
}

/// Index count for list topology: three indices per triangle.
#[must_use]
pub fn list_index_count(resolution: u32) -> u32 {
    3 * triangle_count(resolution)
}

/// Index count for strip topology: per face, `r` row bands of
/// `2(r + 1)` indices, each closed by one restart sentinel.
#[must_use]
pub fn strip_index_count(resolution: u32) -> u32 {
    6 * resolution * (2 * (resolution + 1) + 1)
}

/// Seam-aware mapping from `(face, row, col)` to canonical vertex index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexGrid {
    resolution: u32,
}

impl VertexGrid {
    pub fn new(resolution: u32) -> Result<Self, GridError> {
        if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&resolution) {
            return Err(GridError::UnsupportedResolution { resolution });
        }
        Ok(Self { resolution })
    }

    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    #[must_use]
    pub fn vertex_count(&self) -> u32 {
        vertex_count(self.resolution)
    }

    /// Canonical storage index for a face-grid coordinate.
    ///
    /// Any of the up-to-three addresses naming the same physical vertex
    /// (seam edges, cube corners) resolves to the same index. Indices are
    /// contiguous in `0..vertex_count()`.
    pub fn index(&self, face: CubeFace, row: u32, col: u32) -> Result<u32, GridError> {
        let r = self.resolution;
        if row > r || col > r {
            return Err(GridError::CoordOutOfRange {
                row,
                col,
                resolution: r,
            });
        }
        let (face, row, col) = self.canonical(face, row, col);
        debug_assert!(face.is_belt() || (row >= 1 && row < r && col >= 1 && col < r));
        let index = if face.is_belt() {
            face.index() * r * (r + 1) + row * (r + 1) + col
        } else {
            let cap_base = 4 * r * (r + 1);
            let interior = (r - 1) * (r - 1);
            let cap_offset = if face == CubeFace::NegY { interior } else { 0 };
            cap_base + cap_offset + (row - 1) * (r - 1) + (col - 1)
        };
        Ok(index)
    }

    /// Like [`VertexGrid::index`] but validates a raw face number.
    pub fn index_at(&self, face: u32, row: u32, col: u32) -> Result<u32, GridError> {
        let face = CubeFace::from_index(face).ok_or(GridError::FaceOutOfRange { face })?;
        self.index(face, row, col)
    }

    /// Folds seam aliases onto the owning address.
    fn canonical(&self, face: CubeFace, row: u32, col: u32) -> (CubeFace, u32, u32) {
        let r = self.resolution;
        // Cap boundary vertices belong to the belt column they touch.
        let (face, row, col) = match face {
            CubeFace::PosY => {
                if row == 0 {
                    (CubeFace::NegX, r - col, r)
                } else if row == r {
                    (CubeFace::PosX, col, r)
                } else if col == 0 {
                    (CubeFace::NegZ, row, r)
                } else if col == r {
                    (CubeFace::PosZ, r - row, r)
                } else {
                    (face, row, col)
                }
            }
            CubeFace::NegY => {
                if row == 0 {
                    (CubeFace::NegX, col, 0)
                } else if row == r {
                    (CubeFace::PosX, r - col, 0)
                } else if col == 0 {
                    (CubeFace::PosZ, r - row, 0)
                } else if col == r {
                    (CubeFace::NegZ, row, 0)
                } else {
                    (face, row, col)
                }
            }
            _ => (face, row, col),
        };
        // Belt wrap: the last row of each belt face is row 0 of the next.
        if face.is_belt() && row == r {
            (face.next_belt(), 0, col)
        } else {
            (face, row, col)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube_face::cube_point;
    use std::collections::HashMap;

    fn grid(resolution: u32) -> VertexGrid {
        VertexGrid::new(resolution).unwrap()
    }

    /// Scales a cube point so every coordinate becomes an exact integer,
    /// giving a hashable identity for a physical vertex.
    fn quantize(face: CubeFace, row: u32, col: u32, resolution: u32) -> (i32, i32, i32) {
        let p = cube_point(face, row, col, resolution) * resolution as f32;
        (
            p.x.round() as i32,
            p.y.round() as i32,
            p.z.round() as i32,
        )
    }

    #[test]
    fn test_vertex_count_formulas_agree() {
        for r in MIN_RESOLUTION..=16 {
            assert_eq!(vertex_count(r), 6 * r * r + 2);
        }
        assert_eq!(vertex_count(2), 26);
    }

    #[test]
    fn test_index_count_formulas() {
        assert_eq!(triangle_count(2), 48);
        assert_eq!(list_index_count(4), 576);
        assert_eq!(strip_index_count(2), 84);
        for r in MIN_RESOLUTION..=8 {
            assert_eq!(list_index_count(r), triangle_count(r) * 3);
            // List capacity covers strip topology at every resolution.
            assert!(list_index_count(r) >= strip_index_count(r));
        }
    }

    #[test]
    fn test_indices_are_contiguous_and_complete() {
        for r in MIN_RESOLUTION..=5 {
            let grid = grid(r);
            let mut seen = vec![false; grid.vertex_count() as usize];
            for face in CubeFace::ALL {
                for row in 0..=r {
                    for col in 0..=r {
                        let index = grid.index(face, row, col).unwrap();
                        assert!(index < grid.vertex_count());
                        seen[index as usize] = true;
                    }
                }
            }
            assert!(
                seen.iter().all(|&covered| covered),
                "resolution {r}: some canonical index never produced"
            );
        }
    }

    #[test]
    fn test_same_physical_vertex_same_index() {
        // Every pair of addresses that lands on the same cube point must
        // resolve to the same index, and distinct points must not collide.
        for r in MIN_RESOLUTION..=5 {
            let grid = grid(r);
            let mut by_position: HashMap<(i32, i32, i32), u32> = HashMap::new();
            let mut by_index: HashMap<u32, (i32, i32, i32)> = HashMap::new();
            for face in CubeFace::ALL {
                for row in 0..=r {
                    for col in 0..=r {
                        let index = grid.index(face, row, col).unwrap();
                        let position = quantize(face, row, col, r);
                        if let Some(&prior) = by_position.get(&position) {
                            assert_eq!(
                                prior, index,
                                "resolution {r}: {face:?}/{row}/{col} duplicates a vertex"
                            );
                        } else {
                            by_position.insert(position, index);
                        }
                        if let Some(&prior) = by_index.get(&index) {
                            assert_eq!(
                                prior, position,
                                "resolution {r}: index {index} names two positions"
                            );
                        } else {
                            by_index.insert(index, position);
                        }
                    }
                }
            }
            assert_eq!(by_position.len(), grid.vertex_count() as usize);
        }
    }

    #[test]
    fn test_belt_storage_is_row_major() {
        let grid = grid(4);
        assert_eq!(grid.index(CubeFace::PosX, 0, 0).unwrap(), 0);
        assert_eq!(grid.index(CubeFace::PosX, 0, 1).unwrap(), 1);
        assert_eq!(grid.index(CubeFace::PosX, 1, 0).unwrap(), 5);
        // First vertex of the next belt face continues the sequence.
        assert_eq!(grid.index(CubeFace::PosZ, 0, 0).unwrap(), 20);
    }

    #[test]
    fn test_belt_wrap_aliases() {
        let r = 4;
        let grid = grid(r);
        for face in CubeFace::BELT {
            for col in 0..=r {
                assert_eq!(
                    grid.index(face, r, col).unwrap(),
                    grid.index(face.next_belt(), 0, col).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_cap_boundary_aliases_belt_columns() {
        let r = 4;
        let grid = grid(r);
        for col in 0..=r {
            assert_eq!(
                grid.index(CubeFace::PosY, 0, col).unwrap(),
                grid.index(CubeFace::NegX, r - col, r).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::PosY, r, col).unwrap(),
                grid.index(CubeFace::PosX, col, r).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::NegY, 0, col).unwrap(),
                grid.index(CubeFace::NegX, col, 0).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::NegY, r, col).unwrap(),
                grid.index(CubeFace::PosX, r - col, 0).unwrap()
            );
        }
        for row in 0..=r {
            assert_eq!(
                grid.index(CubeFace::PosY, row, 0).unwrap(),
                grid.index(CubeFace::NegZ, row, r).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::PosY, row, r).unwrap(),
                grid.index(CubeFace::PosZ, r - row, r).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::NegY, row, 0).unwrap(),
                grid.index(CubeFace::PosZ, r - row, 0).unwrap()
            );
            assert_eq!(
                grid.index(CubeFace::NegY, row, r).unwrap(),
                grid.index(CubeFace::NegZ, row, 0).unwrap()
            );
        }
    }

    #[test]
    fn test_cube_corners_resolve_consistently() {
        // Each cube corner is addressable from three faces; all three
        // addresses must map to one index.
        let r = 3;
        let grid = grid(r);
        let corner_addresses = [
            (CubeFace::PosY, 0, 0),
            (CubeFace::NegX, r, r),
            (CubeFace::NegZ, 0, r),
        ];
        let indices: Vec<u32> = corner_addresses
            .iter()
            .map(|&(face, row, col)| grid.index(face, row, col).unwrap())
            .collect();
        assert_eq!(indices[0], indices[1]);
        assert_eq!(indices[1], indices[2]);
    }

    #[test]
    fn test_out_of_range_inputs_are_rejected() {
        let grid = grid(4);
        assert_eq!(
            grid.index(CubeFace::PosX, 5, 0),
            Err(GridError::CoordOutOfRange {
                row: 5,
                col: 0,
                resolution: 4
            })
        );
        assert_eq!(
            grid.index(CubeFace::NegY, 0, 9),
            Err(GridError::CoordOutOfRange {
                row: 0,
                col: 9,
                resolution: 4
            })
        );
        assert_eq!(
            grid.index_at(6, 0, 0),
            Err(GridError::FaceOutOfRange { face: 6 })
        );
        assert!(grid.index_at(5, 0, 0).is_ok());
    }

    #[test]
    fn test_resolution_bounds() {
        assert!(VertexGrid::new(MIN_RESOLUTION).is_ok());
        assert!(VertexGrid::new(MAX_RESOLUTION).is_ok());
        assert_eq!(
            VertexGrid::new(1),
            Err(GridError::UnsupportedResolution { resolution: 1 })
        );
        assert_eq!(
            VertexGrid::new(MAX_RESOLUTION + 1),
            Err(GridError::UnsupportedResolution {
                resolution: MAX_RESOLUTION + 1
            })
        );
    }

    #[test]
    fn test_max_resolution_counts_stay_in_u32() {
        // The largest grid must not overflow any of the count formulas.
        let r = MAX_RESOLUTION;
        assert_eq!(vertex_count(r), 6 * r * r + 2);
        assert!(list_index_count(r) > strip_index_count(r));
    }
}
