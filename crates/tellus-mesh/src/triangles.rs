//! Index topologies and the canonical triangle walk.

/// Primitive-restart sentinel separating strips in the index buffer.
/// Matches the value GPU APIs use for 32-bit indices.
pub const RESTART_INDEX: u32 = u32::MAX;

/// How the index buffer encodes triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Three indices per triangle.
    #[default]
    Triangles,
    /// Strips separated by [`RESTART_INDEX`]; each index after the first
    /// two of a strip completes one triangle.
    TriangleStrip,
}

/// Resumable position inside a triangle walk.
///
/// Snapshot via [`TriangleIter::cursor`], resume later with
/// [`crate::MeshBuffer::triangles_from`]. Only valid while the index data
/// it was taken from is unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriangleCursor {
    /// Next index-buffer element to consume.
    position: usize,
    /// Elements consumed since the current strip began.
    strip_len: usize,
}

/// Iterator yielding `(a, b, c)` vertex-index triples in draw order,
/// winding already corrected for strip parity.
#[derive(Clone, Debug)]
pub struct TriangleIter<'a> {
    indices: &'a [u32],
    topology: Topology,
    cursor: TriangleCursor,
}

impl<'a> TriangleIter<'a> {
    pub(crate) fn new(indices: &'a [u32], topology: Topology) -> Self {
        Self::resume(indices, topology, TriangleCursor::default())
    }

    pub(crate) fn resume(indices: &'a [u32], topology: Topology, cursor: TriangleCursor) -> Self {
        debug_assert!(cursor.position <= indices.len());
        Self {
            indices,
            topology,
            cursor,
        }
    }

    /// Current position, for resuming the walk in a later slice.
    #[must_use]
    pub fn cursor(&self) -> TriangleCursor {
        self.cursor
    }
}

impl Iterator for TriangleIter<'_> {
    type Item = (u32, u32, u32);

    fn next(&mut self) -> Option<(u32, u32, u32)> {
        match self.topology {
            Topology::Triangles => {
                let at = self.cursor.position;
                if at + 3 > self.indices.len() {
                    return None;
                }
                self.cursor.position = at + 3;
                Some((self.indices[at], self.indices[at + 1], self.indices[at + 2]))
            }
            Topology::TriangleStrip => {
                while self.cursor.position < self.indices.len() {
                    let at = self.cursor.position;
                    let index = self.indices[at];
                    self.cursor.position = at + 1;
                    if index == RESTART_INDEX {
                        self.cursor.strip_len = 0;
                        continue;
                    }
                    self.cursor.strip_len += 1;
                    if self.cursor.strip_len < 3 {
                        continue;
                    }
                    let older = self.indices[at - 2];
                    let prior = self.indices[at - 1];
                    // Odd in-strip triangles swap the leading pair so every
                    // triangle keeps the same facing.
                    let triangle = if self.cursor.strip_len % 2 == 1 {
                        (older, prior, index)
                    } else {
                        (prior, older, index)
                    };
                    return Some(triangle);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(indices: &[u32], topology: Topology) -> Vec<(u32, u32, u32)> {
        TriangleIter::new(indices, topology).collect()
    }

    #[test]
    fn test_list_walk_yields_consecutive_triples() {
        let indices = [0, 1, 2, 2, 1, 3];
        assert_eq!(
            collect(&indices, Topology::Triangles),
            vec![(0, 1, 2), (2, 1, 3)]
        );
    }

    #[test]
    fn test_list_walk_ignores_trailing_partial_triple() {
        let indices = [0, 1, 2, 9, 9];
        assert_eq!(collect(&indices, Topology::Triangles), vec![(0, 1, 2)]);
    }

    #[test]
    fn test_strip_walk_alternates_winding() {
        // Strip 0-1-2-3: the second triangle leads with its newer edge,
        // matching fixed-function strip decoding.
        let indices = [0, 1, 2, 3];
        assert_eq!(
            collect(&indices, Topology::TriangleStrip),
            vec![(0, 1, 2), (2, 1, 3)]
        );
    }

    #[test]
    fn test_strip_restart_begins_fresh_strip() {
        let indices = [0, 1, 2, RESTART_INDEX, 10, 11, 12, 13];
        assert_eq!(
            collect(&indices, Topology::TriangleStrip),
            vec![(0, 1, 2), (10, 11, 12), (12, 11, 13)]
        );
    }

    #[test]
    fn test_strip_shorter_than_three_yields_nothing() {
        assert_eq!(collect(&[5, 6], Topology::TriangleStrip), vec![]);
        assert_eq!(
            collect(
                &[5, 6, RESTART_INDEX, 7, 8, RESTART_INDEX],
                Topology::TriangleStrip
            ),
            vec![]
        );
    }

    #[test]
    fn test_consecutive_restarts_are_tolerated() {
        let indices = [RESTART_INDEX, RESTART_INDEX, 1, 2, 3];
        assert_eq!(collect(&indices, Topology::TriangleStrip), vec![(1, 2, 3)]);
    }

    #[test]
    fn test_cursor_resume_continues_exactly() {
        let indices = [0, 1, 2, 3, RESTART_INDEX, 4, 5, 6, 7];
        for split_after in 0..4 {
            let mut first = TriangleIter::new(&indices, Topology::TriangleStrip);
            let mut head: Vec<_> = Vec::new();
            for _ in 0..split_after {
                if let Some(triangle) = first.next() {
                    head.push(triangle);
                }
            }
            let tail: Vec<_> =
                TriangleIter::resume(&indices, Topology::TriangleStrip, first.cursor()).collect();
            let mut rejoined = head;
            rejoined.extend(tail);
            assert_eq!(
                rejoined,
                collect(&indices, Topology::TriangleStrip),
                "split after {split_after} triangles diverged"
            );
        }
    }

    #[test]
    fn test_cursor_resume_mid_strip_keeps_parity() {
        let indices = [0, 1, 2, 3, 4];
        let mut iter = TriangleIter::new(&indices, Topology::TriangleStrip);
        assert_eq!(iter.next(), Some((0, 1, 2)));
        let resumed: Vec<_> =
            TriangleIter::resume(&indices, Topology::TriangleStrip, iter.cursor()).collect();
        assert_eq!(resumed, vec![(2, 1, 3), (2, 3, 4)]);
    }
}
