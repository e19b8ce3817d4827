//! Mesh topology tables: face corners and vertex adjacency.

use crate::attributes::AttributeKind;
use crate::error::MeshError;
use crate::mesh::inputs::InputAttribute;

/// The face→vertex index table: three parallel arrays, one per corner,
/// each `face_count` long. Corner-major layout keeps per-corner scatter
/// loops running down contiguous memory.
#[derive(Debug, Default, Clone)]
pub struct FaceVertices {
    corners: [Vec<u32>; 3],
}

impl FaceVertices {
    /// Build the table from a triangulated position input, validating every
    /// index against the input's vertex count.
    pub fn from_input(positions: &InputAttribute) -> Result<Self, MeshError> {
        debug_assert_eq!(
            positions.faces().len(),
            3,
            "face tables must be triangulated before building topology"
        );
        let vertex_count = positions.vertex_count();
        let mut corners: [Vec<u32>; 3] = Default::default();
        for (corner, table) in positions.faces().iter().enumerate() {
            for &index in table {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        attribute: AttributeKind::Position,
                        index,
                        vertex_count,
                    });
                }
            }
            corners[corner] = table.clone();
        }
        Ok(Self { corners })
    }

    /// Number of faces in the table.
    pub fn face_count(&self) -> usize {
        self.corners[0].len()
    }

    /// Vertex index of `corner` (0..3) of `face`.
    #[inline]
    pub fn vertex(&self, corner: usize, face: usize) -> usize {
        self.corners[corner][face] as usize
    }

    /// The full index array of one corner.
    pub fn corner(&self, corner: usize) -> &[u32] {
        &self.corners[corner]
    }
}

/// The vertex→face adjacency table in compressed form: for each vertex, the
/// ids of every face that touches it. Backed by one flat buffer plus an
/// offset array, matching the variable-length per-vertex lists without
/// per-vertex allocation.
#[derive(Debug, Default, Clone)]
pub struct VertexFaces {
    offsets: Vec<u32>,
    faces: Vec<u32>,
}

impl VertexFaces {
    /// Build the adjacency from a face→vertex table.
    pub fn build(face_vertices: &FaceVertices, vertex_count: usize) -> Self {
        let mut counts = vec![0u32; vertex_count];
        for corner in 0..3 {
            for &vertex in face_vertices.corner(corner) {
                counts[vertex as usize] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut total = 0u32;
        offsets.push(0);
        for &count in &counts {
            total += count;
            offsets.push(total);
        }

        let mut cursors: Vec<u32> = offsets[..vertex_count].to_vec();
        let mut faces = vec![0u32; total as usize];
        for corner in 0..3 {
            for (face, &vertex) in face_vertices.corner(corner).iter().enumerate() {
                let cursor = &mut cursors[vertex as usize];
                faces[*cursor as usize] = face as u32;
                *cursor += 1;
            }
        }

        Self { offsets, faces }
    }

    /// Number of vertices covered by the table.
    pub fn vertex_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Face ids adjacent to `vertex`.
    #[inline]
    pub fn faces_of(&self, vertex: usize) -> &[u32] {
        let start = self.offsets[vertex] as usize;
        let end = self.offsets[vertex + 1] as usize;
        &self.faces[start..end]
    }

    /// Total number of (vertex, face) incidences.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// True when no incidences exist.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}
