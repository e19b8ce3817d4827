//! Face-side attributes: one value per face, pulled from vertex data.

use crate::accessors::color::ColorGenerator;
use crate::arena::{LaneArena, Slot, Vec3Arena};
use crate::attributes::vertex::VertexAttribute;
use crate::attributes::AttributeKind;
use crate::mesh::topology::FaceVertices;

/// A typed collection of per-face values over one lane arena.
#[derive(Debug, Clone)]
pub struct FaceAttribute<const LANES: usize> {
    kind: AttributeKind,
    base: Slot<LANES>,
    count: usize,
}

impl<const LANES: usize> FaceAttribute<LANES> {
    /// Allocate storage for `face_count` values.
    pub fn new(kind: AttributeKind, arena: &mut LaneArena<LANES>, face_count: usize) -> Self {
        Self {
            kind,
            base: arena.allocate(face_count),
            count: face_count,
        }
    }

    /// The attribute's semantic kind.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Number of faces covered.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Slot of `face`'s value.
    #[inline]
    pub fn slot(&self, face: usize) -> Slot<LANES> {
        self.base.nth(face)
    }

    /// Derive each face's value as the componentwise average of its three
    /// corner values. Correct for positions and colors; face *normals* must
    /// use [`pull_face_normals`] instead, because vertex positions do not
    /// average into a valid surface normal.
    pub fn pull_from_vertices(
        &self,
        arena: &mut LaneArena<LANES>,
        vertices: &VertexAttribute<LANES>,
        face_vertices: &FaceVertices,
    ) {
        for face in 0..self.count {
            let corner_slots = [
                vertices.corner_slot(0, face, face_vertices),
                vertices.corner_slot(1, face, face_vertices),
                vertices.corner_slot(2, face, face_vertices),
            ];
            for lane in 0..LANES {
                let sum: f32 = corner_slots
                    .iter()
                    .map(|slot| arena.component(*slot, lane))
                    .sum();
                arena.set_component(self.slot(face), lane, sum / 3.0);
            }
        }
    }
}

impl FaceAttribute<3> {
    /// Fill with generated colors.
    pub fn generate(&self, arena: &mut LaneArena<3>, generator: &mut ColorGenerator) {
        generator.fill(arena, self.base, self.count);
    }
}

/// Compute every face normal as the normalized cross product of the two
/// edge vectors leaving corner 0 (v0→v1 × v0→v2).
///
/// The winding order of the face determines which side the normal faces.
pub fn pull_face_normals(
    arena: &mut Vec3Arena,
    normals: &FaceAttribute<3>,
    positions: &VertexAttribute<3>,
    face_vertices: &FaceVertices,
) {
    for face in 0..normals.count() {
        let p0 = positions.corner_slot(0, face, face_vertices);
        let p1 = positions.corner_slot(1, face, face_vertices);
        let p2 = positions.corner_slot(2, face, face_vertices);

        let edge_a = arena.allocate_temp();
        let edge_b = arena.allocate_temp();
        arena.sub(p1, p0, edge_a);
        arena.sub(p2, p0, edge_b);

        arena.cross(edge_a, edge_b, normals.slot(face));
        arena.normalize_assign(normals.slot(face));
    }
}
