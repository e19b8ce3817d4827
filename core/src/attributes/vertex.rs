//! Vertex-side attributes: shared or per-corner storage with load and pull.

use crate::accessors::color::ColorGenerator;
use crate::arena::{LaneArena, Slot};
use crate::attributes::face::FaceAttribute;
use crate::attributes::AttributeKind;
use crate::error::MeshError;
use crate::mesh::inputs::InputAttribute;
use crate::mesh::topology::{FaceVertices, VertexFaces};

/// Storage form of a vertex attribute, resolved once at mesh load.
#[derive(Debug, Clone)]
pub enum VertexStorage<const LANES: usize> {
    /// One slot per vertex, referenced by every adjacent face.
    Shared {
        /// First slot of the contiguous per-vertex range.
        base: Slot<LANES>,
        /// Number of vertices.
        count: usize,
    },
    /// One slot per face corner — values may differ per face even at a
    /// shared vertex (hard edges).
    PerCorner {
        /// First slot of each corner's contiguous per-face range.
        corners: [Slot<LANES>; 3],
        /// Number of faces.
        count: usize,
    },
}

/// A typed collection of per-vertex values over one lane arena.
#[derive(Debug, Clone)]
pub struct VertexAttribute<const LANES: usize> {
    kind: AttributeKind,
    storage: VertexStorage<LANES>,
}

impl<const LANES: usize> VertexAttribute<LANES> {
    /// Allocate shared storage: one slot per vertex.
    pub fn shared(kind: AttributeKind, arena: &mut LaneArena<LANES>, vertex_count: usize) -> Self {
        Self {
            kind,
            storage: VertexStorage::Shared {
                base: arena.allocate(vertex_count),
                count: vertex_count,
            },
        }
    }

    /// Allocate per-corner storage: three slots per face.
    pub fn per_corner(kind: AttributeKind, arena: &mut LaneArena<LANES>, face_count: usize) -> Self {
        Self {
            kind,
            storage: VertexStorage::PerCorner {
                corners: [
                    arena.allocate(face_count),
                    arena.allocate(face_count),
                    arena.allocate(face_count),
                ],
                count: face_count,
            },
        }
    }

    /// The attribute's semantic kind.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Whether values are stored per vertex rather than per corner.
    pub fn is_shared(&self) -> bool {
        matches!(self.storage, VertexStorage::Shared { .. })
    }

    /// The storage form.
    pub fn storage(&self) -> &VertexStorage<LANES> {
        &self.storage
    }

    /// Slot of a vertex in shared storage.
    ///
    /// # Panics
    ///
    /// Panics on per-corner storage, where a vertex has no single slot.
    pub fn vertex_slot(&self, vertex: usize) -> Slot<LANES> {
        match &self.storage {
            VertexStorage::Shared { base, .. } => base.nth(vertex),
            VertexStorage::PerCorner { .. } => {
                panic!("per-corner {} storage has no per-vertex slots", self.kind)
            }
        }
    }

    /// Slot holding the value of `corner` (0..3) of `face`, resolving
    /// through the face→vertex table for shared storage.
    pub fn corner_slot(
        &self,
        corner: usize,
        face: usize,
        face_vertices: &FaceVertices,
    ) -> Slot<LANES> {
        match &self.storage {
            VertexStorage::Shared { base, .. } => base.nth(face_vertices.vertex(corner, face)),
            VertexStorage::PerCorner { corners, .. } => corners[corner].nth(face),
        }
    }

    /// Copy raw input values into storage.
    ///
    /// Positions in shared storage copy straight through — their input
    /// defines mesh vertex order. Every other shared attribute scatters its
    /// values onto mesh vertex slots by matching face corners between its
    /// own index table and the mesh's. Per-corner storage gathers the input
    /// value of each corner's vertex.
    pub fn load(
        &self,
        arena: &mut LaneArena<LANES>,
        input: &InputAttribute,
        face_vertices: &FaceVertices,
    ) -> Result<(), MeshError> {
        match &self.storage {
            VertexStorage::Shared { base, count } => {
                if self.kind == AttributeKind::Position {
                    debug_assert_eq!(input.vertex_count(), *count);
                    for lane in 0..LANES {
                        let offset = base.index();
                        arena.lane_mut(lane)[offset..offset + count]
                            .copy_from_slice(&input.vertices()[lane]);
                    }
                } else {
                    self.check_input_faces(input, face_vertices)?;
                    for lane in 0..LANES {
                        for corner in 0..3 {
                            for face in 0..face_vertices.face_count() {
                                let value =
                                    input.vertices()[lane][input.faces()[corner][face] as usize];
                                let target = base.nth(face_vertices.vertex(corner, face));
                                arena.set_component(target, lane, value);
                            }
                        }
                    }
                }
            }
            VertexStorage::PerCorner { corners, count } => {
                self.check_input_faces(input, face_vertices)?;
                for lane in 0..LANES {
                    for corner in 0..3 {
                        for face in 0..*count {
                            let value =
                                input.vertices()[lane][input.faces()[corner][face] as usize];
                            arena.set_component(corners[corner].nth(face), lane, value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_input_faces(
        &self,
        input: &InputAttribute,
        face_vertices: &FaceVertices,
    ) -> Result<(), MeshError> {
        if input.face_count() != face_vertices.face_count() {
            return Err(MeshError::ComponentCountMismatch {
                attribute: self.kind,
                expected: face_vertices.face_count(),
                got: input.face_count(),
            });
        }
        let vertex_count = input.vertex_count();
        for corner in input.faces() {
            for &index in corner {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfRange {
                        attribute: self.kind,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Derive vertex values from a face attribute.
    ///
    /// Shared storage averages over each vertex's adjacent faces through
    /// the vertex→face table; per-corner storage copies the single owning
    /// face's value into all three corner slots of that face.
    pub fn pull_from_faces(
        &self,
        arena: &mut LaneArena<LANES>,
        faces: &FaceAttribute<LANES>,
        adjacency: &VertexFaces,
    ) {
        match &self.storage {
            VertexStorage::Shared { base, count } => {
                for vertex in 0..*count {
                    let adjacent = adjacency.faces_of(vertex);
                    if adjacent.is_empty() {
                        continue;
                    }
                    for lane in 0..LANES {
                        let mut accumulator = 0.0;
                        for &face in adjacent {
                            accumulator += arena.component(faces.slot(face as usize), lane);
                        }
                        arena.set_component(
                            base.nth(vertex),
                            lane,
                            accumulator / adjacent.len() as f32,
                        );
                    }
                }
            }
            VertexStorage::PerCorner { corners, count } => {
                for face in 0..*count {
                    for corner in corners {
                        arena.copy(faces.slot(face), corner.nth(face));
                    }
                }
            }
        }
    }
}

impl VertexAttribute<3> {
    /// Fill with generated colors.
    pub fn generate(&self, arena: &mut LaneArena<3>, generator: &mut ColorGenerator) {
        match &self.storage {
            VertexStorage::Shared { base, count } => generator.fill(arena, *base, *count),
            VertexStorage::PerCorner { corners, count } => {
                for corner in corners {
                    generator.fill(arena, *corner, *count);
                }
            }
        }
    }
}
