//! Raw input geometry: validated per-attribute component and index arrays.
//!
//! Inputs arrive as structure-of-arrays: one component array per dimension
//! of the attribute, and one index array per vertex-of-face slot. Every
//! attribute can carry its own face table — a hard-edged cube, for example,
//! indexes 8 position vertices but 24 normal vertices.
//!
//! Quads are triangulated at [`MeshInputs::init`] time, before any
//! attribute storage is built: each quad `[A, B, C, D]` splits along the
//! A–C diagonal into `[A, B, C]` and `[A, C, D]`, doubling the face count
//! and preserving winding order.

use bitflags::bitflags;

use crate::attributes::AttributeKind;
use crate::error::MeshError;

bitflags! {
    /// Which attributes are present in a mesh input or configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: u8 {
        /// Vertex or face positions.
        const POSITION = 0b0001;
        /// Surface normals.
        const NORMAL = 0b0010;
        /// RGB colors.
        const COLOR = 0b0100;
        /// Texture coordinates.
        const UV = 0b1000;
    }
}

/// Face topology of the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceType {
    /// 3 vertices per face.
    Triangle,
    /// 4 vertices per face; triangulated on init.
    Quad,
}

impl FaceType {
    /// Vertices per face.
    pub fn corners(self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Quad => 4,
        }
    }

    /// Classify a per-face vertex count.
    pub fn from_corners(corners: usize) -> Result<Self, MeshError> {
        match corners {
            3 => Ok(Self::Triangle),
            4 => Ok(Self::Quad),
            other => Err(MeshError::InvalidFaceType(other)),
        }
    }
}

/// One attribute's raw input: component arrays plus a face index table.
#[derive(Debug, Clone)]
pub struct InputAttribute {
    kind: AttributeKind,
    face_type: FaceType,
    /// `dim` component arrays, all the same length (one entry per vertex).
    vertices: Vec<Vec<f32>>,
    /// `face_type.corners()` index arrays, all the same length (one entry
    /// per face).
    faces: Vec<Vec<u32>>,
}

impl InputAttribute {
    /// Create an empty input for `kind` with the given face topology.
    /// uv inputs are 2-dimensional, everything else 3-dimensional.
    pub fn new(kind: AttributeKind, face_type: FaceType) -> Self {
        let dim = match kind {
            AttributeKind::Uv => 2,
            _ => 3,
        };
        Self {
            kind,
            face_type,
            vertices: vec![Vec::new(); dim],
            faces: vec![Vec::new(); face_type.corners()],
        }
    }

    /// The attribute's component dimension (2 for uv, 3 otherwise).
    pub fn dim(&self) -> usize {
        self.vertices.len()
    }

    /// The semantic kind of this input.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Current face topology (triangle after triangulation).
    pub fn face_type(&self) -> FaceType {
        self.face_type
    }

    /// Number of vertices pushed so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices[0].len()
    }

    /// Number of faces pushed so far.
    pub fn face_count(&self) -> usize {
        self.faces[0].len()
    }

    /// Component arrays, one per dimension.
    pub fn vertices(&self) -> &[Vec<f32>] {
        &self.vertices
    }

    /// Index arrays, one per corner.
    pub fn faces(&self) -> &[Vec<u32>] {
        &self.faces
    }

    /// Append one vertex row.
    ///
    /// Rejects rows of the wrong arity and non-finite component values;
    /// nothing is appended on error.
    pub fn push_vertex(&mut self, components: &[f32]) -> Result<(), MeshError> {
        if components.len() != self.dim() {
            return Err(MeshError::ComponentCountMismatch {
                attribute: self.kind,
                expected: self.dim(),
                got: components.len(),
            });
        }
        if components.iter().any(|c| !c.is_finite()) {
            return Err(MeshError::NonFiniteValue {
                attribute: self.kind,
                vertex: self.vertex_count(),
            });
        }
        for (component, value) in self.vertices.iter_mut().zip(components) {
            component.push(*value);
        }
        Ok(())
    }

    /// Append one face row (vertex indices, one per corner).
    ///
    /// Index range validation happens at mesh load, once the final vertex
    /// count is known.
    pub fn push_face(&mut self, indices: &[u32]) -> Result<(), MeshError> {
        if indices.len() != self.face_type.corners() {
            return Err(MeshError::ComponentCountMismatch {
                attribute: self.kind,
                expected: self.face_type.corners(),
                got: indices.len(),
            });
        }
        for (corner, index) in self.faces.iter_mut().zip(indices) {
            corner.push(*index);
        }
        Ok(())
    }

    /// Split every quad into two triangles along the 0–2 diagonal.
    ///
    /// The second triangle block `[A, C, D]` is appended after the first
    /// `[A, B, C]` block, doubling the face count. Winding order is
    /// preserved: both triangles run in the source quad's direction.
    /// No-op for triangle inputs.
    pub fn triangulate(&mut self) {
        if self.face_type != FaceType::Quad {
            return;
        }
        let quad_count = self.face_count();
        let fourth = self.faces.pop().expect("quad inputs have four corner arrays");

        for corner in &mut self.faces {
            corner.reserve(quad_count);
        }
        for quad in 0..quad_count {
            let a = self.faces[0][quad];
            let c = self.faces[2][quad];
            let d = fourth[quad];
            self.faces[0].push(a);
            self.faces[1].push(c);
            self.faces[2].push(d);
        }

        self.face_type = FaceType::Triangle;
    }
}

/// The complete raw input set for one mesh.
///
/// Positions are required; normals, colors and uvs are optional and flagged
/// in `included`.
#[derive(Debug, Clone)]
pub struct MeshInputs {
    included: AttributeFlags,
    face_type: FaceType,
    /// Vertex positions (required).
    pub position: InputAttribute,
    /// Vertex normals (optional).
    pub normal: InputAttribute,
    /// Vertex colors (optional).
    pub color: InputAttribute,
    /// Texture coordinates (optional).
    pub uv: InputAttribute,
}

impl MeshInputs {
    /// Create an empty input set for the given topology and attribute set.
    pub fn new(face_type: FaceType, included: AttributeFlags) -> Self {
        Self {
            included: included | AttributeFlags::POSITION,
            face_type,
            position: InputAttribute::new(AttributeKind::Position, face_type),
            normal: InputAttribute::new(AttributeKind::Normal, face_type),
            color: InputAttribute::new(AttributeKind::Color, face_type),
            uv: InputAttribute::new(AttributeKind::Uv, face_type),
        }
    }

    /// Attributes present in this input set.
    pub fn included(&self) -> AttributeFlags {
        self.included
    }

    /// Current face topology (triangle after [`MeshInputs::init`]).
    pub fn face_type(&self) -> FaceType {
        self.face_type
    }

    /// Finalize the inputs for loading: triangulate quads across every
    /// included attribute and validate that positions exist.
    pub fn init(&mut self) -> Result<(), MeshError> {
        if self.position.vertex_count() == 0 {
            return Err(MeshError::MissingPositions);
        }

        if self.face_type == FaceType::Quad {
            self.position.triangulate();
            if self.included.contains(AttributeFlags::NORMAL) {
                self.normal.triangulate();
            }
            if self.included.contains(AttributeFlags::COLOR) {
                self.color.triangulate();
            }
            if self.included.contains(AttributeFlags::UV) {
                self.uv.triangulate();
            }
            self.face_type = FaceType::Triangle;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_vertex_validates_arity() {
        let mut input = InputAttribute::new(AttributeKind::Position, FaceType::Triangle);
        let err = input.push_vertex(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::ComponentCountMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));
        assert_eq!(input.vertex_count(), 0);
    }

    #[test]
    fn test_push_vertex_rejects_non_finite() {
        let mut input = InputAttribute::new(AttributeKind::Position, FaceType::Triangle);
        let err = input.push_vertex(&[0.0, f32::NAN, 0.0]).unwrap_err();
        assert!(matches!(err, MeshError::NonFiniteValue { vertex: 0, .. }));

        let err = input.push_vertex(&[f32::INFINITY, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, MeshError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_uv_inputs_are_two_dimensional() {
        let mut input = InputAttribute::new(AttributeKind::Uv, FaceType::Triangle);
        assert_eq!(input.dim(), 2);
        input.push_vertex(&[0.5, 0.5]).unwrap();
        assert_eq!(input.vertex_count(), 1);
    }

    #[test]
    fn test_push_face_validates_corner_count() {
        let mut input = InputAttribute::new(AttributeKind::Position, FaceType::Quad);
        assert!(input.push_face(&[0, 1, 2, 3]).is_ok());
        let err = input.push_face(&[0, 1, 2]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::ComponentCountMismatch {
                expected: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_face_type_classification() {
        assert_eq!(FaceType::from_corners(3).unwrap(), FaceType::Triangle);
        assert_eq!(FaceType::from_corners(4).unwrap(), FaceType::Quad);
        assert!(matches!(
            FaceType::from_corners(5),
            Err(MeshError::InvalidFaceType(5))
        ));
    }

    #[test]
    fn test_triangulate_splits_along_diagonal() {
        let mut input = InputAttribute::new(AttributeKind::Position, FaceType::Quad);
        for position in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ] {
            input.push_vertex(&position).unwrap();
        }
        input.push_face(&[0, 1, 2, 3]).unwrap();

        input.triangulate();

        assert_eq!(input.face_type(), FaceType::Triangle);
        assert_eq!(input.face_count(), 2);
        // [A, B, C] followed by [A, C, D].
        assert_eq!(input.faces()[0], vec![0, 0]);
        assert_eq!(input.faces()[1], vec![1, 2]);
        assert_eq!(input.faces()[2], vec![2, 3]);
    }

    #[test]
    fn test_triangulated_quads_cover_all_corners() {
        let mut input = InputAttribute::new(AttributeKind::Position, FaceType::Quad);
        for i in 0..4 {
            input.push_vertex(&[i as f32, 0.0, 0.0]).unwrap();
        }
        input.push_face(&[0, 1, 2, 3]).unwrap();
        input.triangulate();

        let mut seen: Vec<u32> = (0..2)
            .flat_map(|face| (0..3).map(move |corner| (face, corner)))
            .map(|(face, corner)| input.faces()[corner][face])
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_init_requires_positions() {
        let mut inputs = MeshInputs::new(FaceType::Triangle, AttributeFlags::POSITION);
        assert!(matches!(inputs.init(), Err(MeshError::MissingPositions)));
    }

    #[test]
    fn test_init_triangulates_every_included_attribute() {
        let mut inputs = MeshInputs::new(
            FaceType::Quad,
            AttributeFlags::POSITION | AttributeFlags::UV,
        );
        for i in 0..4 {
            inputs.position.push_vertex(&[i as f32, 0.0, 0.0]).unwrap();
            inputs.uv.push_vertex(&[0.0, i as f32]).unwrap();
        }
        inputs.position.push_face(&[0, 1, 2, 3]).unwrap();
        inputs.uv.push_face(&[0, 1, 2, 3]).unwrap();

        inputs.init().unwrap();

        assert_eq!(inputs.face_type(), FaceType::Triangle);
        assert_eq!(inputs.position.face_count(), 2);
        assert_eq!(inputs.uv.face_count(), 2);
    }
}
