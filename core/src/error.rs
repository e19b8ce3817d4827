//! Mesh loading error types.

use std::fmt;

use crate::attributes::AttributeKind;

/// Errors that can occur while validating and loading mesh input geometry.
///
/// All of these are fatal to the load call that raised them: the mesh is
/// not constructed and the inputs are handed back to the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An input vertex or face row had the wrong number of components.
    ComponentCountMismatch {
        /// Which attribute the row belonged to.
        attribute: AttributeKind,
        /// Components required by the attribute (or corners by the face type).
        expected: usize,
        /// Components actually supplied.
        got: usize,
    },
    /// An input component value was NaN or infinite.
    NonFiniteValue {
        /// Which attribute carried the value.
        attribute: AttributeKind,
        /// Index of the vertex row the value belonged to.
        vertex: usize,
    },
    /// A face referenced a vertex index outside the attribute's vertex range.
    IndexOutOfRange {
        /// Which attribute's face table held the index.
        attribute: AttributeKind,
        /// The offending index.
        index: u32,
        /// Number of vertices the attribute actually has.
        vertex_count: usize,
    },
    /// A face had a vertex count other than 3 (triangle) or 4 (quad).
    InvalidFaceType(usize),
    /// The inputs carried no vertex positions.
    MissingPositions,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComponentCountMismatch {
                attribute,
                expected,
                got,
            } => write!(
                f,
                "{attribute} input row has {got} components, expected {expected}"
            ),
            Self::NonFiniteValue { attribute, vertex } => {
                write!(f, "{attribute} vertex {vertex} has a non-finite component")
            }
            Self::IndexOutOfRange {
                attribute,
                index,
                vertex_count,
            } => write!(
                f,
                "{attribute} face references vertex {index}, but only {vertex_count} vertices exist"
            ),
            Self::InvalidFaceType(corners) => write!(
                f,
                "invalid face type with {corners} corners, only triangles and quads are supported"
            ),
            Self::MissingPositions => write!(f, "mesh inputs carry no vertex positions"),
        }
    }
}

impl std::error::Error for MeshError {}
