//! Vertex and face attributes over lane arenas.
//!
//! An attribute is an ordered collection of slots of one semantic kind.
//! Vertex attributes store either one value per vertex (*shared*, reused by
//! every adjacent face) or one value per face corner (*unshared*, for hard
//! edges where a value must differ per face even at a shared vertex). Face
//! attributes always store one value per face.
//!
//! Attributes are populated two ways: [`load`]ed from sanitized input
//! geometry, or [`pull`]ed from a related attribute — faces averaging their
//! corners (or crossing edges, for normals), vertices averaging their
//! adjacent faces.
//!
//! [`load`]: vertex::VertexAttribute::load
//! [`pull`]: vertex::VertexAttribute::pull_from_faces

pub mod face;
pub mod vertex;

use std::fmt;

pub use face::{pull_face_normals, FaceAttribute};
pub use vertex::{VertexAttribute, VertexStorage};

/// Semantic kind of an attribute, used in flags and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Vertex or face positions.
    Position,
    /// Surface normals.
    Normal,
    /// RGB colors.
    Color,
    /// Texture coordinates.
    Uv,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::Normal => write!(f, "normal"),
            Self::Color => write!(f, "color"),
            Self::Uv => write!(f, "uv"),
        }
    }
}
