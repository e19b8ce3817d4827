//! Mesh configuration: storage sharing and attribute sourcing policies.
//!
//! The sourcing enums are the authoritative state machine for attribute
//! population — every legal combination of {no / load / generate / gather}
//! at vertex and face granularity has a named variant, and there is no
//! other path that produces normals or colors. Loading resolves a policy to
//! an ordered list of [`DerivationStep`]s through a lookup table, which
//! keeps the dependency ordering (face normals before vertex-normal
//! gathers, face colors before vertex-color gathers) auditable in one
//! place.

use crate::mesh::inputs::{AttributeFlags, MeshInputs};

/// How normals are sourced, at vertex and face granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalSourcing {
    /// No normals at all.
    #[default]
    NoVertexNoFace,
    /// Face normals generated from vertex positions; no vertex normals.
    NoVertexGenerateFace,
    /// Vertex normals loaded from input; no face normals.
    LoadVertexNoFace,
    /// Vertex normals loaded from input, face normals generated.
    LoadVertexGenerateFace,
    /// Face normals generated, then gathered back onto vertices.
    GatherVertexGenerateFace,
}

/// How colors are sourced, at vertex and face granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSourcing {
    /// No colors at all.
    #[default]
    NoVertexNoFace,
    /// Face colors generated; no vertex colors.
    NoVertexGenerateFace,
    /// Vertex colors loaded from input; no face colors.
    LoadVertexNoFace,
    /// Vertex colors loaded, face colors gathered from them.
    LoadVertexGatherFace,
    /// Vertex colors loaded, face colors generated independently.
    LoadVertexGenerateFace,
    /// Vertex colors generated; no face colors.
    GenerateVertexNoFace,
    /// Vertex colors generated, face colors gathered from them.
    GenerateVertexGatherFace,
    /// Vertex and face colors generated independently.
    GenerateVertexGenerateFace,
    /// Face colors generated, then gathered back onto vertices.
    GatherVertexGenerateFace,
}

/// One step of the load-time derivation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DerivationStep {
    LoadVertexNormals,
    GenerateFaceNormals,
    GatherVertexNormals,
    LoadVertexColors,
    GenerateVertexColors,
    GenerateFaceColors,
    GatherFaceColors,
    GatherVertexColors,
}

impl NormalSourcing {
    /// The ordered derivation steps for this policy. Face normals always
    /// precede a vertex-normal gather.
    pub(crate) fn steps(self) -> &'static [DerivationStep] {
        use DerivationStep::*;
        match self {
            Self::NoVertexNoFace => &[],
            Self::NoVertexGenerateFace => &[GenerateFaceNormals],
            Self::LoadVertexNoFace => &[LoadVertexNormals],
            Self::LoadVertexGenerateFace => &[LoadVertexNormals, GenerateFaceNormals],
            Self::GatherVertexGenerateFace => &[GenerateFaceNormals, GatherVertexNormals],
        }
    }

    /// Whether the policy stores vertex normals.
    pub fn has_vertex(self) -> bool {
        !matches!(self, Self::NoVertexNoFace | Self::NoVertexGenerateFace)
    }

    /// Whether the policy stores face normals.
    pub fn has_face(self) -> bool {
        !matches!(self, Self::NoVertexNoFace | Self::LoadVertexNoFace)
    }
}

impl ColorSourcing {
    /// The ordered derivation steps for this policy. Face colors always
    /// precede a vertex-color gather, and vertex colors precede a
    /// face-color gather.
    pub(crate) fn steps(self) -> &'static [DerivationStep] {
        use DerivationStep::*;
        match self {
            Self::NoVertexNoFace => &[],
            Self::NoVertexGenerateFace => &[GenerateFaceColors],
            Self::LoadVertexNoFace => &[LoadVertexColors],
            Self::LoadVertexGatherFace => &[LoadVertexColors, GatherFaceColors],
            Self::LoadVertexGenerateFace => &[LoadVertexColors, GenerateFaceColors],
            Self::GenerateVertexNoFace => &[GenerateVertexColors],
            Self::GenerateVertexGatherFace => &[GenerateVertexColors, GatherFaceColors],
            Self::GenerateVertexGenerateFace => &[GenerateFaceColors, GenerateVertexColors],
            Self::GatherVertexGenerateFace => &[GenerateFaceColors, GatherVertexColors],
        }
    }

    /// Whether the policy stores vertex colors.
    pub fn has_vertex(self) -> bool {
        !matches!(self, Self::NoVertexNoFace | Self::NoVertexGenerateFace)
    }

    /// Whether the policy stores face colors.
    pub fn has_face(self) -> bool {
        !matches!(
            self,
            Self::NoVertexNoFace | Self::LoadVertexNoFace | Self::GenerateVertexNoFace
        )
    }
}

/// Mesh load configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshOptions {
    /// Which vertex attributes use shared (per-vertex) storage rather than
    /// per-corner storage.
    pub share: AttributeFlags,
    /// Normal sourcing policy.
    pub normal: NormalSourcing,
    /// Color sourcing policy.
    pub color: ColorSourcing,
    /// Whether to load texture coordinates.
    pub include_uvs: bool,
    /// Whether to derive per-face positions (face centers) from vertices.
    pub generate_face_positions: bool,
}

impl MeshOptions {
    /// The vertex attributes this configuration stores. Positions always.
    pub fn vertex_attributes(&self) -> AttributeFlags {
        let mut flags = AttributeFlags::POSITION;
        if self.normal.has_vertex() {
            flags |= AttributeFlags::NORMAL;
        }
        if self.color.has_vertex() {
            flags |= AttributeFlags::COLOR;
        }
        if self.include_uvs {
            flags |= AttributeFlags::UV;
        }
        flags
    }

    /// The face attributes this configuration stores.
    pub fn face_attributes(&self) -> AttributeFlags {
        let mut flags = AttributeFlags::empty();
        if self.normal.has_face() {
            flags |= AttributeFlags::NORMAL;
        }
        if self.color.has_face() {
            flags |= AttributeFlags::COLOR;
        }
        if self.generate_face_positions {
            flags |= AttributeFlags::POSITION;
        }
        flags
    }

    /// Downgrade policies that request vertex-side data the inputs do not
    /// carry, falling back to the nearest "no vertex" variant. Downgrades
    /// are logged, not fatal.
    pub fn sanitize(&mut self, inputs: &MeshInputs) {
        if !inputs.included().contains(AttributeFlags::NORMAL) {
            let downgraded = match self.normal {
                NormalSourcing::LoadVertexNoFace => Some(NormalSourcing::NoVertexNoFace),
                NormalSourcing::LoadVertexGenerateFace => {
                    Some(NormalSourcing::NoVertexGenerateFace)
                }
                _ => None,
            };
            if let Some(policy) = downgraded {
                log::warn!(
                    "normal sourcing {:?} requests vertex normals the inputs lack, using {:?}",
                    self.normal,
                    policy
                );
                self.normal = policy;
            }
        }

        if !inputs.included().contains(AttributeFlags::COLOR) {
            let downgraded = match self.color {
                ColorSourcing::LoadVertexNoFace | ColorSourcing::LoadVertexGatherFace => {
                    Some(ColorSourcing::NoVertexNoFace)
                }
                ColorSourcing::LoadVertexGenerateFace => Some(ColorSourcing::NoVertexGenerateFace),
                _ => None,
            };
            if let Some(policy) = downgraded {
                log::warn!(
                    "color sourcing {:?} requests vertex colors the inputs lack, using {:?}",
                    self.color,
                    policy
                );
                self.color = policy;
            }
        }

        if self.include_uvs && !inputs.included().contains(AttributeFlags::UV) {
            log::warn!("uvs requested but not present in inputs, dropping");
            self.include_uvs = false;
        }
    }
}
