//! Mesh: attribute collections, topology tables, and load orchestration.
//!
//! [`Mesh::load`] is the single entry point that turns raw
//! [`MeshInputs`](inputs::MeshInputs) into arena-backed attribute storage:
//! sanitize the sourcing policies against what the inputs actually carry,
//! triangulate quads, build the topology tables, pre-size the arenas from
//! the final counts, then run the derivation plan in dependency order —
//! vertex positions first, face normals before any vertex-normal gather,
//! face colors before any vertex-color gather.

pub mod generators;
pub mod inputs;
pub mod options;
pub mod topology;

use crate::accessors::color::ColorGenerator;
use crate::arena::ArenaSet;
use crate::attributes::{pull_face_normals, AttributeKind, FaceAttribute, VertexAttribute};
use crate::error::MeshError;
use inputs::{AttributeFlags, MeshInputs};
use options::{DerivationStep, MeshOptions};
use topology::{FaceVertices, VertexFaces};

/// The vertex-side attribute collection of a mesh.
#[derive(Debug)]
pub struct Vertices {
    /// Vertex positions (always present).
    pub positions: VertexAttribute<3>,
    /// Vertex normals, when the normal policy stores them.
    pub normals: Option<VertexAttribute<3>>,
    /// Vertex colors, when the color policy stores them.
    pub colors: Option<VertexAttribute<3>>,
    /// Texture coordinates, when requested and present in the inputs.
    pub uvs: Option<VertexAttribute<2>>,
    /// Vertex→face adjacency used by gather pulls.
    pub faces: VertexFaces,
}

/// The face-side attribute collection of a mesh.
#[derive(Debug)]
pub struct Faces {
    /// Face centers, when `generate_face_positions` is set.
    pub positions: Option<FaceAttribute<3>>,
    /// Face normals, when the normal policy stores them.
    pub normals: Option<FaceAttribute<3>>,
    /// Face colors, when the color policy stores them.
    pub colors: Option<FaceAttribute<3>>,
    /// The face→vertex index table.
    pub vertices: FaceVertices,
}

/// A loaded triangulated mesh over arena-backed attribute storage.
#[derive(Debug)]
pub struct Mesh {
    vertex_count: usize,
    face_count: usize,
    options: MeshOptions,
    /// Vertex-side attributes.
    pub vertex: Vertices,
    /// Face-side attributes.
    pub face: Faces,
}

impl Mesh {
    /// Load a mesh from raw inputs.
    ///
    /// Input validation errors abort construction; the arenas may have
    /// grown but no mesh refers to the abandoned slots. Policy downgrades
    /// (vertex data requested but absent) are logged and auto-corrected,
    /// not fatal.
    pub fn load(
        mut inputs: MeshInputs,
        mut options: MeshOptions,
        arenas: &mut ArenaSet,
    ) -> Result<Self, MeshError> {
        inputs.init()?;
        options.sanitize(&inputs);

        let vertex_count = inputs.position.vertex_count();
        let face_count = inputs.position.face_count();

        let face_vertices = FaceVertices::from_input(&inputs.position)?;
        let vertex_faces = VertexFaces::build(&face_vertices, vertex_count);

        let vertex_flags = options.vertex_attributes();
        let face_flags = options.face_attributes();

        // Size the arenas from the final counts before any allocation.
        let vertex_slots = |flag: AttributeFlags| {
            if options.share.contains(flag) {
                vertex_count
            } else {
                3 * face_count
            }
        };
        let mut vec3_slots = vertex_slots(AttributeFlags::POSITION);
        if vertex_flags.contains(AttributeFlags::NORMAL) {
            vec3_slots += vertex_slots(AttributeFlags::NORMAL);
        }
        if vertex_flags.contains(AttributeFlags::COLOR) {
            vec3_slots += vertex_slots(AttributeFlags::COLOR);
        }
        for flag in [
            AttributeFlags::POSITION,
            AttributeFlags::NORMAL,
            AttributeFlags::COLOR,
        ] {
            if face_flags.contains(flag) {
                vec3_slots += face_count;
            }
        }
        arenas.vec3.reserve(vec3_slots);
        if vertex_flags.contains(AttributeFlags::UV) {
            arenas.vec2.reserve(vertex_slots(AttributeFlags::UV));
        }

        // Attribute storage, resolved to shared or per-corner once.
        let vertex_attribute = |arena: &mut crate::arena::Vec3Arena,
                                kind: AttributeKind,
                                flag: AttributeFlags| {
            if options.share.contains(flag) {
                VertexAttribute::shared(kind, arena, vertex_count)
            } else {
                VertexAttribute::per_corner(kind, arena, face_count)
            }
        };

        let positions = vertex_attribute(
            &mut arenas.vec3,
            AttributeKind::Position,
            AttributeFlags::POSITION,
        );
        let normals = vertex_flags
            .contains(AttributeFlags::NORMAL)
            .then(|| vertex_attribute(&mut arenas.vec3, AttributeKind::Normal, AttributeFlags::NORMAL));
        let colors = vertex_flags
            .contains(AttributeFlags::COLOR)
            .then(|| vertex_attribute(&mut arenas.vec3, AttributeKind::Color, AttributeFlags::COLOR));
        let uvs = vertex_flags.contains(AttributeFlags::UV).then(|| {
            if options.share.contains(AttributeFlags::UV) {
                VertexAttribute::shared(AttributeKind::Uv, &mut arenas.vec2, vertex_count)
            } else {
                VertexAttribute::per_corner(AttributeKind::Uv, &mut arenas.vec2, face_count)
            }
        });

        let face_positions = face_flags
            .contains(AttributeFlags::POSITION)
            .then(|| FaceAttribute::new(AttributeKind::Position, &mut arenas.vec3, face_count));
        let face_normals = face_flags
            .contains(AttributeFlags::NORMAL)
            .then(|| FaceAttribute::new(AttributeKind::Normal, &mut arenas.vec3, face_count));
        let face_colors = face_flags
            .contains(AttributeFlags::COLOR)
            .then(|| FaceAttribute::new(AttributeKind::Color, &mut arenas.vec3, face_count));

        // Vertex positions always load first: everything derives from them.
        positions.load(&mut arenas.vec3, &inputs.position, &face_vertices)?;
        if let Some(uvs) = &uvs {
            uvs.load(&mut arenas.vec2, &inputs.uv, &face_vertices)?;
        }

        // Derivation plan: normals, then colors, then face centers.
        let mut generator = ColorGenerator::default();
        let steps = options
            .normal
            .steps()
            .iter()
            .chain(options.color.steps());
        for step in steps {
            match step {
                DerivationStep::LoadVertexNormals => {
                    if let Some(normals) = &normals {
                        normals.load(&mut arenas.vec3, &inputs.normal, &face_vertices)?;
                    }
                }
                DerivationStep::GenerateFaceNormals => {
                    if let Some(face_normals) = &face_normals {
                        pull_face_normals(&mut arenas.vec3, face_normals, &positions, &face_vertices);
                    }
                }
                DerivationStep::GatherVertexNormals => {
                    if let (Some(normals), Some(face_normals)) = (&normals, &face_normals) {
                        normals.pull_from_faces(&mut arenas.vec3, face_normals, &vertex_faces);
                    }
                }
                DerivationStep::LoadVertexColors => {
                    if let Some(colors) = &colors {
                        colors.load(&mut arenas.vec3, &inputs.color, &face_vertices)?;
                    }
                }
                DerivationStep::GenerateVertexColors => {
                    if let Some(colors) = &colors {
                        colors.generate(&mut arenas.vec3, &mut generator);
                    }
                }
                DerivationStep::GenerateFaceColors => {
                    if let Some(face_colors) = &face_colors {
                        face_colors.generate(&mut arenas.vec3, &mut generator);
                    }
                }
                DerivationStep::GatherFaceColors => {
                    if let (Some(face_colors), Some(colors)) = (&face_colors, &colors) {
                        face_colors.pull_from_vertices(&mut arenas.vec3, colors, &face_vertices);
                    }
                }
                DerivationStep::GatherVertexColors => {
                    if let (Some(colors), Some(face_colors)) = (&colors, &face_colors) {
                        colors.pull_from_faces(&mut arenas.vec3, face_colors, &vertex_faces);
                    }
                }
            }
        }

        if let Some(face_positions) = &face_positions {
            face_positions.pull_from_vertices(&mut arenas.vec3, &positions, &face_vertices);
        }

        log::debug!(
            "mesh loaded: {} vertices, {} faces, vertex attributes {:?}, face attributes {:?}",
            vertex_count,
            face_count,
            vertex_flags,
            face_flags
        );

        Ok(Self {
            vertex_count,
            face_count,
            options,
            vertex: Vertices {
                positions,
                normals,
                colors,
                uvs,
                faces: vertex_faces,
            },
            face: Faces {
                positions: face_positions,
                normals: face_normals,
                colors: face_colors,
                vertices: face_vertices,
            },
        })
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of (triangulated) faces.
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// The sanitized options this mesh was loaded with.
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }
}
