//! Mesh generators for common shapes.
//!
//! Generators produce raw [`MeshInputs`] plus sensible default options, so
//! callers can still override sharing or sourcing before loading.

use crate::arena::ArenaSet;
use crate::error::MeshError;
use crate::mesh::inputs::{AttributeFlags, FaceType, MeshInputs};
use crate::mesh::options::{ColorSourcing, MeshOptions, NormalSourcing};
use crate::mesh::Mesh;

/// Unit cube corner positions, one array per component.
const CUBE_X: [f32; 8] = [0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
const CUBE_Y: [f32; 8] = [0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0];
const CUBE_Z: [f32; 8] = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

/// Quad face corner indices, one array per corner slot.
const CUBE_FACES: [[u32; 6]; 4] = [
    [0, 1, 5, 4, 0, 3],
    [1, 5, 4, 0, 1, 2],
    [2, 6, 7, 3, 5, 6],
    [3, 2, 6, 7, 4, 7],
];

/// Raw inputs for a unit cube: 8 vertices and 6 quad faces, which
/// triangulate into 12 triangles at load.
pub fn cube() -> MeshInputs {
    let mut inputs = MeshInputs::new(FaceType::Quad, AttributeFlags::POSITION);

    for i in 0..8 {
        inputs
            .position
            .push_vertex(&[CUBE_X[i], CUBE_Y[i], CUBE_Z[i]])
            .expect("cube vertex tables are finite 3-component rows");
    }
    for face in 0..6 {
        inputs
            .position
            .push_face(&[
                CUBE_FACES[0][face],
                CUBE_FACES[1][face],
                CUBE_FACES[2][face],
                CUBE_FACES[3][face],
            ])
            .expect("cube face tables are 4-corner rows");
    }

    inputs
}

/// Default cube options: shared positions, generated face normals,
/// generated face colors.
pub fn cube_options() -> MeshOptions {
    MeshOptions {
        share: AttributeFlags::POSITION,
        normal: NormalSourcing::NoVertexGenerateFace,
        color: ColorSourcing::NoVertexGenerateFace,
        ..Default::default()
    }
}

/// Load a unit cube mesh with the default options.
pub fn cube_mesh(arenas: &mut ArenaSet) -> Result<Mesh, MeshError> {
    Mesh::load(cube(), cube_options(), arenas)
}

/// Raw inputs for a single quad on the XY plane, centered at the origin.
pub fn quad(half_width: f32, half_height: f32) -> MeshInputs {
    let mut inputs = MeshInputs::new(FaceType::Quad, AttributeFlags::POSITION);
    for position in [
        [-half_width, -half_height, 0.0],
        [half_width, -half_height, 0.0],
        [half_width, half_height, 0.0],
        [-half_width, half_height, 0.0],
    ] {
        inputs
            .position
            .push_vertex(&position)
            .expect("quad vertex rows are finite 3-component rows");
    }
    inputs
        .position
        .push_face(&[0, 1, 2, 3])
        .expect("quad face row has 4 corners");
    inputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_inputs_before_triangulation() {
        let inputs = cube();
        assert_eq!(inputs.position.vertex_count(), 8);
        assert_eq!(inputs.position.face_count(), 6);
        assert_eq!(inputs.face_type(), FaceType::Quad);
    }

    #[test]
    fn test_cube_triangulates_to_twelve_faces() {
        let mut inputs = cube();
        inputs.init().unwrap();
        assert_eq!(inputs.position.face_count(), 12);
        assert_eq!(inputs.face_type(), FaceType::Triangle);
    }

    #[test]
    fn test_cube_triangle_pairs_share_the_quad_diagonal() {
        let mut inputs = cube();
        inputs.init().unwrap();
        let faces = inputs.position.faces();

        // Triangle q and q+6 came from quad q and share corners A and C.
        for quad in 0..6 {
            let first = [faces[0][quad], faces[1][quad], faces[2][quad]];
            let second = [faces[0][quad + 6], faces[1][quad + 6], faces[2][quad + 6]];
            assert_eq!(first[0], second[0], "shared corner A of quad {quad}");
            assert_eq!(first[2], second[1], "shared corner C of quad {quad}");
        }
    }

    #[test]
    fn test_quad_generator() {
        let mut inputs = quad(0.5, 0.5);
        inputs.init().unwrap();
        assert_eq!(inputs.position.vertex_count(), 4);
        assert_eq!(inputs.position.face_count(), 2);
    }
}
