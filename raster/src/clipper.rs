//! Single-plane clipping against the camera's near plane.
//!
//! Clip-space convention: a vertex is visible when `z >= near`. Clipping a
//! triangle against one plane yields 0, 1 or 2 triangles:
//!
//! - all three visible → unchanged (1)
//! - none visible → discarded (0)
//! - one visible → the two exiting edges are cut, one smaller triangle (1)
//! - two visible → the cut quadrilateral splits into two triangles, the
//!   second written into the caller's scratch triangle (2)
//!
//! Edge intersections interpolate at `t = d_kept / (d_kept - d_lost)`
//! where `d = z - near` is the signed plane distance; the interpolated
//! vertex lands exactly on the plane, and every carried attribute moves
//! with the same `t`. Winding order is preserved by keeping each output
//! vertex in (or cyclically consistent with) its source corner.

use glimmer_core::arena::{Vec2Arena, Vec3Arena, Vec4Arena};

use crate::triangle::Triangle;

/// Clip `triangle` in place against the plane `z = near`, writing a second
/// output into `extra` when the visible region is a quadrilateral. Returns
/// the number of triangles to rasterize (0, 1 or 2).
pub fn clip_to_near_plane(
    triangle: &Triangle,
    extra: &mut Triangle,
    near: f32,
    vec4: &mut Vec4Arena,
    vec2: &mut Vec2Arena,
    vec3: &mut Vec3Arena,
) -> u32 {
    let distances = [
        vec4.component(triangle.positions[0], 2) - near,
        vec4.component(triangle.positions[1], 2) - near,
        vec4.component(triangle.positions[2], 2) - near,
    ];
    let visible = [
        distances[0] >= 0.0,
        distances[1] >= 0.0,
        distances[2] >= 0.0,
    ];

    match visible.iter().filter(|v| **v).count() {
        3 => 1,
        0 => 0,
        1 => {
            // One vertex kept: cut both edges leaving it. Writing the cut
            // points into the lost corners keeps the cyclic order intact.
            let kept = (0..3).find(|i| visible[*i]).unwrap_or(0);
            let next = (kept + 1) % 3;
            let prev = (kept + 2) % 3;

            let t_next = distances[kept] / (distances[kept] - distances[next]);
            let t_prev = distances[kept] / (distances[kept] - distances[prev]);

            triangle.lerp_vertex_into(kept, next, t_next, triangle, next, vec4, vec2, vec3);
            triangle.lerp_vertex_into(kept, prev, t_prev, triangle, prev, vec4, vec2, vec3);
            1
        }
        _ => {
            // One vertex lost: the visible quad is A, B, B', A' with A and
            // B the kept corners (in cyclic order) and the primed points on
            // the cut edges. Split into (A, B, B') and (A, B', A'), both
            // still in source winding.
            let lost = (0..3).find(|i| !visible[*i]).unwrap_or(0);
            let a = (lost + 1) % 3;
            let b = (lost + 2) % 3;

            let t_a = distances[a] / (distances[a] - distances[lost]);
            let t_b = distances[b] / (distances[b] - distances[lost]);

            // extra = (A, B', A'), laid out so its cyclic order matches.
            triangle.copy_vertex_into(a, extra, a, vec4, vec2, vec3);
            triangle.lerp_vertex_into(b, lost, t_b, extra, b, vec4, vec2, vec3);
            triangle.lerp_vertex_into(a, lost, t_a, extra, lost, vec4, vec2, vec3);
            extra.carry = triangle.carry;
            vec3.copy(triangle.face_color, extra.face_color);

            // triangle = (A, B, B'): only the lost corner is replaced.
            extra.copy_vertex_into(b, triangle, lost, vec4, vec2, vec3);
            2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::arena::ArenaSet;
    use rstest::rstest;

    use crate::triangle::VertexCarry;

    const NEAR: f32 = 1.0;

    fn triangle_with_depths(arenas: &mut ArenaSet, depths: [f32; 3]) -> Triangle {
        let triangle = Triangle::allocate(arenas);
        let corners = [[0.0f32, 0.0], [2.0, 0.0], [0.0, 2.0]];
        for i in 0..3 {
            arenas.vec4.set(
                triangle.positions[i],
                [corners[i][0], corners[i][1], depths[i], depths[i]],
            );
        }
        triangle
    }

    fn all_in_front(triangle: &Triangle, vec4: &Vec4Arena) -> bool {
        triangle
            .positions
            .iter()
            .all(|p| vec4.component(*p, 2) >= NEAR - 1e-4)
    }

    #[rstest]
    #[case::all_visible([2.0, 3.0, 4.0], 1)]
    #[case::all_behind([0.1, 0.5, 0.9], 0)]
    #[case::one_visible([2.0, 0.5, 0.5], 1)]
    #[case::two_visible([2.0, 3.0, 0.5], 2)]
    #[case::on_the_plane([1.0, 1.0, 1.0], 1)]
    fn test_clip_case_table(#[case] depths: [f32; 3], #[case] expected: u32) {
        let mut arenas = ArenaSet::new();
        let triangle = triangle_with_depths(&mut arenas, depths);
        let mut extra = Triangle::allocate(&mut arenas);

        let count = clip_to_near_plane(
            &triangle,
            &mut extra,
            NEAR,
            &mut arenas.vec4,
            &mut arenas.vec2,
            &mut arenas.vec3,
        );
        assert_eq!(count, expected);

        if count >= 1 {
            assert!(all_in_front(&triangle, &arenas.vec4));
        }
        if count == 2 {
            assert!(all_in_front(&extra, &arenas.vec4));
        }
    }

    #[test]
    fn test_fully_visible_triangle_is_unchanged() {
        let mut arenas = ArenaSet::new();
        let triangle = triangle_with_depths(&mut arenas, [2.0, 3.0, 4.0]);
        let before: Vec<[f32; 4]> = triangle
            .positions
            .iter()
            .map(|p| arenas.vec4.get(*p))
            .collect();
        let mut extra = Triangle::allocate(&mut arenas);

        let count = clip_to_near_plane(
            &triangle,
            &mut extra,
            NEAR,
            &mut arenas.vec4,
            &mut arenas.vec2,
            &mut arenas.vec3,
        );

        assert_eq!(count, 1);
        for (slot, original) in triangle.positions.iter().zip(before) {
            assert_eq!(arenas.vec4.get(*slot), original);
        }
    }

    #[test]
    fn test_cut_vertices_land_on_the_plane() {
        let mut arenas = ArenaSet::new();
        // Vertex 0 at depth 3, the others behind the plane.
        let triangle = triangle_with_depths(&mut arenas, [3.0, 0.0, 0.0]);
        let mut extra = Triangle::allocate(&mut arenas);

        let count = clip_to_near_plane(
            &triangle,
            &mut extra,
            NEAR,
            &mut arenas.vec4,
            &mut arenas.vec2,
            &mut arenas.vec3,
        );
        assert_eq!(count, 1);

        // The kept vertex is untouched, the cut ones sit at z == near.
        assert_eq!(arenas.vec4.component(triangle.positions[0], 2), 3.0);
        assert!((arenas.vec4.component(triangle.positions[1], 2) - NEAR).abs() < 1e-5);
        assert!((arenas.vec4.component(triangle.positions[2], 2) - NEAR).abs() < 1e-5);
    }

    #[test]
    fn test_quad_split_preserves_winding() {
        let mut arenas = ArenaSet::new();
        // Vertex 2 behind the plane; vertices 0 and 1 kept.
        let triangle = triangle_with_depths(&mut arenas, [2.0, 2.0, 0.5]);
        let mut extra = Triangle::allocate(&mut arenas);

        let normal_before = arenas.vec4.allocate(1);
        triangle.normal(&mut arenas.vec4, normal_before);
        let sign_before = arenas.vec4.component(normal_before, 2).signum();

        let count = clip_to_near_plane(
            &triangle,
            &mut extra,
            NEAR,
            &mut arenas.vec4,
            &mut arenas.vec2,
            &mut arenas.vec3,
        );
        assert_eq!(count, 2);

        // Both outputs keep the source facing.
        let normal_after = arenas.vec4.allocate(1);
        triangle.normal(&mut arenas.vec4, normal_after);
        assert_eq!(arenas.vec4.component(normal_after, 2).signum(), sign_before);

        extra.normal(&mut arenas.vec4, normal_after);
        assert_eq!(arenas.vec4.component(normal_after, 2).signum(), sign_before);
    }

    #[test]
    fn test_clip_interpolates_carried_attributes() {
        let mut arenas = ArenaSet::new();
        let mut triangle = triangle_with_depths(&mut arenas, [3.0, 0.0, 3.0]);
        triangle.carry = VertexCarry {
            normals: false,
            uvs: true,
            colors: true,
        };
        arenas.vec2.set(triangle.uvs[0], [0.0, 0.0]);
        arenas.vec2.set(triangle.uvs[1], [1.0, 1.0]);
        arenas.vec2.set(triangle.uvs[2], [0.0, 1.0]);
        arenas.vec3.set(triangle.colors[0], [1.0, 0.0, 0.0]);
        arenas.vec3.set(triangle.colors[1], [0.0, 1.0, 0.0]);
        arenas.vec3.set(triangle.colors[2], [0.0, 0.0, 1.0]);
        let mut extra = Triangle::allocate(&mut arenas);

        let count = clip_to_near_plane(
            &triangle,
            &mut extra,
            NEAR,
            &mut arenas.vec4,
            &mut arenas.vec2,
            &mut arenas.vec3,
        );
        assert_eq!(count, 2);

        // Vertex 1 was cut against both edges: t = (3-1)/(3-0) = 2/3 along
        // 0→1, so the replacement uv is 2/3 of the way there.
        let expected_t = 2.0 / 3.0;
        for slot in [triangle.uvs[1], extra.uvs[1]] {
            let [u, v] = arenas.vec2.get(slot);
            assert!(u <= expected_t + 1e-5);
            assert!(v <= expected_t + 1e-5);
        }
        // Colors moved with the same parameter as positions: extra corner 0
        // is vertex 0 interpolated toward the lost vertex 1.
        let [r, g, b] = arenas.vec3.get(extra.colors[0]);
        assert!((r - (1.0 - expected_t)).abs() < 1e-5);
        assert!((g - expected_t).abs() < 1e-5);
        assert!(b.abs() < 1e-5);
    }
}
