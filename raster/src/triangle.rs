//! Transient triangle working set for the raster pipeline.
//!
//! A [`Triangle`] owns stable scratch slots in the pipeline's arenas — 3
//! homogeneous positions plus optional per-vertex normal/uv/color and one
//! flat face color. Pipelines allocate a handful of these once and reuse
//! them for every face of every frame; nothing here is per-frame allocated
//! or persisted across frames.

use glimmer_core::arena::{
    ArenaSet, Mat4Arena, Mat4Slot, Vec2Arena, Vec2Slot, Vec3Arena, Vec3Slot, Vec4Arena, Vec4Slot,
};

/// Which optional per-vertex attributes a triangle currently carries.
///
/// Set per mesh when a triangle is (re)populated; the clipper interpolates
/// exactly the carried attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexCarry {
    /// Per-vertex normals are valid.
    pub normals: bool,
    /// Per-vertex texture coordinates are valid.
    pub uvs: bool,
    /// Per-vertex colors are valid.
    pub colors: bool,
}

/// A 3-vertex working triangle over pipeline scratch arenas.
#[derive(Debug)]
pub struct Triangle {
    /// Homogeneous clip/screen-space positions.
    pub positions: [Vec4Slot; 3],
    /// Per-vertex normals (`w = 0`), valid when [`VertexCarry::normals`].
    pub normals: [Vec4Slot; 3],
    /// Per-vertex texture coordinates, valid when [`VertexCarry::uvs`].
    pub uvs: [Vec2Slot; 3],
    /// Per-vertex colors, valid when [`VertexCarry::colors`].
    pub colors: [Vec3Slot; 3],
    /// Flat face color.
    pub face_color: Vec3Slot,
    /// Which optional attributes are currently populated.
    pub carry: VertexCarry,
}

impl Triangle {
    /// Allocate stable scratch slots for one reusable triangle.
    pub fn allocate(arenas: &mut ArenaSet) -> Self {
        let positions = arenas.vec4.allocate(3);
        let normals = arenas.vec4.allocate(3);
        let uvs = arenas.vec2.allocate(3);
        let colors = arenas.vec3.allocate(3);
        Self {
            positions: [positions, positions.nth(1), positions.nth(2)],
            normals: [normals, normals.nth(1), normals.nth(2)],
            uvs: [uvs, uvs.nth(1), uvs.nth(2)],
            colors: [colors, colors.nth(1), colors.nth(2)],
            face_color: arenas.vec3.allocate(1),
            carry: VertexCarry::default(),
        }
    }

    /// Copy vertex `from_index` of `self` into vertex `to_index` of `out`,
    /// along with every carried attribute.
    pub fn copy_vertex_into(
        &self,
        from_index: usize,
        out: &Triangle,
        to_index: usize,
        vec4: &mut Vec4Arena,
        vec2: &mut Vec2Arena,
        vec3: &mut Vec3Arena,
    ) {
        vec4.copy(self.positions[from_index], out.positions[to_index]);
        if self.carry.normals {
            vec4.copy(self.normals[from_index], out.normals[to_index]);
        }
        if self.carry.uvs {
            vec2.copy(self.uvs[from_index], out.uvs[to_index]);
        }
        if self.carry.colors {
            vec3.copy(self.colors[from_index], out.colors[to_index]);
        }
    }

    /// Interpolate vertex `a` toward vertex `b` of `self` at parameter `t`,
    /// writing vertex `to_index` of `out`. Every carried attribute uses the
    /// same `t`; skipping one would split values that must stay coherent
    /// across a clipped edge (visible seams). Interpolated normals are
    /// renormalized.
    #[allow(clippy::too_many_arguments)]
    pub fn lerp_vertex_into(
        &self,
        a: usize,
        b: usize,
        t: f32,
        out: &Triangle,
        to_index: usize,
        vec4: &mut Vec4Arena,
        vec2: &mut Vec2Arena,
        vec3: &mut Vec3Arena,
    ) {
        vec4.lerp(self.positions[a], self.positions[b], t, out.positions[to_index]);
        if self.carry.normals {
            vec4.lerp(self.normals[a], self.normals[b], t, out.normals[to_index]);
            vec4.normalize3_assign(out.normals[to_index]);
        }
        if self.carry.uvs {
            vec2.lerp(self.uvs[a], self.uvs[b], t, out.uvs[to_index]);
        }
        if self.carry.colors {
            vec3.lerp(self.colors[a], self.colors[b], t, out.colors[to_index]);
        }
    }

    /// Transform all three vertex positions by `matrix`, writing into
    /// `out`'s position slots. `out` may alias `self`: the underlying
    /// vector transform buffers its reads, so the in-place case is safe.
    /// Carried attributes are not touched — they are not positions — and
    /// any face normal must be recomputed afterwards.
    pub fn transformed_by(
        &self,
        matrices: &Mat4Arena,
        matrix: Mat4Slot,
        vec4: &mut Vec4Arena,
        out: &Triangle,
    ) {
        for corner in 0..3 {
            matrices.transform_vec4(matrix, vec4, self.positions[corner], out.positions[corner]);
        }
    }

    /// Compute the normalized face normal from the two edges leaving
    /// vertex 0 (v0→v1 × v0→v2), writing it into `out` (`w = 0`).
    ///
    /// Transforms are not normal-preserving, so this must be recomputed
    /// after every transform rather than carried through one.
    pub fn normal(&self, vec4: &mut Vec4Arena, out: Vec4Slot) {
        let edge_a = vec4.allocate_temp();
        let edge_b = vec4.allocate_temp();
        vec4.sub(self.positions[1], self.positions[0], edge_a);
        vec4.sub(self.positions[2], self.positions[0], edge_b);
        vec4.cross(edge_a, edge_b, out);
        vec4.normalize3_assign(out);
    }

    /// Frustum rejection: true when all three vertices sit outside the
    /// same clip bound — beyond the depth range in z, or beyond `±w` in
    /// x or y.
    pub fn is_out_of_view(&self, vec4: &Vec4Arena, near: f32, far: f32) -> bool {
        let mut behind_near = 0;
        let mut beyond_far = 0;
        let mut left = 0;
        let mut right = 0;
        let mut below = 0;
        let mut above = 0;

        for position in &self.positions {
            let [x, y, z, w] = vec4.get(*position);
            if z < near {
                behind_near += 1;
            }
            if z > far {
                beyond_far += 1;
            }
            if x < -w {
                left += 1;
            }
            if x > w {
                right += 1;
            }
            if y < -w {
                below += 1;
            }
            if y > w {
                above += 1;
            }
        }

        behind_near == 3 || beyond_far == 3 || left == 3 || right == 3 || below == 3 || above == 3
    }
}

/// Back-face test in clip space: the triangle faces away from the camera
/// when the ray from the eye to its first vertex is aligned with its
/// (precomputed) normal — non-negative dot product.
pub fn is_back_face(
    triangle: &Triangle,
    vec4: &mut Vec4Arena,
    eye: Vec4Slot,
    normal: Vec4Slot,
) -> bool {
    let ray = vec4.allocate_temp();
    vec4.sub(triangle.positions[0], eye, ray);
    vec4.dot3(ray, normal) >= 0.0
}
