//! 4x4 matrix operations over the 16-lane arena.
//!
//! Lane layout is row-major: lane `row * 4 + col` holds `m(row+1)(col+1)`,
//! so lanes 0..4 are the first row (the matrix x-axis) and lanes 12..15 hold
//! the translation row. Vectors multiply as *row vectors*:
//!
//! ```text
//! x' = x*m11 + y*m21 + z*m31 + w*m41
//! ```
//!
//! which means composition reads left to right — `model_to_world *
//! world_to_clip` takes a vector from model space to clip space.
//!
//! External collaborators (scene graphs, cameras) hand over
//! `nalgebra::Matrix4` values in the usual column-vector convention;
//! [`Mat4Arena::load_mat4`] transposes on the way in so both conventions
//! agree on what the matrix does.

use crate::arena::{Mat4Arena, Mat4Slot, Vec3Arena, Vec3Slot, Vec4Arena, Vec4Slot};
use crate::math::Mat4;

impl Mat4Arena {
    /// Write the identity matrix into `m`.
    pub fn set_identity(&mut self, m: Mat4Slot) {
        for row in 0..4 {
            for col in 0..4 {
                self.set_component(m, row * 4 + col, if row == col { 1.0 } else { 0.0 });
            }
        }
    }

    /// True when `m` equals the identity matrix exactly.
    pub fn is_identity(&self, m: Mat4Slot) -> bool {
        for row in 0..4 {
            for col in 0..4 {
                let expected = if row == col { 1.0 } else { 0.0 };
                if self.component(m, row * 4 + col) != expected {
                    return false;
                }
            }
        }
        true
    }

    /// Read element `(row, col)` of `m` (zero-based).
    #[inline]
    pub fn at(&self, m: Mat4Slot, row: usize, col: usize) -> f32 {
        self.component(m, row * 4 + col)
    }

    /// Write element `(row, col)` of `m` (zero-based).
    #[inline]
    pub fn set_at(&mut self, m: Mat4Slot, row: usize, col: usize, value: f32) {
        self.set_component(m, row * 4 + col, value);
    }

    /// `out = transpose(a)`. Falls back to the in-place swap when `out`
    /// aliases `a`.
    pub fn transpose(&mut self, a: Mat4Slot, out: Mat4Slot) {
        if out == a {
            self.transpose_assign(a);
            return;
        }
        for row in 0..4 {
            for col in 0..4 {
                let v = self.at(a, row, col);
                self.set_at(out, col, row, v);
            }
        }
    }

    /// Transpose `a` in place.
    pub fn transpose_assign(&mut self, a: Mat4Slot) {
        for row in 0..4 {
            for col in (row + 1)..4 {
                let upper = self.at(a, row, col);
                let lower = self.at(a, col, row);
                self.set_at(a, row, col, lower);
                self.set_at(a, col, row, upper);
            }
        }
    }

    /// Matrix product `out = a * b` (row-vector composition: apply `a`,
    /// then `b`).
    ///
    /// # Panics
    ///
    /// Panics if `out` aliases `a` or `b`: the product reads every element
    /// of both inputs while writing the output, so an aliasing output is
    /// structurally unsafe. Use [`Mat4Arena::mat_mul_assign`] to accumulate
    /// into an operand.
    pub fn mat_mul(&mut self, a: Mat4Slot, b: Mat4Slot, out: Mat4Slot) {
        assert!(
            out != a && out != b,
            "matrix multiply output slot must not alias an input slot"
        );
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(a, row, k) * self.at(b, k, col);
                }
                self.set_at(out, row, col, sum);
            }
        }
    }

    /// In-place matrix product `a = a * b`, buffered through the stack.
    pub fn mat_mul_assign(&mut self, a: Mat4Slot, b: Mat4Slot) {
        let mut product = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.at(a, row, k) * self.at(b, k, col);
                }
                product[row * 4 + col] = sum;
            }
        }
        self.set(a, product);
    }

    /// Load an external column-vector-convention matrix into lane storage.
    ///
    /// The matrix is transposed on the way in so that the row-vector
    /// multiply applied by this arena has the same effect as `matrix * v`
    /// had outside.
    pub fn load_mat4(&mut self, m: Mat4Slot, source: &Mat4) {
        for row in 0..4 {
            for col in 0..4 {
                self.set_at(m, row, col, source[(col, row)]);
            }
        }
    }

    /// Read lane storage back out as a column-vector-convention matrix.
    pub fn store_mat4(&self, m: Mat4Slot) -> Mat4 {
        let mut out = Mat4::zeros();
        for row in 0..4 {
            for col in 0..4 {
                out[(col, row)] = self.at(m, row, col);
            }
        }
        out
    }

    /// Transform a 4-lane vector: `dst = src * m`. Safe when `dst` aliases
    /// `src` (the source components are read out before any write).
    pub fn transform_vec4(&self, m: Mat4Slot, vectors: &mut Vec4Arena, src: Vec4Slot, dst: Vec4Slot) {
        let [x, y, z, w] = vectors.get(src);
        vectors.set(
            dst,
            [
                x * self.at(m, 0, 0) + y * self.at(m, 1, 0) + z * self.at(m, 2, 0) + w * self.at(m, 3, 0),
                x * self.at(m, 0, 1) + y * self.at(m, 1, 1) + z * self.at(m, 2, 1) + w * self.at(m, 3, 1),
                x * self.at(m, 0, 2) + y * self.at(m, 1, 2) + z * self.at(m, 2, 2) + w * self.at(m, 3, 2),
                x * self.at(m, 0, 3) + y * self.at(m, 1, 3) + z * self.at(m, 2, 3) + w * self.at(m, 3, 3),
            ],
        );
    }

    /// Transform a 3-lane position (`w = 1`, translation applied). The
    /// result drops the homogeneous coordinate; use a 4-lane slot when the
    /// projection `w` is needed downstream.
    pub fn transform_point3(&self, m: Mat4Slot, vectors: &mut Vec3Arena, src: Vec3Slot, dst: Vec3Slot) {
        let [x, y, z] = vectors.get(src);
        vectors.set(
            dst,
            [
                x * self.at(m, 0, 0) + y * self.at(m, 1, 0) + z * self.at(m, 2, 0) + self.at(m, 3, 0),
                x * self.at(m, 0, 1) + y * self.at(m, 1, 1) + z * self.at(m, 2, 1) + self.at(m, 3, 1),
                x * self.at(m, 0, 2) + y * self.at(m, 1, 2) + z * self.at(m, 2, 2) + self.at(m, 3, 2),
            ],
        );
    }

    /// Transform a 3-lane direction (`w = 0`, translation ignored).
    pub fn transform_dir3(&self, m: Mat4Slot, vectors: &mut Vec3Arena, src: Vec3Slot, dst: Vec3Slot) {
        let [x, y, z] = vectors.get(src);
        vectors.set(
            dst,
            [
                x * self.at(m, 0, 0) + y * self.at(m, 1, 0) + z * self.at(m, 2, 0),
                x * self.at(m, 0, 1) + y * self.at(m, 1, 1) + z * self.at(m, 2, 1),
                x * self.at(m, 0, 2) + y * self.at(m, 1, 2) + z * self.at(m, 2, 2),
            ],
        );
    }

    /// Allocate a stable slot already set to the identity matrix.
    pub fn allocate_identity(&mut self) -> Mat4Slot {
        let m = self.allocate(1);
        self.set_identity(m);
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Mat4Arena;
    use crate::math;

    fn filled(arena: &mut Mat4Arena, values: [f32; 16]) -> Mat4Slot {
        let m = arena.allocate(1);
        arena.set(m, values);
        m
    }

    #[test]
    fn test_multiply_by_identity_is_noop() {
        let mut arena = Mat4Arena::new();
        let m = filled(
            &mut arena,
            [
                1.0, 2.0, 3.0, 4.0, //
                5.0, 6.0, 7.0, 8.0, //
                9.0, 10.0, 11.0, 12.0, //
                13.0, 14.0, 15.0, 16.0,
            ],
        );
        let identity = arena.allocate_identity();
        let out = arena.allocate(1);

        arena.mat_mul(m, identity, out);
        assert!(arena.approx_eq(out, m));
    }

    #[test]
    fn test_transpose_twice_is_identity_operation() {
        let mut arena = Mat4Arena::new();
        let m = filled(
            &mut arena,
            [
                0.5, 2.0, -3.0, 4.0, //
                5.0, -6.5, 7.0, 8.0, //
                9.0, 10.0, 11.25, 12.0, //
                13.0, 14.0, 15.0, -16.0,
            ],
        );
        let original = arena.duplicate(m);

        arena.transpose_assign(m);
        arena.transpose_assign(m);
        assert!(arena.approx_eq(m, original));
    }

    #[test]
    fn test_transpose_out_of_place_aliasing_falls_back() {
        let mut arena = Mat4Arena::new();
        let m = filled(
            &mut arena,
            [
                1.0, 2.0, 0.0, 0.0, //
                3.0, 4.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        );
        arena.transpose(m, m);
        assert_eq!(arena.at(m, 0, 1), 3.0);
        assert_eq!(arena.at(m, 1, 0), 2.0);
    }

    #[test]
    #[should_panic(expected = "must not alias")]
    fn test_mat_mul_aliasing_output_panics() {
        let mut arena = Mat4Arena::new();
        let a = arena.allocate_identity();
        let b = arena.allocate_identity();
        arena.mat_mul(a, b, a);
    }

    #[test]
    fn test_row_vector_translation() {
        let mut arena = Mat4Arena::new();
        let mut vectors = crate::arena::Vec4Arena::new();

        // Row-vector translation lives in the fourth row.
        let m = arena.allocate_identity();
        arena.set_at(m, 3, 0, 10.0);
        arena.set_at(m, 3, 1, 20.0);
        arena.set_at(m, 3, 2, 30.0);

        let v = vectors.allocate(1);
        vectors.set(v, [1.0, 2.0, 3.0, 1.0]);
        arena.transform_vec4(m, &mut vectors, v, v);

        assert_eq!(vectors.get(v), [11.0, 22.0, 33.0, 1.0]);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let mut arena = Mat4Arena::new();
        let mut vectors = crate::arena::Vec3Arena::new();

        let m = arena.allocate_identity();
        arena.set_at(m, 3, 0, 10.0);

        let d = vectors.allocate(1);
        vectors.set(d, [1.0, 0.0, 0.0]);
        arena.transform_dir3(m, &mut vectors, d, d);
        assert_eq!(vectors.get(d), [1.0, 0.0, 0.0]);

        let p = vectors.allocate(1);
        vectors.set(p, [1.0, 0.0, 0.0]);
        arena.transform_point3(m, &mut vectors, p, p);
        assert_eq!(vectors.get(p), [11.0, 0.0, 0.0]);
    }

    #[test]
    fn test_load_mat4_matches_external_convention() {
        let mut arena = Mat4Arena::new();
        let mut vectors = crate::arena::Vec4Arena::new();

        // A translation in nalgebra's column-vector convention...
        let external = math::mat4_from_translation(math::Vec3::new(5.0, 6.0, 7.0));
        let m = arena.allocate(1);
        arena.load_mat4(m, &external);

        // ...must move points identically through the row-vector multiply.
        let v = vectors.allocate(1);
        vectors.set(v, [1.0, 1.0, 1.0, 1.0]);
        arena.transform_vec4(m, &mut vectors, v, v);
        assert_eq!(vectors.get(v), [6.0, 7.0, 8.0, 1.0]);

        // Round-trips back out unchanged.
        let restored = arena.store_mat4(m);
        assert_eq!(restored, external);
    }

    #[test]
    fn test_mat_mul_composes_left_to_right() {
        let mut arena = Mat4Arena::new();
        let mut vectors = crate::arena::Vec4Arena::new();

        let translate = arena.allocate_identity();
        arena.set_at(translate, 3, 0, 1.0);

        let scale = arena.allocate_identity();
        arena.set_at(scale, 0, 0, 2.0);

        // Translate first, then scale: (0 + 1) * 2 == 2.
        let combined = arena.allocate(1);
        arena.mat_mul(translate, scale, combined);

        let v = vectors.allocate(1);
        vectors.set(v, [0.0, 0.0, 0.0, 1.0]);
        arena.transform_vec4(combined, &mut vectors, v, v);
        assert_eq!(vectors.get(v)[0], 2.0);
    }
}
