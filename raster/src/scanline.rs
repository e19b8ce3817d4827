//! Scanline fill of screen-space triangles against the depth buffer.
//!
//! Triangles are filled top half then bottom half, split at the middle
//! vertex after sorting the three vertices by increasing y. Each scanline
//! steps x and the interpolated attributes (u, v, depth) linearly along the
//! long edge and the active short edge, then linearly across the span. The
//! depth channel holds reciprocal view depth (nearer-is-greater), so linear
//! interpolation in screen space is perspective-correct for the depth test:
//! a pixel is written only when its interpolated depth beats the stored
//! value.

use std::cmp::Ordering;

use bytemuck::{Pod, Zeroable};

use crate::framebuffer::{DepthBuffer, FrameSink, Rgba8};

/// A screen-space triangle ready for sorting and filling.
///
/// Copied out of lane storage once per surviving face (the raster queue is
/// reused across frames, so steady-state rendering stays allocation-free).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ScreenTriangle {
    /// Screen-space x per vertex.
    pub x: [f32; 3],
    /// Screen-space y per vertex.
    pub y: [f32; 3],
    /// Reciprocal view depth per vertex (nearer-is-greater).
    pub depth: [f32; 3],
    /// View-space depth per vertex, kept for painter ordering.
    pub view_depth: [f32; 3],
    /// Texture u per vertex.
    pub u: [f32; 3],
    /// Texture v per vertex.
    pub v: [f32; 3],
    /// Flat fill color.
    pub color: [f32; 3],
}

impl ScreenTriangle {
    /// Average view depth of the three vertices.
    pub fn average_view_depth(&self) -> f32 {
        (self.view_depth[0] + self.view_depth[1] + self.view_depth[2]) / 3.0
    }

    /// True when every coordinate and depth is finite.
    pub fn is_finite(&self) -> bool {
        self.x.iter().all(|c| c.is_finite())
            && self.y.iter().all(|c| c.is_finite())
            && self.depth.iter().all(|c| c.is_finite())
    }

    /// Twice the signed area in screen space; zero for degenerate
    /// triangles.
    pub fn doubled_area(&self) -> f32 {
        (self.x[1] - self.x[0]) * (self.y[2] - self.y[0])
            - (self.x[2] - self.x[0]) * (self.y[1] - self.y[0])
    }
}

/// Painter's-algorithm ordering: farther triangles (greater average
/// view depth) sort first, so they are drawn first and nearer ones paint
/// over them.
pub fn painter_order(a: &ScreenTriangle, b: &ScreenTriangle) -> Ordering {
    b.average_view_depth()
        .partial_cmp(&a.average_view_depth())
        .unwrap_or(Ordering::Equal)
}

/// Per-vertex values interpolated along edges and across spans.
#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f32,
    depth: f32,
    u: f32,
    v: f32,
}

fn edge_sample(tri: &ScreenTriangle, a: usize, b: usize, yf: f32) -> Sample {
    let dy = tri.y[b] - tri.y[a];
    let t = if dy.abs() < f32::EPSILON {
        0.0
    } else {
        ((yf - tri.y[a]) / dy).clamp(0.0, 1.0)
    };
    Sample {
        x: tri.x[a] + t * (tri.x[b] - tri.x[a]),
        depth: tri.depth[a] + t * (tri.depth[b] - tri.depth[a]),
        u: tri.u[a] + t * (tri.u[b] - tri.u[a]),
        v: tri.v[a] + t * (tri.v[b] - tri.v[a]),
    }
}

/// Fill one triangle, depth-testing every pixel.
///
/// Degenerate (zero-area) and non-finite triangles are skipped and logged;
/// a malformed primitive costs one triangle for one frame, never the frame.
pub fn fill_triangle(
    tri: &ScreenTriangle,
    sink: &mut dyn FrameSink,
    depth_buffer: &mut DepthBuffer,
    width: u32,
    height: u32,
) {
    if !tri.is_finite() {
        log::debug!("skipping triangle with non-finite coordinates");
        return;
    }
    if tri.doubled_area().abs() < f32::EPSILON {
        log::trace!("skipping zero-area triangle");
        return;
    }

    // Vertex indices sorted by increasing y: top, middle, bottom.
    let mut order = [0usize, 1, 2];
    order.sort_by(|a, b| {
        tri.y[*a]
            .partial_cmp(&tri.y[*b])
            .unwrap_or(Ordering::Equal)
    });
    let [top, middle, bottom] = order;

    let color = Rgba8::from_f32(tri.color[0], tri.color[1], tri.color[2]);

    let y_start = tri.y[top].ceil().max(0.0) as i64;
    let y_end = tri.y[bottom].floor().min(height as f32 - 1.0) as i64;

    for y in y_start..=y_end {
        let yf = y as f32;

        // Long edge spans the whole height; the short edge switches at the
        // middle vertex.
        let long = edge_sample(tri, top, bottom, yf);
        let short = if yf < tri.y[middle] {
            edge_sample(tri, top, middle, yf)
        } else {
            edge_sample(tri, middle, bottom, yf)
        };

        let (left, right) = if long.x <= short.x {
            (long, short)
        } else {
            (short, long)
        };

        let x_start = left.x.ceil().max(0.0) as i64;
        let x_end = right.x.floor().min(width as f32 - 1.0) as i64;
        let span = right.x - left.x;

        for x in x_start..=x_end {
            let t = if span.abs() < f32::EPSILON {
                0.0
            } else {
                (x as f32 - left.x) / span
            };
            let depth = left.depth + t * (right.depth - left.depth);
            if depth_buffer.test_and_set(x as u32, y as u32, depth) {
                sink.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Framebuffer;

    fn flat_triangle(depth: f32, color: [f32; 3]) -> ScreenTriangle {
        ScreenTriangle {
            x: [2.0, 14.0, 2.0],
            y: [2.0, 2.0, 14.0],
            depth: [depth; 3],
            view_depth: [1.0 / depth; 3],
            u: [0.0; 3],
            v: [0.0; 3],
            color,
        }
    }

    #[test]
    fn test_fill_covers_interior_pixels() {
        let mut fb = Framebuffer::new(16, 16);
        let mut depth = DepthBuffer::new();
        depth.ensure_size(16, 16);
        depth.clear();

        fill_triangle(&flat_triangle(0.5, [1.0, 1.0, 1.0]), &mut fb, &mut depth, 16, 16);

        assert!(fb.painted_pixels() > 0);
        assert_eq!(fb.pixel(3, 3), Rgba8::from_f32(1.0, 1.0, 1.0));
        // A corner outside the triangle stays clear.
        assert_eq!(fb.pixel(15, 15), Rgba8::BLACK);
    }

    #[test]
    fn test_depth_test_keeps_nearest_regardless_of_order() {
        let near = flat_triangle(0.7, [1.0, 0.0, 0.0]);
        let far = flat_triangle(0.3, [0.0, 1.0, 0.0]);
        let red = Rgba8::from_f32(1.0, 0.0, 0.0);

        for pair in [[&far, &near], [&near, &far]] {
            let mut fb = Framebuffer::new(16, 16);
            let mut depth = DepthBuffer::new();
            depth.ensure_size(16, 16);
            depth.clear();

            for tri in pair {
                fill_triangle(tri, &mut fb, &mut depth, 16, 16);
            }

            // The nearer (depth 0.7) triangle owns the pixel either way.
            assert_eq!(depth.at(4, 4), 0.7);
            assert_eq!(fb.pixel(4, 4), red);
        }
    }

    #[test]
    fn test_painter_order_sorts_farther_first() {
        let mut farther = flat_triangle(0.5, [0.0; 3]);
        farther.view_depth = [5.0; 3];
        let mut nearer = flat_triangle(0.5, [0.0; 3]);
        nearer.view_depth = [2.0; 3];

        let mut queue = vec![nearer, farther];
        queue.sort_by(painter_order);

        assert_eq!(queue[0].average_view_depth(), 5.0);
        assert_eq!(queue[1].average_view_depth(), 2.0);
    }

    #[test]
    fn test_degenerate_triangle_is_skipped() {
        let mut fb = Framebuffer::new(16, 16);
        let mut depth = DepthBuffer::new();
        depth.ensure_size(16, 16);
        depth.clear();

        let mut degenerate = flat_triangle(0.5, [1.0; 3]);
        degenerate.x = [4.0, 4.0, 4.0];
        degenerate.y = [2.0, 8.0, 14.0];
        fill_triangle(&degenerate, &mut fb, &mut depth, 16, 16);
        assert_eq!(fb.painted_pixels(), 0);
    }

    #[test]
    fn test_non_finite_triangle_is_skipped() {
        let mut fb = Framebuffer::new(16, 16);
        let mut depth = DepthBuffer::new();
        depth.ensure_size(16, 16);
        depth.clear();

        let mut bad = flat_triangle(0.5, [1.0; 3]);
        bad.x[1] = f32::NAN;
        fill_triangle(&bad, &mut fb, &mut depth, 16, 16);
        assert_eq!(fb.painted_pixels(), 0);
    }

    #[test]
    fn test_fill_clamps_to_viewport() {
        let mut fb = Framebuffer::new(8, 8);
        let mut depth = DepthBuffer::new();
        depth.ensure_size(8, 8);
        depth.clear();

        // Extends well past every edge; must not panic or wrap.
        let huge = ScreenTriangle {
            x: [-20.0, 30.0, -20.0],
            y: [-20.0, 4.0, 30.0],
            depth: [0.5; 3],
            view_depth: [2.0; 3],
            u: [0.0; 3],
            v: [0.0; 3],
            color: [1.0, 1.0, 1.0],
        };
        fill_triangle(&huge, &mut fb, &mut depth, 8, 8);
        assert!(fb.painted_pixels() > 0);
    }
}
