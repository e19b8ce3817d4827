//! The per-frame raster pipeline.
//!
//! One [`RasterPipeline::render`] call runs the whole pass synchronously:
//!
//! 1. Poll the camera; recompute world→view, view→clip, world→clip and
//!    NDC→screen matrices only for the flags that changed, and reallocate
//!    the depth buffer on viewport resize.
//! 2. Per instance: model→clip = model→world × world→clip.
//! 3. Per face: transform to clip space, frustum cull, back-face cull,
//!    near-plane clip, flat shade, perspective divide, screen scale.
//! 4. Sort all surviving screen triangles back to front by average
//!    view-space depth (painter first, depth test second).
//! 5. Clear the sink and depth buffer, then scanline-fill in order.
//!
//! All scratch state (matrices, working triangles, the raster queue) is
//! pipeline-owned and reused every frame.

use glimmer_core::arena::{ArenaSet, Mat4Slot, Vec4Slot};
use glimmer_core::mesh::Mesh;

use crate::camera::Camera;
use crate::clipper::clip_to_near_plane;
use crate::framebuffer::{DepthBuffer, FrameSink};
use crate::scanline::{fill_triangle, painter_order, ScreenTriangle};
use crate::scene::Scene;
use crate::triangle::{is_back_face, Triangle, VertexCarry};

/// Minimum flat-shading intensity, so faces turned away from the light
/// stay visible.
const AMBIENT_INTENSITY: f32 = 0.1;

/// The software rasterizer's per-frame orchestrator.
#[derive(Debug)]
pub struct RasterPipeline {
    scratch: ArenaSet,

    world_to_view: Mat4Slot,
    view_to_clip: Mat4Slot,
    world_to_clip: Mat4Slot,
    model_to_clip: Mat4Slot,
    ndc_to_screen: Mat4Slot,
    instance_matrices: Vec<Mat4Slot>,

    light_direction: Vec4Slot,
    eye: Vec4Slot,
    face_normal: Vec4Slot,

    tri_clip: Triangle,
    tri_extra: Triangle,
    tri_ndc: Triangle,

    queue: Vec<ScreenTriangle>,
    depth: DepthBuffer,
    viewport: (u32, u32),
}

impl RasterPipeline {
    /// Create a pipeline with its scratch storage.
    pub fn new() -> Self {
        let mut scratch = ArenaSet::new();

        let world_to_view = scratch.mat4.allocate_identity();
        let view_to_clip = scratch.mat4.allocate_identity();
        let world_to_clip = scratch.mat4.allocate_identity();
        let model_to_clip = scratch.mat4.allocate_identity();
        let ndc_to_screen = scratch.mat4.allocate_identity();

        let light_direction = scratch.vec4.allocate(1);
        scratch.vec4.set(light_direction, [0.0, 0.0, -1.0, 0.0]);

        let eye = scratch.vec4.allocate(1);
        scratch.vec4.set(eye, [0.0, 0.0, 0.0, 0.0]);

        let face_normal = scratch.vec4.allocate(1);

        let tri_clip = Triangle::allocate(&mut scratch);
        let tri_extra = Triangle::allocate(&mut scratch);
        let tri_ndc = Triangle::allocate(&mut scratch);

        Self {
            scratch,
            world_to_view,
            view_to_clip,
            world_to_clip,
            model_to_clip,
            ndc_to_screen,
            instance_matrices: Vec::new(),
            light_direction,
            eye,
            face_normal,
            tri_clip,
            tri_extra,
            tri_ndc,
            queue: Vec::new(),
            depth: DepthBuffer::new(),
            viewport: (0, 0),
        }
    }

    /// Number of screen triangles rasterized by the last pass.
    pub fn rasterized_triangle_count(&self) -> usize {
        self.queue.len()
    }

    /// Render one frame of `scene` through `camera` into `sink`.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        camera: &mut Camera,
        width: u32,
        height: u32,
        sink: &mut dyn FrameSink,
    ) {
        let changes = camera.poll(width, height);

        if changes.view {
            let view = camera.view_matrix();
            self.scratch.mat4.load_mat4(self.world_to_view, &view);
        }
        if changes.projection {
            camera.write_projection(&mut self.scratch.mat4, self.view_to_clip);

            // The eye through the projection anchors the back-face test.
            self.scratch.vec4.set(self.eye, [0.0, 0.0, 0.0, 1.0]);
            self.scratch
                .mat4
                .transform_vec4(self.view_to_clip, &mut self.scratch.vec4, self.eye, self.eye);
        }
        if changes.view || changes.projection {
            self.scratch
                .mat4
                .mat_mul(self.world_to_view, self.view_to_clip, self.world_to_clip);
        }
        if changes.resized {
            let half_width = width as f32 * 0.5;
            let half_height = height as f32 * 0.5;
            self.scratch.mat4.set_identity(self.ndc_to_screen);
            self.scratch.mat4.set_at(self.ndc_to_screen, 0, 0, half_width);
            self.scratch.mat4.set_at(self.ndc_to_screen, 1, 1, -half_height);
            self.scratch.mat4.set_at(self.ndc_to_screen, 3, 0, half_width);
            self.scratch.mat4.set_at(self.ndc_to_screen, 3, 1, half_height);

            self.depth.ensure_size(width, height);
            self.viewport = (width, height);
            log::debug!("viewport resized to {width}x{height}");
        }

        self.sync_instance_matrices(scene);

        let near = camera.frustum().near;
        let far = camera.frustum().far;

        self.queue.clear();
        for index in 0..scene.instances().len() {
            let instance = &scene.instances()[index];
            let mesh = scene.mesh(instance.mesh());

            // Model space straight to clip space in one matrix.
            self.scratch.mat4.mat_mul(
                self.instance_matrices[index],
                self.world_to_clip,
                self.model_to_clip,
            );

            self.tri_clip.carry = VertexCarry {
                normals: false,
                uvs: mesh.vertex.uvs.is_some(),
                colors: mesh.vertex.colors.is_some(),
            };

            for face in 0..mesh.face_count() {
                self.draw_face(&scene.arenas, mesh, face, near, far);
            }
        }

        // Painter first: farther triangles draw first, the depth test
        // settles the rest per pixel.
        self.queue.sort_by(painter_order);

        sink.clear();
        self.depth.clear();
        for triangle in &self.queue {
            fill_triangle(triangle, sink, &mut self.depth, width, height);
        }
    }

    /// Ensure every instance has an uploaded model-to-world matrix,
    /// re-uploading those whose scene-graph transform changed.
    fn sync_instance_matrices(&mut self, scene: &mut Scene) {
        for (index, instance) in scene.instances_mut().iter_mut().enumerate() {
            if index == self.instance_matrices.len() {
                self.instance_matrices.push(self.scratch.mat4.allocate(1));
            }
            if instance.take_refresh() {
                self.scratch
                    .mat4
                    .load_mat4(self.instance_matrices[index], instance.model_to_world());
            }
        }
    }

    /// Run one face through cull → clip → shade → project, queueing up to
    /// two screen triangles.
    fn draw_face(&mut self, arenas: &ArenaSet, mesh: &Mesh, face: usize, near: f32, far: f32) {
        let table = &mesh.face.vertices;

        // Build the clip-space triangle: positions through model→clip with
        // w = 1, carried attributes copied straight over.
        for corner in 0..3 {
            let source = mesh.vertex.positions.corner_slot(corner, face, table);
            let [x, y, z] = arenas.vec3.get(source);
            self.scratch
                .vec4
                .set(self.tri_clip.positions[corner], [x, y, z, 1.0]);

            if let Some(uvs) = &mesh.vertex.uvs {
                let value = arenas.vec2.get(uvs.corner_slot(corner, face, table));
                self.scratch.vec2.set(self.tri_clip.uvs[corner], value);
            }
            if let Some(colors) = &mesh.vertex.colors {
                let value = arenas.vec3.get(colors.corner_slot(corner, face, table));
                self.scratch.vec3.set(self.tri_clip.colors[corner], value);
            }
        }
        match &mesh.face.colors {
            Some(colors) => {
                let value = arenas.vec3.get(colors.slot(face));
                self.scratch.vec3.set(self.tri_clip.face_color, value);
            }
            None => self.scratch.vec3.set(self.tri_clip.face_color, [0.0; 3]),
        }

        self.tri_clip.transformed_by(
            &self.scratch.mat4,
            self.model_to_clip,
            &mut self.scratch.vec4,
            &self.tri_clip,
        );

        if self.tri_clip.is_out_of_view(&self.scratch.vec4, near, far) {
            return;
        }

        // The clip-space normal drives both culling and shading; it must be
        // recomputed here because the transform above is not
        // normal-preserving.
        self.tri_clip.normal(&mut self.scratch.vec4, self.face_normal);
        if is_back_face(&self.tri_clip, &mut self.scratch.vec4, self.eye, self.face_normal) {
            return;
        }

        let count = clip_to_near_plane(
            &self.tri_clip,
            &mut self.tri_extra,
            near,
            &mut self.scratch.vec4,
            &mut self.scratch.vec2,
            &mut self.scratch.vec3,
        );
        if count == 0 {
            return;
        }

        // Flat shade, unless an explicit face color sits at a pure primary
        // value — those bypass lighting.
        let intensity = self
            .scratch
            .vec4
            .dot3(self.light_direction, self.face_normal)
            .max(AMBIENT_INTENSITY);
        let color = if mesh.face.colors.is_some()
            && self.scratch.vec3.is_pure_primary(self.tri_clip.face_color)
        {
            self.scratch.vec3.get(self.tri_clip.face_color)
        } else {
            [intensity; 3]
        };

        let screen = project_to_screen(
            &mut self.scratch,
            &self.tri_ndc,
            self.ndc_to_screen,
            &self.tri_clip,
            color,
        );
        self.queue.push(screen);

        if count == 2 {
            let screen = project_to_screen(
                &mut self.scratch,
                &self.tri_ndc,
                self.ndc_to_screen,
                &self.tri_extra,
                color,
            );
            self.queue.push(screen);
        }
    }
}

impl Default for RasterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Perspective-divide a clip-space triangle and scale it to screen space,
/// reading the result out as a [`ScreenTriangle`].
///
/// After the divide the z channel holds reciprocal view depth
/// (nearer-is-greater) and w is 1, so the screen matrix translation applies
/// cleanly; the pre-divide w is kept alongside as the painter sort key.
fn project_to_screen(
    scratch: &mut ArenaSet,
    ndc: &Triangle,
    ndc_to_screen: Mat4Slot,
    tri: &Triangle,
    color: [f32; 3],
) -> ScreenTriangle {
    let mut screen = ScreenTriangle {
        x: [0.0; 3],
        y: [0.0; 3],
        depth: [0.0; 3],
        view_depth: [0.0; 3],
        u: [0.0; 3],
        v: [0.0; 3],
        color,
    };

    for corner in 0..3 {
        let [x, y, _z, w] = scratch.vec4.get(tri.positions[corner]);
        // w carries view depth and is >= near > 0 for clipped geometry.
        let inverse_depth = 1.0 / w;
        let position = ndc.positions[corner];
        scratch
            .vec4
            .set(position, [x * inverse_depth, y * inverse_depth, inverse_depth, 1.0]);
        scratch
            .mat4
            .transform_vec4(ndc_to_screen, &mut scratch.vec4, position, position);

        let [sx, sy, sz, _] = scratch.vec4.get(position);
        screen.x[corner] = sx;
        screen.y[corner] = sy;
        screen.depth[corner] = sz;
        screen.view_depth[corner] = w;

        if tri.carry.uvs {
            let [u, v] = scratch.vec2.get(tri.uvs[corner]);
            screen.u[corner] = u;
            screen.v[corner] = v;
        }
    }

    screen
}
