//! Camera: lense and frustum parameters with per-frame change tracking.
//!
//! The camera's world transform arrives from the scene-graph collaborator
//! as a `nalgebra` matrix; everything derived from it (view matrix,
//! projection, screen mapping) is recomputed only when the corresponding
//! dirty flag is set. The pipeline polls [`Camera::poll`] exactly once per
//! frame and receives the set of changes to apply.

use glimmer_core::arena::{Mat4Arena, Mat4Slot};
use glimmer_core::math::Mat4;

/// Perspective lense parameters.
///
/// Field of view and focal length are two views of the same quantity
/// (`focal_length = 1 / tan(fov / 2)`); setting either keeps the other in
/// sync. Zoom scales the focal length without touching it.
#[derive(Debug, Clone, Copy)]
pub struct Lense {
    fov: f32,
    focal_length: f32,
    zoom: f32,
}

impl Lense {
    /// 90 degree field of view, unit zoom.
    pub fn new() -> Self {
        Self {
            fov: std::f32::consts::FRAC_PI_2,
            focal_length: 1.0,
            zoom: 1.0,
        }
    }

    /// Vertical field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Focal length derived from the field of view.
    pub fn focal_length(&self) -> f32 {
        self.focal_length
    }

    /// Zoom factor applied on top of the focal length.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.focal_length = 1.0 / (fov * 0.5).tan();
    }

    fn set_focal_length(&mut self, focal_length: f32) {
        self.focal_length = focal_length;
        self.fov = 2.0 * (1.0 / focal_length).atan();
    }
}

impl Default for Lense {
    fn default() -> Self {
        Self::new()
    }
}

/// View frustum bounds.
#[derive(Debug, Clone, Copy)]
pub struct ViewFrustum {
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
    /// Width over height, updated from the viewport each frame.
    pub aspect: f32,
}

impl Default for ViewFrustum {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
        }
    }
}

/// The changes a frame must react to, returned by [`Camera::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraChanges {
    /// The camera moved: the view matrix needs recomputing.
    pub view: bool,
    /// Projection parameters changed: the projection matrix needs
    /// recomputing.
    pub projection: bool,
    /// The viewport was resized: screen mapping and depth buffer need
    /// rebuilding.
    pub resized: bool,
}

impl CameraChanges {
    /// Everything at once — the state of a freshly created camera.
    fn all() -> Self {
        Self {
            view: true,
            projection: true,
            resized: true,
        }
    }
}

/// A perspective camera with dirty-flag change tracking.
#[derive(Debug)]
pub struct Camera {
    world_transform: Mat4,
    lense: Lense,
    frustum: ViewFrustum,
    viewport: (u32, u32),
    pending: CameraChanges,
}

impl Camera {
    /// Create a camera at the world origin looking down +Z.
    pub fn new() -> Self {
        Self {
            world_transform: Mat4::identity(),
            lense: Lense::new(),
            frustum: ViewFrustum::default(),
            viewport: (0, 0),
            pending: CameraChanges::all(),
        }
    }

    /// The lense parameters.
    pub fn lense(&self) -> &Lense {
        &self.lense
    }

    /// The frustum bounds.
    pub fn frustum(&self) -> &ViewFrustum {
        &self.frustum
    }

    /// Replace the camera's model-to-world matrix (scene-graph contract:
    /// the collaborator notifies by calling this).
    pub fn set_world_transform(&mut self, matrix: Mat4) {
        self.world_transform = matrix;
        self.pending.view = true;
    }

    /// Set the vertical field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.lense.set_fov(fov);
        self.pending.projection = true;
    }

    /// Set the focal length directly.
    pub fn set_focal_length(&mut self, focal_length: f32) {
        self.lense.set_focal_length(focal_length);
        self.pending.projection = true;
    }

    /// Set the zoom factor.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.lense.zoom = zoom;
        self.pending.projection = true;
    }

    /// Set the near plane distance.
    pub fn set_near(&mut self, near: f32) {
        self.frustum.near = near;
        self.pending.projection = true;
    }

    /// Set the far plane distance.
    pub fn set_far(&mut self, far: f32) {
        self.frustum.far = far;
        self.pending.projection = true;
    }

    /// Poll and reset the pending changes, folding in the viewport size.
    ///
    /// Called once per frame by the pipeline. A viewport change also marks
    /// the projection dirty, since the aspect ratio feeds it.
    pub fn poll(&mut self, width: u32, height: u32) -> CameraChanges {
        if (width, height) != self.viewport {
            self.viewport = (width, height);
            self.frustum.aspect = width as f32 / height.max(1) as f32;
            self.pending.resized = true;
            self.pending.projection = true;
        }
        std::mem::take(&mut self.pending)
    }

    /// The world-to-view matrix: the inverse of the camera's world
    /// transform. A singular transform (zero scale) falls back to identity.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_transform.try_inverse().unwrap_or_else(|| {
            log::warn!("camera world transform is singular, using identity view");
            Mat4::identity()
        })
    }

    /// Write the view-to-clip projection into lane matrix storage.
    ///
    /// Row-vector perspective that preserves view depth: `x' = x·f/aspect`,
    /// `y' = y·f`, `z' = z`, `w' = z` with `f = zoom · focal_length`. Depth
    /// therefore survives into clip space for the near clip and frustum
    /// tests, and the perspective divide later turns it into the
    /// reciprocal-depth value the depth buffer compares.
    pub fn write_projection(&self, matrices: &mut Mat4Arena, target: Mat4Slot) {
        let f = self.lense.zoom * self.lense.focal_length;
        #[rustfmt::skip]
        matrices.set(target, [
            f / self.frustum.aspect, 0.0, 0.0, 0.0,
            0.0,                     f,   0.0, 0.0,
            0.0,                     0.0, 1.0, 1.0,
            0.0,                     0.0, 0.0, 0.0,
        ]);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::arena::Vec4Arena;
    use glimmer_core::math;

    #[test]
    fn test_fresh_camera_reports_everything_changed() {
        let mut camera = Camera::new();
        let changes = camera.poll(640, 480);
        assert!(changes.view && changes.projection && changes.resized);

        // Nothing pending on the next frame.
        let changes = camera.poll(640, 480);
        assert_eq!(changes, CameraChanges::default());
    }

    #[test]
    fn test_resize_marks_projection_dirty() {
        let mut camera = Camera::new();
        let _ = camera.poll(640, 480);

        let changes = camera.poll(800, 600);
        assert!(changes.resized);
        assert!(changes.projection);
        assert!(!changes.view);
        assert!((camera.frustum().aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_marks_view_dirty_only() {
        let mut camera = Camera::new();
        let _ = camera.poll(640, 480);

        camera.set_world_transform(math::mat4_from_translation(math::Vec3::new(0.0, 0.0, -5.0)));
        let changes = camera.poll(640, 480);
        assert!(changes.view);
        assert!(!changes.projection);
        assert!(!changes.resized);
    }

    #[test]
    fn test_lense_fov_focal_length_coupling() {
        let mut camera = Camera::new();
        camera.set_fov(std::f32::consts::FRAC_PI_2);
        assert!((camera.lense().focal_length() - 1.0).abs() < 1e-6);

        camera.set_focal_length(2.0);
        let expected_fov = 2.0 * (0.5f32).atan();
        assert!((camera.lense().fov() - expected_fov).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_inverts_world_transform() {
        let mut camera = Camera::new();
        let world = math::mat4_from_translation(math::Vec3::new(1.0, 2.0, 3.0));
        camera.set_world_transform(world);

        let product = camera.view_matrix() * world;
        assert!((product - Mat4::identity()).norm() < 1e-5);
    }

    #[test]
    fn test_projection_preserves_view_depth() {
        let mut camera = Camera::new();
        let _ = camera.poll(100, 100); // square viewport, aspect 1

        let mut matrices = Mat4Arena::new();
        let mut vectors = Vec4Arena::new();
        let projection = matrices.allocate(1);
        camera.write_projection(&mut matrices, projection);

        let v = vectors.allocate(1);
        vectors.set(v, [1.0, 2.0, 4.0, 1.0]);
        matrices.transform_vec4(projection, &mut vectors, v, v);

        let [x, y, z, w] = vectors.get(v);
        assert_eq!(z, 4.0, "clip z carries view depth");
        assert_eq!(w, 4.0, "clip w carries view depth");
        // 90 degree fov: x and y pass through the unit focal length.
        assert_eq!(x, 1.0);
        assert_eq!(y, 2.0);
    }
}
