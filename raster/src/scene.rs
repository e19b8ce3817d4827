//! Scene contract: meshes, their storage, and placed instances.
//!
//! Transform propagation lives outside this system — a scene graph supplies
//! each instance's model-to-world matrix and notifies when it changed
//! ([`MeshInstance::set_model_to_world`]). The pipeline only consumes the
//! resulting matrix.

use glimmer_core::arena::ArenaSet;
use glimmer_core::error::MeshError;
use glimmer_core::math::Mat4;
use glimmer_core::mesh::inputs::MeshInputs;
use glimmer_core::mesh::options::MeshOptions;
use glimmer_core::mesh::Mesh;

/// A placed copy of a mesh.
#[derive(Debug)]
pub struct MeshInstance {
    mesh: usize,
    model_to_world: Mat4,
    refresh: bool,
}

impl MeshInstance {
    /// The index of the mesh this instance renders.
    pub fn mesh(&self) -> usize {
        self.mesh
    }

    /// The current model-to-world matrix.
    pub fn model_to_world(&self) -> &Mat4 {
        &self.model_to_world
    }

    /// Replace the model-to-world matrix (scene-graph notification).
    pub fn set_model_to_world(&mut self, matrix: Mat4) {
        self.model_to_world = matrix;
        self.refresh = true;
    }

    /// Consume the refresh notification; true when the matrix changed since
    /// the last call.
    pub(crate) fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh)
    }
}

/// The renderable content of one frame: loaded meshes over their arena set,
/// plus instances placing them in the world.
#[derive(Debug, Default)]
pub struct Scene {
    /// Attribute storage shared by every mesh in the scene.
    pub arenas: ArenaSet,
    meshes: Vec<Mesh>,
    instances: Vec<MeshInstance>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mesh into the scene, returning its index.
    pub fn add_mesh(&mut self, inputs: MeshInputs, options: MeshOptions) -> Result<usize, MeshError> {
        let mesh = Mesh::load(inputs, options, &mut self.arenas)?;
        self.meshes.push(mesh);
        Ok(self.meshes.len() - 1)
    }

    /// Place an instance of mesh `mesh` with the given model-to-world
    /// matrix, returning the instance index.
    pub fn add_instance(&mut self, mesh: usize, model_to_world: Mat4) -> usize {
        self.instances.push(MeshInstance {
            mesh,
            model_to_world,
            refresh: true,
        });
        self.instances.len() - 1
    }

    /// The loaded meshes.
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// A mesh by index.
    pub fn mesh(&self, index: usize) -> &Mesh {
        &self.meshes[index]
    }

    /// The placed instances.
    pub fn instances(&self) -> &[MeshInstance] {
        &self.instances
    }

    /// A placed instance by index, for transform updates.
    pub fn instance_mut(&mut self, index: usize) -> &mut MeshInstance {
        &mut self.instances[index]
    }

    pub(crate) fn instances_mut(&mut self) -> &mut [MeshInstance] {
        &mut self.instances
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_core::math;
    use glimmer_core::mesh::generators;

    #[test]
    fn test_scene_holds_meshes_and_instances() {
        let mut scene = Scene::new();
        let cube = scene
            .add_mesh(generators::cube(), generators::cube_options())
            .unwrap();
        let instance = scene.add_instance(cube, Mat4::identity());

        assert_eq!(scene.meshes().len(), 1);
        assert_eq!(scene.mesh(cube).face_count(), 12);
        assert_eq!(scene.instances()[instance].mesh(), cube);
    }

    #[test]
    fn test_instance_refresh_notification() {
        let mut scene = Scene::new();
        let cube = scene
            .add_mesh(generators::cube(), generators::cube_options())
            .unwrap();
        let index = scene.add_instance(cube, Mat4::identity());

        // Fresh instances report once, then stay quiet.
        assert!(scene.instance_mut(index).take_refresh());
        assert!(!scene.instance_mut(index).take_refresh());

        scene
            .instance_mut(index)
            .set_model_to_world(math::mat4_from_translation(math::Vec3::new(0.0, 0.0, 3.0)));
        assert!(scene.instance_mut(index).take_refresh());
    }
}
