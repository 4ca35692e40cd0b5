use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

use crate::camera::OrthoCamera;
use crate::geometry::Vertex;

/// Bounding radius assumed for every mesh when culling.
pub const CULL_RADIUS: f32 = 0.1;

/// A colored triangle list with a transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    color: Vec4,
    model: Mat4,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        let mut mesh = Self {
            vertices,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            color: Vec4::ONE,
            model: Mat4::IDENTITY,
        };
        mesh.update_model();
        mesh
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    /// Vertex positions after the model transform.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .iter()
            .map(move |vertex| self.model.transform_point3(Vec3::from_array(vertex.position)))
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_model();
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_model();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.update_model();
    }

    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Color as 8-bit RGB, alpha dropped.
    pub fn rgb(&self) -> [u8; 3] {
        let c = (self.color.truncate().clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8]
    }

    fn update_model(&mut self) {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        self.model = Mat4::from_scale_rotation_translation(self.scale, rotation, self.position);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

/// Ordered list of meshes; ids stay valid until their mesh is removed.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<(MeshId, Mesh)>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.push((id, mesh));
        id
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        let index = self.meshes.iter().position(|(mesh_id, _)| *mesh_id == id)?;
        Some(self.meshes.remove(index).1)
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.iter().find(|(mesh_id, _)| *mesh_id == id).map(|(_, mesh)| mesh)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes
            .iter_mut()
            .find(|(mesh_id, _)| *mesh_id == id)
            .map(|(_, mesh)| mesh)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter().map(|(_, mesh)| mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn clear(&mut self) {
        self.meshes.clear();
    }

    /// Meshes whose bounding sphere touches the camera frustum.
    pub fn visible<'a>(&'a self, camera: &'a OrthoCamera) -> impl Iterator<Item = &'a Mesh> + 'a {
        self.iter()
            .filter(move |mesh| camera.is_in_frustum(mesh.position(), CULL_RADIUS))
    }
}
