use glam::{Mat4, Vec2, Vec3};
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::frustum::Frustum;

/// Orthographic camera for the tile map.
///
/// Every mutator recomputes the matrices it touches and then the frustum, so
/// the camera can be queried right after any call.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    position: Vec3,
    rotation: Vec3,
    zoom: f32,
    aspect: f32,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
    frustum: Frustum,
}

impl OrthoCamera {
    pub const NEAR: f32 = -1.0;
    pub const FAR: f32 = 1.0;

    pub fn new(aspect: f32) -> Result<Self> {
        validate_aspect(aspect)?;
        let mut camera = Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            zoom: 1.0,
            aspect,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
            frustum: Frustum::from_matrix(&Mat4::IDENTITY),
        };
        camera.update_projection();
        camera.update_view();
        Ok(camera)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Half width and half height of the visible area in world units.
    pub fn half_extents(&self) -> Vec2 {
        let width = 2.0 / self.zoom;
        let height = width / self.aspect;
        Vec2::new(width / 2.0, height / 2.0)
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    /// Euler angles in radians, applied X, then Y, then Z.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_view();
    }

    pub fn move_by(&mut self, delta: Vec3) {
        self.position += delta;
        self.update_view();
    }

    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.update_view();
    }

    /// Larger zoom shows less of the world.
    pub fn set_zoom(&mut self, zoom: f32) -> Result<()> {
        if !(zoom.is_finite() && zoom > 0.0) {
            warn!("rejected camera zoom {}", zoom);
            return Err(Error::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        self.update_projection();
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<()> {
        validate_aspect(aspect)?;
        self.aspect = aspect;
        self.update_projection();
        Ok(())
    }

    pub fn is_in_frustum(&self, point: Vec3, radius: f32) -> bool {
        self.frustum.contains_sphere(point, radius)
    }

    /// Map a point in normalized device coordinates back to world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        self.view_projection.inverse().project_point3(ndc)
    }

    fn update_projection(&mut self) {
        let half = self.half_extents();
        self.projection = Mat4::orthographic_rh_gl(
            -half.x,
            half.x,
            -half.y,
            half.y,
            Self::NEAR,
            Self::FAR,
        );
        self.update_frustum();
    }

    fn update_view(&mut self) {
        self.view = Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
            * Mat4::from_translation(-self.position);
        self.update_frustum();
    }

    fn update_frustum(&mut self) {
        self.view_projection = self.projection * self.view;
        self.frustum = Frustum::from_matrix(&self.view_projection);
        debug!(
            "camera at {:?} rot {:?} zoom {} aspect {}",
            self.position, self.rotation, self.zoom, self.aspect
        );
    }
}

fn validate_aspect(aspect: f32) -> Result<()> {
    if aspect.is_finite() && aspect > 0.0 {
        Ok(())
    } else {
        warn!("rejected camera aspect ratio {}", aspect);
        Err(Error::InvalidAspectRatio(aspect))
    }
}
