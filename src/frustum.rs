use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumPlane {
    Left = 0,
    Right = 1,
    Bottom = 2,
    Top = 3,
    Near = 4,
    Far = 5,
}

/// Six clip planes as `(nx, ny, nz, d)`; a point `p` is on the inner side of
/// a plane when `n . p + d >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb-Hartmann extraction from a view-projection matrix. Each plane is
    /// divided by the length of its normal.
    pub fn from_matrix(view_projection: &Mat4) -> Self {
        let m = view_projection;
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));

        let planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ]
        .map(|plane| plane / plane.truncate().length());

        Self { planes }
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    pub fn plane(&self, which: FrustumPlane) -> Vec4 {
        self.planes[which as usize]
    }

    /// Conservative sphere test: rejects only spheres lying entirely behind
    /// some plane, so spheres near corners may pass while still invisible.
    pub fn contains_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w + radius >= 0.0)
    }
}
