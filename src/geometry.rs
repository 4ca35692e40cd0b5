use glam::Vec3;

use crate::scene::Mesh;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.to_array(),
        }
    }

    pub const fn xy(x: f32, y: f32) -> Self {
        Self {
            position: [x, y, 0.0],
        }
    }
}

// cos(30 deg), as used for the flat-topped hexagon corners
const HEX_COS: f32 = 0.866;
const HEX_RADIUS: f32 = 0.5;

pub struct Geometry;

impl Geometry {
    pub fn triangle() -> Mesh {
        Mesh::new(vec![
            Vertex::xy(-0.5, -0.5),
            Vertex::xy(0.5, -0.5),
            Vertex::xy(0.0, 0.5),
        ])
    }

    /// Unit square centered on the origin, two triangles.
    pub fn rectangle() -> Mesh {
        Mesh::new(vec![
            // First triangle
            Vertex::xy(-0.5, 0.5),
            Vertex::xy(-0.5, -0.5),
            Vertex::xy(0.5, -0.5),
            // Second triangle
            Vertex::xy(-0.5, 0.5),
            Vertex::xy(0.5, -0.5),
            Vertex::xy(0.5, 0.5),
        ])
    }

    /// Six triangles fanned around the center, radius 0.5.
    pub fn hexagon() -> Mesh {
        let r = HEX_RADIUS;
        let corners = [
            Vec3::new(0.0, r, 0.0),
            Vec3::new(r * HEX_COS, r * 0.5, 0.0),
            Vec3::new(r * HEX_COS, -r * 0.5, 0.0),
            Vec3::new(0.0, -r, 0.0),
            Vec3::new(-r * HEX_COS, -r * 0.5, 0.0),
            Vec3::new(-r * HEX_COS, r * 0.5, 0.0),
        ];

        let vertices = (0..corners.len())
            .flat_map(|i| {
                let next = corners[(i + 1) % corners.len()];
                [
                    Vertex::new(Vec3::ZERO),
                    Vertex::new(corners[i]),
                    Vertex::new(next),
                ]
            })
            .collect();

        Mesh::new(vertices)
    }
}
