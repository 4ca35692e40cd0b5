//! Tile-map sandbox: seeded Perlin terrain with biome and resource
//! classification, viewed through an orthographic camera that culls against
//! its frustum.

pub mod camera;
pub mod config;
pub mod error;
pub mod frustum;
pub mod geometry;
pub mod perlin;
pub mod registry;
pub mod renderer;
pub mod scene;
pub mod terrain;
pub mod tile_map;
pub mod world_gen;

pub use camera::OrthoCamera;
pub use config::{MapMode, SandboxConfig};
pub use error::{Error, Result};
pub use frustum::{Frustum, FrustumPlane};
pub use perlin::NoiseField;
pub use terrain::{TerrainClass, TerrainField, TerrainParams};
pub use world_gen::{BiomeType, ResourceType, Tile, WorldGenerator};
