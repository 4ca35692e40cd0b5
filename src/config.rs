use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::terrain::TerrainParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    /// Biome map with walls and resources.
    Biome,
    /// Height-band map from the terrain field.
    Terrain,
}

impl MapMode {
    pub fn toggled(self) -> Self {
        match self {
            MapMode::Biome => MapMode::Terrain,
            MapMode::Terrain => MapMode::Biome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub zoom: f32,
    /// World units per key press, before dividing by zoom.
    pub move_step: f32,
    pub zoom_step: f32,
    /// Zoom keys never go past these bounds.
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Radians per key press.
    pub rotate_step: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 0.5,
            move_step: 0.1,
            zoom_step: 1.25,
            min_zoom: 0.05,
            max_zoom: 50.0,
            rotate_step: 0.1,
        }
    }
}

impl CameraConfig {
    /// Zoom after one zoom-in or zoom-out press from `current`, clamped to
    /// `min_zoom..=max_zoom`.
    pub fn step_zoom(&self, current: f32, zoom_in: bool) -> f32 {
        let next = if zoom_in {
            current * self.zoom_step
        } else {
            current / self.zoom_step
        };
        if next.is_nan() {
            return current;
        }
        next.max(self.min_zoom).min(self.max_zoom)
    }
}

/// Ring of animated hexagons drawn over the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRingConfig {
    pub count: usize,
    pub radius: f32,
}

impl Default for MeshRingConfig {
    fn default() -> Self {
        Self {
            count: 12,
            radius: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub seed: u64,
    /// Side of one map tile in world units.
    pub tile_size: f32,
    pub frame_millis: u64,
    pub map_mode: MapMode,
    pub camera: CameraConfig,
    pub mesh_ring: MeshRingConfig,
    pub terrain: TerrainParams,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            seed: 114514,
            tile_size: 0.05,
            frame_millis: 33,
            map_mode: MapMode::Biome,
            camera: CameraConfig::default(),
            mesh_ring: MeshRingConfig::default(),
            terrain: TerrainParams::default(),
        }
    }
}

impl SandboxConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
