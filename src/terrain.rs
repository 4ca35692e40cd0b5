use std::sync::Arc;

use log::info;
use noise::NoiseFn;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::perlin::NoiseField;

/// One noise layer: sample at `coordinate * scale`, contribute `value * weight`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Octave {
    pub scale: f64,
    pub weight: f64,
}

impl Octave {
    pub const fn new(scale: f64, weight: f64) -> Self {
        Self { scale, weight }
    }

    pub fn sample<N: NoiseFn<f64, 2>>(&self, field: &N, x: f64, y: f64) -> f64 {
        field.get([x * self.scale, y * self.scale]) * self.weight
    }
}

/// How the weighted octave sum is turned into a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Use the weighted sum as is.
    None,
    /// `(sum + 1) / 2`, applied on top of the per-sample `[0, 1]` remap.
    Remap,
}

/// Neighborhood smoothness rule for walls: every cell within `radius`
/// (Chebyshev distance) must differ from the center by at most `tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Continuity {
    pub radius: i32,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub wall: f64,
    pub water: f64,
    pub mountain: f64,
    pub forest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    pub octaves: Vec<Octave>,
    pub normalization: Normalization,
    pub thresholds: Thresholds,
    pub continuity: Option<Continuity>,
}

impl TerrainParams {
    /// One noise layer at scale 0.1, thresholds read straight off the sample.
    pub fn single_noise() -> Self {
        Self {
            octaves: vec![Octave::new(0.1, 1.0)],
            normalization: Normalization::None,
            thresholds: Thresholds {
                wall: 0.85,
                water: 0.3,
                mountain: 0.7,
                forest: 0.55,
            },
            continuity: None,
        }
    }

    /// Base, detail and ridge layers with the double `[0, 1]` remap.
    pub fn multi_octave() -> Self {
        Self {
            octaves: vec![
                Octave::new(0.05, 1.0),
                Octave::new(0.2, 0.1),
                Octave::new(0.02, 0.6),
            ],
            normalization: Normalization::Remap,
            thresholds: Thresholds {
                wall: 0.95,
                water: 0.6,
                mountain: 0.9,
                forest: 0.8,
            },
            continuity: Some(Continuity {
                radius: 1,
                tolerance: 0.3,
            }),
        }
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self::multi_octave()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerrainClass {
    Wall,
    Water,
    Mountain,
    Forest,
    Floor,
}

impl TerrainClass {
    /// Style registry key for this class.
    pub fn style_key(self) -> &'static str {
        match self {
            TerrainClass::Wall => "wall",
            TerrainClass::Water => "water",
            TerrainClass::Mountain => "mountain",
            TerrainClass::Forest => "forest",
            TerrainClass::Floor => "floor",
        }
    }
}

/// Scalar height field over one noise layer per octave.
///
/// Layer `k` is seeded with `seed + k`. Reseeding builds fresh layers and
/// swaps the `Arc`s; snapshots taken with [`TerrainField::layers`] keep
/// reading the old tables.
pub struct TerrainField {
    params: TerrainParams,
    layers: Vec<Arc<NoiseField>>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl TerrainField {
    pub fn new(seed: u64, params: TerrainParams) -> Self {
        let layers = build_layers(seed, params.octaves.len());
        info!(
            "terrain field seeded with {} ({} octaves)",
            seed,
            params.octaves.len()
        );
        Self {
            params,
            layers,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Seed of the current layout.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layers(&self) -> Vec<Arc<NoiseField>> {
        self.layers.clone()
    }

    /// Replace every layer with one built from a seed drawn from the session
    /// generator. Octaves and thresholds are kept.
    pub fn reseed(&mut self) -> u64 {
        let seed = self.rng.gen::<u64>();
        self.replace_layers(seed);
        seed
    }

    /// Rebuild from a known seed. The session generator is left alone.
    pub fn reseed_with(&mut self, seed: u64) {
        self.replace_layers(seed);
    }

    fn replace_layers(&mut self, seed: u64) {
        self.layers = build_layers(seed, self.params.octaves.len());
        self.seed = seed;
        info!("terrain field reseeded with {}", seed);
    }

    pub fn height(&self, x: f64, y: f64) -> f64 {
        let combined: f64 = self
            .params
            .octaves
            .iter()
            .zip(&self.layers)
            .map(|(octave, field)| octave.sample(&**field, x, y))
            .sum();

        match self.params.normalization {
            Normalization::None => combined,
            Normalization::Remap => (combined + 1.0) * 0.5,
        }
    }

    pub fn is_wall(&self, x: f64, y: f64) -> bool {
        let height = self.height(x, y);
        if height <= self.params.thresholds.wall {
            return false;
        }
        match self.params.continuity {
            Some(rule) => is_smooth(height, rule, x, y, |nx, ny| self.height(nx, ny)),
            None => true,
        }
    }

    pub fn is_water(&self, x: f64, y: f64) -> bool {
        self.height(x, y) < self.params.thresholds.water
    }

    pub fn is_mountain(&self, x: f64, y: f64) -> bool {
        let t = &self.params.thresholds;
        let h = self.height(x, y);
        t.mountain < h && h <= t.wall
    }

    pub fn is_forest(&self, x: f64, y: f64) -> bool {
        let t = &self.params.thresholds;
        let h = self.height(x, y);
        t.forest < h && h <= t.mountain
    }

    pub fn classify(&self, x: f64, y: f64) -> TerrainClass {
        let t = &self.params.thresholds;
        let h = self.height(x, y);
        if self.is_wall(x, y) {
            TerrainClass::Wall
        } else if h < t.water {
            TerrainClass::Water
        } else if t.mountain < h && h <= t.wall {
            TerrainClass::Mountain
        } else if t.forest < h && h <= t.mountain {
            TerrainClass::Forest
        } else {
            TerrainClass::Floor
        }
    }
}

fn build_layers(seed: u64, count: usize) -> Vec<Arc<NoiseField>> {
    (0..count as u64)
        .map(|k| Arc::new(NoiseField::new(seed.wrapping_add(k))))
        .collect()
}

/// True when every neighbor within `rule.radius` of `(x, y)` has a value
/// within `rule.tolerance` of `center`.
pub(crate) fn is_smooth<F>(center: f64, rule: Continuity, x: f64, y: f64, value_at: F) -> bool
where
    F: Fn(f64, f64) -> f64,
{
    for dx in -rule.radius..=rule.radius {
        for dy in -rule.radius..=rule.radius {
            if dx == 0 && dy == 0 {
                continue;
            }
            let neighbor = value_at(x + dx as f64, y + dy as f64);
            if (neighbor - center).abs() > rule.tolerance {
                return false;
            }
        }
    }
    true
}
