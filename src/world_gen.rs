use std::sync::Arc;

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::perlin::NoiseField;
use crate::terrain::{is_smooth, Continuity, Octave};

const BIOME_SCALE: f64 = 0.05;
const MOUNTAIN_SCALE: f64 = 0.1;
const MOUNTAIN_OFFSET: f64 = 1000.0;
const MOUNTAIN_CUTOFF: f64 = 0.7;

const BASE: Octave = Octave::new(0.05, 1.0);
const MOUNTAIN_DETAIL: Octave = Octave::new(0.2, 0.3);
const MOUNTAIN_RIDGE: Octave = Octave::new(0.02, 0.5);
const LOWLAND_DETAIL: Octave = Octave::new(0.2, 0.6);

const MOUNTAIN_WALL_CUTOFF: f64 = 0.3;
const MOUNTAIN_CONTINUITY: Continuity = Continuity {
    radius: 2,
    tolerance: 0.3,
};

const RESOURCE_SCALE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomeType {
    Plains,
    Hills,
    Plateau,
    Basin,
    Mountains,
}

impl BiomeType {
    pub const ALL: [BiomeType; 5] = [
        BiomeType::Plains,
        BiomeType::Hills,
        BiomeType::Plateau,
        BiomeType::Basin,
        BiomeType::Mountains,
    ];

    /// Wall cutoff and neighbor tolerance for the lowland biomes. Mountains
    /// use their own rule and return `None`.
    pub fn wall_rule(self) -> Option<(f64, f64)> {
        match self {
            BiomeType::Plateau => Some((0.85, 0.4)),
            BiomeType::Hills => Some((0.75, 0.35)),
            BiomeType::Plains => Some((0.65, 0.3)),
            BiomeType::Basin => Some((0.55, 0.25)),
            BiomeType::Mountains => None,
        }
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            BiomeType::Plains => [124, 176, 78],
            BiomeType::Hills => [96, 140, 62],
            BiomeType::Plateau => [181, 160, 110],
            BiomeType::Basin => [70, 110, 150],
            BiomeType::Mountains => [128, 118, 110],
        }
    }

    pub fn style_key(self) -> &'static str {
        match self {
            BiomeType::Plains => "biome.plains",
            BiomeType::Hills => "biome.hills",
            BiomeType::Plateau => "biome.plateau",
            BiomeType::Basin => "biome.basin",
            BiomeType::Mountains => "biome.mountains",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Gold,
    Stone,
    Wood,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [ResourceType::Gold, ResourceType::Stone, ResourceType::Wood];

    /// Minimum resource sample for this resource, given whether the tile
    /// borders a wall.
    pub fn cutoff(self, near_wall: bool) -> f64 {
        match (self, near_wall) {
            (ResourceType::Gold, true) => 0.85,
            (ResourceType::Stone, true) => 0.75,
            (ResourceType::Wood, true) => 0.65,
            (ResourceType::Gold, false) => 0.95,
            (ResourceType::Stone, false) => 0.90,
            (ResourceType::Wood, false) => 0.85,
        }
    }

    /// Highest-value resource whose cutoff `sample` exceeds.
    pub fn from_sample(sample: f64, near_wall: bool) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|resource| sample > resource.cutoff(near_wall))
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            ResourceType::Gold => [235, 196, 52],
            ResourceType::Stone => [170, 170, 178],
            ResourceType::Wood => [122, 84, 48],
        }
    }

    pub fn style_key(self) -> &'static str {
        match self {
            ResourceType::Gold => "resource.gold",
            ResourceType::Stone => "resource.stone",
            ResourceType::Wood => "resource.wood",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub biome: BiomeType,
    pub wall: bool,
    pub resource: Option<ResourceType>,
}

struct Fields {
    biome: NoiseField,
    base: NoiseField,
    detail: NoiseField,
    ridge: NoiseField,
    resource: NoiseField,
}

impl Fields {
    fn new(seed: u64) -> Self {
        Self {
            biome: NoiseField::new(seed),
            base: NoiseField::new(seed.wrapping_add(1)),
            detail: NoiseField::new(seed.wrapping_add(2)),
            ridge: NoiseField::new(seed.wrapping_add(3)),
            resource: NoiseField::new(seed.wrapping_add(4)),
        }
    }
}

/// Biome-driven tile generator for the map demo.
///
/// Every tile is classified from world coordinates alone, so tiles can be
/// produced in any order.
pub struct WorldGenerator {
    fields: Arc<Fields>,
    seed: u64,
    rng: ChaCha8Rng,
}

impl WorldGenerator {
    pub fn new(seed: u64) -> Self {
        info!("world generator seeded with {}", seed);
        Self {
            fields: Arc::new(Fields::new(seed)),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reseed(&mut self) -> u64 {
        let seed = self.rng.gen::<u64>();
        self.reseed_with(seed);
        seed
    }

    pub fn reseed_with(&mut self, seed: u64) {
        self.fields = Arc::new(Fields::new(seed));
        self.seed = seed;
        info!("world generator reseeded with {}", seed);
    }

    pub fn biome_at(&self, x: f64, y: f64) -> BiomeType {
        let biome = &self.fields.biome;
        let mountain = biome.raw(
            (x + MOUNTAIN_OFFSET) * MOUNTAIN_SCALE,
            (y + MOUNTAIN_OFFSET) * MOUNTAIN_SCALE,
        );
        if mountain > MOUNTAIN_CUTOFF {
            return BiomeType::Mountains;
        }

        let value = biome.raw(x * BIOME_SCALE, y * BIOME_SCALE);
        if value > 0.5 {
            BiomeType::Plateau
        } else if value > 0.0 {
            BiomeType::Hills
        } else if value > -0.5 {
            BiomeType::Plains
        } else {
            BiomeType::Basin
        }
    }

    /// Octave sum used for the wall test of `biome` at `(x, y)`.
    pub fn wall_value(&self, biome: BiomeType, x: f64, y: f64) -> f64 {
        let f = &self.fields;
        let base = BASE.sample(&f.base, x, y);
        match biome {
            BiomeType::Mountains => {
                base + MOUNTAIN_DETAIL.sample(&f.detail, x, y)
                    + MOUNTAIN_RIDGE.sample(&f.ridge, x, y)
            }
            _ => base + LOWLAND_DETAIL.sample(&f.detail, x, y),
        }
    }

    pub fn is_wall(&self, x: f64, y: f64) -> bool {
        self.wall_for(self.biome_at(x, y), x, y)
    }

    fn wall_for(&self, biome: BiomeType, x: f64, y: f64) -> bool {
        let value = self.wall_value(biome, x, y);
        let value_at = |nx: f64, ny: f64| self.wall_value(biome, nx, ny);
        match biome.wall_rule() {
            None => value > MOUNTAIN_WALL_CUTOFF && is_smooth(value, MOUNTAIN_CONTINUITY, x, y, value_at),
            Some((cutoff, tolerance)) => {
                let rule = Continuity {
                    radius: 1,
                    tolerance,
                };
                value < cutoff && is_smooth(value, rule, x, y, value_at)
            }
        }
    }

    /// Whether any of the 8 surrounding tiles is a wall.
    pub fn is_near_wall(&self, x: f64, y: f64) -> bool {
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if self.is_wall(x + dx as f64, y + dy as f64) {
                    return true;
                }
            }
        }
        false
    }

    pub fn resource_at(&self, x: f64, y: f64) -> Option<ResourceType> {
        if self.is_wall(x, y) {
            return None;
        }
        self.open_tile_resource(x, y)
    }

    /// Resource noise at `(x, y)`, compared against [`ResourceType::cutoff`].
    pub fn resource_sample(&self, x: f64, y: f64) -> f64 {
        self.fields
            .resource
            .noise(x * RESOURCE_SCALE, y * RESOURCE_SCALE)
    }

    fn open_tile_resource(&self, x: f64, y: f64) -> Option<ResourceType> {
        let sample = self.resource_sample(x, y);
        // Nothing can clear the cutoffs below the lowest near-wall one.
        if sample <= ResourceType::Wood.cutoff(true) {
            return None;
        }
        ResourceType::from_sample(sample, self.is_near_wall(x, y))
    }

    pub fn classify(&self, x: f64, y: f64) -> Tile {
        let biome = self.biome_at(x, y);
        let wall = self.wall_for(biome, x, y);
        let resource = if wall {
            None
        } else {
            self.open_tile_resource(x, y)
        };
        Tile {
            biome,
            wall,
            resource,
        }
    }
}
