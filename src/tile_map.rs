use std::collections::HashMap;

use log::debug;

use crate::world_gen::{Tile, WorldGenerator};

/// Tiles kept around the last viewport on each side.
pub const MARGIN: i32 = 8;

/// Tile classifications memoized by world tile coordinate.
///
/// Classifying one tile costs up to a few dozen noise samples because of
/// the neighbor checks, so repeated frames over the same viewport read from
/// here instead. The cache only holds the last viewport plus [`MARGIN`];
/// anything further away is evicted when the view moves.
pub struct TileMap {
    generator: WorldGenerator,
    tiles: HashMap<(i32, i32), Tile>,
}

impl TileMap {
    pub fn new(generator: WorldGenerator) -> Self {
        Self {
            generator,
            tiles: HashMap::new(),
        }
    }

    pub fn generator(&self) -> &WorldGenerator {
        &self.generator
    }

    pub fn tile(&mut self, x: i32, y: i32) -> Tile {
        let generator = &self.generator;
        *self
            .tiles
            .entry((x, y))
            .or_insert_with(|| generator.classify(x as f64, y as f64))
    }

    /// Classify every tile in the inclusive rectangle `min..=max`, row by row.
    pub fn region(&mut self, min: (i32, i32), max: (i32, i32)) -> Vec<Tile> {
        let before = self.tiles.len();
        let mut out = Vec::new();
        for y in min.1..=max.1 {
            for x in min.0..=max.0 {
                out.push(self.tile(x, y));
            }
        }
        let filled = self.tiles.len() - before;
        if filled > 0 {
            debug!("tile cache filled {} tiles ({} cached)", filled, self.tiles.len());
        }
        self.retain_viewport(min, max);
        out
    }

    /// Evict every tile outside `min..=max` grown by [`MARGIN`].
    pub fn retain_viewport(&mut self, min: (i32, i32), max: (i32, i32)) {
        let (x0, y0) = (min.0.saturating_sub(MARGIN), min.1.saturating_sub(MARGIN));
        let (x1, y1) = (max.0.saturating_add(MARGIN), max.1.saturating_add(MARGIN));
        let before = self.tiles.len();
        self.tiles
            .retain(|&(x, y), _| x >= x0 && x <= x1 && y >= y0 && y <= y1);
        let evicted = before - self.tiles.len();
        if evicted > 0 {
            debug!("tile cache evicted {} tiles ({} cached)", evicted, self.tiles.len());
        }
    }

    /// New layout from the generator's session seed; drops every cached tile.
    pub fn reseed(&mut self) -> u64 {
        self.tiles.clear();
        self.generator.reseed()
    }

    pub fn reseed_with(&mut self, seed: u64) {
        self.tiles.clear();
        self.generator.reseed_with(seed);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
