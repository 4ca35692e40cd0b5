use std::collections::HashMap;

use crate::terrain::TerrainClass;
use crate::world_gen::{BiomeType, ResourceType};

/// How one kind of tile is drawn in the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileStyle {
    pub color: [u8; 3],
}

/// Named tile styles, owned by whoever renders with them.
#[derive(Debug, Clone, Default)]
pub struct StyleRegistry {
    styles: HashMap<String, TileStyle>,
}

const WALL_COLOR: [u8; 3] = [48, 40, 36];
const FALLBACK_COLOR: [u8; 3] = [255, 0, 255];

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with a style for every terrain class, biome and
    /// resource.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(TerrainClass::Mountain.style_key(), [139, 69, 19]);
        registry.insert(TerrainClass::Forest.style_key(), [34, 139, 34]);
        registry.insert(TerrainClass::Water.style_key(), [65, 105, 225]);
        registry.insert(TerrainClass::Floor.style_key(), [169, 169, 169]);
        registry.insert(TerrainClass::Wall.style_key(), WALL_COLOR);
        for biome in BiomeType::ALL {
            registry.insert(biome.style_key(), biome.color());
        }
        for resource in ResourceType::ALL {
            registry.insert(resource.style_key(), resource.color());
        }
        registry
    }

    pub fn insert(&mut self, name: &str, color: [u8; 3]) -> Option<TileStyle> {
        self.styles.insert(name.to_owned(), TileStyle { color })
    }

    pub fn get(&self, name: &str) -> Option<&TileStyle> {
        self.styles.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TileStyle> {
        self.styles.remove(name)
    }

    /// Color for `name`, or a loud magenta when nothing is registered.
    pub fn color(&self, name: &str) -> [u8; 3] {
        self.get(name).map_or(FALLBACK_COLOR, |style| style.color)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_every_key() {
        let registry = StyleRegistry::with_defaults();
        assert_eq!(registry.len(), 5 + BiomeType::ALL.len() + ResourceType::ALL.len());
        assert_eq!(registry.color("water"), [65, 105, 225]);
        assert_eq!(registry.color(BiomeType::Hills.style_key()), BiomeType::Hills.color());
        assert_eq!(registry.color(ResourceType::Gold.style_key()), ResourceType::Gold.color());
    }

    #[test]
    fn test_registries_are_independent() {
        let mut a = StyleRegistry::with_defaults();
        let b = StyleRegistry::with_defaults();
        a.insert("water", [0, 0, 0]);
        assert_eq!(a.color("water"), [0, 0, 0]);
        assert_eq!(b.color("water"), [65, 105, 225]);
    }

    #[test]
    fn test_missing_style_falls_back() {
        let mut registry = StyleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.color("lava"), FALLBACK_COLOR);
        registry.insert("lava", [255, 80, 0]);
        assert_eq!(registry.remove("lava"), Some(TileStyle { color: [255, 80, 0] }));
        assert_eq!(registry.color("lava"), FALLBACK_COLOR);
    }
}
