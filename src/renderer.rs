use std::collections::HashMap;
use std::io::{self, Write};

use glam::{Mat4, Vec3};

use crate::camera::OrthoCamera;
use crate::registry::StyleRegistry;
use crate::scene::Scene;
use crate::terrain::TerrainField;
use crate::tile_map::TileMap;
use crate::world_gen::Tile;

/// RGB pixel grid, row 0 at the top.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0, 0, 0]; (width * height) as usize];
    }

    pub fn clear(&mut self, color: [u8; 3]) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    /// Center of pixel `(x, y)` in normalized device coordinates.
    pub fn pixel_to_ndc(&self, x: u32, y: u32) -> Vec3 {
        Vec3::new(
            (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0,
            1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0,
            0.0,
        )
    }

    pub fn ndc_to_pixel(&self, ndc: Vec3) -> Option<(u32, u32)> {
        let x = ((ndc.x + 1.0) * 0.5 * self.width as f32).floor();
        let y = ((1.0 - ndc.y) * 0.5 * self.height as f32).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as u32, y as u32))
    }
}

/// Draws tile maps and scene meshes into a [`Framebuffer`] through an
/// [`OrthoCamera`].
pub struct MapRenderer {
    styles: StyleRegistry,
    tile_size: f32,
}

impl MapRenderer {
    pub fn new(styles: StyleRegistry, tile_size: f32) -> Self {
        Self { styles, tile_size }
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// World position to integer tile coordinate.
    pub fn tile_at(&self, world: Vec3) -> (i32, i32) {
        (
            (world.x / self.tile_size).floor() as i32,
            (world.y / self.tile_size).floor() as i32,
        )
    }

    pub fn tile_color(&self, tile: &Tile) -> [u8; 3] {
        let key = if tile.wall {
            "wall"
        } else if let Some(resource) = tile.resource {
            resource.style_key()
        } else {
            tile.biome.style_key()
        };
        self.styles.color(key)
    }

    /// Inclusive tile rectangle covering the camera's view, rotation included.
    pub fn visible_tiles(&self, camera: &OrthoCamera) -> ((i32, i32), (i32, i32)) {
        let inverse = camera.view_projection().inverse();
        let mut min = (i32::MAX, i32::MAX);
        let mut max = (i32::MIN, i32::MIN);
        for (x, y) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let (tx, ty) = self.tile_at(inverse.project_point3(Vec3::new(x, y, 0.0)));
            min = (min.0.min(tx), min.1.min(ty));
            max = (max.0.max(tx), max.1.max(ty));
        }
        (min, max)
    }

    pub fn draw_biome_map(&self, fb: &mut Framebuffer, camera: &OrthoCamera, tiles: &mut TileMap) {
        let inverse = camera.view_projection().inverse();
        self.for_each_pixel_tile(fb, &inverse, |coord| {
            let tile = tiles.tile(coord.0, coord.1);
            self.tile_color(&tile)
        });
        let (min, max) = self.visible_tiles(camera);
        tiles.retain_viewport(min, max);
    }

    pub fn draw_terrain_map(&self, fb: &mut Framebuffer, camera: &OrthoCamera, terrain: &TerrainField) {
        let inverse = camera.view_projection().inverse();
        let mut frame: HashMap<(i32, i32), [u8; 3]> = HashMap::new();
        self.for_each_pixel_tile(fb, &inverse, |coord| {
            *frame.entry(coord).or_insert_with(|| {
                let class = terrain.classify(coord.0 as f64, coord.1 as f64);
                self.styles.color(class.style_key())
            })
        });
    }

    fn for_each_pixel_tile<F>(&self, fb: &mut Framebuffer, inverse: &Mat4, mut color_of: F)
    where
        F: FnMut((i32, i32)) -> [u8; 3],
    {
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                let world = inverse.project_point3(fb.pixel_to_ndc(x, y));
                let color = color_of(self.tile_at(world));
                fb.set(x, y, color);
            }
        }
    }

    /// Plot the center and transformed vertices of every mesh that survives
    /// frustum culling; returns how many did.
    pub fn draw_meshes(&self, fb: &mut Framebuffer, camera: &OrthoCamera, scene: &Scene) -> usize {
        let view_projection = camera.view_projection();
        let mut drawn = 0;
        for mesh in scene.visible(camera) {
            drawn += 1;
            let color = mesh.rgb();
            let points = std::iter::once(mesh.position()).chain(mesh.world_vertices());
            for point in points {
                if let Some((x, y)) = fb.ndc_to_pixel(view_projection.project_point3(point)) {
                    fb.set(x, y, color);
                }
            }
        }
        drawn
    }
}

/// Write the framebuffer as upper-half-block characters: each terminal row
/// shows two pixel rows, foreground on top and background below.
pub fn present<W: Write>(fb: &Framebuffer, out: &mut W) -> io::Result<()> {
    // Begin synchronized update
    write!(out, "\x1b[?2026h")?;
    write!(out, "\x1b[H")?;

    let mut prev: Option<([u8; 3], [u8; 3])> = None;
    let mut terminal_row = 1;
    let mut y = 0;
    while y < fb.height() {
        write!(out, "\x1b[{};1H", terminal_row)?;
        for x in 0..fb.width() {
            let top = fb.get(x, y).unwrap_or([0, 0, 0]);
            let bottom = fb.get(x, y + 1).unwrap_or([0, 0, 0]);

            if prev != Some((top, bottom)) {
                write!(out, "\x1b[38;2;{};{};{}m", top[0], top[1], top[2])?;
                write!(out, "\x1b[48;2;{};{};{}m", bottom[0], bottom[1], bottom[2])?;
                prev = Some((top, bottom));
            }
            write!(out, "\u{2580}")?;
        }
        y += 2;
        terminal_row += 1;
    }

    write!(out, "\x1b[0m")?;
    // End synchronized update
    write!(out, "\x1b[?2026l")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::terrain::TerrainParams;
    use crate::tile_map::MARGIN;
    use crate::world_gen::WorldGenerator;
    use glam::Vec4;

    #[test]
    fn test_pixel_ndc_round_trip() {
        let fb = Framebuffer::new(8, 6);
        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(fb.ndc_to_pixel(fb.pixel_to_ndc(x, y)), Some((x, y)));
            }
        }
        assert_eq!(fb.ndc_to_pixel(Vec3::new(1.5, 0.0, 0.0)), None);
    }

    #[test]
    fn test_set_out_of_bounds_is_ignored() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set(5, 5, [1, 2, 3]);
        fb.set(1, 0, [9, 9, 9]);
        assert_eq!(fb.get(1, 0), Some([9, 9, 9]));
        assert_eq!(fb.get(2, 0), None);
    }

    #[test]
    fn test_tile_at_floors_negative_coordinates() {
        let renderer = MapRenderer::new(StyleRegistry::with_defaults(), 0.5);
        assert_eq!(renderer.tile_at(Vec3::new(0.2, 0.7, 0.0)), (0, 1));
        assert_eq!(renderer.tile_at(Vec3::new(-0.2, -1.1, 0.0)), (-1, -3));
    }

    #[test]
    fn test_biome_map_paints_tile_colors() {
        let renderer = MapRenderer::new(StyleRegistry::with_defaults(), 0.25);
        let camera = OrthoCamera::new(1.0).unwrap();
        let mut tiles = TileMap::new(WorldGenerator::new(8));
        let mut fb = Framebuffer::new(8, 8);
        renderer.draw_biome_map(&mut fb, &camera, &mut tiles);

        // Pixel (5, 2) has its center at world (0.375, 0.375): tile (1, 1).
        let expected = renderer.tile_color(&tiles.tile(1, 1));
        assert_eq!(fb.get(5, 2), Some(expected));
        // 2 world units across at 0.25 per tile.
        assert_eq!(tiles.len(), 64);
    }

    #[test]
    fn test_terrain_map_uses_class_styles() {
        let renderer = MapRenderer::new(StyleRegistry::with_defaults(), 1.0);
        let camera = OrthoCamera::new(1.0).unwrap();
        let terrain = TerrainField::new(4, TerrainParams::single_noise());
        let mut fb = Framebuffer::new(4, 4);
        renderer.draw_terrain_map(&mut fb, &camera, &terrain);

        // Pixel (0, 3) has its center at world (-0.75, -0.75): tile (-1, -1).
        let class = terrain.classify(-1.0, -1.0);
        assert_eq!(fb.get(0, 3), Some(renderer.styles().color(class.style_key())));
    }

    #[test]
    fn test_draw_meshes_skips_culled() {
        let renderer = MapRenderer::new(StyleRegistry::new(), 1.0);
        let camera = OrthoCamera::new(1.0).unwrap();
        let mut scene = Scene::new();
        let inside = scene.add(Geometry::hexagon());
        let outside = scene.add(Geometry::hexagon());
        scene.get_mut(inside).unwrap().set_position(Vec3::ZERO);
        scene.get_mut(outside).unwrap().set_position(Vec3::new(5.0, 0.0, 0.0));

        let mut fb = Framebuffer::new(4, 4);
        assert_eq!(renderer.draw_meshes(&mut fb, &camera, &scene), 1);
        assert_eq!(fb.get(2, 2), Some([255, 255, 255]));
    }

    #[test]
    fn test_draw_meshes_applies_model_transform() {
        let renderer = MapRenderer::new(StyleRegistry::new(), 1.0);
        let camera = OrthoCamera::new(1.0).unwrap();
        let mut scene = Scene::new();
        let id = scene.add(Geometry::rectangle());
        let mesh = scene.get_mut(id).unwrap();
        mesh.set_scale(Vec3::new(1.75, 1.75, 1.0));
        mesh.set_color(Vec4::new(1.0, 0.0, 0.0, 1.0));

        let mut fb = Framebuffer::new(8, 8);
        assert_eq!(renderer.draw_meshes(&mut fb, &camera, &scene), 1);
        // Corners at +-0.875 after scaling land in the corner pixels.
        assert_eq!(fb.get(7, 0), Some([255, 0, 0]));
        assert_eq!(fb.get(0, 7), Some([255, 0, 0]));
        assert_eq!(fb.get(4, 4), Some([255, 0, 0]));
        assert_eq!(fb.get(5, 2), Some([0, 0, 0]));
    }

    #[test]
    fn test_biome_map_evicts_tiles_behind_the_camera() {
        let renderer = MapRenderer::new(StyleRegistry::with_defaults(), 0.25);
        let mut camera = OrthoCamera::new(1.0).unwrap();
        let mut tiles = TileMap::new(WorldGenerator::new(114514));
        let mut fb = Framebuffer::new(8, 8);

        let bound = ((8 + 1 + 2 * MARGIN) * (8 + 1 + 2 * MARGIN)) as usize;
        for _ in 0..20 {
            renderer.draw_biome_map(&mut fb, &camera, &mut tiles);
            assert!(tiles.len() <= bound, "{} tiles cached", tiles.len());
            camera.move_by(Vec3::new(2.0, 0.0, 0.0));
        }
        let (min, max) = renderer.visible_tiles(&camera);
        assert!(min.0 >= 150 && max.0 <= 170, "{:?}..{:?}", min, max);
    }

    #[test]
    fn test_present_writes_half_blocks() {
        let mut fb = Framebuffer::new(2, 2);
        fb.set(0, 0, [255, 0, 0]);
        fb.set(0, 1, [0, 0, 255]);
        let mut out = Vec::new();
        present(&fb, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("\x1b[?2026h\x1b[H\x1b[1;1H"));
        assert!(text.contains("\x1b[38;2;255;0;0m\x1b[48;2;0;0;255m\u{2580}"));
        assert_eq!(text.matches('\u{2580}').count(), 2);
        assert!(text.ends_with("\x1b[?2026l"));
    }
}
