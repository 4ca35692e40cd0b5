use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal,
};
use glam::{Vec3, Vec4};
use log::{info, warn};
use std::io::stdout;
use std::time::Duration;

use tilescope::geometry::Geometry;
use tilescope::registry::StyleRegistry;
use tilescope::renderer::{present, Framebuffer, MapRenderer};
use tilescope::scene::{MeshId, Scene};
use tilescope::tile_map::TileMap;
use tilescope::{MapMode, OrthoCamera, SandboxConfig, TerrainField, WorldGenerator};

fn get_terminal_size() -> (u32, u32) {
    match terminal::size() {
        Ok((cols, rows)) => (cols as u32, rows as u32),
        Err(_) => (80, 24), // fallback
    }
}

struct TileScope {
    config: SandboxConfig,
    camera: OrthoCamera,
    tiles: TileMap,
    terrain: TerrainField,
    scene: Scene,
    ring: Vec<MeshId>,
    renderer: MapRenderer,
    framebuffer: Framebuffer,
    mode: MapMode,
    phase: f32,
}

impl TileScope {
    fn new(config: SandboxConfig) -> Result<Self> {
        let (cols, rows) = get_terminal_size();
        // Two pixel rows per terminal row
        let framebuffer = Framebuffer::new(cols, rows * 2);

        let mut camera = OrthoCamera::new(framebuffer.aspect_ratio())?;
        camera.set_zoom(config.camera.zoom)?;

        let tiles = TileMap::new(WorldGenerator::new(config.seed));
        let terrain = TerrainField::new(config.seed, config.terrain.clone());
        let renderer = MapRenderer::new(StyleRegistry::with_defaults(), config.tile_size);

        let mut scene = Scene::new();
        let ring = (0..config.mesh_ring.count)
            .map(|_| {
                let mut mesh = Geometry::hexagon();
                mesh.set_scale(Vec3::new(0.1, 0.1, 1.0));
                scene.add(mesh)
            })
            .collect();

        info!(
            "tilescope started: {}x{} pixels, seed {}, {:?} map",
            framebuffer.width(),
            framebuffer.height(),
            config.seed,
            config.map_mode
        );

        Ok(Self {
            mode: config.map_mode,
            config,
            camera,
            tiles,
            terrain,
            scene,
            ring,
            renderer,
            framebuffer,
            phase: 0.0,
        })
    }

    fn handle_input(&mut self) -> Result<bool> {
        // Use non-blocking poll
        if !event::poll(Duration::from_millis(0))? {
            return Ok(true);
        }

        match event::read()? {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                let step = self.config.camera.move_step / self.camera.zoom();
                let turn = self.config.camera.rotate_step;
                match code {
                    KeyCode::Char('x') | KeyCode::Esc => return Ok(false),
                    KeyCode::Char('w') | KeyCode::Up => self.camera.move_by(Vec3::new(0.0, step, 0.0)),
                    KeyCode::Char('s') | KeyCode::Down => self.camera.move_by(Vec3::new(0.0, -step, 0.0)),
                    KeyCode::Char('a') | KeyCode::Left => self.camera.move_by(Vec3::new(-step, 0.0, 0.0)),
                    KeyCode::Char('d') | KeyCode::Right => self.camera.move_by(Vec3::new(step, 0.0, 0.0)),
                    KeyCode::Char('q') => self.camera.rotate(Vec3::new(0.0, 0.0, turn)),
                    KeyCode::Char('e') => self.camera.rotate(Vec3::new(0.0, 0.0, -turn)),
                    KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(true),
                    KeyCode::Char('-') => self.zoom(false),
                    KeyCode::Char('r') => {
                        let seed = self.tiles.reseed();
                        self.terrain.reseed_with(seed);
                    }
                    KeyCode::Char('m') => {
                        self.mode = self.mode.toggled();
                        info!("switched to {:?} map", self.mode);
                    }
                    _ => {}
                }
            }
            Event::Resize(cols, rows) if cols > 0 && rows > 0 => {
                self.framebuffer.resize(cols as u32, rows as u32 * 2);
                self.camera.set_aspect_ratio(self.framebuffer.aspect_ratio())?;
            }
            _ => {}
        }
        Ok(true)
    }

    fn zoom(&mut self, zoom_in: bool) {
        let zoom = self.config.camera.step_zoom(self.camera.zoom(), zoom_in);
        if let Err(e) = self.camera.set_zoom(zoom) {
            warn!("ignoring zoom key: {}", e);
        }
    }

    fn update(&mut self) {
        self.phase += 0.001;
        let radius = self.config.mesh_ring.radius;
        let count = self.ring.len().max(1) as f32;
        for (i, id) in self.ring.iter().enumerate() {
            let Some(mesh) = self.scene.get_mut(*id) else {
                continue;
            };
            let i = i as f32;
            let angle = self.phase * 10.0 + i;
            mesh.set_position(Vec3::new(angle.sin() * radius, angle.cos() * radius, 0.0));
            mesh.set_rotation(Vec3::new(0.0, 0.0, -self.phase + i * 0.2));

            let hue = (i + self.phase) % count;
            mesh.set_color(Vec4::new(
                (hue * 0.52).sin() * 0.5 + 0.5,
                (hue * 1.04).sin() * 0.5 + 0.5,
                (hue * 1.57).sin() * 0.5 + 0.5,
                1.0,
            ));
        }
    }

    fn render(&mut self) -> Result<()> {
        match self.mode {
            MapMode::Biome => {
                self.renderer
                    .draw_biome_map(&mut self.framebuffer, &self.camera, &mut self.tiles)
            }
            MapMode::Terrain => {
                self.renderer
                    .draw_terrain_map(&mut self.framebuffer, &self.camera, &self.terrain)
            }
        }
        self.renderer
            .draw_meshes(&mut self.framebuffer, &self.camera, &self.scene);

        let mut stdout = std::io::BufWriter::new(stdout());
        present(&self.framebuffer, &mut stdout)?;
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let frame = Duration::from_millis(self.config.frame_millis);
        let result = loop {
            match self.handle_input() {
                Ok(true) => {}
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }

            self.update();
            if let Err(e) = self.render() {
                break Err(e);
            }

            std::thread::sleep(frame);
        };

        execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()?;

        result
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };

    let mut app = TileScope::new(config)?;
    app.run()
}
