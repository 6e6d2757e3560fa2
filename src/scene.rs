//! The demo scene: a spinning cube, lit hills, water, an axis gizmo and a
//! crate, optionally with a heightmapped terrain and a sky.
//!
//! The caller forwards window events and calls [`DemoScene::frame`] once per
//! redraw with the view of the texture to draw into.

use anyhow::Context as _;
use cgmath::Vector3;
use image::DynamicImage;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    camera::CameraController,
    config::SceneConfig,
    context::Context,
    data_structures::{texture::Texture, transform::Transform},
    input::InputManager,
    objects::{Basis, CrateBox, Land, SceneObject, SpinningBox, Water},
    pick::{Picked, Picker, pick_ray},
    render::{Render, render_to},
    render_states::{BlendMode, RasterState, RenderOptions},
    sky::Sky,
    terrain::{Terrain, TerrainInfo},
    timer::{FrameReport, FrameStats, GameTimer},
};

/// How far above the ground the eye stays while walking on the terrain.
const EYE_HEIGHT: f32 = 2.0;

/// Where the sky comes from.
#[derive(Clone, Debug)]
pub enum SkySource {
    /// Faces in the order +X, -X, +Y, -Y, +Z, -Z.
    Cube(Box<[DynamicImage; 6]>),
    Gradient { top: [u8; 4], bottom: [u8; 4] },
}

impl Default for SkySource {
    fn default() -> Self {
        SkySource::Gradient {
            top: [70, 120, 200, 255],
            bottom: [190, 190, 190, 255],
        }
    }
}

#[derive(Clone, Debug)]
pub struct TerrainAssets {
    pub info: TerrainInfo,
    /// 8 bit raw heights, `info.heightmap_width * info.heightmap_height` bytes.
    pub raw_heightmap: Vec<u8>,
}

/// Images and data handed in by the caller. Everything is optional, objects
/// without a texture get a flat colour.
#[derive(Clone, Debug, Default)]
pub struct SceneAssets {
    pub land_texture: Option<DynamicImage>,
    pub water_texture: Option<DynamicImage>,
    pub crate_texture: Option<DynamicImage>,
    pub sky: Option<SkySource>,
    pub terrain: Option<TerrainAssets>,
}

pub struct DemoScene {
    controller: CameraController,
    input: InputManager,
    timer: GameTimer,
    stats: FrameStats,
    objects: Vec<Box<dyn SceneObject>>,
    terrain: Option<Terrain>,
    sky: Option<Sky>,
    picker: Picker,
    paused: bool,
    walk_on_terrain: bool,
}

impl DemoScene {
    pub fn new(ctx: &mut Context, config: &SceneConfig, assets: SceneAssets) -> anyhow::Result<Self> {
        let texture = |img: &Option<DynamicImage>, label: &str| {
            img.as_ref()
                .map(|img| Texture::from_image(&ctx.device, &ctx.queue, img, label))
        };
        let land_texture = texture(&assets.land_texture, "land");
        let water_texture = texture(&assets.water_texture, "water");
        let crate_texture = texture(&assets.crate_texture, "crate");

        let objects: Vec<Box<dyn SceneObject>> = vec![
            Box::new(SpinningBox::new(ctx, 1)),
            Box::new(Land::new(ctx, 2, land_texture.as_ref())),
            Box::new(Water::new(ctx, 3, water_texture.as_ref())),
            Box::new(Basis::new(ctx, 4)),
            Box::new(CrateBox::new(
                ctx,
                5,
                Transform::from_position(Vector3::new(-5.0, 3.0, 0.0)).with_scale(2.0),
                crate_texture.as_ref(),
                BlendMode::AlphaToCoverage,
            )),
        ];

        let sky = match assets.sky {
            Some(SkySource::Cube(faces)) => {
                let cube = Texture::cube_from_images(&ctx.device, &ctx.queue, &faces, "sky")
                    .context("invalid sky cube map")?;
                Some(Sky::new(ctx, 5000.0, &cube))
            }
            Some(SkySource::Gradient { top, bottom }) => Some(Sky::gradient(ctx, 5000.0, top, bottom)),
            None => None,
        };

        let terrain = match assets.terrain {
            Some(TerrainAssets { info, raw_heightmap }) => {
                let mut terrain = Terrain::from_raw(ctx, &info, &raw_heightmap).context("could not build terrain")?;
                terrain.lod = config.terrain_lod;
                Some(terrain)
            }
            None => None,
        };

        ctx.render_options = config.render_options;
        let mut timer = GameTimer::new();
        timer.reset();
        log::info!(
            "demo scene with {} objects, terrain: {}, sky: {}",
            objects.len(),
            terrain.is_some(),
            sky.is_some()
        );

        Ok(Self {
            controller: CameraController::new(config.camera_speed, config.mouse_sensitivity),
            input: InputManager::new(),
            timer,
            stats: FrameStats::default(),
            objects,
            terrain,
            sky,
            picker: Picker::new(),
            paused: false,
            walk_on_terrain: false,
        })
    }

    /// Feeds an event to the input state and reacts to scene keys, clicks,
    /// focus and size changes. Returns true if the event was used.
    pub fn handle_window_event(&mut self, ctx: &mut Context, event: &WindowEvent) -> bool {
        let consumed = self.input.handle_window_event(event);
        match event {
            WindowEvent::Resized(size) => {
                ctx.resize(size.width, size.height);
                true
            }
            WindowEvent::Focused(focused) => {
                if *focused {
                    self.resume();
                } else {
                    self.pause();
                }
                true
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(ctx, *code) || consumed,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.input.mouse_pos();
                self.pick(ctx, x, y);
                true
            }
            _ => consumed,
        }
    }

    fn handle_key(&mut self, ctx: &mut Context, code: KeyCode) -> bool {
        if let Some(options) = RenderOptions::from_key(code) {
            log::info!("render options: {options:?}");
            ctx.render_options = options;
            return true;
        }
        match code {
            KeyCode::KeyF => {
                let next = match ctx.raster_state() {
                    RasterState::Wireframe => RasterState::Solid,
                    _ => RasterState::Wireframe,
                };
                ctx.set_raster_state(next);
                true
            }
            KeyCode::KeyT if self.terrain.is_some() => {
                self.walk_on_terrain = !self.walk_on_terrain;
                log::info!("walking on terrain: {}", self.walk_on_terrain);
                true
            }
            _ => false,
        }
    }

    /// Stops the clock. Frames still render, with no time passing.
    pub fn pause(&mut self) {
        if !self.paused {
            log::debug!("scene paused");
            self.paused = true;
            self.timer.stop();
            self.input.clear();
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::debug!("scene resumed");
            self.paused = false;
            self.timer.start();
        }
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn walk_on_terrain(&self) -> bool {
        self.walk_on_terrain
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn objects(&self) -> &[Box<dyn SceneObject>] {
        &self.objects
    }

    /// Selects the nearest triangle under pixel `(sx, sy)`, or clears the
    /// selection if nothing is there.
    pub fn pick(&mut self, ctx: &Context, sx: f32, sy: f32) -> Option<Picked> {
        let camera = &ctx.camera;
        let Some(ray) = pick_ray(sx, sy, ctx.width as f32, ctx.height as f32, &camera.proj(), &camera.view()) else {
            log::warn!("view matrix is not invertible, clearing the selection");
            self.picker.clear();
            return None;
        };
        let candidates = self
            .objects
            .iter()
            .filter_map(|object| object.pick_mesh().map(|mesh| (object.id(), mesh)));
        self.picker.pick(&ray, candidates)
    }

    /// One tick: time, camera, animation, uniforms, then draw into `target`.
    /// Returns a report about once per second of unpaused time. Paused
    /// frames never report.
    pub fn frame(&mut self, ctx: &mut Context, target: &wgpu::TextureView) -> anyhow::Result<Option<FrameReport>> {
        self.timer.tick();
        let dt = if self.paused { 0.0 } else { self.timer.delta_time() };

        self.controller.update_camera(&mut ctx.camera, &mut self.input, dt);
        if let (true, Some(terrain)) = (self.walk_on_terrain, &self.terrain) {
            let mut eye = ctx.camera.position();
            let ground = terrain.height(eye.x, eye.z) + EYE_HEIGHT;
            if eye.y < ground {
                eye.y = ground;
                ctx.camera.set_position(eye);
                ctx.camera.update_view_matrix();
            }
        }

        let eye = ctx.camera.position();
        let view_proj = ctx.camera.view_proj();
        for object in &mut self.objects {
            object.update(dt);
        }
        if let Some(sky) = &mut self.sky {
            sky.update(&ctx.queue, eye);
        }
        if let Some(terrain) = &mut self.terrain {
            terrain.update(&ctx.queue, eye, &view_proj);
        }

        ctx.write_frame_uniform();
        for object in &mut self.objects {
            let picked = self.picker.triangle_of(object.id());
            object.write_to_buffer(ctx, picked);
        }

        let mut renders: Vec<Render> = self.objects.iter().map(|object| object.render()).collect();
        if let Some(terrain) = &self.terrain {
            renders.push(Render::Terrain(terrain));
        }
        if let Some(sky) = &self.sky {
            renders.push(sky.render());
        }
        render_to(ctx, target, renders);

        ctx.device
            .poll(wgpu::PollType::Poll)
            .context("device lost while rendering the scene")?;
        Ok(self.stats.frame(&self.timer))
    }
}
