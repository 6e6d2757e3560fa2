use cgmath::Vector3;

use crate::{
    camera::Camera,
    config::SceneConfig,
    data_structures::{
        lighting::{DirectionalLight, FogSettings, FrameUniform, default_lights},
        texture::Texture,
    },
    pipelines::Pipelines,
    render_states::{RasterState, RenderOptions},
    resources::{Layouts, UniformBinding, texture_bind_group},
};

/// Everything shared by the objects of a scene: the device, the pipelines,
/// the per-frame uniform and the camera it is built from.
///
/// The caller owns the window and the surface. It hands over a device and
/// queue, the colour format it renders to and the current size.
#[derive(Debug)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub(crate) depth_texture: Texture,
    pub layouts: Layouts,
    pub pipelines: Pipelines,
    pub frame: UniformBinding<FrameUniform>,
    /// 1x1 white texture for objects without a diffuse map.
    pub white: wgpu::BindGroup,
    pub camera: Camera,
    pub lights: Vec<DirectionalLight>,
    pub fog: FogSettings,
    pub clear_colour: wgpu::Color,
    pub render_options: RenderOptions,
    raster_state: RasterState,
}

impl Context {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SceneConfig,
    ) -> Self {
        log::info!("creating context {width}x{height} ({format:?})");
        let layouts = Layouts::new(&device);
        let pipelines = Pipelines::new(&device, &layouts, format);
        let frame = UniformBinding::new(&device, &layouts.frame, FrameUniform::new(), "Frame");
        let depth_texture = Texture::create_depth_texture(&device, [width, height], "depth_texture");
        let white = texture_bind_group(
            &device,
            &layouts.diffuse,
            &Texture::solid(&device, &queue, [255; 4], "white"),
            "White Bind Group",
        );

        let mut camera = Camera::default();
        camera.set_lens(config.fov_y, aspect(width, height), config.near_z, config.far_z);
        camera.look_at(config.camera_position, config.camera_target, Vector3::unit_y());

        let mut ctx = Self {
            device,
            queue,
            format,
            width,
            height,
            depth_texture,
            layouts,
            pipelines,
            frame,
            white,
            camera,
            lights: default_lights().to_vec(),
            fog: config.fog,
            clear_colour: config.clear_colour,
            render_options: config.render_options,
            raster_state: RasterState::Solid,
        };
        ctx.write_frame_uniform();
        ctx
    }

    /// Recreates the depth buffer and fixes the aspect ratio. A zero sized
    /// (minimized) target is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("ignoring resize to {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
        self.depth_texture = Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.camera.set_aspect(aspect(width, height));
    }

    /// Uploads camera, lights, fog and render options for the next frame.
    pub fn write_frame_uniform(&mut self) {
        let mut uniform = self.frame.uniform;
        uniform.update(
            self.camera.view_proj(),
            self.camera.position(),
            &self.lights,
            &self.fog,
            self.render_options,
        );
        self.frame.write(&self.queue, uniform);
    }

    pub fn supports_wireframe(&self) -> bool {
        self.pipelines.has_wireframe()
    }

    pub fn raster_state(&self) -> RasterState {
        self.raster_state
    }

    /// Wireframe falls back to solid on devices without line polygon mode.
    pub fn set_raster_state(&mut self, state: RasterState) {
        if state == RasterState::Wireframe && !self.supports_wireframe() {
            log::warn!("wireframe is not supported by this device, staying solid");
            self.raster_state = RasterState::Solid;
            return;
        }
        self.raster_state = state;
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture.view
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
