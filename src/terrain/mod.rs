//! Heightmapped terrain drawn as level-of-detail patches.
//!
//! The CPU keeps the smoothed heights for [`Terrain::height`] (walking on the
//! ground) and the patch bounds for culling. The GPU gets the same heights as
//! an `R32Float` texture and displaces a flat unit grid per patch with it.
//! Which grid a patch uses is decided every frame in [`Terrain::update`].

pub mod heightmap;
pub mod patches;

use std::ops::Range;

use anyhow::Context as _;
use cgmath::{Matrix4, Point3};
use image::{DynamicImage, Rgba, RgbaImage};
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{bounds::Frustum, lighting::Material, mesh::GpuMesh, texture::Texture},
};
pub use heightmap::Heightmap;
pub use patches::{LodSettings, PatchInstance, PatchSet};

/// Heightmap cells along each side of a patch.
pub const CELLS_PER_PATCH: u32 = 64;
/// Texture layers blended by the terrain shader.
pub const LAYER_COUNT: usize = 5;

/// Grass, dark dirt, stone, light dirt, snow.
const DEFAULT_LAYER_COLOURS: [[u8; 4]; LAYER_COUNT] = [
    [86, 125, 70, 255],
    [92, 68, 48, 255],
    [128, 128, 128, 255],
    [181, 160, 125, 255],
    [245, 245, 250, 255],
];

/// How to build a terrain from a raw heightmap and optional textures.
#[derive(Clone, Debug)]
pub struct TerrainInfo {
    pub height_scale: f32,
    pub heightmap_width: u32,
    pub heightmap_height: u32,
    pub cell_spacing: f32,
    /// How often the layer textures repeat across the whole terrain.
    pub tex_scale: f32,
    /// Up to [`LAYER_COUNT`] layer images. Missing layers get flat colours.
    pub layers: Vec<DynamicImage>,
    /// RGBA weights of layers 1 to 4 over layer 0. Derived from the heights
    /// when absent.
    pub blend_map: Option<DynamicImage>,
}

/// A 2049x2049 map. Devices need a `max_texture_dimension_2d` of at least
/// 2049 for it.
impl Default for TerrainInfo {
    fn default() -> Self {
        Self {
            height_scale: 50.0,
            heightmap_width: 2049,
            heightmap_height: 2049,
            cell_spacing: 0.5,
            tex_scale: 50.0,
            layers: Vec::new(),
            blend_map: None,
        }
    }
}

impl TerrainInfo {
    /// Reads an 8 bit raw heightmap of the configured size and smooths it.
    pub fn load_heightmap(&self, raw: &[u8]) -> anyhow::Result<Heightmap> {
        let mut heightmap = Heightmap::from_raw_u8(raw, self.heightmap_width, self.heightmap_height, self.height_scale)
            .context("invalid terrain heightmap")?
            .with_cell_spacing(self.cell_spacing);
        heightmap.smooth();
        Ok(heightmap)
    }

    fn layer_images(&self) -> Vec<DynamicImage> {
        if self.layers.len() > LAYER_COUNT {
            log::warn!(
                "terrain has {} layers, only the first {LAYER_COUNT} are used",
                self.layers.len()
            );
        }
        let mut layers: Vec<_> = self.layers.iter().take(LAYER_COUNT).cloned().collect();
        for colour in &DEFAULT_LAYER_COLOURS[layers.len()..] {
            layers.push(DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba(*colour))));
        }
        layers
    }
}

/// The heights are uploaded as one texture, so each side has to fit the
/// device's 2D texture limit. The default 2049x2049 map needs more than the
/// 2048 of `Limits::downlevel_defaults()`.
fn check_texture_size(width: u32, depth: u32, limits: &wgpu::Limits) -> anyhow::Result<()> {
    let max = limits.max_texture_dimension_2d;
    anyhow::ensure!(
        width <= max && depth <= max,
        "terrain heightmap is {width}x{depth} samples, the device allows textures up to {max}"
    );
    Ok(())
}

/// Blend weights from normalized height: dirt on the slopes, stone higher
/// up and snow on the peaks.
pub fn height_blend_map(heightmap: &Heightmap) -> RgbaImage {
    let (min, max) = heightmap
        .heights()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    let range = (max - min).max(f32::EPSILON);
    let ramp = |x: f32, from: f32, to: f32| {
        let t = ((x - from) / (to - from)).clamp(0.0, 1.0);
        (t * t * (3.0 - 2.0 * t) * 255.0).round() as u8
    };
    RgbaImage::from_fn(heightmap.samples_wide(), heightmap.samples_deep(), |x, y| {
        let h = (heightmap.sample(y, x) - min) / range;
        Rgba([ramp(h, 0.15, 0.35), ramp(h, 0.45, 0.65), 0, ramp(h, 0.8, 0.95)])
    })
}

/// Terrain parameters (bind group 1, binding 0 of the terrain pipeline).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniform {
    material: Material,
    texel_u: f32,
    texel_v: f32,
    world_cell_space: f32,
    tex_scale: f32,
}

#[derive(Debug)]
pub struct Terrain {
    heightmap: Heightmap,
    patches: PatchSet,
    pub lod: LodSettings,
    blend_texture: Texture,
    bind_group: wgpu::BindGroup,
    /// Unit grid per level.
    grids: Vec<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    /// Level and instance range of every non-empty batch of the last update.
    draws: Vec<(usize, Range<u32>)>,
}

impl Terrain {
    /// Builds a terrain from raw 8 bit heights as described by `info`.
    pub fn from_raw(ctx: &Context, info: &TerrainInfo, raw: &[u8]) -> anyhow::Result<Self> {
        let heightmap = info.load_heightmap(raw)?;
        Self::new(ctx, info, heightmap)
    }

    pub fn new(ctx: &Context, info: &TerrainInfo, heightmap: Heightmap) -> anyhow::Result<Self> {
        let device = &ctx.device;
        check_texture_size(heightmap.samples_wide(), heightmap.samples_deep(), &device.limits())?;
        let patches = PatchSet::new(&heightmap)?;
        log::info!(
            "terrain {}x{} samples, {} patches",
            heightmap.samples_wide(),
            heightmap.samples_deep(),
            patches.layout().patch_count()
        );

        let height_texture = Texture::heightmap(
            device,
            &ctx.queue,
            heightmap.heights(),
            heightmap.samples_wide(),
            heightmap.samples_deep(),
        )?;
        let layer_texture = Texture::array_from_images(device, &ctx.queue, &info.layer_images(), "terrain layers")?;
        let blend_texture = match &info.blend_map {
            Some(img) => Texture::linear_from_image(device, &ctx.queue, img, "terrain blend map"),
            None => Texture::linear_from_image(
                device,
                &ctx.queue,
                &DynamicImage::ImageRgba8(height_blend_map(&heightmap)),
                "terrain blend map",
            ),
        };
        let sampler = crate::data_structures::texture::create_default_sampler(device);

        let uniform = TerrainUniform {
            material: Material::terrain(),
            texel_u: 1.0 / (heightmap.samples_wide() - 1) as f32,
            texel_v: 1.0 / (heightmap.samples_deep() - 1) as f32,
            world_cell_space: heightmap.cell_spacing(),
            tex_scale: info.tex_scale,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.layouts.terrain,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&height_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&layer_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&blend_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("Terrain Bind Group"),
        });

        let grids = (0..=patches::MAX_LEVEL)
            .map(|level| GpuMesh::new(device, &format!("terrain grid {level}"), &patches::unit_grid(level)))
            .collect();
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Terrain Instance Buffer"),
            size: (patches.layout().patch_count().max(1) * std::mem::size_of::<PatchInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            heightmap,
            patches,
            lod: LodSettings::default(),
            blend_texture,
            bind_group,
            grids,
            instance_buffer,
            draws: Vec::new(),
        })
    }

    /// Height of the ground at world `(x, z)`, 0 outside the terrain.
    pub fn height(&self, x: f32, z: f32) -> f32 {
        self.heightmap.height_at(x, z)
    }

    pub fn width(&self) -> f32 {
        self.heightmap.width()
    }

    pub fn depth(&self) -> f32 {
        self.heightmap.depth()
    }

    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    pub fn patches(&self) -> &PatchSet {
        &self.patches
    }

    /// Layer weights as sampled by the terrain shader.
    pub fn blend_map(&self) -> &Texture {
        &self.blend_texture
    }

    /// Picks patch levels for this eye, culls against the frustum and uploads
    /// the surviving instances.
    pub fn update(&mut self, queue: &wgpu::Queue, eye: Point3<f32>, view_proj: &Matrix4<f32>) {
        let frustum = Frustum::from_view_proj(view_proj);
        let batches = self.patches.visible_instances(eye, &self.lod, Some(&frustum));

        let mut instances = Vec::with_capacity(self.patches.layout().patch_count());
        self.draws.clear();
        for (level, batch) in batches.into_iter().enumerate() {
            if batch.is_empty() {
                continue;
            }
            let start = instances.len() as u32;
            instances.extend(batch);
            self.draws.push((level, start..instances.len() as u32));
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
    }

    /// Patches drawn since the last [`update`](Self::update).
    pub fn visible_patch_count(&self) -> u32 {
        self.draws.iter().map(|(_, range)| range.len() as u32).sum()
    }

    /// Expects the terrain pipeline and the frame bind group to be set.
    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        for (level, instances) in &self.draws {
            let grid = &self.grids[*level];
            render_pass.set_vertex_buffer(0, grid.vertex_buffer.slice(..));
            render_pass.set_index_buffer(grid.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..grid.num_elements, 0, instances.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use image::GenericImageView;

    use super::*;

    #[test]
    fn uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<TerrainUniform>(), 80);
    }

    #[test]
    fn missing_layers_are_filled() {
        let info = TerrainInfo {
            layers: vec![DynamicImage::new_rgba8(4, 4)],
            ..TerrainInfo::default()
        };
        let layers = info.layer_images();
        assert_eq!(layers.len(), LAYER_COUNT);
        assert_eq!(layers[0].dimensions(), (4, 4));
        assert_eq!(layers[4].to_rgba8().get_pixel(0, 0).0, DEFAULT_LAYER_COLOURS[4]);
    }

    #[test]
    fn load_heightmap_checks_size_and_smooths() {
        let info = TerrainInfo {
            heightmap_width: 3,
            heightmap_height: 3,
            height_scale: 255.0,
            cell_spacing: 2.0,
            ..TerrainInfo::default()
        };
        assert!(info.load_heightmap(&[0; 8]).is_err());

        let map = info.load_heightmap(&[0, 0, 0, 0, 9, 0, 0, 0, 0]).unwrap();
        assert!((map.sample(1, 1) - 1.0).abs() < 1e-5);
        assert_eq!(map.width(), 4.0);
    }

    #[test]
    fn blend_map_follows_height() {
        let heights = vec![0.0, 25.0, 50.0, 100.0];
        let map = Heightmap::from_heights(heights, 2, 2).unwrap();
        let blend = height_blend_map(&map);
        assert_eq!(blend.get_pixel(0, 0).0, [0, 0, 0, 0]);
        // halfway up: dirt fully, stone partly, no snow
        let mid = blend.get_pixel(0, 1).0;
        assert_eq!(mid[0], 255);
        assert!(mid[1] > 0 && mid[1] < 255);
        assert_eq!(mid[3], 0);
        assert_eq!(blend.get_pixel(1, 1).0, [255, 255, 0, 255]);
    }

    #[test]
    fn heightmap_must_fit_the_texture_limit() {
        let limits = wgpu::Limits::downlevel_defaults();
        let info = TerrainInfo::default();
        assert!(check_texture_size(info.heightmap_width, info.heightmap_height, &limits).is_err());
        assert!(check_texture_size(2048, 129, &limits).is_ok());

        let larger = wgpu::Limits {
            max_texture_dimension_2d: 8192,
            ..limits
        };
        assert!(check_texture_size(info.heightmap_width, info.heightmap_height, &larger).is_ok());
    }
}
