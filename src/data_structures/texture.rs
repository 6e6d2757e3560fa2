//! GPU textures and texture creation utilities.
//!
//! Besides plain 2D colour maps this covers what the scene needs: the depth
//! buffer, 1x1 fallback colours, cube maps for the sky, 2D arrays for terrain
//! layers and a single channel float texture for terrain heights. Images are
//! always passed in memory, nothing here touches the file system.

use anyhow::{Context as _, Result, ensure};
use image::{DynamicImage, GenericImageView, imageops::FilterType};

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const HEIGHT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
    pub const COLOUR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
    pub const LINEAR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            sampler: None,
        }
    }

    /// A 1x1 texture of one colour. Used when an object has no diffuse map.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba)));
        Self::from_rgba_layers(device, queue, &[img.to_rgba8()], label, LayerKind::D2)
    }

    /// Colour map, sampled with sRGB decoding.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &DynamicImage,
        label: &str,
    ) -> Self {
        Self::from_rgba_layers(device, queue, &[img.to_rgba8()], label, LayerKind::D2)
    }

    /// Data map such as blend weights. The bytes are sampled as they are,
    /// without sRGB decoding.
    pub fn linear_from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &DynamicImage,
        label: &str,
    ) -> Self {
        Self::from_rgba_layers(device, queue, &[img.to_rgba8()], label, LayerKind::Linear)
    }

    /// Cube map from six square faces in the order +X, -X, +Y, -Y, +Z, -Z.
    pub fn cube_from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[DynamicImage; 6],
        label: &str,
    ) -> Result<Self> {
        let (w, h) = faces[0].dimensions();
        ensure!(w == h, "cube map faces must be square, got {w}x{h}");
        for (i, face) in faces.iter().enumerate() {
            ensure!(
                face.dimensions() == (w, h),
                "cube map face {i} is {:?}, expected {w}x{h}",
                face.dimensions()
            );
        }
        let layers: Vec<_> = faces.iter().map(DynamicImage::to_rgba8).collect();
        Ok(Self::from_rgba_layers(device, queue, &layers, label, LayerKind::Cube))
    }

    /// Cube map that fades from `bottom` (looking down) to `top` (looking up).
    pub fn gradient_cube(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size: u32,
        top: [u8; 4],
        bottom: [u8; 4],
    ) -> Self {
        let layers: Vec<_> = (0..6)
            .map(|face| gradient_face(face, size.max(1), top, bottom))
            .collect();
        Self::from_rgba_layers(device, queue, &layers, "sky gradient", LayerKind::Cube)
    }

    /// 2D array texture. Every layer is resized to the size of the first one.
    pub fn array_from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &[DynamicImage],
        label: &str,
    ) -> Result<Self> {
        let first = images
            .first()
            .with_context(|| format!("texture array '{label}' needs at least one layer"))?;
        let (w, h) = first.dimensions();
        let layers: Vec<_> = images
            .iter()
            .map(|img| {
                if img.dimensions() == (w, h) {
                    img.to_rgba8()
                } else {
                    log::debug!("resizing layer of '{label}' from {:?} to {w}x{h}", img.dimensions());
                    image::imageops::resize(&img.to_rgba8(), w, h, FilterType::Triangle)
                }
            })
            .collect();
        Ok(Self::from_rgba_layers(device, queue, &layers, label, LayerKind::Array))
    }

    /// Heights as an unfilterable `R32Float` texture, read with `textureLoad`.
    pub fn heightmap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        heights: &[f32],
        width: u32,
        height: u32,
    ) -> Result<Self> {
        ensure!(
            heights.len() == (width as usize) * (height as usize),
            "heightmap has {} samples, expected {width}x{height}",
            heights.len()
        );
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("heightmap"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::HEIGHT_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            bytemuck::cast_slice(heights),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self {
            texture,
            view,
            sampler: None,
        })
    }

    fn from_rgba_layers(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layers: &[image::RgbaImage],
        label: &str,
        kind: LayerKind,
    ) -> Self {
        let (width, height) = layers[0].dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: layers.len() as u32,
        };
        let format = match kind {
            LayerKind::Linear => Self::LINEAR_FORMAT,
            _ => Self::COLOUR_FORMAT,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let data: Vec<u8> = layers.iter().flat_map(|l| l.as_raw().iter().copied()).collect();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let dimension = match kind {
            LayerKind::D2 | LayerKind::Linear => wgpu::TextureViewDimension::D2,
            LayerKind::Cube => wgpu::TextureViewDimension::Cube,
            LayerKind::Array => wgpu::TextureViewDimension::D2Array,
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(dimension),
            ..Default::default()
        });
        let sampler = match kind {
            LayerKind::Cube => create_clamped_sampler(device),
            _ => create_default_sampler(device),
        };
        Self {
            texture,
            view,
            sampler: Some(sampler),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LayerKind {
    D2,
    /// 2D without sRGB decoding.
    Linear,
    Cube,
    Array,
}

/// Direction through texel `(x, y)` of cube face `face` (+X, -X, +Y, -Y, +Z, -Z).
fn cube_direction(face: u32, x: u32, y: u32, size: u32) -> [f32; 3] {
    let u = 2.0 * (x as f32 + 0.5) / size as f32 - 1.0;
    let v = 2.0 * (y as f32 + 0.5) / size as f32 - 1.0;
    match face {
        0 => [1.0, -v, -u],
        1 => [-1.0, -v, u],
        2 => [u, 1.0, v],
        3 => [u, -1.0, -v],
        4 => [u, -v, 1.0],
        _ => [-u, -v, -1.0],
    }
}

fn gradient_face(face: u32, size: u32, top: [u8; 4], bottom: [u8; 4]) -> image::RgbaImage {
    image::RgbaImage::from_fn(size, size, |x, y| {
        let [dx, dy, dz] = cube_direction(face, x, y, size);
        let t = 0.5 * (dy / (dx * dx + dy * dy + dz * dz).sqrt() + 1.0);
        let mut px = [0u8; 4];
        for (i, c) in px.iter_mut().enumerate() {
            let b = bottom[i] as f32;
            *c = (b + (top[i] as f32 - b) * t).round() as u8;
        }
        image::Rgba(px)
    })
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

pub fn create_clamped_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_goes_from_bottom_to_top() {
        let top = [0, 0, 255, 255];
        let bottom = [255, 255, 255, 255];
        let up = gradient_face(2, 8, top, bottom);
        let down = gradient_face(3, 8, top, bottom);
        // Face centres look straight up and straight down.
        assert!(up.get_pixel(4, 4)[0] < 20);
        assert!(down.get_pixel(4, 4)[0] > 235);
    }

    #[test]
    fn cube_directions_point_out_of_their_face() {
        for face in 0..6 {
            let d = cube_direction(face, 2, 2, 5);
            let axis = (face / 2) as usize;
            let sign = if face % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(d[axis], sign);
        }
    }
}
