use std::time::Duration;

use anyhow::Context as _;
use terra_ngin::{config::SceneConfig, context::Context};

pub(crate) const WIDTH: u32 = 256;
pub(crate) const HEIGHT: u32 = 256;
pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device without a surface. `None` if the machine has no adapter at all, in
/// which case the GPU tests are skipped.
pub(crate) fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::default();
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::warn!("no adapter available, skipping GPU test: {e}");
                return None;
            }
        };
        let wireframe = adapter.features() & wgpu::Features::POLYGON_MODE_LINE;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("test device"),
                required_features: wireframe,
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(|e| log::warn!("could not create device, skipping GPU test: {e}"))
            .ok()
    })
}

pub(crate) fn test_context(config: &SceneConfig) -> Option<Context> {
    init_logger();
    let (device, queue) = headless_device()?;
    Some(Context::new(device, queue, FORMAT, WIDTH, HEIGHT, config))
}

pub(crate) struct Target {
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

pub(crate) fn render_target(ctx: &Context) -> Target {
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Output Texture"),
        size: wgpu::Extent3d {
            width: ctx.width,
            height: ctx.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    Target { texture, view }
}

/// Copies the target into a mappable buffer and waits for it. Rows are
/// padded to 256 bytes on the GPU side and unpadded here.
pub(crate) fn read_pixels(ctx: &Context, target: &Target) -> anyhow::Result<image::RgbaImage> {
    let (width, height) = (ctx.width, ctx.height);
    let unpadded = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded = unpadded.div_ceil(align) * align;

    let buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Readback Buffer"),
        size: (padded * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Readback Encoder") });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    let submission = ctx.queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    ctx.device
        .poll(wgpu::PollType::Wait {
            submission_index: Some(submission),
            timeout: Some(Duration::from_secs(3)),
        })
        .context("waiting for the readback copy")?;
    futures::executor::block_on(rx.receive())
        .context("readback channel closed")?
        .context("could not map the readback buffer")?;

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded * height) as usize);
    for row in data.chunks(padded as usize) {
        pixels.extend_from_slice(&row[..unpadded as usize]);
    }
    drop(data);
    buffer.unmap();
    image::RgbaImage::from_raw(width, height, pixels).context("readback has the wrong size")
}

pub(crate) fn colour_to_rgba8(colour: wgpu::Color) -> image::Rgba<u8> {
    // The target is sRGB, so linear clear values are encoded on write.
    let encode = |c: f64| {
        let c = c.clamp(0.0, 1.0);
        let s = if c <= 0.003_130_8 { c * 12.92 } else { 1.055 * c.powf(1.0 / 2.4) - 0.055 };
        (s * 255.0).round() as u8
    };
    image::Rgba([encode(colour.r), encode(colour.g), encode(colour.b), (colour.a.clamp(0.0, 1.0) * 255.0).round() as u8])
}

pub(crate) fn close(a: image::Rgba<u8>, b: image::Rgba<u8>, tolerance: u8) -> bool {
    a.0.iter().zip(b.0.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}
