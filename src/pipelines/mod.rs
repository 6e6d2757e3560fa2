//! Render pipelines.
//!
//! Every shader is `common.wgsl` followed by its own source, so the frame
//! uniform and the lighting model are written once. Raster states switch at
//! runtime, so the opaque pipelines exist once per [`RasterState`]. The
//! wireframe set is only built when the device can draw lines.

pub mod basic;
pub mod color;
pub mod sky;
pub mod terrain;

use crate::{data_structures::texture::Texture, render_states::RasterState, resources::Layouts};

/// Depth test and write of a pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthMode {
    pub write: bool,
    pub compare: wgpu::CompareFunction,
}

impl DepthMode {
    pub const OPAQUE: Self = Self {
        write: true,
        compare: wgpu::CompareFunction::Less,
    };
    /// Tested against but never written, for blended geometry.
    pub const READ_ONLY: Self = Self {
        write: false,
        compare: wgpu::CompareFunction::Less,
    };
    /// Passes on equal depth, for the sky on the far plane and for redrawing
    /// a triangle over itself.
    pub const LESS_EQUAL: Self = Self {
        write: false,
        compare: wgpu::CompareFunction::LessEqual,
    };
}

pub(crate) fn shader_module(device: &wgpu::Device, label: &str, source: &'static str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth: DepthMode,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    primitive: wgpu::PrimitiveState,
    fs_entry: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive,
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// The pipelines whose primitive state follows the current [`RasterState`].
#[derive(Debug)]
pub struct OpaquePipelines {
    pub colored: wgpu::RenderPipeline,
    pub lit: wgpu::RenderPipeline,
    pub terrain: wgpu::RenderPipeline,
}

impl OpaquePipelines {
    fn new(device: &wgpu::Device, layouts: &Layouts, format: wgpu::TextureFormat, raster: RasterState) -> Self {
        Self {
            colored: color::mk_color_pipeline(device, layouts, format, raster),
            lit: basic::mk_lit_pipeline(device, layouts, format, raster),
            terrain: terrain::mk_terrain_pipeline(device, layouts, format, raster),
        }
    }
}

#[derive(Debug)]
pub struct Pipelines {
    solid: OpaquePipelines,
    no_cull: OpaquePipelines,
    wireframe: Option<OpaquePipelines>,
    pub lines: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub highlight_lit: wgpu::RenderPipeline,
    pub highlight_colored: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, layouts: &Layouts, format: wgpu::TextureFormat) -> Self {
        let wireframe = if RasterState::Wireframe.supported_by(device.features()) {
            Some(OpaquePipelines::new(device, layouts, format, RasterState::Wireframe))
        } else {
            log::info!("device lacks POLYGON_MODE_LINE, wireframe is unavailable");
            None
        };
        Self {
            solid: OpaquePipelines::new(device, layouts, format, RasterState::Solid),
            no_cull: OpaquePipelines::new(device, layouts, format, RasterState::NoCull),
            wireframe,
            lines: color::mk_lines_pipeline(device, layouts, format),
            transparent: basic::mk_transparent_pipeline(device, layouts, format),
            highlight_lit: basic::mk_highlight_pipeline(device, layouts, format),
            highlight_colored: color::mk_highlight_pipeline(device, layouts, format),
            sky: sky::mk_sky_pipeline(device, layouts, format),
        }
    }

    /// Opaque pipelines for `raster`. Wireframe falls back to solid when the
    /// device cannot draw it.
    pub fn opaque(&self, raster: RasterState) -> &OpaquePipelines {
        match raster {
            RasterState::Solid => &self.solid,
            RasterState::NoCull => &self.no_cull,
            RasterState::Wireframe => self.wireframe.as_ref().unwrap_or(&self.solid),
        }
    }

    pub fn has_wireframe(&self) -> bool {
        self.wireframe.is_some()
    }
}
