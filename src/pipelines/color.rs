use crate::{
    data_structures::vertex::{ColorVertex, Vertex},
    pipelines::{DepthMode, mk_render_pipeline, shader_module},
    render_states::{BlendMode, RasterState},
    resources::Layouts,
};

const SOURCE: &str = concat!(include_str!("common.wgsl"), include_str!("color.wgsl"));

fn layout(device: &wgpu::Device, layouts: &Layouts) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Color Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.object],
        push_constant_ranges: &[],
    })
}

/// Per-vertex colours, unlit. The spinning cube uses it.
pub fn mk_color_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
    raster: RasterState,
) -> wgpu::RenderPipeline {
    let shader = shader_module(device, "Color Shader", SOURCE);
    mk_render_pipeline(
        device,
        &format!("Color Pipeline ({raster:?})"),
        &layout(device, layouts),
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::OPAQUE,
        &[ColorVertex::desc()],
        &shader,
        raster.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_main",
    )
}

/// Line lists, e.g. the axis gizmo.
pub fn mk_lines_pipeline(device: &wgpu::Device, layouts: &Layouts, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = shader_module(device, "Lines Shader", SOURCE);
    mk_render_pipeline(
        device,
        "Lines Pipeline",
        &layout(device, layouts),
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::OPAQUE,
        &[ColorVertex::desc()],
        &shader,
        RasterState::Solid.primitive(wgpu::PrimitiveTopology::LineList),
        "fs_main",
    )
}

/// Redraws a picked triangle of a coloured mesh in the highlight colour.
pub fn mk_highlight_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = shader_module(device, "Color Highlight Shader", SOURCE);
    mk_render_pipeline(
        device,
        "Color Highlight Pipeline",
        &layout(device, layouts),
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::LESS_EQUAL,
        &[ColorVertex::desc()],
        &shader,
        RasterState::Solid.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_highlight",
    )
}
