use crate::{
    data_structures::vertex::{BasicVertex, Vertex},
    pipelines::{DepthMode, mk_render_pipeline, shader_module},
    render_states::{BlendMode, RasterState},
    resources::Layouts,
};

const SOURCE: &str = concat!(include_str!("common.wgsl"), include_str!("basic.wgsl"));

/// Lit, optionally textured surfaces: land, boxes and water.
pub fn mk_lit_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
    raster: RasterState,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lit Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.object, &layouts.diffuse],
        push_constant_ranges: &[],
    });
    let shader = shader_module(device, "Lit Shader", SOURCE);
    mk_render_pipeline(
        device,
        &format!("Lit Pipeline ({raster:?})"),
        &render_pipeline_layout,
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::OPAQUE,
        &[BasicVertex::desc()],
        &shader,
        raster.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_main",
    )
}

/// Same shader as the lit pipeline, alpha blended and without depth writes.
/// Objects drawn with it must be sorted back to front.
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Transparent Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.object, &layouts.diffuse],
        push_constant_ranges: &[],
    });
    let shader = shader_module(device, "Transparent Shader", SOURCE);
    let mode = BlendMode::Transparent;
    mk_render_pipeline(
        device,
        "Transparent Pipeline",
        &render_pipeline_layout,
        format,
        mode.blend_state(),
        if mode.writes_depth() {
            DepthMode::OPAQUE
        } else {
            DepthMode::READ_ONLY
        },
        &[BasicVertex::desc()],
        &shader,
        RasterState::Solid.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_main",
    )
}

/// Redraws a picked triangle of a lit mesh with the highlight material.
/// Never textured, so the diffuse group is not part of the layout.
pub fn mk_highlight_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lit Highlight Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.object],
        push_constant_ranges: &[],
    });
    let shader = shader_module(device, "Lit Highlight Shader", SOURCE);
    mk_render_pipeline(
        device,
        "Lit Highlight Pipeline",
        &render_pipeline_layout,
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::LESS_EQUAL,
        &[BasicVertex::desc()],
        &shader,
        RasterState::NoCull.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_highlight",
    )
}
