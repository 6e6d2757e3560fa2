use crate::{
    data_structures::vertex::{BasicVertex, Vertex},
    pipelines::{DepthMode, mk_render_pipeline, shader_module},
    render_states::{BlendMode, RasterState},
    resources::Layouts,
};

/// The sky sphere is seen from inside, so nothing is culled. It sits on the
/// far plane and must pass against a cleared depth of 1.
pub fn mk_sky_pipeline(device: &wgpu::Device, layouts: &Layouts, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.object, &layouts.cube],
        push_constant_ranges: &[],
    });
    let shader = shader_module(
        device,
        "Sky Shader",
        concat!(include_str!("common.wgsl"), include_str!("sky.wgsl")),
    );
    mk_render_pipeline(
        device,
        "Sky Pipeline",
        &render_pipeline_layout,
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::LESS_EQUAL,
        &[BasicVertex::desc()],
        &shader,
        RasterState::NoCull.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_main",
    )
}
