use crate::{
    data_structures::vertex::Vertex,
    pipelines::{DepthMode, mk_render_pipeline, shader_module},
    render_states::{BlendMode, RasterState},
    resources::Layouts,
    terrain::patches::{GridVertex, PatchInstance},
};

/// Instanced patch grids displaced by the heightmap.
pub fn mk_terrain_pipeline(
    device: &wgpu::Device,
    layouts: &Layouts,
    format: wgpu::TextureFormat,
    raster: RasterState,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Terrain Pipeline Layout"),
        bind_group_layouts: &[&layouts.frame, &layouts.terrain],
        push_constant_ranges: &[],
    });
    let shader = shader_module(
        device,
        "Terrain Shader",
        concat!(include_str!("common.wgsl"), include_str!("terrain.wgsl")),
    );
    mk_render_pipeline(
        device,
        &format!("Terrain Pipeline ({raster:?})"),
        &render_pipeline_layout,
        format,
        BlendMode::Opaque.blend_state(),
        DepthMode::OPAQUE,
        &[GridVertex::desc(), PatchInstance::desc()],
        &shader,
        raster.primitive(wgpu::PrimitiveTopology::TriangleList),
        "fs_main",
    )
}
