//! Render composition and pipeline batching.
//!
//! Scene objects describe what they want drawn as a [`Render`]. The renders of
//! one frame are flattened into [`Batches`], one per pipeline, and drawn in a
//! fixed order:
//!
//! 1. opaque geometry: coloured meshes, lit meshes, lines and terrain
//! 2. the sky, which only fills pixels nothing opaque covered
//! 3. transparent meshes, back to front
//! 4. highlighted (picked) triangles, drawn over their own surface
//!

use std::iter;

use cgmath::{MetricSpace, Point3};

use crate::{
    context::Context,
    data_structures::mesh::{DrawMesh, GpuMesh},
    sky::Sky,
    terrain::Terrain,
};

/// One mesh with its per-object bind groups.
#[derive(Copy, Clone, Debug)]
pub struct Draw<'a> {
    pub mesh: &'a GpuMesh,
    /// Group 1: the object uniform.
    pub object: &'a wgpu::BindGroup,
    /// Group 2 for lit meshes. `None` binds the white texture.
    pub texture: Option<&'a wgpu::BindGroup>,
    pub id: u32,
    /// World position used to sort transparent draws.
    pub world_pos: Point3<f32>,
}

/// Which shader a highlighted triangle is redrawn with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HighlightKind {
    Lit,
    Colored,
}

/// Specifies how a scene object should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Colored(Draw)` renders an unlit mesh with vertex colours
/// - `Lines(Draw)` renders a coloured line list
/// - `Lit(Draw)` renders an opaque lit mesh
/// - `Transparent(Draw)` renders an alpha blended lit mesh
/// - `Highlight` redraws one triangle of a mesh in the highlight material
/// - `Terrain` renders the visible terrain patches
/// - `Sky` renders the sky sphere
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
#[derive(Debug)]
pub enum Render<'a> {
    None,
    Colored(Draw<'a>),
    Lines(Draw<'a>),
    Lit(Draw<'a>),
    Transparent(Draw<'a>),
    Highlight {
        draw: Draw<'a>,
        triangle: u32,
        kind: HighlightKind,
    },
    Terrain(&'a Terrain),
    Sky(&'a Sky),
    Composed(Vec<Render<'a>>),
}

/// The renders of one frame, sorted by pipeline.
#[derive(Debug, Default)]
pub struct Batches<'a> {
    pub colored: Vec<Draw<'a>>,
    pub lines: Vec<Draw<'a>>,
    pub lit: Vec<Draw<'a>>,
    pub transparent: Vec<Draw<'a>>,
    pub highlights: Vec<(Draw<'a>, u32, HighlightKind)>,
    pub terrain: Vec<&'a Terrain>,
    pub sky: Option<&'a Sky>,
}

impl<'a> Batches<'a> {
    pub fn is_empty(&self) -> bool {
        self.colored.is_empty()
            && self.lines.is_empty()
            && self.lit.is_empty()
            && self.transparent.is_empty()
            && self.highlights.is_empty()
            && self.terrain.is_empty()
            && self.sky.is_none()
    }

    pub fn sort_transparent(&mut self, eye: Point3<f32>) {
        sort_back_to_front(&mut self.transparent, eye, |draw| draw.world_pos);
    }
}

/// Farthest from `eye` first, so nearer blended surfaces end up on top.
pub fn sort_back_to_front<T>(items: &mut [T], eye: Point3<f32>, position: impl Fn(&T) -> Point3<f32>) {
    items.sort_by(|a, b| {
        let da = eye.distance2(position(a));
        let db = eye.distance2(position(b));
        db.total_cmp(&da)
    });
}

/// One pipeline batch of [`Batches`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pass {
    Colored,
    Lit,
    Lines,
    Terrain,
    Sky,
    Transparent,
    Highlight,
}

impl Pass {
    pub fn is_opaque(self) -> bool {
        matches!(self, Pass::Colored | Pass::Lit | Pass::Lines | Pass::Terrain)
    }
}

/// The order [`draw_batches`] draws the batches in.
pub const DRAW_ORDER: [Pass; 7] = [
    Pass::Colored,
    Pass::Lit,
    Pass::Lines,
    Pass::Terrain,
    Pass::Sky,
    Pass::Transparent,
    Pass::Highlight,
];

impl<'a> Render<'a> {
    pub fn collect(self, batches: &mut Batches<'a>) {
        match self {
            Render::Colored(draw) => batches.colored.push(draw),
            Render::Lines(draw) => batches.lines.push(draw),
            Render::Lit(draw) => batches.lit.push(draw),
            Render::Transparent(draw) => batches.transparent.push(draw),
            Render::Highlight { draw, triangle, kind } => batches.highlights.push((draw, triangle, kind)),
            Render::Terrain(terrain) => batches.terrain.push(terrain),
            Render::Sky(sky) => {
                if batches.sky.replace(sky).is_some() {
                    log::warn!("more than one sky in a frame, drawing the last one");
                }
            }
            Render::Composed(renders) => renders.into_iter().for_each(|render| render.collect(batches)),
            Render::None => (),
        }
    }
}

impl<'a> From<Vec<Render<'a>>> for Batches<'a> {
    fn from(renders: Vec<Render<'a>>) -> Self {
        let mut batches = Batches::default();
        Render::Composed(renders).collect(&mut batches);
        batches
    }
}

/// Draws `batches` into a pass whose attachments match the context's format
/// and depth buffer.
pub fn draw_batches(ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>, mut batches: Batches<'_>) {
    batches.sort_transparent(ctx.camera.position());
    let opaque = ctx.pipelines.opaque(ctx.raster_state());
    render_pass.set_bind_group(0, &ctx.frame.bind_group, &[]);

    for pass in DRAW_ORDER {
        match pass {
            Pass::Colored => {
                render_pass.set_pipeline(&opaque.colored);
                for draw in &batches.colored {
                    render_pass.set_bind_group(1, draw.object, &[]);
                    render_pass.draw_mesh(draw.mesh);
                }
            }
            Pass::Lit => {
                render_pass.set_pipeline(&opaque.lit);
                for draw in &batches.lit {
                    render_pass.set_bind_group(1, draw.object, &[]);
                    render_pass.set_bind_group(2, draw.texture.unwrap_or(&ctx.white), &[]);
                    render_pass.draw_mesh(draw.mesh);
                }
            }
            Pass::Lines => {
                render_pass.set_pipeline(&ctx.pipelines.lines);
                for draw in &batches.lines {
                    render_pass.set_bind_group(1, draw.object, &[]);
                    render_pass.draw_mesh(draw.mesh);
                }
            }
            Pass::Terrain => {
                if !batches.terrain.is_empty() {
                    render_pass.set_pipeline(&opaque.terrain);
                    for terrain in &batches.terrain {
                        terrain.draw(render_pass);
                    }
                }
            }
            Pass::Sky => {
                if let Some(sky) = batches.sky {
                    render_pass.set_pipeline(&ctx.pipelines.sky);
                    sky.draw(render_pass);
                }
            }
            Pass::Transparent => {
                render_pass.set_pipeline(&ctx.pipelines.transparent);
                for draw in &batches.transparent {
                    render_pass.set_bind_group(1, draw.object, &[]);
                    render_pass.set_bind_group(2, draw.texture.unwrap_or(&ctx.white), &[]);
                    render_pass.draw_mesh(draw.mesh);
                }
            }
            Pass::Highlight => {
                for (draw, triangle, kind) in &batches.highlights {
                    let first = triangle * 3;
                    if first + 3 > draw.mesh.num_elements {
                        log::warn!("highlighted triangle {triangle} is not part of mesh '{}'", draw.mesh.name);
                        continue;
                    }
                    render_pass.set_pipeline(match kind {
                        HighlightKind::Lit => &ctx.pipelines.highlight_lit,
                        HighlightKind::Colored => &ctx.pipelines.highlight_colored,
                    });
                    render_pass.set_bind_group(1, draw.object, &[]);
                    render_pass.draw_mesh_range(draw.mesh, first..first + 3);
                }
            }
        }
    }
}

/// Clears `target`, draws `renders` and submits.
pub fn render_to(ctx: &Context, target: &wgpu::TextureView, renders: Vec<Render<'_>>) {
    let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    });
    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(ctx.clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: ctx.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        draw_batches(ctx, &mut render_pass, Batches::from(renders));
    }
    ctx.queue.submit(iter::once(encoder.finish()));
}
