use super::{ObjectResources, SceneObject};
use crate::{
    context::Context,
    data_structures::{lighting::Material, texture::Texture, transform::Transform},
    geometry,
    pick::PickMesh,
    render::{HighlightKind, Render},
    render_states::BlendMode,
};

const WOOD: [u8; 4] = [150, 111, 51, 255];

/// Lit, textured box. With [`BlendMode::AlphaToCoverage`] texels with low
/// alpha are cut out, with [`BlendMode::Transparent`] it is blended.
#[derive(Debug)]
pub struct CrateBox {
    id: u32,
    blend: BlendMode,
    resources: ObjectResources,
}

impl CrateBox {
    pub fn new(ctx: &Context, id: u32, transform: Transform, texture: Option<&Texture>, blend: BlendMode) -> Self {
        let fallback;
        let texture = match texture {
            Some(texture) => texture,
            None => {
                fallback = Texture::solid(&ctx.device, &ctx.queue, WOOD, "wood");
                &fallback
            }
        };
        let material = match blend {
            BlendMode::Transparent => Material::water(),
            _ => Material::land(),
        };
        let mut resources = ObjectResources::new(ctx, "crate", &geometry::lit_box(1.0, 1.0, 1.0), material, Some(texture));
        resources.world = transform.to_matrix();
        resources.alpha_clip = blend.needs_alpha_clip(1);
        Self { id, blend, resources }
    }

    pub fn blend(&self) -> BlendMode {
        self.blend
    }
}

impl SceneObject for CrateBox {
    fn id(&self) -> u32 {
        self.id
    }

    fn write_to_buffer(&mut self, ctx: &Context, picked_triangle: Option<u32>) {
        self.resources.write(&ctx.queue, picked_triangle);
    }

    fn render(&self) -> Render<'_> {
        let draw = self.resources.draw(self.id);
        let render = match self.blend {
            BlendMode::Transparent => Render::Transparent(draw),
            BlendMode::Opaque | BlendMode::AlphaToCoverage => Render::Lit(draw),
        };
        self.resources.with_highlight(self.id, render, HighlightKind::Lit)
    }

    fn pick_mesh(&self) -> Option<PickMesh<'_>> {
        self.resources.pick_mesh()
    }
}
