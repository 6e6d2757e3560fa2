use super::{ObjectResources, SceneObject};
use crate::{
    context::Context,
    data_structures::{lighting::Material, texture::Texture, transform::tex_transform},
    geometry,
    pick::PickMesh,
    render::{HighlightKind, Render},
};

const GRASS: [u8; 4] = [86, 125, 70, 255];

/// Procedural hills, 160x160 units.
#[derive(Debug)]
pub struct Land {
    id: u32,
    resources: ObjectResources,
}

impl Land {
    /// Without a texture the hills are a flat grass green.
    pub fn new(ctx: &Context, id: u32, texture: Option<&Texture>) -> Self {
        let fallback;
        let texture = match texture {
            Some(texture) => texture,
            None => {
                fallback = Texture::solid(&ctx.device, &ctx.queue, GRASS, "grass");
                &fallback
            }
        };
        let mesh = geometry::hills(160.0, 160.0, 50, 50);
        let mut resources = ObjectResources::new(ctx, "land", &mesh, Material::land(), Some(texture));
        resources.tex_transform = tex_transform(5.0, 5.0, [0.0, 0.0]);
        Self { id, resources }
    }
}

impl SceneObject for Land {
    fn id(&self) -> u32 {
        self.id
    }

    fn write_to_buffer(&mut self, ctx: &Context, picked_triangle: Option<u32>) {
        self.resources.write(&ctx.queue, picked_triangle);
    }

    fn render(&self) -> Render<'_> {
        self.resources
            .with_highlight(self.id, Render::Lit(self.resources.draw(self.id)), HighlightKind::Lit)
    }

    fn pick_mesh(&self) -> Option<PickMesh<'_>> {
        self.resources.pick_mesh()
    }
}
