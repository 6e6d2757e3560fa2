use super::{ObjectResources, SceneObject};
use crate::{context::Context, data_structures::lighting::Material, geometry, render::Render};

/// Red, green and blue lines along the world axes.
#[derive(Debug)]
pub struct Basis {
    id: u32,
    resources: ObjectResources,
}

impl Basis {
    pub fn new(ctx: &Context, id: u32) -> Self {
        Self {
            id,
            resources: ObjectResources::new(ctx, "basis", &geometry::basis_lines(), Material::default(), None),
        }
    }
}

impl SceneObject for Basis {
    fn id(&self) -> u32 {
        self.id
    }

    fn write_to_buffer(&mut self, ctx: &Context, _picked_triangle: Option<u32>) {
        self.resources.write(&ctx.queue, None);
    }

    fn render(&self) -> Render<'_> {
        Render::Lines(self.resources.draw(self.id))
    }
}
