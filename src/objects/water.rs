use super::{ObjectResources, SceneObject};
use crate::{
    context::Context,
    data_structures::{lighting::Material, texture::Texture, transform::tex_transform},
    geometry,
    render::Render,
};

const WATER_BLUE: [u8; 4] = [40, 90, 160, 255];

/// Units of texture space scrolled per second.
const SCROLL_SPEED: [f32; 2] = [0.1, 0.05];

/// Flat, half transparent water with a scrolling texture. Not pickable.
#[derive(Debug)]
pub struct Water {
    id: u32,
    offset: [f32; 2],
    resources: ObjectResources,
}

impl Water {
    pub fn new(ctx: &Context, id: u32, texture: Option<&Texture>) -> Self {
        let fallback;
        let texture = match texture {
            Some(texture) => texture,
            None => {
                fallback = Texture::solid(&ctx.device, &ctx.queue, WATER_BLUE, "water");
                &fallback
            }
        };
        let mesh = geometry::grid(160.0, 160.0, 50, 50);
        let mut resources = ObjectResources::new(ctx, "water", &mesh, Material::water(), Some(texture));
        resources.tex_transform = tex_transform(5.0, 5.0, [0.0, 0.0]);
        Self {
            id,
            offset: [0.0, 0.0],
            resources,
        }
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }
}

/// Advances a texture offset, wrapped to `0..1`.
pub fn scroll(offset: [f32; 2], dt: f32) -> [f32; 2] {
    [
        (offset[0] + SCROLL_SPEED[0] * dt).rem_euclid(1.0),
        (offset[1] + SCROLL_SPEED[1] * dt).rem_euclid(1.0),
    ]
}

impl SceneObject for Water {
    fn id(&self) -> u32 {
        self.id
    }

    fn update(&mut self, dt: f32) {
        self.offset = scroll(self.offset, dt);
        self.resources.tex_transform = tex_transform(5.0, 5.0, self.offset);
    }

    fn write_to_buffer(&mut self, ctx: &Context, _picked_triangle: Option<u32>) {
        self.resources.write(&ctx.queue, None);
    }

    fn render(&self) -> Render<'_> {
        Render::Transparent(self.resources.draw(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolling_wraps() {
        let offset = scroll([0.95, 0.0], 1.0);
        assert!((offset[0] - 0.05).abs() < 1e-5);
        assert!((offset[1] - 0.05).abs() < 1e-5);
        assert_eq!(scroll([0.3, 0.4], 0.0), [0.3, 0.4]);
    }
}
