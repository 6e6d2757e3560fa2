use cgmath::{Matrix4, Rad, Vector3};

use super::{ObjectResources, SceneObject};
use crate::{
    context::Context,
    data_structures::lighting::Material,
    geometry,
    pick::PickMesh,
    render::{HighlightKind, Render},
};

/// The coloured cube, orbiting and tumbling in front of the camera.
#[derive(Debug)]
pub struct SpinningBox {
    id: u32,
    t: f32,
    resources: ObjectResources,
}

impl SpinningBox {
    pub fn new(ctx: &Context, id: u32) -> Self {
        let mut resources = ObjectResources::new(ctx, "spinning box", &geometry::colored_cube(), Material::land(), None);
        resources.world = spin_world(0.0);
        Self { id, t: 0.0, resources }
    }

    pub fn world(&self) -> Matrix4<f32> {
        self.resources.world
    }
}

/// Rotations about x, -y and z by `t`, then a move to `(10 cos t, 0, 20)`.
pub fn spin_world(t: f32) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(10.0 * t.cos(), 0.0, 20.0))
        * Matrix4::from_angle_z(Rad(t))
        * Matrix4::from_angle_y(Rad(-t))
        * Matrix4::from_angle_x(Rad(t))
}

impl SceneObject for SpinningBox {
    fn id(&self) -> u32 {
        self.id
    }

    fn update(&mut self, dt: f32) {
        self.t += dt;
        self.resources.world = spin_world(self.t);
    }

    fn write_to_buffer(&mut self, ctx: &Context, picked_triangle: Option<u32>) {
        self.resources.write(&ctx.queue, picked_triangle);
    }

    fn render(&self) -> Render<'_> {
        self.resources.with_highlight(
            self.id,
            Render::Colored(self.resources.draw(self.id)),
            HighlightKind::Colored,
        )
    }

    fn pick_mesh(&self) -> Option<PickMesh<'_>> {
        self.resources.pick_mesh()
    }
}
