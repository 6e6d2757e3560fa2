//! Cube mapped sky sphere that follows the camera.

use cgmath::{Matrix4, Point3, SquareMatrix};

use crate::{
    context::Context,
    data_structures::{
        lighting::{Material, ObjectUniform},
        mesh::{DrawMesh, GpuMesh},
        texture::Texture,
    },
    geometry,
    render::Render,
    resources::{UniformBinding, texture_bind_group},
};

#[derive(Debug)]
pub struct Sky {
    mesh: GpuMesh,
    object: UniformBinding<ObjectUniform>,
    cube: wgpu::BindGroup,
    radius: f32,
}

impl Sky {
    /// `cube` must have a cube view, see [`Texture::cube_from_images`].
    pub fn new(ctx: &Context, radius: f32, cube: &Texture) -> Self {
        let mesh = GpuMesh::new(&ctx.device, "sky sphere", &geometry::sphere(radius, 30, 30));
        let object = UniformBinding::new(
            &ctx.device,
            &ctx.layouts.object,
            ObjectUniform::new(Matrix4::identity(), Matrix4::identity(), Material::default(), false, false),
            "Sky",
        );
        let cube = texture_bind_group(&ctx.device, &ctx.layouts.cube, cube, "Sky Cube Bind Group");
        Self {
            mesh,
            object,
            cube,
            radius,
        }
    }

    /// Sky fading from `bottom` at the horizon below to `top` straight up.
    pub fn gradient(ctx: &Context, radius: f32, top: [u8; 4], bottom: [u8; 4]) -> Self {
        let cube = Texture::gradient_cube(&ctx.device, &ctx.queue, 64, top, bottom);
        Self::new(ctx, radius, &cube)
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Centres the sphere on the eye so the sky never gets closer.
    pub fn update(&mut self, queue: &wgpu::Queue, eye: Point3<f32>) {
        let world = Matrix4::from_translation(eye - Point3::new(0.0, 0.0, 0.0));
        self.object.write(
            queue,
            ObjectUniform::new(world, Matrix4::identity(), Material::default(), false, false),
        );
    }

    pub fn render(&self) -> Render<'_> {
        Render::Sky(self)
    }

    /// Expects the sky pipeline and the frame bind group to be set.
    pub(crate) fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.object.bind_group, &[]);
        render_pass.set_bind_group(2, &self.cube, &[]);
        render_pass.draw_mesh(&self.mesh);
    }
}
