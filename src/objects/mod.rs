//! Scene objects.
//!
//! Each object owns its GPU mesh, a uniform with its world matrix and
//! material, and optionally a diffuse texture. Pickable objects also keep
//! the CPU positions and indices the ray is tested against, and a second
//! uniform holding the highlight material for the picked triangle.

pub mod basis;
pub mod crate_box;
pub mod land;
pub mod spinning_box;
pub mod water;

use cgmath::{Matrix4, Point3, SquareMatrix, Transform};

use crate::{
    context::Context,
    data_structures::{
        bounds::Aabb,
        lighting::{Material, ObjectUniform},
        mesh::{GpuMesh, MeshData},
        texture::Texture,
        vertex::HasPosition,
    },
    pick::PickMesh,
    render::{Draw, HighlightKind, Render},
    resources::{UniformBinding, texture_bind_group},
};
pub use basis::Basis;
pub use crate_box::CrateBox;
pub use land::Land;
pub use spinning_box::SpinningBox;
pub use water::Water;

/// Something the scene updates, draws and possibly picks every frame.
pub trait SceneObject {
    fn id(&self) -> u32;

    /// Advances animation by `dt` seconds.
    fn update(&mut self, _dt: f32) {}

    /// Uploads the object's uniforms. `picked_triangle` is the selected
    /// triangle if this object holds the selection.
    fn write_to_buffer(&mut self, ctx: &Context, picked_triangle: Option<u32>);

    fn render(&self) -> Render<'_>;

    /// Geometry to test pick rays against. `None` for objects that cannot
    /// be picked.
    fn pick_mesh(&self) -> Option<PickMesh<'_>> {
        None
    }
}

/// GPU and CPU state shared by all mesh objects.
#[derive(Debug)]
pub struct ObjectResources {
    pub mesh: GpuMesh,
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub aabb: Option<Aabb>,
    pub object: UniformBinding<ObjectUniform>,
    pub highlight: UniformBinding<ObjectUniform>,
    pub texture: Option<wgpu::BindGroup>,
    pub material: Material,
    pub world: Matrix4<f32>,
    pub tex_transform: Matrix4<f32>,
    pub alpha_clip: bool,
    picked_triangle: Option<u32>,
}

impl ObjectResources {
    pub fn new<V>(ctx: &Context, name: &str, mesh: &MeshData<V>, material: Material, texture: Option<&Texture>) -> Self
    where
        V: bytemuck::Pod + HasPosition,
    {
        let identity = Matrix4::identity();
        let object = UniformBinding::new(
            &ctx.device,
            &ctx.layouts.object,
            ObjectUniform::new(identity, identity, material, texture.is_some(), false),
            name,
        );
        let highlight = UniformBinding::new(
            &ctx.device,
            &ctx.layouts.object,
            ObjectUniform::new(identity, identity, Material::highlight(), false, false),
            &format!("{name} Highlight"),
        );
        let texture = texture.map(|t| texture_bind_group(&ctx.device, &ctx.layouts.diffuse, t, &format!("{name} Diffuse")));
        Self {
            mesh: GpuMesh::new(&ctx.device, name, mesh),
            positions: mesh.positions(),
            indices: mesh.indices.clone(),
            aabb: mesh.aabb(),
            object,
            highlight,
            texture,
            material,
            world: identity,
            tex_transform: identity,
            alpha_clip: false,
            picked_triangle: None,
        }
    }

    /// Writes the object uniform, and the highlight uniform while one of
    /// the triangles is picked.
    pub fn write(&mut self, queue: &wgpu::Queue, picked_triangle: Option<u32>) {
        self.picked_triangle = picked_triangle;
        self.object.write(
            queue,
            ObjectUniform::new(
                self.world,
                self.tex_transform,
                self.material,
                self.texture.is_some(),
                self.alpha_clip,
            ),
        );
        if picked_triangle.is_some() {
            self.highlight.write(
                queue,
                ObjectUniform::new(self.world, self.tex_transform, Material::highlight(), false, false),
            );
        }
    }

    pub fn world_pos(&self) -> Point3<f32> {
        self.world.transform_point(Point3::new(0.0, 0.0, 0.0))
    }

    pub fn draw(&self, id: u32) -> Draw<'_> {
        Draw {
            mesh: &self.mesh,
            object: &self.object.bind_group,
            texture: self.texture.as_ref(),
            id,
            world_pos: self.world_pos(),
        }
    }

    /// The object itself followed by its highlighted triangle, if any.
    pub fn with_highlight<'a>(&'a self, id: u32, render: Render<'a>, kind: HighlightKind) -> Render<'a> {
        match self.picked_triangle {
            Some(triangle) => Render::Composed(vec![
                render,
                Render::Highlight {
                    draw: Draw {
                        object: &self.highlight.bind_group,
                        texture: None,
                        ..self.draw(id)
                    },
                    triangle,
                    kind,
                },
            ]),
            None => render,
        }
    }

    pub fn pick_mesh(&self) -> Option<PickMesh<'_>> {
        Some(PickMesh {
            world: self.world,
            positions: &self.positions,
            indices: &self.indices,
            aabb: self.aabb?,
        })
    }

    pub fn picked_triangle(&self) -> Option<u32> {
        self.picked_triangle
    }
}
