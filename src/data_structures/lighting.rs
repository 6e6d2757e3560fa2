//! Materials, directional lights, fog and the uniform blocks that carry them.
//!
//! Every struct uploaded to the GPU is `#[repr(C)]` and padded by hand so the
//! Rust layout matches the WGSL uniform layout rules (16 byte alignment for
//! `vec3`/`vec4`/`mat4x4`).

use cgmath::{Matrix4, Point3, SquareMatrix};

use crate::render_states::RenderOptions;

pub const MAX_LIGHTS: usize = 3;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Material {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// `w` is the specular power.
    pub specular: [f32; 4],
    pub reflect: [f32; 4],
}

impl Material {
    pub const fn new(ambient: [f32; 4], diffuse: [f32; 4], specular: [f32; 4]) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            reflect: [0.0; 4],
        }
    }

    /// Hills and boxes.
    pub const fn land() -> Self {
        Self::new(
            [0.5, 0.5, 0.5, 1.0],
            [1.0, 1.0, 1.0, 1.0],
            [0.2, 0.2, 0.2, 16.0],
        )
    }

    /// Half transparent, shiny.
    pub const fn water() -> Self {
        Self::new(
            [0.5, 0.5, 0.5, 1.0],
            [1.0, 1.0, 1.0, 0.5],
            [0.8, 0.8, 0.8, 32.0],
        )
    }

    pub const fn terrain() -> Self {
        Self {
            ambient: [1.0, 1.0, 1.0, 1.0],
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0, 64.0],
            reflect: [0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Drawn over a picked triangle.
    pub const fn highlight() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], [0.0, 0.8, 0.4, 1.0], [0.0, 0.0, 0.0, 16.0])
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::land()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub direction: [f32; 3],
}

impl DirectionalLight {
    pub fn to_raw(&self) -> DirectionalLightRaw {
        DirectionalLightRaw {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            direction: self.direction,
            _padding: 0.0,
        }
    }
}

/// Key, fill and back light.
pub fn default_lights() -> [DirectionalLight; MAX_LIGHTS] {
    [
        DirectionalLight {
            ambient: [0.2, 0.2, 0.2, 1.0],
            diffuse: [0.5, 0.5, 0.5, 1.0],
            specular: [0.5, 0.5, 0.5, 1.0],
            direction: [0.57735, -0.57735, 0.57735],
        },
        DirectionalLight {
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.20, 0.20, 0.20, 1.0],
            specular: [0.25, 0.25, 0.25, 1.0],
            direction: [-0.57735, -0.57735, 0.57735],
        },
        DirectionalLight {
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.2, 0.2, 0.2, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            direction: [0.0, -0.707, -0.707],
        },
    ]
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
    direction: [f32; 3],
    _padding: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FogSettings {
    pub color: [f32; 4],
    pub start: f32,
    pub range: f32,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            color: [0.75, 0.75, 0.75, 1.0],
            start: 15.0,
            range: 175.0,
        }
    }
}

/// Per-frame data shared by every pipeline (bind group 0).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    eye_pos: [f32; 3],
    light_count: u32,
    fog_color: [f32; 4],
    fog_start: f32,
    fog_range: f32,
    fog_enabled: u32,
    use_texture: u32,
    lights: [DirectionalLightRaw; MAX_LIGHTS],
}

impl FrameUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            eye_pos: [0.0; 3],
            light_count: MAX_LIGHTS as u32,
            fog_color: FogSettings::default().color,
            fog_start: 0.0,
            fog_range: 1.0,
            fog_enabled: 0,
            use_texture: 0,
            lights: default_lights().map(|l| l.to_raw()),
        }
    }

    pub fn update(
        &mut self,
        view_proj: Matrix4<f32>,
        eye: Point3<f32>,
        lights: &[DirectionalLight],
        fog: &FogSettings,
        options: RenderOptions,
    ) {
        self.view_proj = view_proj.into();
        self.eye_pos = eye.into();
        self.light_count = lights.len().min(MAX_LIGHTS) as u32;
        for (slot, light) in self.lights.iter_mut().zip(lights) {
            *slot = light.to_raw();
        }
        self.fog_color = fog.color;
        self.fog_start = fog.start;
        self.fog_range = fog.range.max(f32::EPSILON);
        self.fog_enabled = options.fog() as u32;
        self.use_texture = options.textures() as u32;
    }

    pub fn light_count(&self) -> u32 {
        self.light_count
    }

    pub fn fog_enabled(&self) -> bool {
        self.fog_enabled != 0
    }
}

impl Default for FrameUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-object data (bind group 1 of the lit and colour pipelines).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    world: [[f32; 4]; 4],
    world_inv_transpose: [[f32; 4]; 4],
    tex_transform: [[f32; 4]; 4],
    material: Material,
    /// x: object has its own texture, y: alpha clip, z/w unused.
    flags: [u32; 4],
}

impl ObjectUniform {
    pub fn new(
        world: Matrix4<f32>,
        tex_transform: Matrix4<f32>,
        material: Material,
        textured: bool,
        alpha_clip: bool,
    ) -> Self {
        Self {
            world: world.into(),
            world_inv_transpose: inverse_transpose(world).into(),
            tex_transform: tex_transform.into(),
            material,
            flags: [textured as u32, alpha_clip as u32, 0, 0],
        }
    }

    pub fn material(&self) -> &Material {
        &self.material
    }
}

/// Normals need the inverse transpose of the world matrix. Translation is
/// dropped first so it cannot leak into the result.
pub fn inverse_transpose(m: Matrix4<f32>) -> Matrix4<f32> {
    use cgmath::Matrix;
    let mut a = m;
    a.w = cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
    a.invert().unwrap_or(Matrix4::identity()).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_follow_wgsl_layout() {
        assert_eq!(std::mem::size_of::<Material>(), 64);
        assert_eq!(std::mem::size_of::<DirectionalLightRaw>(), 64);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 304);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 272);
    }

    #[test]
    fn frame_uniform_follows_render_options() {
        let mut uniform = FrameUniform::new();
        let lights = default_lights();
        uniform.update(
            Matrix4::identity(),
            Point3::new(0.0, 1.0, 2.0),
            &lights[..2],
            &FogSettings::default(),
            RenderOptions::TexturesAndFog,
        );
        assert_eq!(uniform.light_count(), 2);
        assert!(uniform.fog_enabled());

        uniform.update(
            Matrix4::identity(),
            Point3::new(0.0, 1.0, 2.0),
            &lights,
            &FogSettings::default(),
            RenderOptions::Lighting,
        );
        assert_eq!(uniform.light_count(), 3);
        assert!(!uniform.fog_enabled());
    }

    #[test]
    fn inverse_transpose_ignores_translation() {
        let m = Matrix4::from_translation([5.0, 6.0, 7.0].into()) * Matrix4::from_scale(2.0);
        let it = inverse_transpose(m);
        assert_eq!(it, Matrix4::from_scale(0.5));
    }
}
