//! Start-up parameters of a [`crate::context::Context`] and the demo scene.

use cgmath::Point3;

use crate::{
    data_structures::lighting::FogSettings, render_states::RenderOptions, terrain::LodSettings,
};

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub clear_colour: wgpu::Color,
    pub fov_y: f32,
    pub near_z: f32,
    pub far_z: f32,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
    /// Units per second.
    pub camera_speed: f32,
    /// Degrees per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    pub fog: FogSettings,
    pub render_options: RenderOptions,
    pub terrain_lod: LodSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let fog = FogSettings::default();
        Self {
            clear_colour: wgpu::Color {
                r: fog.color[0] as f64,
                g: fog.color[1] as f64,
                b: fog.color[2] as f64,
                a: 1.0,
            },
            fov_y: 0.25 * std::f32::consts::PI,
            near_z: 1.0,
            far_z: 1000.0,
            camera_position: Point3::new(0.0, 2.0, -15.0),
            camera_target: Point3::new(0.0, 0.0, 0.0),
            camera_speed: 10.0,
            mouse_sensitivity: 0.25,
            fog,
            render_options: RenderOptions::default(),
            terrain_lod: LodSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_colour_matches_fog() {
        let config = SceneConfig::default();
        assert_eq!(config.clear_colour.r, config.fog.color[0] as f64);
        assert_eq!(config.render_options, RenderOptions::TexturesAndFog);
        assert_eq!(config.terrain_lod.max_tess, 6);
    }
}
