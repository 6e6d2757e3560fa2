#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn flat_terrain_info() -> terra_ngin::terrain::TerrainInfo {
    terra_ngin::terrain::TerrainInfo {
        height_scale: 10.0,
        heightmap_width: 129,
        heightmap_height: 129,
        cell_spacing: 0.5,
        ..Default::default()
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_sample_heights_and_cull_patches() {
    use crate::common::test_utils::test_context;
    use cgmath::Point3;
    use terra_ngin::{camera::Camera, config::SceneConfig, terrain::Terrain};

    let Some(ctx) = test_context(&SceneConfig::default()) else {
        return;
    };
    let info = flat_terrain_info();
    let raw = vec![255u8; 129 * 129];
    let mut terrain = Terrain::from_raw(&ctx, &info, &raw).expect("terrain setup failed");

    assert_eq!(terrain.width(), 64.0);
    assert_eq!(terrain.patches().layout().patch_count(), 4);
    assert!((terrain.height(0.0, 0.0) - 10.0).abs() < 1e-3);
    assert_eq!(terrain.height(1000.0, 1000.0), 0.0);

    let mut camera = Camera::default();
    camera.set_lens(0.25 * std::f32::consts::PI, 1.0, 1.0, 1000.0);
    camera.look_at(Point3::new(0.0, 50.0, -100.0), Point3::new(0.0, 0.0, 0.0), cgmath::Vector3::unit_y());
    terrain.update(&ctx.queue, camera.position(), &camera.view_proj());
    assert_eq!(terrain.visible_patch_count(), 4);

    camera.look_at(Point3::new(0.0, 50.0, -100.0), Point3::new(0.0, 50.0, -200.0), cgmath::Vector3::unit_y());
    terrain.update(&ctx.queue, camera.position(), &camera.view_proj());
    assert_eq!(terrain.visible_patch_count(), 0);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_terrain_over_the_clear_colour() {
    use crate::common::test_utils::{HEIGHT, WIDTH, close, colour_to_rgba8, read_pixels, render_target, test_context};
    use cgmath::Point3;
    use terra_ngin::{
        config::SceneConfig,
        render::{Render, render_to},
        render_states::RenderOptions,
        terrain::Terrain,
    };

    let config = SceneConfig {
        clear_colour: wgpu::Color::BLACK,
        camera_position: Point3::new(0.0, 50.0, -100.0),
        camera_target: Point3::new(0.0, 0.0, 0.0),
        render_options: RenderOptions::Lighting,
        ..Default::default()
    };
    let Some(mut ctx) = test_context(&config) else {
        return;
    };
    let info = flat_terrain_info();
    let raw = vec![128u8; 129 * 129];
    let mut terrain = Terrain::from_raw(&ctx, &info, &raw).expect("terrain setup failed");
    terrain.update(&ctx.queue, ctx.camera.position(), &ctx.camera.view_proj());
    ctx.write_frame_uniform();

    let target = render_target(&ctx);
    render_to(&ctx, &target.view, vec![Render::Terrain(&terrain)]);
    let img = read_pixels(&ctx, &target).expect("readback failed");

    let black = colour_to_rgba8(wgpu::Color::BLACK);
    assert!(!close(*img.get_pixel(WIDTH / 2, HEIGHT / 2), black, 8));
    // Above the horizon only the clear colour is left.
    assert_eq!(*img.get_pixel(WIDTH / 2, 0), black);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_sample_blend_weights_without_srgb_decoding() {
    use crate::common::test_utils::test_context;
    use image::{DynamicImage, Rgba, RgbaImage};
    use terra_ngin::{config::SceneConfig, data_structures::texture::Texture, terrain::Terrain};

    let Some(ctx) = test_context(&SceneConfig::default()) else {
        return;
    };
    let raw = vec![64u8; 129 * 129];

    let derived = Terrain::from_raw(&ctx, &flat_terrain_info(), &raw).expect("terrain setup failed");
    assert_eq!(derived.blend_map().texture.format(), wgpu::TextureFormat::Rgba8Unorm);

    let info = terra_ngin::terrain::TerrainInfo {
        blend_map: Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([128, 0, 0, 0])))),
        ..flat_terrain_info()
    };
    let authored = Terrain::from_raw(&ctx, &info, &raw).expect("terrain setup failed");
    assert_eq!(authored.blend_map().texture.format(), Texture::LINEAR_FORMAT);
}
