#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use crate::common::test_utils::{colour_to_rgba8, read_pixels, render_target, test_context};
    use terra_ngin::{config::SceneConfig, render::render_to};

    let config = SceneConfig {
        clear_colour: wgpu::Color::WHITE,
        ..Default::default()
    };
    let Some(ctx) = test_context(&config) else {
        return;
    };
    let target = render_target(&ctx);
    render_to(&ctx, &target.view, Vec::new());

    let img = read_pixels(&ctx, &target).expect("readback failed");
    let desired = colour_to_rgba8(wgpu::Color::WHITE);
    for pixel in img.pixels() {
        assert_eq!(*pixel, desired);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_follow_clear_colour_changes() {
    use crate::common::test_utils::{close, colour_to_rgba8, read_pixels, render_target, test_context};
    use terra_ngin::{config::SceneConfig, render::render_to};

    let Some(mut ctx) = test_context(&SceneConfig::default()) else {
        return;
    };
    let target = render_target(&ctx);
    ctx.clear_colour = wgpu::Color::RED;
    render_to(&ctx, &target.view, Vec::new());

    let img = read_pixels(&ctx, &target).expect("readback failed");
    let desired = colour_to_rgba8(wgpu::Color::RED);
    assert!(img.pixels().all(|p| close(*p, desired, 1)));
}
