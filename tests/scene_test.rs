#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_frames_of_the_demo_scene() {
    use crate::common::test_utils::{HEIGHT, WIDTH, read_pixels, render_target, test_context};
    use terra_ngin::{
        config::SceneConfig,
        scene::{DemoScene, SceneAssets, SkySource},
    };

    let config = SceneConfig::default();
    let Some(mut ctx) = test_context(&config) else {
        return;
    };
    let assets = SceneAssets {
        sky: Some(SkySource::default()),
        ..Default::default()
    };
    let mut scene = DemoScene::new(&mut ctx, &config, assets).expect("scene setup failed");
    let target = render_target(&ctx);

    for _ in 0..3 {
        scene.frame(&mut ctx, &target.view).expect("frame failed");
    }
    let img = read_pixels(&ctx, &target).expect("readback failed");
    assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_pick_the_land_in_the_centre_of_the_view() {
    use crate::common::test_utils::{HEIGHT, WIDTH, render_target, test_context};
    use terra_ngin::{
        config::SceneConfig,
        scene::{DemoScene, SceneAssets},
    };

    let config = SceneConfig::default();
    let Some(mut ctx) = test_context(&config) else {
        return;
    };
    let mut scene = DemoScene::new(&mut ctx, &config, SceneAssets::default()).expect("scene setup failed");

    // The default camera looks from (0, 2, -15) at the origin, where the
    // hills are at height 0.
    let picked = scene
        .pick(&ctx, WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0)
        .expect("centre ray should hit the land");
    assert_eq!(picked.object_id, 2);
    assert!((picked.distance - 15.13).abs() < 0.5);
    assert_eq!(scene.picker().triangle_of(2), Some(picked.triangle));

    // Rendering with a selection draws the highlight on top.
    let target = render_target(&ctx);
    scene.frame(&mut ctx, &target.view).expect("frame failed");

    assert!(scene.pick(&ctx, WIDTH as f32 / 2.0, 0.0).is_none());
    assert_eq!(scene.picker().picked(), None);
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_pause_on_focus_loss() {
    use crate::common::test_utils::{render_target, test_context};
    use terra_ngin::{
        WindowEvent,
        config::SceneConfig,
        scene::{DemoScene, SceneAssets},
    };

    let config = SceneConfig::default();
    let Some(mut ctx) = test_context(&config) else {
        return;
    };
    let mut scene = DemoScene::new(&mut ctx, &config, SceneAssets::default()).expect("scene setup failed");
    let target = render_target(&ctx);

    assert!(scene.handle_window_event(&mut ctx, &WindowEvent::Focused(false)));
    assert!(scene.paused());
    scene.frame(&mut ctx, &target.view).expect("paused frames still render");

    assert!(scene.handle_window_event(&mut ctx, &WindowEvent::Focused(true)));
    assert!(!scene.paused());
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_sort_demo_objects_into_pipeline_batches() {
    use crate::common::test_utils::{HEIGHT, WIDTH, test_context};
    use terra_ngin::{
        config::SceneConfig,
        render::{Batches, Render},
        scene::{DemoScene, SceneAssets},
    };

    let config = SceneConfig::default();
    let Some(mut ctx) = test_context(&config) else {
        return;
    };
    let mut scene = DemoScene::new(&mut ctx, &config, SceneAssets::default()).expect("scene setup failed");

    let renders: Vec<Render> = scene.objects().iter().map(|object| object.render()).collect();
    let batches = Batches::from(renders);
    assert_eq!(batches.colored.len(), 1);
    assert_eq!(batches.lines.len(), 1);
    // land and the alpha clipped crate
    assert_eq!(batches.lit.len(), 2);
    assert_eq!(batches.transparent.len(), 1);
    assert_eq!(batches.transparent[0].id, 3);
    assert!(batches.highlights.is_empty());
    assert!(batches.sky.is_none());

    // The selection only reaches the objects once their uniforms are written.
    scene.pick(&ctx, WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0).expect("centre ray should hit the land");
    let target = crate::common::test_utils::render_target(&ctx);
    scene.frame(&mut ctx, &target.view).expect("frame failed");
    let renders: Vec<Render> = scene.objects().iter().map(|object| object.render()).collect();
    let batches = Batches::from(renders);
    assert_eq!(batches.highlights.len(), 1);
    assert_eq!(batches.highlights[0].0.id, 2);
}
