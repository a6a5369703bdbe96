use std::{path::Path, sync::Arc};

use bake_view::{
    ModelPresenter, Variant, VariantConfig, Viewer,
    data_structures::scene_graph::SceneNode,
    presenter::{self, AssetRequest, bind_surface_texture},
};

mod common;

use common::test_utils::{self, TestNode};

async fn load_missing(presenter: &mut ModelPresenter, dir: &Path, config: &VariantConfig) {
    let request = presenter.cache().missing(config);
    let fetched = presenter::fetch(dir.to_path_buf(), request)
        .await
        .expect("assets should load");
    presenter.cache_mut().insert_fetched(fetched);
}

fn slots_hold(scene: &SceneNode, texture: Option<&str>) -> bool {
    scene.meshes().iter().all(|mesh| {
        mesh.surface_texture().map(|handle| handle.name.as_str()) == texture
    })
}

const UNTITLED_BAKED: VariantConfig = VariantConfig {
    model: "untitled.glb",
    texture: Some("bake.jpg"),
};

#[tokio::test]
async fn should_show_the_unbaked_model_without_texture_at_start() {
    let dir = test_utils::variant_assets("start");
    let mut viewer = Viewer::new();
    let config = viewer.variant_config();

    load_missing(viewer.presenter_mut(), &dir, &config).await;
    let scene = viewer.presenter_mut().present(&config).expect("present");

    assert_eq!(scene.name(), "untitled.glb");
    assert_eq!(scene.meshes().len(), 4);
    assert!(slots_hold(scene, None));
}

#[tokio::test]
async fn should_bind_the_texture_to_every_mesh_after_toggling() {
    let dir = test_utils::variant_assets("toggle");
    let mut viewer = Viewer::new();
    let config = viewer.variant_config();
    load_missing(viewer.presenter_mut(), &dir, &config).await;
    viewer.presenter_mut().present(&config).expect("present");

    viewer.toggle();
    let config = viewer.variant_config();
    assert_eq!(
        viewer.presenter().cache().missing(&config),
        AssetRequest {
            model: Some("office1.glb".to_string()),
            texture: Some("bake.jpg".to_string()),
        }
    );
    load_missing(viewer.presenter_mut(), &dir, &config).await;
    let bake = viewer
        .presenter()
        .cache()
        .texture("bake.jpg")
        .cloned()
        .expect("bake.jpg cached");

    let scene = viewer.presenter_mut().present(&config).expect("present");

    assert_eq!(scene.name(), "office1.glb");
    assert_eq!(scene.meshes().len(), 3);
    for mesh in scene.meshes() {
        let slot = mesh.surface_texture().expect("slot should be bound");
        assert!(Arc::ptr_eq(slot, &bake), "{} holds another texture", mesh.name);
        assert!(mesh.needs_update());
    }
}

#[tokio::test]
async fn should_reuse_cached_assets_when_toggling_back() {
    let dir = test_utils::variant_assets("toggle_back");
    let mut viewer = Viewer::new();
    for _ in 0..2 {
        let config = viewer.variant_config();
        load_missing(viewer.presenter_mut(), &dir, &config).await;
        viewer.presenter_mut().present(&config).expect("present");
        viewer.toggle();
    }
    let first: *const SceneNode = viewer
        .presenter()
        .cache()
        .model("untitled.glb")
        .expect("cached");

    // Back on the unbaked variant: nothing left to fetch
    assert_eq!(viewer.variant(), Variant::Unbaked);
    let config = viewer.variant_config();
    assert!(viewer.presenter().cache().missing(&config).is_empty());

    let scene = viewer.presenter_mut().present(&config).expect("present");
    assert!(std::ptr::eq(first, scene));
    assert!(slots_hold(scene, None));
}

#[tokio::test]
async fn should_clear_slots_bound_by_an_earlier_pass() {
    let dir = test_utils::variant_assets("clear");
    let mut presenter = ModelPresenter::new();
    load_missing(&mut presenter, &dir, &UNTITLED_BAKED).await;

    let scene = presenter.present(&UNTITLED_BAKED).expect("present");
    assert!(slots_hold(scene, Some("bake.jpg")));

    let scene = presenter
        .present(&Variant::Unbaked.config())
        .expect("present");
    assert!(slots_hold(scene, None));
}

#[tokio::test]
async fn should_leave_the_scene_untouched_when_the_texture_is_missing() {
    let dir = test_utils::variant_assets("untouched");
    let mut presenter = ModelPresenter::new();
    load_missing(&mut presenter, &dir, &UNTITLED_BAKED).await;
    presenter.present(&UNTITLED_BAKED).expect("present");

    let missing = VariantConfig {
        model: "untitled.glb",
        texture: Some("missing.jpg"),
    };
    let err = presenter.present(&missing).expect_err("texture is not cached");

    assert_eq!(err.to_string(), "asset \"missing.jpg\" is not loaded");
    let scene = presenter.scene().expect("previous scene");
    assert!(slots_hold(scene, Some("bake.jpg")));
}

#[tokio::test]
async fn should_fail_to_fetch_a_missing_asset() {
    let dir = test_utils::asset_dir("missing");
    std::fs::write(
        dir.join("office1.glb"),
        test_utils::glb(&[TestNode::mesh("office", test_utils::SINGLE)]),
    )
    .expect("write office1.glb");

    let config = Variant::Baked.config();
    let presenter = ModelPresenter::new();
    let request = presenter.cache().missing(&config);
    let err = presenter::fetch(dir, request)
        .await
        .expect_err("bake.jpg does not exist");

    assert!(format!("{err:#}").contains("bake.jpg"), "{err:#}");
}

#[tokio::test]
async fn should_not_present_a_model_that_was_never_loaded() {
    let mut presenter = ModelPresenter::new();

    let err = presenter
        .present(&Variant::Baked.config())
        .expect_err("nothing is cached");

    assert_eq!(err.to_string(), "asset \"office1.glb\" is not loaded");
    assert!(presenter.scene().is_none());
}

#[tokio::test]
async fn should_present_the_current_variant_when_a_stale_fetch_lands() {
    let dir = test_utils::variant_assets("race");
    let mut viewer = Viewer::new();
    let config = viewer.variant_config();
    load_missing(viewer.presenter_mut(), &dir, &config).await;

    // Toggle twice while the baked assets are on their way
    viewer.toggle();
    let request = viewer.presenter().cache().missing(&viewer.variant_config());
    viewer.toggle();
    let fetched = presenter::fetch(dir, request).await.expect("fetch");
    viewer.presenter_mut().cache_mut().insert_fetched(fetched);

    let config = viewer.variant_config();
    let scene = viewer.presenter_mut().present(&config).expect("present");
    assert_eq!(scene.name(), "untitled.glb");
    assert!(slots_hold(scene, None));
}

#[tokio::test]
async fn should_load_gltf_with_an_external_buffer() {
    let dir = test_utils::asset_dir("external");
    test_utils::write_gltf(&dir, "scene.gltf", &test_utils::nested_scene());
    let config = VariantConfig {
        model: "scene.gltf",
        texture: None,
    };
    let mut presenter = ModelPresenter::new();
    load_missing(&mut presenter, &dir, &config).await;

    let scene = presenter.present(&config).expect("present");
    assert_eq!(scene.meshes().len(), 4);
}

#[test]
fn should_bind_meshes_at_every_depth() {
    let glb = test_utils::glb(&test_utils::nested_scene());
    let gltf = gltf::Gltf::from_slice(&glb).expect("valid glb");
    let blob = gltf.blob.clone().expect("binary chunk");
    let mut scene = bake_view::resources::model_from_document("nested.glb", &gltf.document, &[blob])
        .expect("scene");
    let texture = bake_view::resources::texture::decode_texture(
        "stripes.png",
        &test_utils::encode(&test_utils::striped_image(2, 2), image::ImageFormat::Png),
        Default::default(),
    )
    .expect("decode");

    assert_eq!(bind_surface_texture(&mut scene, Some(&texture)), 4);
    assert!(slots_hold(&scene, Some("stripes.png")));

    assert_eq!(bind_surface_texture(&mut scene, None), 4);
    assert!(slots_hold(&scene, None));
}
