use bake_view::{Variant, ViewState, Viewer};

#[test]
fn should_start_with_the_unbaked_variant() {
    let viewer = Viewer::new();
    let config = viewer.variant_config();

    assert_eq!(viewer.variant(), Variant::Unbaked);
    assert_eq!(config.model, "untitled.glb");
    assert_eq!(config.model_name(), "untitled");
    assert_eq!(config.texture, None);
    assert_eq!(config.texture_name(), None);
}

#[test]
fn should_pair_the_baked_model_with_the_bake_texture() {
    let config = Variant::Baked.config();

    assert_eq!(config.model_name(), "office1");
    assert_eq!(config.texture, Some("bake.jpg"));
    assert_eq!(config.texture_name(), Some("bake"));
}

#[test]
fn should_be_unbaked_after_an_even_number_of_toggles() {
    for toggles in 0..7 {
        let mut viewer = Viewer::new();
        (0..toggles).for_each(|_| viewer.toggle());

        let expected = if toggles % 2 == 0 {
            Variant::Unbaked
        } else {
            Variant::Baked
        };
        assert_eq!(viewer.variant(), expected, "after {toggles} toggles");
    }
}

#[test]
fn should_label_the_button_with_the_other_variant() {
    let mut viewer = Viewer::new();
    assert_eq!(viewer.button_label(), "With Baked Shadows");

    viewer.toggle();
    assert_eq!(viewer.button_label(), "Without Baked Shadows");

    viewer.toggle();
    assert_eq!(viewer.button_label(), "With Baked Shadows");
}

#[test]
fn should_toggle_view_state_in_place() {
    let mut state = ViewState::default();
    assert_eq!(state.variant(), Variant::Unbaked);

    state.toggle();
    assert_eq!(state.variant(), Variant::Baked);
    assert_eq!(state.variant().other(), Variant::Unbaked);
}
