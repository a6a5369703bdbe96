//! View state of the application: which of the two fixed variants is shown.

use std::fmt;

use crate::presenter::ModelPresenter;

/// The two fixed (model, texture) pairings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Unbaked,
    Baked,
}

impl Variant {
    pub fn config(self) -> VariantConfig {
        match self {
            Variant::Unbaked => VariantConfig {
                model: "untitled.glb",
                texture: None,
            },
            Variant::Baked => VariantConfig {
                model: "office1.glb",
                texture: Some("bake.jpg"),
            },
        }
    }

    pub fn other(self) -> Self {
        match self {
            Variant::Unbaked => Variant::Baked,
            Variant::Baked => Variant::Unbaked,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Unbaked => f.write_str("unbaked"),
            Variant::Baked => f.write_str("baked"),
        }
    }
}

/// Asset references of a variant, relative to the asset directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariantConfig {
    pub model: &'static str,
    pub texture: Option<&'static str>,
}

impl VariantConfig {
    /// Model reference without its extension, e.g. `untitled`.
    pub fn model_name(&self) -> &'static str {
        file_stem(self.model)
    }

    pub fn texture_name(&self) -> Option<&'static str> {
        self.texture.map(file_stem)
    }
}

fn file_stem(reference: &str) -> &str {
    reference
        .rsplit_once('.')
        .map_or(reference, |(stem, _)| stem)
}

/// UI state of one session. Starts unbaked; [`ViewState::toggle`] is the only transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewState {
    uses_baked_variant: bool,
}

impl ViewState {
    pub fn toggle(&mut self) {
        self.uses_baked_variant = !self.uses_baked_variant;
    }

    pub fn variant(&self) -> Variant {
        if self.uses_baked_variant {
            Variant::Baked
        } else {
            Variant::Unbaked
        }
    }
}

/// Root of the view: owns the view state and the presenter of its scene.
#[derive(Debug, Default)]
pub struct Viewer {
    state: ViewState,
    presenter: ModelPresenter,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to the other variant. The caller re-presents the scene afterwards.
    pub fn toggle(&mut self) {
        self.state.toggle();
        log::info!("switched to the {} variant", self.variant());
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn variant(&self) -> Variant {
        self.state.variant()
    }

    pub fn variant_config(&self) -> VariantConfig {
        self.variant().config()
    }

    /// Label of the toggle button: names the variant a click switches to.
    pub fn button_label(&self) -> &'static str {
        match self.variant() {
            Variant::Unbaked => "With Baked Shadows",
            Variant::Baked => "Without Baked Shadows",
        }
    }

    pub fn presenter(&self) -> &ModelPresenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut ModelPresenter {
        &mut self.presenter
    }
}
