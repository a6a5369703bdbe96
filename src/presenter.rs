//! Loads the assets of a variant and binds its texture onto every mesh of its model.
//!
//! Fetching is async and happens outside the presenter; [`ModelPresenter::present`]
//! only reads from the [`AssetCache`] so a pass either fully applies or leaves the
//! scene graph untouched.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};

use crate::{
    data_structures::{scene_graph::SceneNode, texture::TextureHandle},
    resources::{
        load_model_gltf,
        texture::{TextureOptions, load_texture},
    },
    viewer::VariantConfig,
};

/// References of a variant that are not in the cache yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetRequest {
    pub model: Option<String>,
    pub texture: Option<String>,
}

impl AssetRequest {
    pub fn is_empty(&self) -> bool {
        self.model.is_none() && self.texture.is_none()
    }
}

/// Parsed assets ready to be inserted into the cache.
#[derive(Debug, Default)]
pub struct FetchedAssets {
    pub model: Option<(String, SceneNode)>,
    pub texture: Option<(String, TextureHandle)>,
}

/// Parsed scene graphs and decoded textures keyed by their reference.
///
/// Every reference is loaded at most once; later passes reuse the same scene graph and
/// the same texture allocation.
#[derive(Debug, Default)]
pub struct AssetCache {
    models: HashMap<String, SceneNode>,
    textures: HashMap<String, TextureHandle>,
}

impl AssetCache {
    pub fn model(&self, reference: &str) -> Option<&SceneNode> {
        self.models.get(reference)
    }

    pub fn model_mut(&mut self, reference: &str) -> Option<&mut SceneNode> {
        self.models.get_mut(reference)
    }

    pub fn texture(&self, reference: &str) -> Option<&TextureHandle> {
        self.textures.get(reference)
    }

    /// Keeps the first model loaded for a reference.
    pub fn insert_model(&mut self, reference: &str, model: SceneNode) {
        self.models.entry(reference.to_string()).or_insert(model);
    }

    /// Keeps the first texture loaded for a reference.
    pub fn insert_texture(&mut self, reference: &str, texture: TextureHandle) {
        self.textures
            .entry(reference.to_string())
            .or_insert(texture);
    }

    pub fn missing(&self, config: &VariantConfig) -> AssetRequest {
        AssetRequest {
            model: (!self.models.contains_key(config.model)).then(|| config.model.to_string()),
            texture: config
                .texture
                .filter(|reference| !self.textures.contains_key(*reference))
                .map(str::to_string),
        }
    }

    pub fn insert_fetched(&mut self, fetched: FetchedAssets) {
        if let Some((reference, model)) = fetched.model {
            self.insert_model(&reference, model);
        }
        if let Some((reference, texture)) = fetched.texture {
            self.insert_texture(&reference, texture);
        }
    }
}

/// Loads the requested model and texture concurrently.
pub async fn fetch(asset_dir: PathBuf, request: AssetRequest) -> anyhow::Result<FetchedAssets> {
    let model = async {
        match &request.model {
            Some(reference) => {
                let model = load_model_gltf(&asset_dir, reference)
                    .await
                    .with_context(|| format!("failed to load model {reference}"))?;
                anyhow::Ok(Some((reference.clone(), model)))
            }
            None => Ok(None),
        }
    };
    let texture = async {
        match &request.texture {
            Some(reference) => {
                let texture = load_texture(&asset_dir, reference, TextureOptions::BAKED)
                    .await
                    .with_context(|| format!("failed to load texture {reference}"))?;
                anyhow::Ok(Some((reference.clone(), texture)))
            }
            None => Ok(None),
        }
    };
    let (model, texture) = futures::future::try_join(model, texture).await?;
    Ok(FetchedAssets { model, texture })
}

/// Sets the surface-texture slot of every mesh below `scene` to `texture`, or clears it,
/// and marks each mesh for re-upload. Returns the number of meshes visited.
pub fn bind_surface_texture(scene: &mut SceneNode, texture: Option<&TextureHandle>) -> usize {
    let mut meshes = 0;
    scene.for_each_mesh_mut(|mesh| {
        mesh.set_surface_texture(texture.map(Arc::clone));
        mesh.mark_needs_update();
        meshes += 1;
    });
    meshes
}

/// Presents the model of a variant with its texture applied.
#[derive(Debug, Default)]
pub struct ModelPresenter {
    cache: AssetCache,
    current: Option<&'static str>,
}

impl ModelPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut AssetCache {
        &mut self.cache
    }

    /// Binds the variant's texture (or none) onto every mesh of its model and returns
    /// the model for rendering.
    ///
    /// Both references must already be cached. When either is missing an error is
    /// returned and no scene graph is modified.
    pub fn present(&mut self, config: &VariantConfig) -> anyhow::Result<&mut SceneNode> {
        if self.cache.model(config.model).is_none() {
            return Err(not_loaded(config.model));
        }
        let texture = match config.texture {
            Some(reference) => Some(
                self.cache
                    .texture(reference)
                    .cloned()
                    .ok_or_else(|| not_loaded(reference))?,
            ),
            None => None,
        };

        let scene = self
            .cache
            .model_mut(config.model)
            .ok_or_else(|| not_loaded(config.model))?;
        let meshes = bind_surface_texture(scene, texture.as_ref());
        log::debug!(
            "presented {} with {} on {meshes} meshes",
            config.model,
            config.texture.unwrap_or("no texture"),
        );
        self.current = Some(config.model);
        Ok(scene)
    }

    /// The scene of the last successful pass.
    pub fn scene(&self) -> Option<&SceneNode> {
        self.current.and_then(|reference| self.cache.model(reference))
    }

    pub fn scene_mut(&mut self) -> Option<&mut SceneNode> {
        self.current
            .and_then(|reference| self.cache.model_mut(reference))
    }
}

fn not_loaded(reference: &str) -> anyhow::Error {
    anyhow!("asset \"{reference}\" is not loaded")
}
