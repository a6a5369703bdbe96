use std::path::Path;

use anyhow::{Context, bail};

use crate::data_structures::scene_graph::{GroupNode, SceneNode, to_scene_node};

/**
 * This module contains all logic for loading models and textures from external files.
 */
pub mod texture;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let location = window.location();
    let origin = location
        .origin()
        .map_err(|_| anyhow::anyhow!("window location has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Reads an asset. Natively `file_name` is resolved below `asset_dir`; on the web it is
/// fetched from `<origin>/assets/`.
pub async fn load_binary(asset_dir: &Path, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let _ = asset_dir;
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = asset_dir.join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(data)
}

/// Fetches a `.glb` or `.gltf` file (with its external buffers) and converts the default
/// scene into a [`SceneNode`] with world transforms already applied.
pub async fn load_model_gltf(asset_dir: &Path, file_name: &str) -> anyhow::Result<SceneNode> {
    let gltf_bytes = load_binary(asset_dir, file_name).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)
        .with_context(|| format!("{file_name} is not a valid glTF file"))?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.to_vec()),
                None => bail!("{file_name} references a binary chunk it does not contain"),
            },
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(asset_dir, uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    model_from_document(file_name, &gltf.document, &buffer_data)
}

/// Builds the scene graph of an already parsed document.
pub fn model_from_document(
    file_name: &str,
    document: &gltf::Document,
    buffers: &[Vec<u8>],
) -> anyhow::Result<SceneNode> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .with_context(|| format!("{file_name} contains no scene"))?;

    let children = scene
        .nodes()
        .map(|node| to_scene_node(node, buffers))
        .collect::<anyhow::Result<Vec<_>>>()
        .with_context(|| format!("invalid geometry in {file_name}"))?;
    let mut root = SceneNode::Group(GroupNode::new(file_name, children));
    root.update_world_transform_all();

    let mesh_count = root.meshes().len();
    if mesh_count == 0 {
        log::warn!("{file_name} contains no meshes");
    }
    log::info!("loaded {file_name} with {mesh_count} meshes");
    Ok(root)
}
