use std::sync::Arc;

use anyhow::Context;
use image::{ImageFormat, load_from_memory_with_format};

use crate::{
    data_structures::texture::{ColorSpace, TextureAsset, TextureHandle, fit_within},
    resources::load_binary,
};

/// Largest texture side the device is requested to support: the WebGL2 downlevel limit
/// on the web, the default limit natively.
#[cfg(target_arch = "wasm32")]
pub const MAX_TEXTURE_DIMENSION: u32 = 2048;
#[cfg(not(target_arch = "wasm32"))]
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Decoding options for a texture asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextureOptions {
    pub color_space: ColorSpace,
    /// Mirror rows so that `v = 0` samples the bottom of the image, the convention
    /// baked textures are exported with.
    pub flip_y: bool,
    /// Larger images are scaled down so their longest side is this many pixels.
    pub max_dimension: u32,
}

impl TextureOptions {
    /// Baked lighting: display colours, bottom-up rows.
    pub const BAKED: TextureOptions = TextureOptions {
        color_space: ColorSpace::Srgb,
        flip_y: true,
        max_dimension: MAX_TEXTURE_DIMENSION,
    };
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self::BAKED
    }
}

pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("Model material_bind_group_layout"),
    })
}

/// Decode raw image file contents (JPEG, PNG) into a shared texture handle.
///
/// The format is taken from the file extension of `name` when it has one, and guessed
/// from the bytes otherwise.
pub fn decode_texture(name: &str, bytes: &[u8], options: TextureOptions) -> anyhow::Result<TextureHandle> {
    let format = std::path::Path::new(name)
        .extension()
        .and_then(|ext| ImageFormat::from_extension(ext));
    let img = match format {
        Some(fmt) => load_from_memory_with_format(bytes, fmt),
        None => image::load_from_memory(bytes),
    }
    .with_context(|| format!("could not decode texture {name}"))?;
    let img = if options.flip_y { img.flipv() } else { img };
    let (width, height) = (img.width(), img.height());
    let image = fit_within(img.to_rgba8(), options.max_dimension);
    if image.dimensions() != (width, height) {
        log::warn!(
            "{name} is {width}x{height}, scaled to {}x{}",
            image.width(),
            image.height()
        );
    }

    Ok(Arc::new(TextureAsset {
        name: name.to_string(),
        color_space: options.color_space,
        image,
    }))
}

pub async fn load_texture(
    asset_dir: &std::path::Path,
    file_name: &str,
    options: TextureOptions,
) -> anyhow::Result<TextureHandle> {
    let data = load_binary(asset_dir, file_name).await?;
    decode_texture(file_name, &data, options)
}
