//! Textures on both sides of the upload.
//!
//! [`TextureAsset`] is a decoded image shared through a [`TextureHandle`]; scene graph
//! surface slots hold handles, never GPU objects. [`Texture`] wraps the WGPU texture,
//! view and sampler, and [`GpuTextures`] uploads each handle once and hands out the
//! plain white fallback for cleared slots.

use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc};

use image::imageops::{self, FilterType};

/// How the texel values of an image are to be interpreted by the sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour data authored for display. Decoded to linear on sampling.
    Srgb,
    /// Raw data (normal maps, masks). Sampled as stored.
    Linear,
}

impl ColorSpace {
    pub fn texture_format(&self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// A decoded RGBA8 image ready to be uploaded.
pub struct TextureAsset {
    pub name: String,
    pub color_space: ColorSpace,
    pub image: image::RgbaImage,
}

impl fmt::Debug for TextureAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureAsset")
            .field("name", &self.name)
            .field("color_space", &self.color_space)
            .field("dimensions", &self.image.dimensions())
            .finish()
    }
}

/// Shared reference to a decoded texture. Slots compare by pointer identity.
pub type TextureHandle = Arc<TextureAsset>;

/// Scales `image` down, keeping its aspect ratio, until neither side exceeds
/// `max_dimension`. Images that already fit are returned as they are.
pub fn fit_within(image: image::RgbaImage, max_dimension: u32) -> image::RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if longest <= max_dimension || max_dimension == 0 {
        return image;
    }
    let scale = max_dimension as f64 / longest as f64;
    let target = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    imageops::resize(&image, target(width), target(height), FilterType::Triangle)
}

/// A GPU texture with a view and sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 texture of a single colour.
    ///
    /// Used as the surface of meshes whose slot is cleared (white keeps the base colour)
    /// and as the button background.
    pub fn create_solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Texture {
        let image = image::RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::from_rgba(device, queue, &image, Some(label), ColorSpace::Srgb)
    }

    /// Uploads a decoded asset, scaling it down first when it exceeds the device's
    /// texture size limit.
    pub fn from_asset(device: &wgpu::Device, queue: &wgpu::Queue, asset: &TextureAsset) -> Self {
        let limit = device.limits().max_texture_dimension_2d;
        let (width, height) = asset.image.dimensions();
        let image = if width.max(height) > limit {
            log::warn!(
                "{} is {width}x{height}, scaling it to fit the {limit} pixel device limit",
                asset.name
            );
            Cow::Owned(fit_within(asset.image.clone(), limit))
        } else {
            Cow::Borrowed(&asset.image)
        };
        Self::from_rgba(device, queue, &image, Some(asset.name.as_str()), asset.color_space)
    }

    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &image::RgbaImage,
        label: Option<&str>,
        color_space: ColorSpace,
    ) -> Self {
        let dimensions = rgba.dimensions();

        let size = wgpu::Extent3d {
            width: dimensions.0,
            height: dimensions.1,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: color_space.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * dimensions.0),
                rows_per_image: Some(dimensions.1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = create_default_sampler(device);

        Self {
            texture,
            view,
            sampler,
        }
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Upload cache keyed by texture name.
///
/// A handle is uploaded the first time a dirty mesh needs it; later meshes bound to the
/// same texture share the GPU copy.
pub struct GpuTextures {
    blank: Texture,
    uploaded: HashMap<String, Texture>,
}

impl GpuTextures {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            blank: Texture::create_solid(device, queue, [255, 255, 255, 255], "blank surface"),
            uploaded: HashMap::new(),
        }
    }

    /// The GPU texture for a surface slot: the uploaded handle, or white when cleared.
    pub fn surface(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        slot: Option<&TextureHandle>,
    ) -> &Texture {
        match slot {
            None => &self.blank,
            Some(handle) => self
                .uploaded
                .entry(handle.name.clone())
                .or_insert_with(|| {
                    log::info!("uploading texture {}", handle.name);
                    Texture::from_asset(device, queue, handle)
                }),
        }
    }
}
