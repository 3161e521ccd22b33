use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::{
    foundation::core::premultiply_rgba8_in_place,
    foundation::error::{PostchainError, PostchainResult},
    render::target::FilterMode,
};

/// Immutable CPU-side texture in premultiplied RGBA8 form.
///
/// Textures are shared by `Arc`; binding one to a material never copies the pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Sampling filter.
    pub filter: FilterMode,
    /// Row-major premultiplied RGBA8 bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Texture {
    /// Wrap premultiplied bytes. Fails when the byte length does not match `width * height * 4`.
    pub fn from_premul_rgba8(
        width: u32,
        height: u32,
        filter: FilterMode,
        rgba8_premul: Vec<u8>,
    ) -> PostchainResult<Self> {
        if width == 0 || height == 0 {
            return Err(PostchainError::InvalidDimension { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PostchainError::validation("texture size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(PostchainError::validation(format!(
                "texture expects {expected} bytes for {width}x{height}, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            filter,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Wrap straight-alpha bytes, premultiplying them.
    pub fn from_straight_rgba8(
        width: u32,
        height: u32,
        filter: FilterMode,
        mut rgba8: Vec<u8>,
    ) -> PostchainResult<Self> {
        premultiply_rgba8_in_place(&mut rgba8);
        Self::from_premul_rgba8(width, height, filter, rgba8)
    }

    /// A single-colour texture.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PostchainResult<Self> {
        let px = crate::foundation::core::Rgba8::from_array(rgba).premultiplied();
        let len = (width as usize) * (height as usize);
        Self::from_premul_rgba8(width, height, FilterMode::Nearest, px.repeat(len))
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) into a texture.
    pub fn decode(bytes: &[u8], filter: FilterMode) -> PostchainResult<Self> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        let rgba = dyn_img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_straight_rgba8(width, height, filter, rgba.into_raw())
    }

    /// Read and decode an image file.
    pub fn from_path(path: &Path, filter: FilterMode) -> PostchainResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read texture '{}'", path.display()))?;
        Self::decode(&bytes, filter)
    }

    /// Premultiplied texel at integer coordinates, clamped to the edges.
    pub fn texel(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        let d = &self.rgba8_premul;
        [d[idx], d[idx + 1], d[idx + 2], d[idx + 3]]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/texture.rs"]
mod tests;
