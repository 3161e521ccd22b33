//! Palette lookup textures and the slot a palette pass reads them from.
//!
//! A lookup texture of size `n` stores `n` slices of `n x n` texels side by side: the texture is
//! `n * n` wide and `n` tall, and quantised colour `(r, g, b)` maps to texel
//! `(b * n + r, g)`.

use std::{path::Path, sync::Arc};

use parking_lot::Mutex;

use crate::{
    assets::{cache::TextureCache, loader::{LoadId, TextureLoader}, texture::Texture},
    foundation::error::{PostchainError, PostchainResult},
    render::target::FilterMode,
};

/// Resolution state of a lookup slot.
#[derive(Clone, Debug, PartialEq)]
pub enum LookupState {
    /// Load requested, not delivered yet.
    Pending,
    /// Texture available.
    Ready(Arc<Texture>),
    /// Load failed; the message is kept for diagnostics.
    Failed(String),
}

/// Shared, late-bound lookup texture.
#[derive(Clone, Debug)]
pub struct LookupSlot {
    state: Arc<Mutex<LookupState>>,
}

impl Default for LookupSlot {
    fn default() -> Self {
        Self::pending()
    }
}

impl LookupSlot {
    /// Slot waiting for a texture.
    pub fn pending() -> Self {
        Self {
            state: Arc::new(Mutex::new(LookupState::Pending)),
        }
    }

    /// Slot that is already resolved.
    pub fn ready(texture: Arc<Texture>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LookupState::Ready(texture))),
        }
    }

    /// Request `path` through `loader`; the slot resolves when the loader is polled.
    pub fn load(
        loader: &mut TextureLoader,
        cache: &TextureCache,
        path: impl AsRef<Path>,
    ) -> PostchainResult<(Self, LoadId)> {
        let slot = Self::pending();
        let ok = slot.clone();
        let err = slot.clone();
        let id = loader.load(
            cache,
            path,
            FilterMode::Nearest,
            move |tex| ok.fulfil(tex),
            move |e| err.fail(e.to_string()),
        )?;
        Ok((slot, id))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LookupState {
        self.state.lock().clone()
    }

    /// The texture, once ready.
    pub fn texture(&self) -> Option<Arc<Texture>> {
        match &*self.state.lock() {
            LookupState::Ready(t) => Some(t.clone()),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.lock(), LookupState::Ready(_))
    }

    /// Resolve with a texture.
    pub fn fulfil(&self, texture: Arc<Texture>) {
        *self.state.lock() = LookupState::Ready(texture);
    }

    /// Mark as failed.
    pub fn fail(&self, message: impl Into<String>) {
        *self.state.lock() = LookupState::Failed(message.into());
    }
}

/// Builders for lookup textures.
pub struct LookupTable;

impl LookupTable {
    /// Lookup texture that maps every colour to itself (up to quantisation).
    pub fn identity(size: u32) -> PostchainResult<Texture> {
        Self::build(size, |r, g, b| [r, g, b])
    }

    /// Lookup texture that maps every colour to the nearest palette entry (squared RGB distance;
    /// ties go to the earlier entry).
    pub fn from_palette(size: u32, palette: &[[u8; 3]]) -> PostchainResult<Texture> {
        if palette.is_empty() {
            return Err(PostchainError::validation("palette must not be empty"));
        }
        Self::build(size, |r, g, b| {
            let mut best = palette[0];
            let mut best_d = u32::MAX;
            for &p in palette {
                let d = dist2(p, [r, g, b]);
                if d < best_d {
                    best_d = d;
                    best = p;
                }
            }
            best
        })
    }

    fn build(size: u32, map: impl Fn(u8, u8, u8) -> [u8; 3]) -> PostchainResult<Texture> {
        if !(2..=256).contains(&size) {
            return Err(PostchainError::validation(format!(
                "lookup size must be in 2..=256, got {size}"
            )));
        }
        let width = size * size;
        let level = |i: u32| ((i * 255 + (size - 1) / 2) / (size - 1)) as u8;
        let mut data = Vec::with_capacity((width * size * 4) as usize);
        for g in 0..size {
            for b in 0..size {
                for r in 0..size {
                    let [mr, mg, mb] = map(level(r), level(g), level(b));
                    data.extend_from_slice(&[mr, mg, mb, 255]);
                }
            }
        }
        Texture::from_premul_rgba8(width, size, FilterMode::Nearest, data)
    }
}

fn dist2(a: [u8; 3], b: [u8; 3]) -> u32 {
    (0..3)
        .map(|i| {
            let d = i32::from(a[i]) - i32::from(b[i]);
            (d * d) as u32
        })
        .sum()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/lookup.rs"]
mod tests;
