use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{assets::texture::Texture, render::target::FilterMode};

/// Decoded textures keyed by source path and sampling filter.
///
/// The cache is an ordinary owned value; whoever drives the loader passes it in explicitly.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<(PathBuf, FilterMode), Arc<Texture>>,
}

impl TextureCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached texture for `path` decoded with `filter`.
    pub fn get(&self, path: &Path, filter: FilterMode) -> Option<Arc<Texture>> {
        self.entries.get(&(path.to_path_buf(), filter)).cloned()
    }

    /// Insert (or replace) an entry and return the shared handle.
    pub fn insert(&mut self, path: PathBuf, filter: FilterMode, texture: Texture) -> Arc<Texture> {
        let tex = Arc::new(texture);
        self.entries.insert((path, filter), tex.clone());
        tex
    }

    /// Drop one entry. Textures still bound elsewhere stay alive through their `Arc`.
    pub fn remove(&mut self, path: &Path, filter: FilterMode) -> Option<Arc<Texture>> {
        self.entries.remove(&(path.to_path_buf(), filter))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
