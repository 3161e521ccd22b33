use std::sync::Arc;

use parking_lot::RwLock;

use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};

/// Geometry of a drawable.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle in local space.
    Rect(Rect),
    /// Arbitrary filled path (non-zero winding).
    Path(BezPath),
}

/// One filled shape of the render list.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    /// Local geometry.
    pub shape: Shape,
    /// Local-to-world transform.
    pub transform: Affine,
    /// Straight-alpha fill colour.
    pub color: Rgba8,
}

impl Drawable {
    /// Filled rectangle with an identity transform.
    pub fn rect(rect: Rect, color: Rgba8) -> Self {
        Self {
            shape: Shape::Rect(rect),
            transform: Affine::IDENTITY,
            color,
        }
    }

    /// Filled path with an identity transform.
    pub fn path(path: BezPath, color: Rgba8) -> Self {
        Self {
            shape: Shape::Path(path),
            transform: Affine::IDENTITY,
            color,
        }
    }

    /// Replace the transform.
    pub fn with_transform(mut self, transform: Affine) -> Self {
        self.transform = transform;
        self
    }
}

/// Maps a world-space view rectangle onto the destination.
///
/// With no view the world is in destination pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    /// Visible world rectangle, or `None` for pixel space.
    pub view: Option<Rect>,
}

impl Camera {
    /// World units are destination pixels.
    pub fn pixels() -> Self {
        Self { view: None }
    }

    /// Orthographic camera showing `view`.
    pub fn ortho(view: Rect) -> Self {
        Self { view: Some(view) }
    }

    /// World-to-destination transform for a `width` x `height` destination.
    pub fn view_transform(&self, width: u32, height: u32) -> Affine {
        match self.view {
            Some(v) if v.width() != 0.0 && v.height() != 0.0 => {
                Affine::scale_non_uniform(
                    f64::from(width) / v.width(),
                    f64::from(height) / v.height(),
                ) * Affine::translate((-v.x0, -v.y0))
            }
            _ => Affine::IDENTITY,
        }
    }
}

/// Cloneable handle to the current frame's visible drawables.
///
/// The visibility system replaces the list between frames; the scene pass reads it once per
/// draw.
#[derive(Clone, Debug, Default)]
pub struct SharedRenderList {
    items: Arc<RwLock<Vec<Drawable>>>,
}

impl SharedRenderList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// List pre-filled with `items`.
    pub fn from_items(items: Vec<Drawable>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Replace the whole list.
    pub fn replace(&self, items: Vec<Drawable>) {
        *self.items.write() = items;
    }

    /// Append one drawable.
    pub fn push(&self, item: Drawable) {
        self.items.write().push(item);
    }

    /// Number of drawables.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// True when nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Run `f` with a read lock held.
    pub fn with_items<R>(&self, f: impl FnOnce(&[Drawable]) -> R) -> R {
        f(&self.items.read())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
