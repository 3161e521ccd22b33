use std::sync::{
    Arc, Weak,
    atomic::{AtomicU64, Ordering},
};

use crate::foundation::error::{PostchainError, PostchainResult};

/// Largest supported edge length; the CPU rasteriser addresses pixmaps with `u16`.
pub const MAX_TARGET_DIMENSION: u32 = u16::MAX as u32;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Sampling filter used when a target (or texture) is read by a later draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Nearest texel, no interpolation.
    Nearest,
    /// Bilinear interpolation between the four closest texels.
    #[default]
    Linear,
}

/// Supported pixel formats for render targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit RGBA with premultiplied alpha.
    #[default]
    Rgba8Premul,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8Premul => 4,
        }
    }
}

/// Creation options for [`RenderTarget::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderTargetOptions {
    /// Filter used when the target is sampled.
    pub filter: FilterMode,
    /// Storage format.
    pub format: PixelFormat,
}

impl RenderTargetOptions {
    /// Options with a nearest-neighbour filter.
    pub fn nearest() -> Self {
        Self {
            filter: FilterMode::Nearest,
            ..Self::default()
        }
    }

    /// Options with a bilinear filter.
    pub fn linear() -> Self {
        Self {
            filter: FilterMode::Linear,
            ..Self::default()
        }
    }
}

/// Render target declaration: dimensions, filter and pixel format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTargetDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Filter used when sampled.
    pub filter: FilterMode,
    /// Storage format.
    pub format: PixelFormat,
}

impl RenderTargetDesc {
    /// Byte length of a tightly packed buffer with this description.
    pub fn byte_len(&self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(self.format.bytes_per_pixel())
    }
}

/// Process-unique identity of a [`RenderTarget`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rt#{}", self.0)
    }
}

/// Offscreen colour buffer.
///
/// A target is a descriptor plus an identity; its pixel storage is owned by the graphics context
/// that first draws into it. Storage is reclaimed by the context once the target is dropped, so
/// whoever owns the `RenderTarget` owns the memory. Targets are deliberately not `Clone`.
/// Dimensions are fixed at creation; resize by creating a new target between frames.
#[derive(Debug)]
pub struct RenderTarget {
    id: TargetId,
    desc: RenderTargetDesc,
    liveness: Arc<()>,
}

impl RenderTarget {
    /// Create a target. Fails with [`PostchainError::InvalidDimension`] when either edge is zero
    /// or exceeds [`MAX_TARGET_DIMENSION`].
    pub fn new(width: u32, height: u32, options: RenderTargetOptions) -> PostchainResult<Self> {
        if width == 0
            || height == 0
            || width > MAX_TARGET_DIMENSION
            || height > MAX_TARGET_DIMENSION
        {
            return Err(PostchainError::InvalidDimension { width, height });
        }

        Ok(Self {
            id: TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed)),
            desc: RenderTargetDesc {
                width,
                height,
                filter: options.filter,
                format: options.format,
            },
            liveness: Arc::new(()),
        })
    }

    /// Create a fresh target with the same descriptor as `other` (but its own storage).
    pub fn with_same_desc(other: &RenderTarget) -> Self {
        Self {
            id: TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed)),
            desc: other.desc,
            liveness: Arc::new(()),
        }
    }

    /// Target identity.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Target descriptor.
    pub fn desc(&self) -> RenderTargetDesc {
        self.desc
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.desc.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.desc.height
    }

    /// Sampling filter.
    pub fn filter(&self) -> FilterMode {
        self.desc.filter
    }

    /// Options that would recreate this target at another size.
    pub fn options(&self) -> RenderTargetOptions {
        RenderTargetOptions {
            filter: self.desc.filter,
            format: self.desc.format,
        }
    }

    /// Weak token a graphics context keeps next to the storage it allocated for this target.
    /// Once it stops upgrading, the storage may be released.
    pub fn liveness(&self) -> Weak<()> {
        Arc::downgrade(&self.liveness)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;
