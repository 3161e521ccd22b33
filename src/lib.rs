#![forbid(unsafe_code)]
//! Post-processing pass composer.
//!
//! A [`Composer`] owns two ping-pong [`RenderTarget`]s and runs an ordered list of [`Pass`]es
//! (scene draw, fullscreen material, separable Gaussian blur, difference of Gaussians, palette
//! remap) against a [`GraphicsContext`]. [`CpuContext`] is the reference backend.

pub mod assets;
pub mod composer;
pub mod config;
pub mod foundation;
pub mod passes;
pub mod render;
pub mod shader;

pub use assets::{
    cache::TextureCache,
    loader::{LoadId, TextureLoader},
    lookup::{LookupSlot, LookupState, LookupTable},
    texture::Texture,
};
pub use composer::{Composer, FrameReport};
pub use config::{BuiltPipeline, PipelineConfig};
pub use foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
pub use foundation::error::{PostchainError, PostchainResult};
pub use passes::{
    ConvolutionPass, ConvolutionSettings, DifferencePass, DifferenceSettings, FullscreenPass,
    GaussianBlur, LookupSource, PaletteRemapPass, Pass, PassFlags, ScenePass,
};
pub use render::{
    context::{Destination, DrawCall, DrawStats, FrameRgba, GraphicsContext},
    cpu::{CpuContext, CpuContextOpts},
    scene::{Camera, Drawable, SharedRenderList, Shape},
    target::{FilterMode, RenderTarget, RenderTargetOptions, TargetId},
};
pub use shader::{
    definition::{ShaderBuilder, ShaderDefinition, UniformValue},
    kernel::{Kernel, MAX_KERNEL_SIZE, MAX_SIGMA, build_kernel},
    library::ShaderLib,
    material::{Material, ParameterBlock, TextureBinding},
};
