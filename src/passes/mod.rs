//! Render passes executed in order by the [`crate::Composer`].

pub mod convolution;
pub mod difference;
pub mod fullscreen;
pub mod palette;
pub mod scene;

use crate::{
    foundation::error::{PostchainError, PostchainResult},
    render::{
        context::{Destination, GraphicsContext},
        target::RenderTarget,
    },
};

pub use convolution::{ConvolutionPass, ConvolutionSettings, GaussianBlur};
pub use difference::{DifferencePass, DifferenceSettings};
pub use fullscreen::FullscreenPass;
pub use palette::{LookupSource, PaletteRemapPass};
pub use scene::ScenePass;

/// Execution flags shared by every pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassFlags {
    /// Disabled passes are skipped without side effects.
    pub enabled: bool,
    /// Clear the destination before drawing.
    pub clear: bool,
    /// Swap the composer's read/write roles after this pass.
    pub needs_swap: bool,
    /// Draw into the default framebuffer instead of a render target.
    pub render_to_screen: bool,
}

impl PassFlags {
    /// Enabled flags with the given defaults and no screen output.
    pub const fn new(clear: bool, needs_swap: bool) -> Self {
        Self {
            enabled: true,
            clear,
            needs_swap,
            render_to_screen: false,
        }
    }
}

/// A step of the post-processing chain.
#[derive(Debug)]
pub enum Pass {
    /// Rasterises the render list.
    Scene(ScenePass),
    /// Single fullscreen material draw (copy, texture blit, custom shader).
    Fullscreen(FullscreenPass),
    /// Separable Gaussian blur.
    Convolution(ConvolutionPass),
    /// Difference-of-Gaussians edge abstraction.
    Difference(DifferencePass),
    /// Palette quantisation through a lookup texture.
    PaletteRemap(PaletteRemapPass),
}

impl Pass {
    /// Pass kind name for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Pass::Scene(_) => "scene",
            Pass::Fullscreen(_) => "fullscreen",
            Pass::Convolution(_) => "convolution",
            Pass::Difference(_) => "difference_of_gaussians",
            Pass::PaletteRemap(_) => "palette_remap",
        }
    }

    pub fn flags(&self) -> &PassFlags {
        match self {
            Pass::Scene(p) => &p.flags,
            Pass::Fullscreen(p) => &p.flags,
            Pass::Convolution(p) => &p.flags,
            Pass::Difference(p) => &p.flags,
            Pass::PaletteRemap(p) => &p.flags,
        }
    }

    pub fn flags_mut(&mut self) -> &mut PassFlags {
        match self {
            Pass::Scene(p) => &mut p.flags,
            Pass::Fullscreen(p) => &mut p.flags,
            Pass::Convolution(p) => &mut p.flags,
            Pass::Difference(p) => &mut p.flags,
            Pass::PaletteRemap(p) => &mut p.flags,
        }
    }

    /// Explicit output target, if any.
    pub fn target(&self) -> Option<&RenderTarget> {
        match self {
            Pass::Scene(p) => p.target.as_ref(),
            Pass::Fullscreen(p) => p.target.as_ref(),
            Pass::Convolution(p) => p.target.as_ref(),
            Pass::Difference(p) => p.target.as_ref(),
            Pass::PaletteRemap(p) => p.target.as_ref(),
        }
    }

    /// Replace the explicit output target.
    pub fn set_target(&mut self, target: Option<RenderTarget>) {
        match self {
            Pass::Scene(p) => p.target = target,
            Pass::Fullscreen(p) => p.target = target,
            Pass::Convolution(p) => p.target = target,
            Pass::Difference(p) => p.target = target,
            Pass::PaletteRemap(p) => p.target = target,
        }
    }

    /// Whether the composer should run this pass now. A palette pass whose lookup texture has not
    /// resolved is inactive.
    pub fn is_active(&self) -> bool {
        match self {
            Pass::PaletteRemap(p) => p.flags.enabled && p.lookup_ready(),
            other => other.flags().enabled,
        }
    }

    /// Execute the pass: read from `read`, write to `write` (or the screen / explicit target).
    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        write: &RenderTarget,
        read: &RenderTarget,
        delta_time: f32,
    ) -> PostchainResult<()> {
        match self {
            Pass::Scene(p) => p.render(ctx, write, read, delta_time),
            Pass::Fullscreen(p) => p.render(ctx, write, read, delta_time),
            Pass::Convolution(p) => p.render(ctx, write, read, delta_time),
            Pass::Difference(p) => p.render(ctx, write, read, delta_time),
            Pass::PaletteRemap(p) => p.render(ctx, write, read, delta_time),
        }
    }
}

impl From<ScenePass> for Pass {
    fn from(p: ScenePass) -> Self {
        Pass::Scene(p)
    }
}

impl From<FullscreenPass> for Pass {
    fn from(p: FullscreenPass) -> Self {
        Pass::Fullscreen(p)
    }
}

impl From<ConvolutionPass> for Pass {
    fn from(p: ConvolutionPass) -> Self {
        Pass::Convolution(p)
    }
}

impl From<DifferencePass> for Pass {
    fn from(p: DifferencePass) -> Self {
        Pass::Difference(p)
    }
}

impl From<PaletteRemapPass> for Pass {
    fn from(p: PaletteRemapPass) -> Self {
        Pass::PaletteRemap(p)
    }
}

/// Resolve where a pass draws: the screen, its explicit target, or `fallback`.
pub(crate) fn output<'a>(
    pass: &str,
    flags: &PassFlags,
    target: Option<&'a RenderTarget>,
    fallback: &'a RenderTarget,
) -> PostchainResult<Destination<'a>> {
    match (flags.render_to_screen, target) {
        (true, Some(_)) => Err(PostchainError::validation(format!(
            "{pass} pass sets both render_to_screen and an explicit target"
        ))),
        (true, None) => Ok(Destination::Screen),
        (false, Some(t)) => Ok(Destination::Target(t)),
        (false, None) => Ok(Destination::Target(fallback)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/passes/mod.rs"]
mod tests;
