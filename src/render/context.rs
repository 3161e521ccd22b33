use crate::{
    foundation::{core::Rgba8, error::PostchainResult},
    render::{
        scene::{Camera, Drawable},
        target::RenderTarget,
    },
    shader::material::Material,
};

/// One draw submission.
#[derive(Clone, Copy, Debug)]
pub enum DrawCall<'a> {
    /// Rasterise drawables through a camera.
    Scene {
        /// Visible drawables in paint order.
        items: &'a [Drawable],
        /// World-to-destination mapping.
        camera: &'a Camera,
        /// Colour used when the draw clears; transparent black when `None`.
        clear_color: Option<Rgba8>,
    },
    /// Shade every destination pixel with a material.
    Fullscreen {
        /// Shader variant plus parameters.
        material: &'a Material,
    },
}

impl DrawCall<'_> {
    /// Short kind name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCall::Scene { .. } => "scene",
            DrawCall::Fullscreen { .. } => "fullscreen",
        }
    }
}

/// Where a draw lands.
#[derive(Clone, Copy, Debug)]
pub enum Destination<'a> {
    /// The default framebuffer.
    Screen,
    /// An offscreen render target.
    Target(&'a RenderTarget),
}

/// Read-back pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

impl FrameRgba {
    /// RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Cumulative submission counters of a context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// All draw calls.
    pub draw_calls: u64,
    /// Scene draws.
    pub scene_draws: u64,
    /// Fullscreen draws.
    pub fullscreen_draws: u64,
    /// Draws whose destination was the screen.
    pub screen_draws: u64,
    /// Distinct shader variants compiled so far.
    pub compiled_shaders: u64,
}

impl DrawStats {
    /// Record one submission.
    pub fn record(&mut self, draw: &DrawCall<'_>, destination: &Destination<'_>) {
        self.draw_calls += 1;
        match draw {
            DrawCall::Scene { .. } => self.scene_draws += 1,
            DrawCall::Fullscreen { .. } => self.fullscreen_draws += 1,
        }
        if matches!(destination, Destination::Screen) {
            self.screen_draws += 1;
        }
    }
}

/// The rasterisation primitive every pass draws through.
///
/// Implementations own the pixel storage of render targets, compile each distinct shader variant
/// once, and execute draws synchronously in submission order.
pub trait GraphicsContext {
    /// Execute one draw into `destination`, clearing it first when `clear` is set.
    fn render(
        &mut self,
        draw: DrawCall<'_>,
        destination: Destination<'_>,
        clear: bool,
    ) -> PostchainResult<()>;

    /// Copy out the current contents of `source`.
    fn read_pixels(&mut self, source: Destination<'_>) -> PostchainResult<FrameRgba>;

    /// Submission counters.
    fn stats(&self) -> DrawStats;
}
