use crate::{
    foundation::error::{PostchainError, PostchainResult},
    passes::{PassFlags, convolution::GaussianBlur, output},
    render::{
        context::{Destination, DrawCall, GraphicsContext},
        target::{RenderTarget, RenderTargetOptions},
    },
    shader::{
        definition::UniformValue,
        kernel::MAX_SIGMA,
        library::{BLUR1, BLUR2, DIFFERENCE_OF_GAUSSIANS, ORIGINAL, ShaderLib},
        material::Material,
    },
};

/// Ratio between the wide and the narrow blur.
pub const SIGMA_RATIO: f32 = 1.6;

/// Construction parameters of a [`DifferencePass`].
#[derive(Debug)]
pub struct DifferenceSettings {
    /// Explicit output target; `None` writes the composer's `read` buffer in place.
    pub target: Option<RenderTarget>,
    pub width: u32,
    pub height: u32,
    /// Narrow blur sigma; the wide blur uses `1.6 * sigma`. Both are clamped to 2.5.
    pub sigma: f32,
    /// Minimum mean channel response that keeps a pixel.
    pub threshold: f32,
}

impl Default for DifferenceSettings {
    fn default() -> Self {
        Self {
            target: None,
            width: 512,
            height: 512,
            sigma: 0.6,
            threshold: 0.005,
        }
    }
}

/// Difference-of-Gaussians edge abstraction.
///
/// Blurs the input twice, then keeps original pixels wherever the narrow blur exceeds the wide
/// blur by at least `threshold` and paints everything else black. Five draws per frame.
#[derive(Debug)]
pub struct DifferencePass {
    pub flags: PassFlags,
    pub target: Option<RenderTarget>,
    sigma: f32,
    blur1: GaussianBlur,
    blur2: GaussianBlur,
    render_target_x: RenderTarget,
    gaussian1: RenderTarget,
    gaussian2: RenderTarget,
    material: Material,
}

impl DifferencePass {
    pub const DEFAULT_FLAGS: PassFlags = PassFlags::new(false, false);

    pub fn new(lib: &ShaderLib, settings: DifferenceSettings) -> PostchainResult<Self> {
        let DifferenceSettings {
            target,
            width,
            height,
            sigma,
            threshold,
        } = settings;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(PostchainError::validation(format!(
                "difference sigma must be finite and > 0, got {sigma}"
            )));
        }
        let sigma = sigma.min(MAX_SIGMA);
        let opts = RenderTargetOptions::linear();

        let render_target_x = RenderTarget::new(width, height, opts)?;
        let gaussian1 = RenderTarget::with_same_desc(&render_target_x);
        let gaussian2 = RenderTarget::with_same_desc(&render_target_x);
        let blur1 = GaussianBlur::new(lib, sigma, width, height)?;
        let blur2 = GaussianBlur::new(lib, sigma * SIGMA_RATIO, width, height)?;

        let mut material = Material::new(lib.get(DIFFERENCE_OF_GAUSSIANS)?);
        material.set_uniform("threshold", UniformValue::Float(threshold));

        Ok(Self {
            flags: Self::DEFAULT_FLAGS,
            target,
            sigma,
            blur1,
            blur2,
            render_target_x,
            gaussian1,
            gaussian2,
            material,
        })
    }

    /// Narrow blur sigma after clamping.
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    pub fn blurs(&self) -> (&GaussianBlur, &GaussianBlur) {
        (&self.blur1, &self.blur2)
    }

    /// Targets holding the narrow and the wide blur.
    pub fn gaussians(&self) -> (&RenderTarget, &RenderTarget) {
        (&self.gaussian1, &self.gaussian2)
    }

    pub fn threshold(&self) -> PostchainResult<f32> {
        self.material.params().float(DIFFERENCE_OF_GAUSSIANS, "threshold")
    }

    /// Takes effect from the next frame.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.material
            .set_uniform("threshold", UniformValue::Float(threshold));
    }

    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        _write: &RenderTarget,
        read: &RenderTarget,
        _delta_time: f32,
    ) -> PostchainResult<()> {
        let destination = output(
            "difference_of_gaussians",
            &self.flags,
            self.target.as_ref(),
            read,
        )?;
        self.blur1.run(
            ctx,
            read,
            &self.render_target_x,
            Destination::Target(&self.gaussian1),
            true,
        )?;
        self.blur2.run(
            ctx,
            read,
            &self.render_target_x,
            Destination::Target(&self.gaussian2),
            true,
        )?;

        let (g1, g2) = (&self.gaussian1, &self.gaussian2);
        self.material.update(|p| {
            p.set_texture(BLUR1, g1)
                .set_texture(BLUR2, g2)
                .set_texture(ORIGINAL, read);
            Ok(())
        })?;

        ctx.render(
            DrawCall::Fullscreen {
                material: &self.material,
            },
            destination,
            self.flags.clear,
        )
    }
}
