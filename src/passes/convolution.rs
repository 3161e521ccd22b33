use crate::{
    foundation::error::PostchainResult,
    passes::{PassFlags, output},
    render::{
        context::{Destination, DrawCall, GraphicsContext},
        target::{RenderTarget, RenderTargetOptions},
    },
    shader::{
        definition::UniformValue,
        kernel::{Kernel, build_kernel},
        library::{CONVOLUTION, DIFFUSE_MAP, ShaderLib},
        material::Material,
    },
};

/// One separable Gaussian blur: kernel, specialised material and the two texel increments.
///
/// Increments are half a texel of the configured resolution, fixed at construction.
#[derive(Debug)]
pub struct GaussianBlur {
    kernel: Kernel,
    material: Material,
    blur_x: [f32; 2],
    blur_y: [f32; 2],
}

impl GaussianBlur {
    pub fn new(lib: &ShaderLib, sigma: f32, width: u32, height: u32) -> PostchainResult<Self> {
        let kernel = build_kernel(sigma)?;
        let shader = lib
            .get(CONVOLUTION)?
            .to_builder()
            .defines(kernel.defines())
            .build()?;
        let mut material = Material::new(shader);
        material.set_uniform("cKernel", UniformValue::FloatArray(kernel.weights().to_vec()));
        Ok(Self {
            kernel,
            material,
            blur_x: [0.5 / width as f32, 0.0],
            blur_y: [0.0, 0.5 / height as f32],
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Horizontal `input -> scratch` (cleared), then vertical `scratch -> output`.
    pub fn run(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        input: &RenderTarget,
        scratch: &RenderTarget,
        output: Destination<'_>,
        clear: bool,
    ) -> PostchainResult<()> {
        let blur_x = self.blur_x;
        self.material.update(|p| {
            p.set_texture(DIFFUSE_MAP, input)
                .set_uniform("uImageIncrement", UniformValue::Vec2(blur_x));
            Ok(())
        })?;
        ctx.render(
            DrawCall::Fullscreen {
                material: &self.material,
            },
            Destination::Target(scratch),
            true,
        )?;

        let blur_y = self.blur_y;
        self.material.update(|p| {
            p.set_texture(DIFFUSE_MAP, scratch)
                .set_uniform("uImageIncrement", UniformValue::Vec2(blur_y));
            Ok(())
        })?;
        ctx.render(
            DrawCall::Fullscreen {
                material: &self.material,
            },
            output,
            clear,
        )
    }
}

/// Construction parameters of a [`ConvolutionPass`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvolutionSettings {
    /// Blur standard deviation in texels (clamped to 2.5).
    pub sigma: f32,
    /// Resolution the blur increments are derived from; also the scratch target size.
    pub width: u32,
    pub height: u32,
}

impl Default for ConvolutionSettings {
    fn default() -> Self {
        Self {
            sigma: 0.6,
            width: 512,
            height: 512,
        }
    }
}

/// Separable Gaussian blur of the composer input.
#[derive(Debug)]
pub struct ConvolutionPass {
    pub flags: PassFlags,
    pub target: Option<RenderTarget>,
    settings: ConvolutionSettings,
    blur: GaussianBlur,
    scratch: RenderTarget,
}

impl ConvolutionPass {
    pub const DEFAULT_FLAGS: PassFlags = PassFlags::new(false, true);

    pub fn new(lib: &ShaderLib, settings: ConvolutionSettings) -> PostchainResult<Self> {
        let scratch = RenderTarget::new(
            settings.width,
            settings.height,
            RenderTargetOptions::linear(),
        )?;
        let blur = GaussianBlur::new(lib, settings.sigma, settings.width, settings.height)?;
        Ok(Self {
            flags: Self::DEFAULT_FLAGS,
            target: None,
            settings,
            blur,
            scratch,
        })
    }

    pub fn settings(&self) -> &ConvolutionSettings {
        &self.settings
    }

    pub fn kernel(&self) -> &Kernel {
        self.blur.kernel()
    }

    pub fn blur(&self) -> &GaussianBlur {
        &self.blur
    }

    /// Intermediate target holding the horizontal blur.
    pub fn scratch(&self) -> &RenderTarget {
        &self.scratch
    }

    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        write: &RenderTarget,
        read: &RenderTarget,
        _delta_time: f32,
    ) -> PostchainResult<()> {
        let destination = output("convolution", &self.flags, self.target.as_ref(), write)?;
        self.blur
            .run(ctx, read, &self.scratch, destination, self.flags.clear)
    }
}
