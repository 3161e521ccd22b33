use std::sync::Arc;

use crate::{
    assets::texture::Texture,
    foundation::error::PostchainResult,
    passes::{PassFlags, output},
    render::{
        context::{DrawCall, GraphicsContext},
        target::RenderTarget,
    },
    shader::{
        definition::{ShaderDefinition, UniformValue},
        library::{COPY, DIFFUSE_MAP, ShaderLib},
        material::Material,
    },
};

/// One fullscreen draw with a material.
///
/// The input bound as `DIFFUSE_MAP` is the composer's `read` buffer, or a fixed texture for a
/// texture blit (which turns the pass into a source of the chain).
#[derive(Debug)]
pub struct FullscreenPass {
    pub flags: PassFlags,
    pub target: Option<RenderTarget>,
    material: Material,
    source: Option<Arc<Texture>>,
}

impl FullscreenPass {
    pub const DEFAULT_FLAGS: PassFlags = PassFlags::new(false, true);

    /// Fullscreen pass drawing `shader`.
    pub fn new(shader: Arc<ShaderDefinition>) -> Self {
        Self {
            flags: Self::DEFAULT_FLAGS,
            target: None,
            material: Material::new(shader),
            source: None,
        }
    }

    /// Copy of the input.
    pub fn copy(lib: &ShaderLib) -> PostchainResult<Self> {
        Ok(Self::new(lib.get(COPY)?))
    }

    /// Blit of a fixed texture, ignoring the composer's input.
    pub fn texture(lib: &ShaderLib, texture: Arc<Texture>) -> PostchainResult<Self> {
        let mut pass = Self::copy(lib)?;
        pass.source = Some(texture);
        Ok(pass)
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Mutable material, for live uniform edits between frames.
    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Set the `opacity` uniform of a copy pass.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.material
            .set_uniform("opacity", UniformValue::Float(opacity));
    }

    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        write: &RenderTarget,
        read: &RenderTarget,
        _delta_time: f32,
    ) -> PostchainResult<()> {
        match &self.source {
            Some(tex) => self.material.set_texture(DIFFUSE_MAP, tex.clone()),
            None => self.material.set_texture(DIFFUSE_MAP, read),
        }
        let destination = output("fullscreen", &self.flags, self.target.as_ref(), write)?;
        ctx.render(
            DrawCall::Fullscreen {
                material: &self.material,
            },
            destination,
            self.flags.clear,
        )
    }
}
