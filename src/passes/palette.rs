use std::sync::Arc;

use crate::{
    assets::{lookup::LookupSlot, texture::Texture},
    foundation::error::{PostchainError, PostchainResult},
    passes::{PassFlags, output},
    render::{
        context::{DrawCall, GraphicsContext},
        target::RenderTarget,
    },
    shader::{
        definition::UniformValue,
        library::{DIFFUSE_MAP, LOOKUP_MAP, PALETTE_REMAP, ShaderLib},
        material::Material,
    },
};

/// Where a palette pass gets its lookup texture.
#[derive(Clone, Debug)]
pub enum LookupSource {
    /// Available up front.
    Ready(Arc<Texture>),
    /// Filled later by the texture loader.
    Slot(LookupSlot),
}

impl LookupSource {
    fn texture(&self) -> Option<Arc<Texture>> {
        match self {
            LookupSource::Ready(t) => Some(t.clone()),
            LookupSource::Slot(s) => s.texture(),
        }
    }
}

/// Quantises every pixel through a lookup texture.
#[derive(Debug)]
pub struct PaletteRemapPass {
    pub flags: PassFlags,
    pub target: Option<RenderTarget>,
    lookup: LookupSource,
    material: Material,
}

impl PaletteRemapPass {
    pub const DEFAULT_FLAGS: PassFlags = PassFlags::new(false, true);

    pub fn new(lib: &ShaderLib, lookup: LookupSource) -> PostchainResult<Self> {
        Ok(Self {
            flags: Self::DEFAULT_FLAGS,
            target: None,
            lookup,
            material: Material::new(lib.get(PALETTE_REMAP)?),
        })
    }

    /// Whether the lookup texture is available.
    pub fn lookup_ready(&self) -> bool {
        match &self.lookup {
            LookupSource::Ready(_) => true,
            LookupSource::Slot(s) => s.is_ready(),
        }
    }

    pub fn lookup(&self) -> &LookupSource {
        &self.lookup
    }

    /// Replace the lookup source. The previous lookup texture is unbound.
    pub fn set_lookup(&mut self, lookup: LookupSource) {
        self.lookup = lookup;
        self.material.clear_texture(LOOKUP_MAP);
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        write: &RenderTarget,
        read: &RenderTarget,
        _delta_time: f32,
    ) -> PostchainResult<()> {
        let lut = self
            .lookup
            .texture()
            .ok_or_else(|| PostchainError::missing_binding(PALETTE_REMAP, LOOKUP_MAP))?;
        let size = i32::try_from(lut.height)
            .map_err(|_| PostchainError::validation("lookup texture is too tall"))?;
        self.material.update(|p| {
            p.set_texture(DIFFUSE_MAP, read)
                .set_texture(LOOKUP_MAP, lut)
                .set_uniform("lutSize", UniformValue::Int(size));
            Ok(())
        })?;

        let destination = output(PALETTE_REMAP, &self.flags, self.target.as_ref(), write)?;
        ctx.render(
            DrawCall::Fullscreen {
                material: &self.material,
            },
            destination,
            self.flags.clear,
        )
    }
}
