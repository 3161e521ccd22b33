use std::{collections::BTreeMap, sync::Arc};

use crate::{
    assets::texture::Texture,
    foundation::error::{PostchainError, PostchainResult},
    render::target::{RenderTarget, RenderTargetDesc, TargetId},
    shader::definition::{ShaderDefinition, UniformValue},
};

/// What a sampler reads from.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureBinding {
    /// The current contents of a render target, resolved by the graphics context at draw time.
    Target {
        /// Target identity.
        id: TargetId,
        /// Target descriptor (used when the context has not stored pixels for it yet).
        desc: RenderTargetDesc,
    },
    /// A CPU-side texture.
    Texture(Arc<Texture>),
}

impl From<&RenderTarget> for TextureBinding {
    fn from(t: &RenderTarget) -> Self {
        TextureBinding::Target {
            id: t.id(),
            desc: t.desc(),
        }
    }
}

impl From<Arc<Texture>> for TextureBinding {
    fn from(t: Arc<Texture>) -> Self {
        TextureBinding::Texture(t)
    }
}

/// Uniforms and texture bindings of one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterBlock {
    uniforms: BTreeMap<String, UniformValue>,
    textures: BTreeMap<String, TextureBinding>,
}

impl ParameterBlock {
    /// Set (or replace) a uniform.
    pub fn set_uniform(&mut self, name: impl Into<String>, value: UniformValue) -> &mut Self {
        self.uniforms.insert(name.into(), value);
        self
    }

    /// Bind a sampler.
    pub fn set_texture(
        &mut self,
        name: impl Into<String>,
        binding: impl Into<TextureBinding>,
    ) -> &mut Self {
        self.textures.insert(name.into(), binding.into());
        self
    }

    /// Remove a sampler binding.
    pub fn clear_texture(&mut self, name: &str) -> &mut Self {
        self.textures.remove(name);
        self
    }

    /// Uniform by name.
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Texture binding by name.
    pub fn texture(&self, name: &str) -> Option<&TextureBinding> {
        self.textures.get(name)
    }

    /// All uniforms.
    pub fn uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// All texture bindings.
    pub fn textures(&self) -> &BTreeMap<String, TextureBinding> {
        &self.textures
    }

    /// Float uniform, or `MissingBinding` / `Validation` when absent or of another type.
    pub fn float(&self, owner: &str, name: &str) -> PostchainResult<f32> {
        match self.require(owner, name)? {
            UniformValue::Float(v) => Ok(*v),
            other => Err(type_mismatch(owner, name, "float", other)),
        }
    }

    /// Integer uniform.
    pub fn int(&self, owner: &str, name: &str) -> PostchainResult<i32> {
        match self.require(owner, name)? {
            UniformValue::Int(v) => Ok(*v),
            other => Err(type_mismatch(owner, name, "int", other)),
        }
    }

    /// Vec2 uniform.
    pub fn vec2(&self, owner: &str, name: &str) -> PostchainResult<[f32; 2]> {
        match self.require(owner, name)? {
            UniformValue::Vec2(v) => Ok(*v),
            other => Err(type_mismatch(owner, name, "vec2", other)),
        }
    }

    /// Float-array uniform.
    pub fn float_array(&self, owner: &str, name: &str) -> PostchainResult<&[f32]> {
        match self.require(owner, name)? {
            UniformValue::FloatArray(v) => Ok(v),
            other => Err(type_mismatch(owner, name, "float[]", other)),
        }
    }

    /// Texture binding, or `MissingBinding` when unbound.
    pub fn require_texture(&self, owner: &str, name: &str) -> PostchainResult<&TextureBinding> {
        self.textures
            .get(name)
            .ok_or_else(|| PostchainError::missing_binding(owner, name))
    }

    fn require(&self, owner: &str, name: &str) -> PostchainResult<&UniformValue> {
        self.uniforms
            .get(name)
            .ok_or_else(|| PostchainError::missing_binding(owner, name))
    }
}

fn type_mismatch(owner: &str, name: &str, want: &str, got: &UniformValue) -> PostchainError {
    PostchainError::validation(format!(
        "uniform '{name}' of '{owner}' expects {want}, found {}",
        got.type_name()
    ))
}

/// A shader variant plus its mutable parameter block.
///
/// Parameters change through [`Material::update`], which stages edits on a copy and commits them
/// only if the whole edit succeeds, so a draw never observes a half-applied frame update.
#[derive(Clone, Debug)]
pub struct Material {
    shader: Arc<ShaderDefinition>,
    params: ParameterBlock,
}

impl Material {
    /// Create a material whose uniforms start at the shader defaults.
    pub fn new(shader: Arc<ShaderDefinition>) -> Self {
        let mut params = ParameterBlock::default();
        for (k, v) in shader.default_uniforms() {
            params.set_uniform(k.clone(), v.clone());
        }
        Self { shader, params }
    }

    /// The shader variant this material draws with.
    pub fn shader(&self) -> &Arc<ShaderDefinition> {
        &self.shader
    }

    /// Current parameters.
    pub fn params(&self) -> &ParameterBlock {
        &self.params
    }

    /// Apply a batch of parameter edits atomically.
    pub fn update<F>(&mut self, edit: F) -> PostchainResult<()>
    where
        F: FnOnce(&mut ParameterBlock) -> PostchainResult<()>,
    {
        let mut staged = self.params.clone();
        edit(&mut staged)?;
        self.params = staged;
        Ok(())
    }

    /// Set a single uniform.
    pub fn set_uniform(&mut self, name: impl Into<String>, value: UniformValue) {
        self.params.set_uniform(name, value);
    }

    /// Bind a single sampler.
    pub fn set_texture(&mut self, name: impl Into<String>, binding: impl Into<TextureBinding>) {
        self.params.set_texture(name, binding);
    }

    /// Unbind a sampler.
    pub fn clear_texture(&mut self, name: &str) {
        self.params.clear_texture(name);
    }

    /// Check that every sampler the shader declares is bound.
    pub fn check_bindings(&self) -> PostchainResult<()> {
        for sampler in self.shader.samplers() {
            if self.params.texture(sampler).is_none() {
                return Err(PostchainError::missing_binding(self.shader.name(), sampler));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shader/material.rs"]
mod tests;
