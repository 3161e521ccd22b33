use std::{collections::HashMap, sync::Arc};

use crate::{
    foundation::error::{PostchainError, PostchainResult},
    shader::definition::{ShaderBuilder, ShaderDefinition, UniformValue},
};

/// Full-viewport copy with an `opacity` multiplier.
pub const COPY: &str = "copy";
/// One direction of a separable Gaussian blur.
pub const CONVOLUTION: &str = "convolution";
/// Thresholded difference of two blurs, masking the original image.
pub const DIFFERENCE_OF_GAUSSIANS: &str = "difference_of_gaussians";
/// Colour quantisation through a lookup texture.
pub const PALETTE_REMAP: &str = "palette_remap";

/// Sampler holding the pass input.
pub const DIFFUSE_MAP: &str = "DIFFUSE_MAP";
/// Narrow blur input of the difference shader.
pub const BLUR1: &str = "BLUR1";
/// Wide blur input of the difference shader.
pub const BLUR2: &str = "BLUR2";
/// Unblurred input of the difference shader.
pub const ORIGINAL: &str = "ORIGINAL";
/// Lookup texture of the palette shader.
pub const LOOKUP_MAP: &str = "LOOKUP_MAP";

/// Registry of named shader definitions.
///
/// The library is an explicitly owned value: construct one with [`ShaderLib::new`] (which
/// registers the built-ins) and pass it to the pass constructors that need it.
#[derive(Clone, Debug)]
pub struct ShaderLib {
    shaders: HashMap<String, Arc<ShaderDefinition>>,
}

impl Default for ShaderLib {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderLib {
    /// Library with the built-in shaders registered.
    pub fn new() -> Self {
        let mut lib = Self::empty();
        for builder in builtin_builders() {
            match builder.build() {
                Ok(def) => {
                    lib.shaders.insert(def.name().to_string(), def);
                }
                Err(err) => tracing::error!(error = %err, "built-in shader failed to build"),
            }
        }
        lib
    }

    /// Library with nothing registered.
    pub fn empty() -> Self {
        Self {
            shaders: HashMap::new(),
        }
    }

    /// Register (or replace) a definition under its own name.
    pub fn register(&mut self, def: Arc<ShaderDefinition>) {
        tracing::debug!(shader = def.name(), "register shader");
        self.shaders.insert(def.name().to_string(), def);
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> PostchainResult<Arc<ShaderDefinition>> {
        self.shaders.get(name).cloned().ok_or_else(|| {
            PostchainError::shader_compile(name, "shader is not registered in the library")
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.shaders.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn builtin_builders() -> [ShaderBuilder; 4] {
    [
        ShaderDefinition::builder(COPY, include_str!("wgsl/copy.wgsl"))
            .uniform("opacity", UniformValue::Float(1.0))
            .sampler(DIFFUSE_MAP),
        ShaderDefinition::builder(CONVOLUTION, include_str!("wgsl/convolution.wgsl"))
            .uniform("uImageIncrement", UniformValue::Vec2([0.001_953_125, 0.0]))
            .sampler(DIFFUSE_MAP),
        ShaderDefinition::builder(
            DIFFERENCE_OF_GAUSSIANS,
            include_str!("wgsl/difference_of_gaussians.wgsl"),
        )
        .uniform("threshold", UniformValue::Float(0.005))
        .sampler(BLUR1)
        .sampler(BLUR2)
        .sampler(ORIGINAL),
        ShaderDefinition::builder(PALETTE_REMAP, include_str!("wgsl/palette_remap.wgsl"))
            .sampler(DIFFUSE_MAP)
            .sampler(LOOKUP_MAP),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/shader/library.rs"]
mod tests;
