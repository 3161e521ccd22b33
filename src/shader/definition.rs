use std::{borrow::Cow, collections::BTreeMap, sync::Arc};

use crate::foundation::{
    error::{PostchainError, PostchainResult},
    math::Fnv1a64,
};

/// A uniform value as stored in a material's parameter block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformValue {
    /// Scalar float.
    Float(f32),
    /// Scalar integer.
    Int(i32),
    /// Two-component vector.
    Vec2([f32; 2]),
    /// Float array (e.g. kernel weights).
    FloatArray(Vec<f32>),
}

impl UniformValue {
    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Int(_) => "int",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::FloatArray(_) => "float[]",
        }
    }
}

/// Identity of a compiled shader variant: name plus the exact define set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderKey(pub u64);

/// Named shader source with compile-time defines and default uniforms.
///
/// Defines are frozen when the definition is built. A material that references a definition can
/// only change uniforms and texture bindings; different defines mean a different definition and
/// therefore a different compiled variant.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderDefinition {
    name: Cow<'static, str>,
    source: Cow<'static, str>,
    defines: BTreeMap<String, String>,
    uniforms: BTreeMap<String, UniformValue>,
    samplers: Vec<String>,
}

impl ShaderDefinition {
    /// Start a definition from raw source.
    pub fn builder(
        name: impl Into<Cow<'static, str>>,
        source: impl Into<Cow<'static, str>>,
    ) -> ShaderBuilder {
        ShaderBuilder {
            def: ShaderDefinition {
                name: name.into(),
                source: source.into(),
                defines: BTreeMap::new(),
                uniforms: BTreeMap::new(),
                samplers: Vec::new(),
            },
        }
    }

    /// Re-open a copy of this definition to derive a variant (e.g. with different defines).
    pub fn to_builder(&self) -> ShaderBuilder {
        ShaderBuilder { def: self.clone() }
    }

    /// Library name of the shader.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unprocessed source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile-time defines.
    pub fn defines(&self) -> &BTreeMap<String, String> {
        &self.defines
    }

    /// Look up a define value.
    pub fn define(&self, name: &str) -> Option<&str> {
        self.defines.get(name).map(String::as_str)
    }

    /// Default uniform values a new material starts from.
    pub fn default_uniforms(&self) -> &BTreeMap<String, UniformValue> {
        &self.uniforms
    }

    /// Sampler names the shader reads; every one must be bound before a draw.
    pub fn samplers(&self) -> &[String] {
        &self.samplers
    }

    /// Source with defines injected as WGSL constants ahead of the body.
    pub fn preprocessed_source(&self) -> String {
        let mut out = String::with_capacity(self.source.len() + self.defines.len() * 32);
        for (k, v) in &self.defines {
            out.push_str("const ");
            out.push_str(k);
            out.push_str(" = ");
            out.push_str(v);
            out.push_str(";\n");
        }
        out.push_str(&self.source);
        out
    }

    /// Cache key for the compiled variant.
    pub fn key(&self) -> ShaderKey {
        let mut h = Fnv1a64::new_default();
        h.write_str(&self.name);
        h.write_str(&self.source);
        h.write_u64(self.defines.len() as u64);
        for (k, v) in &self.defines {
            h.write_str(k);
            h.write_str(v);
        }
        ShaderKey(h.finish())
    }
}

/// Builder for [`ShaderDefinition`]; the only place defines can be set.
#[derive(Clone, Debug)]
pub struct ShaderBuilder {
    def: ShaderDefinition,
}

impl ShaderBuilder {
    /// Set a define. Names must be identifiers and values non-empty single-line literals.
    pub fn define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.def.defines.insert(name.into(), value.into());
        self
    }

    /// Merge several defines.
    pub fn defines(mut self, defines: BTreeMap<String, String>) -> Self {
        self.def.defines.extend(defines);
        self
    }

    /// Set a default uniform value.
    pub fn uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.def.uniforms.insert(name.into(), value);
        self
    }

    /// Declare a sampler the shader reads.
    pub fn sampler(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.def.samplers.contains(&name) {
            self.def.samplers.push(name);
        }
        self
    }

    /// Validate and freeze the definition.
    pub fn build(self) -> PostchainResult<Arc<ShaderDefinition>> {
        let def = self.def;
        if def.name.is_empty() {
            return Err(PostchainError::validation("shader name must not be empty"));
        }
        for (k, v) in &def.defines {
            if !is_identifier(k) {
                return Err(PostchainError::shader_compile(
                    def.name.to_string(),
                    format!("define name '{k}' is not an identifier"),
                ));
            }
            if v.trim().is_empty() || v.contains('\n') || v.contains(';') {
                return Err(PostchainError::shader_compile(
                    def.name.to_string(),
                    format!("define '{k}' has malformed value '{v}'"),
                ));
            }
        }
        Ok(Arc::new(def))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "../../tests/unit/shader/definition.rs"]
mod tests;
