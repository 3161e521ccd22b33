/// Convenience result type used across postchain.
pub type PostchainResult<T> = Result<T, PostchainError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every failure raised while executing a frame surfaces synchronously from
/// [`crate::Composer::render`]; nothing is retried or suppressed inside the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PostchainError {
    /// A render target was requested with a zero (or oversized) dimension.
    #[error("invalid render target dimension: {width}x{height}")]
    InvalidDimension {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The graphics context rejected a shader/define combination.
    #[error("shader compile error in '{shader}': {reason}")]
    ShaderCompile {
        /// Shader name as registered in the shader library.
        shader: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A draw was issued before a required texture or uniform was bound.
    #[error("missing binding '{binding}' for '{owner}'")]
    MissingBinding {
        /// Shader or pass that needed the binding.
        owner: String,
        /// Binding name (sampler or uniform).
        binding: String,
    },

    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while reading or decoding textures.
    #[error("asset error: {0}")]
    Asset(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PostchainError {
    /// Build a [`PostchainError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PostchainError::Asset`] value.
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`PostchainError::ShaderCompile`] value.
    pub fn shader_compile(shader: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ShaderCompile {
            shader: shader.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`PostchainError::MissingBinding`] value.
    pub fn missing_binding(owner: impl Into<String>, binding: impl Into<String>) -> Self {
        Self::MissingBinding {
            owner: owner.into(),
            binding: binding.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
