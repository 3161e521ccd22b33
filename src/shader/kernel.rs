//! Discrete Gaussian kernels for the separable convolution shader.

use std::collections::BTreeMap;

use crate::foundation::error::{PostchainError, PostchainResult};

/// Largest sigma the fixed-size convolution shader supports. Larger inputs are clamped.
pub const MAX_SIGMA: f32 = 2.5;

/// Upper bound on the number of taps; matches the `cKernel` array length in the shader.
pub const MAX_KERNEL_SIZE: usize = 25;

/// Define carrying the tap count as a float literal (`"5.0"`).
pub const KERNEL_SIZE_FLOAT: &str = "KERNEL_SIZE_FLOAT";
/// Define carrying the tap count as an integer literal (`"5"`).
pub const KERNEL_SIZE_INT: &str = "KERNEL_SIZE_INT";

/// Normalized, symmetric Gaussian weights.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Kernel {
    requested_sigma: f32,
    sigma: f32,
    weights: Vec<f32>,
}

impl Kernel {
    /// Sigma the caller asked for.
    pub fn requested_sigma(&self) -> f32 {
        self.requested_sigma
    }

    /// Sigma actually used (after clamping to [`MAX_SIGMA`]).
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Tap weights, centre tap in the middle.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Number of taps (always odd).
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Never true for a built kernel; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Preprocessor defines that bake the tap count into the convolution shader.
    pub fn defines(&self) -> BTreeMap<String, String> {
        let n = self.weights.len();
        BTreeMap::from([
            (KERNEL_SIZE_FLOAT.to_string(), format!("{n}.0")),
            (KERNEL_SIZE_INT.to_string(), format!("{n}")),
        ])
    }
}

/// Build a Gaussian kernel for `sigma`.
///
/// Sigma is clamped to [`MAX_SIGMA`]; the radius is `ceil(3 * sigma)` texels (capped so the tap
/// count never exceeds [`MAX_KERNEL_SIZE`]); weights are normalized to sum to 1.
pub fn build_kernel(sigma: f32) -> PostchainResult<Kernel> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PostchainError::validation(format!(
            "kernel sigma must be finite and > 0, got {sigma}"
        )));
    }

    let clamped = sigma.min(MAX_SIGMA);
    let size = ((2.0 * (f64::from(clamped) * 3.0).ceil()) as usize + 1).min(MAX_KERNEL_SIZE);
    let half = (size as f64 - 1.0) * 0.5;
    let s = f64::from(clamped);
    let denom = 2.0 * s * s;

    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (-(x * x) / denom).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();

    Ok(Kernel {
        requested_sigma: sigma,
        sigma: clamped,
        weights: raw.iter().map(|w| (w / sum) as f32).collect(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/shader/kernel.rs"]
mod tests;
