//! CPU evaluation of the built-in fullscreen shaders.

use rayon::prelude::*;

use crate::{
    foundation::{
        error::{PostchainError, PostchainResult},
        math::f32_to_unorm8,
    },
    render::sampling::{Rgbaf, SampleView, fragment_uv},
    shader::{
        definition::ShaderDefinition,
        kernel::{KERNEL_SIZE_FLOAT, KERNEL_SIZE_INT, MAX_KERNEL_SIZE},
        library::{
            BLUR1, BLUR2, CONVOLUTION, COPY, DIFFERENCE_OF_GAUSSIANS, DIFFUSE_MAP, LOOKUP_MAP,
            ORIGINAL, PALETTE_REMAP,
        },
        material::ParameterBlock,
    },
};

/// A shader variant validated and specialised for CPU execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Program {
    Copy,
    Convolution { taps: usize },
    Difference,
    PaletteRemap,
}

impl Program {
    pub(crate) fn compile(def: &ShaderDefinition) -> PostchainResult<Self> {
        match def.name() {
            COPY => Ok(Program::Copy),
            CONVOLUTION => {
                let int = def.define(KERNEL_SIZE_INT).ok_or_else(|| {
                    PostchainError::shader_compile(CONVOLUTION, "KERNEL_SIZE_INT is not defined")
                })?;
                let taps: usize = int.trim().parse().map_err(|_| {
                    PostchainError::shader_compile(
                        CONVOLUTION,
                        format!("KERNEL_SIZE_INT '{int}' is not an integer literal"),
                    )
                })?;
                if taps == 0 || taps > MAX_KERNEL_SIZE || taps.is_multiple_of(2) {
                    return Err(PostchainError::shader_compile(
                        CONVOLUTION,
                        format!("KERNEL_SIZE_INT must be odd and in 1..={MAX_KERNEL_SIZE}, got {taps}"),
                    ));
                }
                let float = def.define(KERNEL_SIZE_FLOAT).ok_or_else(|| {
                    PostchainError::shader_compile(CONVOLUTION, "KERNEL_SIZE_FLOAT is not defined")
                })?;
                match float.trim().parse::<f32>() {
                    Ok(v) if v == taps as f32 && float.contains('.') => {}
                    _ => {
                        return Err(PostchainError::shader_compile(
                            CONVOLUTION,
                            format!("KERNEL_SIZE_FLOAT '{float}' does not match {taps}"),
                        ));
                    }
                }
                Ok(Program::Convolution { taps })
            }
            DIFFERENCE_OF_GAUSSIANS => Ok(Program::Difference),
            PALETTE_REMAP => Ok(Program::PaletteRemap),
            other => Err(PostchainError::shader_compile(
                other,
                "no CPU program for this shader",
            )),
        }
    }

    /// Shade a `width` x `height` destination. `lookup` resolves sampler names to views.
    pub(crate) fn shade<'a>(
        &self,
        shader: &str,
        params: &ParameterBlock,
        lookup: impl Fn(&str) -> PostchainResult<SampleView<'a>>,
        width: u32,
        height: u32,
    ) -> PostchainResult<Vec<u8>> {
        match *self {
            Program::Copy => {
                let src = lookup(DIFFUSE_MAP)?;
                let opacity = params.float(shader, "opacity")?.clamp(0.0, 1.0);
                Ok(run(width, height, |u, v| {
                    src.sample(u, v).map(|c| c * opacity)
                }))
            }
            Program::Convolution { taps } => {
                let src = lookup(DIFFUSE_MAP)?;
                let [ix, iy] = params.vec2(shader, "uImageIncrement")?;
                let weights = params.float_array(shader, "cKernel")?;
                if weights.len() != taps {
                    return Err(PostchainError::missing_binding(
                        shader,
                        format!("cKernel[{taps}]"),
                    ));
                }
                let half = (taps as f32 - 1.0) / 2.0;
                Ok(run(width, height, |u, v| {
                    let mut cu = u - half * ix;
                    let mut cv = v - half * iy;
                    let mut sum = [0.0f32; 4];
                    for &w in weights {
                        let s = src.sample(cu, cv);
                        for i in 0..4 {
                            sum[i] += s[i] * w;
                        }
                        cu += ix;
                        cv += iy;
                    }
                    sum
                }))
            }
            Program::Difference => {
                let blur1 = lookup(BLUR1)?;
                let blur2 = lookup(BLUR2)?;
                let original = lookup(ORIGINAL)?;
                let threshold = params.float(shader, "threshold")?;
                Ok(run(width, height, |u, v| {
                    let b1 = blur1.sample(u, v);
                    let b2 = blur2.sample(u, v);
                    let o = original.sample(u, v);
                    let response = (0..3)
                        .map(|i| (b1[i] - b2[i]).clamp(0.0, 1.0))
                        .sum::<f32>()
                        / 3.0;
                    if response >= threshold {
                        [o[0], o[1], o[2], 1.0]
                    } else {
                        [0.0, 0.0, 0.0, 1.0]
                    }
                }))
            }
            Program::PaletteRemap => {
                let src = lookup(DIFFUSE_MAP)?;
                let lut = lookup(LOOKUP_MAP)?;
                let size = params.int(shader, "lutSize")?;
                let n = u32::try_from(size).unwrap_or(0);
                if !(2..=256).contains(&n) || lut.width != n * n || lut.height != n {
                    return Err(PostchainError::validation(format!(
                        "lookup texture {}x{} does not match lutSize {size}",
                        lut.width, lut.height
                    )));
                }
                let levels = (n - 1) as f32;
                Ok(run(width, height, |u, v| {
                    let s = src.sample(u, v);
                    let a = s[3];
                    let straight = |c: f32| if a > 0.0 { (c / a).clamp(0.0, 1.0) } else { 0.0 };
                    let q = |c: f32| (straight(c) * levels).round() as i64;
                    let (r, g, b) = (q(s[0]), q(s[1]), q(s[2]));
                    let m = lut.texel(b * i64::from(n) + r, g);
                    let ma = m[3];
                    let mapped = |c: f32| if ma > 0.0 { c / ma } else { 0.0 };
                    [mapped(m[0]) * a, mapped(m[1]) * a, mapped(m[2]) * a, a]
                }))
            }
        }
    }
}

fn run<F>(width: u32, height: u32, frag: F) -> Vec<u8>
where
    F: Fn(f32, f32) -> Rgbaf + Sync,
{
    let row_len = width as usize * 4;
    let mut out = vec![0u8; row_len * height as usize];
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let (u, v) = fragment_uv(x as u32, y as u32, width, height);
                let c = frag(u, v);
                for i in 0..4 {
                    px[i] = f32_to_unorm8(c[i]);
                }
            }
        });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/programs.rs"]
mod tests;
