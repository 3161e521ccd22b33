//! Texture sampling for the CPU shader programs.
//!
//! Texels are premultiplied RGBA8 and come back as normalised `[f32; 4]`. Coordinates are
//! clamped to the edge. Fragment `(x, y)` of a `w` x `h` destination shades at
//! `((x + 0.5) / w, (y + 0.5) / h)`.

use crate::{foundation::math::unorm8_to_f32, render::target::FilterMode};

pub(crate) type Rgbaf = [f32; 4];

/// Borrowed view of a sampled surface. `data` is `None` for a target that was never drawn to,
/// which samples as transparent black.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SampleView<'a> {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) filter: FilterMode,
    pub(crate) data: Option<&'a [u8]>,
}

impl SampleView<'_> {
    pub(crate) fn texel(&self, x: i64, y: i64) -> Rgbaf {
        let Some(data) = self.data else {
            return [0.0; 4];
        };
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let i = (y * self.width as usize + x) * 4;
        [
            unorm8_to_f32(data[i]),
            unorm8_to_f32(data[i + 1]),
            unorm8_to_f32(data[i + 2]),
            unorm8_to_f32(data[i + 3]),
        ]
    }

    pub(crate) fn sample(&self, u: f32, v: f32) -> Rgbaf {
        let w = self.width as f32;
        let h = self.height as f32;
        match self.filter {
            FilterMode::Nearest => self.texel((u * w).floor() as i64, (v * h).floor() as i64),
            FilterMode::Linear => {
                let px = u * w - 0.5;
                let py = v * h - 0.5;
                let x0 = px.floor();
                let y0 = py.floor();
                let fx = px - x0;
                let fy = py - y0;
                let (x0, y0) = (x0 as i64, y0 as i64);

                let a = self.texel(x0, y0);
                let b = self.texel(x0 + 1, y0);
                let c = self.texel(x0, y0 + 1);
                let d = self.texel(x0 + 1, y0 + 1);
                let mut out = [0.0; 4];
                for i in 0..4 {
                    let top = a[i] + (b[i] - a[i]) * fx;
                    let bottom = c[i] + (d[i] - c[i]) * fx;
                    out[i] = top + (bottom - top) * fy;
                }
                out
            }
        }
    }
}

pub(crate) fn fragment_uv(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    (
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/sampling.rs"]
mod tests;
