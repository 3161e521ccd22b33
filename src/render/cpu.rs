use std::{collections::HashMap, sync::Weak};

use crate::{
    foundation::{
        core::{Affine, BezPath, Point, Rgba8},
        error::{PostchainError, PostchainResult},
    },
    render::{
        composite::{fill, over_in_place},
        context::{Destination, DrawCall, DrawStats, FrameRgba, GraphicsContext},
        programs::Program,
        sampling::SampleView,
        scene::{Camera, Drawable, Shape},
        target::{MAX_TARGET_DIMENSION, RenderTargetDesc, TargetId},
    },
    shader::{
        definition::{ShaderDefinition, ShaderKey},
        material::{Material, TextureBinding},
    },
};

/// Settings for [`CpuContext::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CpuContextOpts {
    /// Default framebuffer width.
    pub screen_width: u32,
    /// Default framebuffer height.
    pub screen_height: u32,
    /// Straight RGBA the screen starts as (and clears to); transparent when `None`.
    pub clear_rgba: Option<[u8; 4]>,
}

impl CpuContextOpts {
    /// Screen of the given size, cleared to transparent black.
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            clear_rgba: None,
        }
    }
}

/// Reference software implementation of [`GraphicsContext`].
///
/// Scene draws are rasterised with `vello_cpu`; fullscreen draws run CPU programs equivalent to
/// the built-in shaders, fanning rows out over `rayon`.
pub struct CpuContext {
    opts: CpuContextOpts,
    screen: Vec<u8>,
    surfaces: HashMap<TargetId, CpuSurface>,
    programs: HashMap<ShaderKey, Program>,
    stats: DrawStats,
}

struct CpuSurface {
    liveness: Weak<()>,
    desc: RenderTargetDesc,
    data: Vec<u8>,
}

impl CpuContext {
    /// Create a context. Fails with `InvalidDimension` for an unusable screen size.
    pub fn new(opts: CpuContextOpts) -> PostchainResult<Self> {
        let (w, h) = (opts.screen_width, opts.screen_height);
        if w == 0 || h == 0 || w > MAX_TARGET_DIMENSION || h > MAX_TARGET_DIMENSION {
            return Err(PostchainError::InvalidDimension {
                width: w,
                height: h,
            });
        }
        let mut screen = vec![0u8; (w as usize) * (h as usize) * 4];
        fill(&mut screen, screen_clear(&opts));
        Ok(Self {
            opts,
            screen,
            surfaces: HashMap::new(),
            programs: HashMap::new(),
            stats: DrawStats::default(),
        })
    }

    /// Screen size.
    pub fn screen_size(&self) -> (u32, u32) {
        (self.opts.screen_width, self.opts.screen_height)
    }

    /// Number of render targets currently holding storage.
    pub fn resident_targets(&self) -> usize {
        self.surfaces.len()
    }

    /// Release storage of targets that have been dropped.
    pub fn collect_garbage(&mut self) {
        let before = self.surfaces.len();
        self.surfaces.retain(|_, s| s.liveness.strong_count() > 0);
        let released = before - self.surfaces.len();
        if released > 0 {
            tracing::debug!(released, "released render target storage");
        }
    }

    fn program_for(&mut self, def: &ShaderDefinition) -> PostchainResult<Program> {
        let key = def.key();
        if let Some(p) = self.programs.get(&key) {
            tracing::trace!(shader = def.name(), "shader cache hit");
            return Ok(*p);
        }
        let program = Program::compile(def)?;
        tracing::debug!(shader = def.name(), defines = ?def.defines(), "compiled shader");
        self.programs.insert(key, program);
        self.stats.compiled_shaders += 1;
        Ok(program)
    }

    fn view_of<'a>(&'a self, binding: &'a TextureBinding) -> SampleView<'a> {
        match binding {
            TextureBinding::Target { id, desc } => SampleView {
                width: desc.width,
                height: desc.height,
                filter: desc.filter,
                data: self.surfaces.get(id).map(|s| s.data.as_slice()),
            },
            TextureBinding::Texture(t) => SampleView {
                width: t.width,
                height: t.height,
                filter: t.filter,
                data: Some(t.rgba8_premul.as_slice()),
            },
        }
    }

    fn shade_fullscreen(
        &mut self,
        material: &Material,
        width: u32,
        height: u32,
    ) -> PostchainResult<Vec<u8>> {
        material.check_bindings()?;
        let program = self.program_for(material.shader())?;
        let name = material.shader().name();
        let params = material.params();
        let this = &*self;
        program.shade(
            name,
            params,
            |sampler| Ok(this.view_of(params.require_texture(name, sampler)?)),
            width,
            height,
        )
    }

    fn destination_buffer(&mut self, destination: Destination<'_>) -> &mut Vec<u8> {
        match destination {
            Destination::Screen => &mut self.screen,
            Destination::Target(t) => {
                let desc = t.desc();
                let surface = self.surfaces.entry(t.id()).or_insert_with(|| CpuSurface {
                    liveness: t.liveness(),
                    desc,
                    data: vec![0u8; desc.byte_len()],
                });
                &mut surface.data
            }
        }
    }
}

impl GraphicsContext for CpuContext {
    #[tracing::instrument(skip_all, fields(kind = draw.kind(), clear = clear))]
    fn render(
        &mut self,
        draw: DrawCall<'_>,
        destination: Destination<'_>,
        clear: bool,
    ) -> PostchainResult<()> {
        self.collect_garbage();
        let (width, height) = match destination {
            Destination::Screen => self.screen_size(),
            Destination::Target(t) => (t.width(), t.height()),
        };

        match draw {
            DrawCall::Scene {
                items,
                camera,
                clear_color,
            } => {
                let layer = rasterize_scene(items, camera, width, height)?;
                let screen_clear = screen_clear(&self.opts);
                let dst = self.destination_buffer(destination);
                if clear {
                    let rgba = match (clear_color, destination) {
                        (Some(c), _) => c.premultiplied(),
                        (None, Destination::Screen) => screen_clear,
                        (None, Destination::Target(_)) => [0, 0, 0, 0],
                    };
                    fill(dst, rgba);
                }
                over_in_place(dst, &layer)?;
            }
            DrawCall::Fullscreen { material } => {
                // Shade into a fresh buffer so a draw may sample its own destination.
                let shaded = self.shade_fullscreen(material, width, height)?;
                *self.destination_buffer(destination) = shaded;
            }
        }

        self.stats.record(&draw, &destination);
        Ok(())
    }

    fn read_pixels(&mut self, source: Destination<'_>) -> PostchainResult<FrameRgba> {
        let (width, height, data) = match source {
            Destination::Screen => (
                self.opts.screen_width,
                self.opts.screen_height,
                self.screen.clone(),
            ),
            Destination::Target(t) => {
                let data = match self.surfaces.get(&t.id()) {
                    Some(s) if s.desc == t.desc() => s.data.clone(),
                    _ => vec![0u8; t.desc().byte_len()],
                };
                (t.width(), t.height(), data)
            }
        };
        Ok(FrameRgba {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    fn stats(&self) -> DrawStats {
        self.stats
    }
}

fn screen_clear(opts: &CpuContextOpts) -> [u8; 4] {
    opts.clear_rgba
        .map(|c| Rgba8::from_array(c).premultiplied())
        .unwrap_or([0, 0, 0, 0])
}

fn rasterize_scene(
    items: &[Drawable],
    camera: &Camera,
    width: u32,
    height: u32,
) -> PostchainResult<Vec<u8>> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PostchainError::InvalidDimension { width, height })?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PostchainError::InvalidDimension { width, height })?;

    let view = camera.view_transform(width, height);
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    for item in items {
        ctx.set_transform(affine_to_cpu(view * item.transform));
        let c = item.color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        match &item.shape {
            Shape::Rect(r) => ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)),
            Shape::Path(p) => ctx.fill_path(&bezpath_to_cpu(p)),
        }
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;

