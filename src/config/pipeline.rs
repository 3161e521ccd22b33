use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    assets::{
        cache::TextureCache,
        loader::TextureLoader,
        lookup::{LookupSlot, LookupTable},
        texture::Texture,
    },
    composer::Composer,
    foundation::{
        core::{Affine, BezPath, Rect, Rgba8},
        error::{PostchainError, PostchainResult},
    },
    passes::{
        ConvolutionPass, ConvolutionSettings, DifferencePass, DifferenceSettings, FullscreenPass,
        LookupSource, PaletteRemapPass, Pass, PassFlags, ScenePass,
    },
    render::{
        scene::{Camera, Drawable, SharedRenderList},
        target::{FilterMode, RenderTarget, RenderTargetOptions},
    },
    shader::library::ShaderLib,
};

/// JSON description of a complete pipeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Ping-pong buffer width.
    pub width: u32,
    /// Ping-pong buffer height.
    pub height: u32,
    /// Sampling filter of the ping-pong buffers.
    #[serde(default)]
    pub filter: FilterMode,
    /// Default framebuffer size; the buffer size when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<SizeConfig>,
    /// Straight RGBA the screen is cleared to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_color: Option<[u8; 4]>,
    /// World rectangle `[x0, y0, x1, y1]` shown by scene passes; pixel space when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<[f64; 4]>,
    /// Initial render list.
    #[serde(default)]
    pub scene: Vec<DrawableConfig>,
    /// Passes in execution order.
    pub passes: Vec<PassConfig>,

    /// Directory relative asset paths resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SizeConfig {
    pub width: u32,
    pub height: u32,
}

/// A drawable: exactly one of `rect` or `path`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawableConfig {
    /// `[x0, y0, x1, y1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<[f64; 4]>,
    /// SVG path data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Straight RGBA.
    pub color: [u8; 4],
    /// Affine coefficients `[a, b, c, d, e, f]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<[f64; 6]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassType {
    /// Render-list draw.
    Scene,
    /// Fullscreen copy of the input.
    Copy,
    /// Fullscreen blit of an image file.
    Texture,
    /// Separable Gaussian blur.
    Convolution,
    /// Difference of Gaussians.
    Dog,
    /// Palette remap.
    Palette,
}

/// One pass entry. Keys a pass type does not use are ignored.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PassConfig {
    #[serde(rename = "type")]
    pub kind: PassType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<bool>,
    #[serde(default, alias = "needsSwap", skip_serializing_if = "Option::is_none")]
    pub needs_swap: Option<bool>,
    #[serde(default, alias = "renderToScreen", skip_serializing_if = "Option::is_none")]
    pub render_to_screen: Option<bool>,
    /// Explicit output target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigma: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Image file of a texture pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupConfig>,
    /// Scene clear colour (straight RGBA).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_color: Option<[u8; 4]>,
}

impl PassConfig {
    /// Entry of the given type with every option left at the pass default.
    pub fn new(kind: PassType) -> Self {
        Self {
            kind,
            enabled: None,
            clear: None,
            needs_swap: None,
            render_to_screen: None,
            target: None,
            width: None,
            height: None,
            sigma: None,
            threshold: None,
            opacity: None,
            source: None,
            lookup: None,
            clear_color: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub filter: FilterMode,
}

/// Lookup texture of a palette pass: an image file or an inline palette.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LookupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<[u8; 3]>>,
    /// Quantisation levels per channel for inline palettes.
    #[serde(default = "default_lookup_size")]
    pub size: u32,
}

fn default_lookup_size() -> u32 {
    16
}

/// A composer built from a config plus the handles a caller drives it with.
#[derive(Debug)]
pub struct BuiltPipeline {
    pub composer: Composer,
    /// Shared with every scene pass; replace its contents between frames.
    pub render_list: SharedRenderList,
    /// Slots of palette passes that load asynchronously.
    pub lookups: Vec<LookupSlot>,
    /// Default framebuffer size.
    pub screen: (u32, u32),
    /// Straight RGBA the screen clears to.
    pub clear_color: Option<[u8; 4]>,
}

impl BuiltPipeline {
    /// True when some enabled pass draws to the default framebuffer.
    pub fn renders_to_screen(&self) -> bool {
        self.composer
            .passes()
            .iter()
            .any(|p| p.flags().enabled && p.flags().render_to_screen)
    }
}

impl PipelineConfig {
    /// Read a JSON file. Relative asset paths resolve against the file's directory.
    pub fn from_path(path: &Path) -> PostchainResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open pipeline '{}'", path.display()))?;
        let mut cfg: PipelineConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse pipeline JSON '{}'", path.display()))?;
        cfg.base_dir = path.parent().map(Path::to_path_buf);
        Ok(cfg)
    }

    pub fn from_json_str(json: &str) -> PostchainResult<Self> {
        Ok(serde_json::from_str(json).context("parse pipeline JSON")?)
    }

    pub fn validate(&self) -> PostchainResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PostchainError::InvalidDimension {
                width: self.width,
                height: self.height,
            });
        }
        if let Some(s) = self.screen
            && (s.width == 0 || s.height == 0)
        {
            return Err(PostchainError::InvalidDimension {
                width: s.width,
                height: s.height,
            });
        }
        if self.passes.is_empty() {
            return Err(PostchainError::validation("pipeline must have at least one pass"));
        }
        for (i, d) in self.scene.iter().enumerate() {
            match (&d.rect, &d.path) {
                (Some(_), None) => {}
                (None, Some(p)) => {
                    BezPath::from_svg(p).map_err(|e| {
                        PostchainError::validation(format!("scene[{i}]: invalid svg path: {e}"))
                    })?;
                }
                _ => {
                    return Err(PostchainError::validation(format!(
                        "scene[{i}] must have exactly one of 'rect' or 'path'"
                    )));
                }
            }
        }
        for (i, p) in self.passes.iter().enumerate() {
            if let Some(sigma) = p.sigma
                && !(sigma.is_finite() && sigma > 0.0)
            {
                return Err(PostchainError::validation(format!(
                    "passes[{i}]: sigma must be finite and > 0"
                )));
            }
            match p.kind {
                PassType::Texture if p.source.is_none() => {
                    return Err(PostchainError::validation(format!(
                        "passes[{i}]: texture pass requires 'source'"
                    )));
                }
                PassType::Palette => {
                    let Some(l) = &p.lookup else {
                        return Err(PostchainError::validation(format!(
                            "passes[{i}]: palette pass requires 'lookup'"
                        )));
                    };
                    if l.path.is_some() == l.palette.is_some() {
                        return Err(PostchainError::validation(format!(
                            "passes[{i}]: lookup needs exactly one of 'path' or 'palette'"
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Screen size used by the pipeline.
    pub fn screen_size(&self) -> (u32, u32) {
        self.screen
            .map(|s| (s.width, s.height))
            .unwrap_or((self.width, self.height))
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    /// Build the composer. Lookup files are requested through `loader` and resolve on a later
    /// `poll`; texture sources are decoded immediately (through `cache`).
    #[tracing::instrument(skip_all, fields(passes = self.passes.len()))]
    pub fn build(
        &self,
        lib: &ShaderLib,
        loader: &mut TextureLoader,
        cache: &mut TextureCache,
    ) -> PostchainResult<BuiltPipeline> {
        self.validate()?;

        let opts = RenderTargetOptions {
            filter: self.filter,
            ..RenderTargetOptions::default()
        };
        let mut composer = Composer::new(RenderTarget::new(self.width, self.height, opts)?);
        let render_list = SharedRenderList::from_items(self.drawables()?);
        let camera = match self.camera {
            Some([x0, y0, x1, y1]) => Camera::ortho(Rect::new(x0, y0, x1, y1)),
            None => Camera::pixels(),
        };
        let mut lookups = Vec::new();

        for pc in &self.passes {
            let mut pass: Pass = match pc.kind {
                PassType::Scene => {
                    let mut p = ScenePass::new(render_list.clone(), camera);
                    p.clear_color = pc.clear_color.map(Rgba8::from_array);
                    p.into()
                }
                PassType::Copy => {
                    let mut p = FullscreenPass::copy(lib)?;
                    if let Some(o) = pc.opacity {
                        p.set_opacity(o);
                    }
                    p.into()
                }
                PassType::Texture => {
                    let src = pc
                        .source
                        .as_deref()
                        .ok_or_else(|| PostchainError::validation("texture pass requires 'source'"))?;
                    let tex = self.load_now(cache, src)?;
                    let mut p = FullscreenPass::texture(lib, tex)?;
                    if let Some(o) = pc.opacity {
                        p.set_opacity(o);
                    }
                    p.into()
                }
                PassType::Convolution => ConvolutionPass::new(
                    lib,
                    ConvolutionSettings {
                        sigma: pc.sigma.unwrap_or(ConvolutionSettings::default().sigma),
                        width: pc.width.unwrap_or(self.width),
                        height: pc.height.unwrap_or(self.height),
                    },
                )?
                .into(),
                PassType::Dog => {
                    let d = DifferenceSettings::default();
                    DifferencePass::new(
                        lib,
                        DifferenceSettings {
                            target: None,
                            width: pc.width.unwrap_or(self.width),
                            height: pc.height.unwrap_or(self.height),
                            sigma: pc.sigma.unwrap_or(d.sigma),
                            threshold: pc.threshold.unwrap_or(d.threshold),
                        },
                    )?
                    .into()
                }
                PassType::Palette => {
                    let l = pc
                        .lookup
                        .as_ref()
                        .ok_or_else(|| PostchainError::validation("palette pass requires 'lookup'"))?;
                    let source = match (&l.path, &l.palette) {
                        (Some(path), _) => {
                            let (slot, _) = LookupSlot::load(loader, cache, self.resolve(path))?;
                            lookups.push(slot.clone());
                            LookupSource::Slot(slot)
                        }
                        (None, Some(palette)) => LookupSource::Ready(Arc::new(
                            LookupTable::from_palette(l.size, palette)?,
                        )),
                        (None, None) => {
                            return Err(PostchainError::validation(
                                "lookup needs 'path' or 'palette'",
                            ));
                        }
                    };
                    PaletteRemapPass::new(lib, source)?.into()
                }
            };

            apply_flags(pass.flags_mut(), pc);
            if let Some(t) = pc.target {
                pass.set_target(Some(RenderTarget::new(
                    t.width,
                    t.height,
                    RenderTargetOptions {
                        filter: t.filter,
                        ..RenderTargetOptions::default()
                    },
                )?));
            }
            composer.add_pass(pass);
        }

        composer.validate()?;
        Ok(BuiltPipeline {
            composer,
            render_list,
            lookups,
            screen: self.screen_size(),
            clear_color: self.clear_color,
        })
    }

    fn drawables(&self) -> PostchainResult<Vec<Drawable>> {
        self.scene
            .iter()
            .map(|d| {
                let color = Rgba8::from_array(d.color);
                let mut item = match (&d.rect, &d.path) {
                    (Some([x0, y0, x1, y1]), _) => {
                        Drawable::rect(Rect::new(*x0, *y0, *x1, *y1), color)
                    }
                    (None, Some(p)) => Drawable::path(
                        BezPath::from_svg(p).map_err(|e| {
                            PostchainError::validation(format!("invalid svg path: {e}"))
                        })?,
                        color,
                    ),
                    (None, None) => {
                        return Err(PostchainError::validation(
                            "drawable needs 'rect' or 'path'",
                        ));
                    }
                };
                if let Some(c) = d.transform {
                    item = item.with_transform(Affine::new(c));
                }
                Ok(item)
            })
            .collect()
    }

    fn load_now(&self, cache: &mut TextureCache, path: &Path) -> PostchainResult<Arc<Texture>> {
        let path = self.resolve(path);
        if let Some(t) = cache.get(&path, FilterMode::Linear) {
            return Ok(t);
        }
        let tex = Texture::from_path(&path, FilterMode::Linear)?;
        Ok(cache.insert(path, FilterMode::Linear, tex))
    }
}

fn apply_flags(flags: &mut PassFlags, pc: &PassConfig) {
    if let Some(v) = pc.enabled {
        flags.enabled = v;
    }
    if let Some(v) = pc.clear {
        flags.clear = v;
    }
    if let Some(v) = pc.needs_swap {
        flags.needs_swap = v;
    }
    if let Some(v) = pc.render_to_screen {
        flags.render_to_screen = v;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/pipeline.rs"]
mod tests;
