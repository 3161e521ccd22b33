use crate::{
    foundation::{core::Rgba8, error::PostchainResult},
    passes::{PassFlags, output},
    render::{
        context::{DrawCall, GraphicsContext},
        scene::{Camera, SharedRenderList},
        target::RenderTarget,
    },
};

/// Draws the current render list.
///
/// Output goes into the composer's `read` buffer so the following pass consumes the scene
/// directly; hence no swap by default.
#[derive(Debug)]
pub struct ScenePass {
    pub flags: PassFlags,
    pub target: Option<RenderTarget>,
    pub render_list: SharedRenderList,
    pub camera: Camera,
    /// Colour the destination is cleared to; transparent black when `None`.
    pub clear_color: Option<Rgba8>,
}

impl ScenePass {
    pub const DEFAULT_FLAGS: PassFlags = PassFlags::new(true, false);

    pub fn new(render_list: SharedRenderList, camera: Camera) -> Self {
        Self {
            flags: Self::DEFAULT_FLAGS,
            target: None,
            render_list,
            camera,
            clear_color: None,
        }
    }

    pub fn with_clear_color(mut self, color: Rgba8) -> Self {
        self.clear_color = Some(color);
        self
    }

    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        _write: &RenderTarget,
        read: &RenderTarget,
        _delta_time: f32,
    ) -> PostchainResult<()> {
        let destination = output("scene", &self.flags, self.target.as_ref(), read)?;
        let clear = self.flags.clear;
        let camera = self.camera;
        let clear_color = self.clear_color;
        self.render_list.with_items(|items| {
            ctx.render(
                DrawCall::Scene {
                    items,
                    camera: &camera,
                    clear_color,
                },
                destination,
                clear,
            )
        })
    }
}
