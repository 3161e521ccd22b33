use crate::{
    foundation::error::{PostchainError, PostchainResult},
    passes::Pass,
    render::{
        context::GraphicsContext,
        target::{RenderTarget, RenderTargetOptions},
    },
};

/// Outcome of one [`Composer::render`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Indices of the passes that ran, in order.
    pub executed: Vec<usize>,
    /// Indices of passes skipped because they were inactive.
    pub skipped: Vec<usize>,
    /// Number of read/write role swaps.
    pub swaps: u32,
    /// Draw submissions made during the frame.
    pub draw_calls: u64,
}

/// Executes an ordered chain of passes over a ping-pong pair of render targets.
///
/// Each pass reads `read` and writes `write` (or the screen, or its own target). After a pass
/// with `needs_swap` and no explicit target the two roles swap, so the next pass reads what was
/// just written.
#[derive(Debug)]
pub struct Composer {
    passes: Vec<Pass>,
    read: RenderTarget,
    write: RenderTarget,
}

impl Composer {
    /// `target` becomes the initial write buffer; a twin with the same descriptor is created as
    /// the read buffer.
    pub fn new(target: RenderTarget) -> Self {
        let read = RenderTarget::with_same_desc(&target);
        Self {
            passes: Vec::new(),
            read,
            write: target,
        }
    }

    /// Use an externally created pair (`write`, `read`).
    pub fn with_targets(write: RenderTarget, read: RenderTarget) -> Self {
        Self {
            passes: Vec::new(),
            read,
            write,
        }
    }

    /// Append a pass. Passes run in insertion order.
    pub fn add_pass(&mut self, pass: impl Into<Pass>) -> &mut Self {
        let pass = pass.into();
        tracing::debug!(index = self.passes.len(), pass = pass.name(), "add pass");
        self.passes.push(pass);
        self
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut [Pass] {
        &mut self.passes
    }

    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Pass> {
        self.passes.get_mut(index)
    }

    /// Exchange the read and write roles.
    pub fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    pub fn read_buffer(&self) -> &RenderTarget {
        &self.read
    }

    pub fn write_buffer(&self) -> &RenderTarget {
        &self.write
    }

    /// Recreate both buffers at a new size, keeping their options. Only callable between frames.
    pub fn set_size(&mut self, width: u32, height: u32) -> PostchainResult<()> {
        let opts: RenderTargetOptions = self.write.options();
        let write = RenderTarget::new(width, height, opts)?;
        self.read = RenderTarget::with_same_desc(&write);
        self.write = write;
        tracing::debug!(width, height, "composer resized");
        Ok(())
    }

    /// Check the screen-output rule: only the last enabled pass may render to the screen.
    pub fn validate(&self) -> PostchainResult<()> {
        if self.passes.is_empty() {
            return Err(PostchainError::validation("composer has no passes"));
        }
        let mut screen_pass: Option<usize> = None;
        for (i, pass) in self.passes.iter().enumerate() {
            let flags = pass.flags();
            if !flags.enabled {
                continue;
            }
            if let Some(s) = screen_pass {
                return Err(PostchainError::validation(format!(
                    "pass {i} ({}) is enabled after pass {s}, which renders to the screen",
                    pass.name()
                )));
            }
            if flags.render_to_screen {
                if pass.target().is_some() {
                    return Err(PostchainError::validation(format!(
                        "pass {i} ({}) sets both render_to_screen and an explicit target",
                        pass.name()
                    )));
                }
                screen_pass = Some(i);
            }
        }
        Ok(())
    }

    /// Run one frame. Any pass failure aborts the frame and is returned as is.
    #[tracing::instrument(skip_all, fields(passes = self.passes.len(), delta_time = delta_time))]
    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        delta_time: f32,
    ) -> PostchainResult<FrameReport> {
        self.validate()?;

        let draws_before = ctx.stats().draw_calls;
        let mut report = FrameReport::default();
        for (i, pass) in self.passes.iter_mut().enumerate() {
            if !pass.is_active() {
                tracing::debug!(index = i, pass = pass.name(), "skip inactive pass");
                report.skipped.push(i);
                continue;
            }

            tracing::debug!(
                index = i,
                pass = pass.name(),
                read = %self.read.id(),
                write = %self.write.id(),
                "run pass"
            );
            pass.render(ctx, &self.write, &self.read, delta_time)?;
            report.executed.push(i);

            if pass.flags().needs_swap && pass.target().is_none() {
                std::mem::swap(&mut self.read, &mut self.write);
                report.swaps += 1;
            }
        }
        report.draw_calls = ctx.stats().draw_calls - draws_before;
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../tests/unit/composer.rs"]
mod tests;
