use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use postchain::{
    CpuContext, CpuContextOpts, Destination, GraphicsContext, PipelineConfig, ShaderLib,
    TextureCache, TextureLoader, build_kernel,
    config::{PassConfig, PassType},
    foundation::core::unpremultiply_rgba8_in_place,
};

#[derive(Parser, Debug)]
#[command(name = "postchain", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a pipeline JSON to a PNG.
    Render(RenderArgs),
    /// Print the Gaussian kernel for a sigma as JSON.
    Kernel(KernelArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Pipeline JSON.
    #[arg(long)]
    pipeline: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Number of frames to run before reading back.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Image blitted as the first pass of the chain.
    #[arg(long)]
    source: Option<PathBuf>,

    /// Seconds to wait for lookup textures before the first frame.
    #[arg(long, default_value_t = 10)]
    load_timeout: u64,
}

#[derive(Parser, Debug)]
struct KernelArgs {
    /// Standard deviation in texels.
    #[arg(long)]
    sigma: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Kernel(args) => cmd_kernel(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = PipelineConfig::from_path(&args.pipeline)?;
    if let Some(src) = &args.source {
        let src = std::path::absolute(src)
            .with_context(|| format!("resolve source '{}'", src.display()))?;
        let mut pass = PassConfig::new(PassType::Texture);
        pass.source = Some(src);
        cfg.passes.insert(0, pass);
    }

    let lib = ShaderLib::new();
    let mut loader = TextureLoader::new()?;
    let mut cache = TextureCache::new();
    let mut built = cfg.build(&lib, &mut loader, &mut cache)?;

    if !built.lookups.is_empty() {
        loader.wait_all(&mut cache, Duration::from_secs(args.load_timeout))?;
    }

    let (sw, sh) = built.screen;
    let mut ctx = CpuContext::new(CpuContextOpts {
        screen_width: sw,
        screen_height: sh,
        clear_rgba: built.clear_color,
    })?;

    let dt = 1.0 / 60.0;
    for frame in 0..args.frames.max(1) {
        loader.poll(&mut cache);
        let report = built
            .composer
            .render(&mut ctx, dt)
            .with_context(|| format!("render frame {frame}"))?;
        tracing::info!(
            frame,
            executed = report.executed.len(),
            skipped = report.skipped.len(),
            draw_calls = report.draw_calls,
            "frame rendered"
        );
    }

    let source = if built.renders_to_screen() {
        Destination::Screen
    } else {
        Destination::Target(built.composer.read_buffer())
    };
    let mut frame = ctx.read_pixels(source)?;
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut frame.data);
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_kernel(args: KernelArgs) -> anyhow::Result<()> {
    let kernel = build_kernel(args.sigma)?;
    let json = serde_json::json!({
        "requested_sigma": kernel.requested_sigma(),
        "sigma": kernel.sigma(),
        "size": kernel.len(),
        "weights": kernel.weights(),
        "defines": kernel.defines(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&json).context("serialize kernel")?
    );
    Ok(())
}
