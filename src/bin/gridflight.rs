use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gridflight", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the control loop and smoothed trajectory as JSON.
    Path(PathArgs),
    /// Print the validated pass plan.
    Plan(PlanArgs),
    /// Render a single frame as a PNG (requires the `gpu` feature).
    Frame(FrameArgs),
    /// Render a numbered PNG sequence at a fixed frame rate (requires the `gpu` feature).
    Sequence(SequenceArgs),
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Scene parameter JSON. Defaults apply when omitted.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Path seed. Overrides the parameter file; defaults to the wall clock.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SizeArgs {
    /// Output width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Parser, Debug)]
struct PathArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    scene: SceneArgs,

    #[command(flatten)]
    size: SizeArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    #[command(flatten)]
    size: SizeArgs,

    /// Seconds into the flight.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    #[command(flatten)]
    scene: SceneArgs,

    #[command(flatten)]
    size: SizeArgs,

    /// Number of frames to render.
    #[arg(long)]
    frames: u64,

    /// Frames per second of the fixed-step clock.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Seconds into the flight of the first frame.
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Directory receiving `frame_00000.png`, `frame_00001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(serde::Serialize)]
struct PathDump<'a> {
    seed: u64,
    control_points: &'a [gridflight::Vec3],
    trajectory: &'a [gridflight::Vec3],
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Path(args) => cmd_path(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn load_params(args: &SceneArgs) -> anyhow::Result<gridflight::SceneParams> {
    match &args.params {
        Some(path) => Ok(gridflight::SceneParams::from_path(path)?),
        None => Ok(gridflight::SceneParams::default()),
    }
}

fn resolve_seed(args: &SceneArgs, params: &gridflight::SceneParams) -> u64 {
    args.seed.or(params.path.seed).unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    })
}

fn resolution(args: &SizeArgs) -> anyhow::Result<gridflight::Resolution> {
    Ok(gridflight::Resolution::new(args.width, args.height)?)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_path(args: PathArgs) -> anyhow::Result<()> {
    let params = load_params(&args.scene)?;
    let seed = resolve_seed(&args.scene, &params);

    let control_loop = gridflight::generate_loop(&params.path.loop_spec(seed))?;
    let trajectory = control_loop.smooth(
        &gridflight::BezierCurve::new(),
        params.path.sample_count(control_loop.len()),
    )?;

    create_parent_dir(&args.out)?;
    let f = std::fs::File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(
        std::io::BufWriter::new(f),
        &PathDump {
            seed,
            control_points: control_loop.points(),
            trajectory: &trajectory,
        },
    )
    .with_context(|| format!("write path JSON '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} control points, {} samples, seed {seed})",
        args.out.display(),
        control_loop.len(),
        trajectory.len()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let params = load_params(&args.scene)?;
    let targets = gridflight::RenderTargetSet::new(resolution(&args.size)?);
    let plan = gridflight::FramePlan::standard(&targets, params.debug_views)?;
    println!("{plan}");
    Ok(())
}

#[cfg(not(feature = "gpu"))]
fn cmd_frame(_args: FrameArgs) -> anyhow::Result<()> {
    anyhow::bail!("gridflight was built without the `gpu` feature")
}

#[cfg(not(feature = "gpu"))]
fn cmd_sequence(_args: SequenceArgs) -> anyhow::Result<()> {
    anyhow::bail!("gridflight was built without the `gpu` feature")
}

#[cfg(feature = "gpu")]
fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let params = load_params(&args.scene)?;
    let seed = resolve_seed(&args.scene, &params);

    let mut orchestrator =
        gridflight::FrameOrchestrator::new(resolution(&args.size)?, &params, seed)?;
    let mut backend = gridflight::GpuBackend::new(&gridflight::EmbeddedShaders)?;

    let input = gridflight::FrameInput {
        time: args.time,
        ..gridflight::FrameInput::default()
    };
    let frame = orchestrator.render_frame(&input, &params, &mut backend)?;

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[cfg(feature = "gpu")]
fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let params = load_params(&args.scene)?;
    let seed = resolve_seed(&args.scene, &params);
    let res = resolution(&args.size)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let mut orchestrator = gridflight::FrameOrchestrator::new(res, &params, seed)?;
    let mut backend = gridflight::GpuBackend::new(&gridflight::EmbeddedShaders)?;
    let mut platform = PngSequence {
        resolution: res,
        clock: gridflight::FixedStepClock::new(args.fps, args.start, args.frames)?,
        out_dir: args.out_dir.clone(),
    };

    let summary = orchestrator.run(&mut platform, &mut backend, &params)?;
    eprintln!(
        "wrote {} frames to {} ({} dropped)",
        summary.presented,
        args.out_dir.display(),
        summary.dropped
    );
    Ok(())
}

#[cfg(feature = "gpu")]
struct PngSequence {
    resolution: gridflight::Resolution,
    clock: gridflight::FixedStepClock,
    out_dir: PathBuf,
}

#[cfg(feature = "gpu")]
impl gridflight::Platform for PngSequence {
    fn resolution(&self) -> gridflight::Resolution {
        self.resolution
    }

    fn poll(&mut self) -> gridflight::FrameInput {
        self.clock.tick()
    }

    fn present(&mut self, frame: gridflight::FrameRgba) -> gridflight::FlightResult<()> {
        let index = self.clock.emitted().saturating_sub(1);
        let path = self.out_dir.join(format!("frame_{index:05}.png"));
        write_png(&path, &frame)?;
        Ok(())
    }
}

#[cfg(feature = "gpu")]
fn write_png(path: &Path, frame: &gridflight::FrameRgba) -> anyhow::Result<()> {
    create_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
