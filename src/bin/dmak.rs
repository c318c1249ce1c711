use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use dmak::{Color, Dmak, KanjiVgDir, Millis, Options, Rasterizer, SvgBackend, TracingObserver};

#[derive(Parser, Debug)]
#[command(name = "dmak", version, about = "Animated kanji stroke-order playback")]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a word and write the surfaces at a point in time as a PNG strip.
    Play(PlayArgs),
    /// Write a static progress snapshot with the current stroke highlighted.
    Frame(FrameArgs),
    /// Print the prepared stroke list as JSON.
    Inspect(SourceArgs),
}

#[derive(Parser, Debug)]
struct SourceArgs {
    /// Text to play.
    text: String,

    /// Directory of KanjiVG `<code>.svg` files (overrides `uri`).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Partial options JSON merged over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Clock time to stop at, in milliseconds (default: run until idle).
    #[arg(long, value_parser = parse_clock_ms)]
    at: Option<f64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Also write each surface as `<dir>/<index>.svg`.
    #[arg(long)]
    svg_dir: Option<PathBuf>,

    #[command(flatten)]
    raster: RasterArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Index of the stroke to highlight (0-based).
    #[arg(long)]
    index: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    raster: RasterArgs,
}

#[derive(Parser, Debug)]
struct RasterArgs {
    /// Output pixels per surface pixel.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Background colour (`#RRGGBB`); transparent when omitted.
    #[arg(long)]
    background: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_clock_ms(s: &str) -> Result<f64, String> {
    let ms: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if !ms.is_finite() || ms < 0.0 {
        return Err(format!("expected a finite, non-negative time in ms, got {s}"));
    }
    Ok(ms)
}

fn load_options(args: &SourceArgs) -> anyhow::Result<Options> {
    let mut opts = match &args.config {
        Some(path) => Options::from_path(path)?,
        None => Options::default(),
    };
    if let Some(dir) = &args.data {
        opts.uri = dir.to_string_lossy().into_owned();
    }
    Ok(opts)
}

fn build_engine(args: &SourceArgs, opts: Options) -> anyhow::Result<Dmak<SvgBackend>> {
    let source = KanjiVgDir::new(opts.uri.clone());
    let engine =
        Dmak::with_source(&args.text, opts, SvgBackend::new(), &source, TracingObserver)?;
    anyhow::ensure!(
        engine.is_loaded(),
        "stroke data for '{}' could not be loaded from '{}'",
        args.text,
        source.root().display()
    );
    Ok(engine)
}

fn rasterizer(args: &RasterArgs) -> anyhow::Result<Rasterizer> {
    let background = args
        .background
        .as_deref()
        .map(Color::parse_hex)
        .transpose()
        .map_err(|e| anyhow::anyhow!("parse --background: {e}"))?;
    Ok(Rasterizer::new().scale(args.scale).background(background))
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let opts = load_options(&args.source)?;
    let mut engine = build_engine(&args.source, opts)?;
    match args.at {
        Some(ms) => engine.advance_to(Millis(ms)),
        None => {
            engine.run_until_idle();
        }
    }
    tracing::info!(
        now = engine.now().as_f64(),
        pointer = engine.pointer(),
        strokes = engine.strokes().len(),
        "playback stopped"
    );

    let surfaces = engine.surfaces().to_vec();
    if let Some(dir) = &args.svg_dir {
        write_svgs(engine.backend_mut(), &surfaces, dir)?;
    }
    let img = rasterizer(&args.raster)?.render_strip(engine.backend_mut(), &surfaces)?;
    dmak::raster::save_png(&args.out, &img)?;
    eprintln!(
        "wrote {} ({} of {} strokes)",
        args.out.display(),
        engine.pointer(),
        engine.strokes().len()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut opts = load_options(&args.source)?;
    opts.autoplay = false;
    opts.render_at = None;
    opts.skip_papers = true;
    let mut engine = build_engine(&args.source, opts)?;

    let frame = engine
        .render_frame(args.index, "frame")
        .with_context(|| format!("render frame at stroke {}", args.index))?;
    let img = rasterizer(&args.raster)?.render_strip(engine.backend_mut(), frame.surfaces())?;
    dmak::raster::save_png(&args.out, &img)?;
    engine.release_frame(frame);
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_inspect(args: SourceArgs) -> anyhow::Result<()> {
    let mut opts = load_options(&args)?;
    opts.autoplay = false;
    opts.render_at = None;
    opts.skip_papers = true;
    let engine = build_engine(&args, opts)?;

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), engine.strokes()).context("write strokes JSON")?;
    println!();
    Ok(())
}

fn write_svgs(
    backend: &mut SvgBackend,
    surfaces: &[dmak::SurfaceId],
    dir: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create svg dir '{}'", dir.display()))?;
    for (i, &s) in surfaces.iter().enumerate() {
        let Some(svg) = backend.surface_svg(s) else {
            continue;
        };
        let path = dir.join(format!("{i}.svg"));
        std::fs::write(&path, svg).with_context(|| format!("write svg '{}'", path.display()))?;
    }
    Ok(())
}
