use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use photocard::{
    Camera, CameraInput, Catalog, Collaborators, Compositor, DecoderTuning, EncoderFactory,
    FacingMode, FfmpegEncoderFactory, FileCamera, FileMicrophone, FileOverlayLoader, FrameRGBA,
    ImageCamera, Microphone, NoMicrophone, OverlayLoader, RawEncoderFactory, RecorderConfig,
    RecordingPhase, SessionController, SessionState, StillOverlay, StillOverlayLoader,
    TransformState, Variant,
};

#[derive(Parser, Debug)]
#[command(name = "photocard", version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List collections, or the clips of one collection.
    Catalog(CatalogArgs),
    /// Composite a single card frame to a PNG.
    Frame(FrameArgs),
    /// Run a full recording session against file-backed devices.
    Record(RecordArgs),
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Catalog JSON (defaults to the bundled one).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Collection whose clips to list.
    #[arg(long)]
    collection: Option<String>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Recorder config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preset used when no config file is given.
    #[arg(long, value_enum, default_value_t = VariantChoice::Countdown)]
    variant: VariantChoice,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Camera still (PNG/JPEG).
    #[arg(long)]
    camera: PathBuf,

    /// Overlay still (PNG/JPEG).
    #[arg(long)]
    overlay: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = FacingChoice::Environment)]
    facing: FacingChoice,

    /// Overlay offset in device pixels.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotation: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Camera source: a still image or a video file (video needs `media-ffmpeg`).
    #[arg(long)]
    camera: PathBuf,

    #[arg(long, value_enum, default_value_t = FacingChoice::Environment)]
    facing: FacingChoice,

    /// Catalog JSON (defaults to the bundled one).
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[arg(long)]
    collection: Option<String>,

    /// Clip display name within `--collection`.
    #[arg(long)]
    clip: Option<String>,

    /// Directory that catalog locators resolve against (needs `media-ffmpeg`).
    #[arg(long)]
    media_root: Option<PathBuf>,

    /// Still image standing in for every clip when no media root is given.
    #[arg(long)]
    overlay_image: Option<PathBuf>,

    /// Audio file used as the microphone track.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Seconds to record before stopping (the clip may end sooner).
    #[arg(long, default_value_t = 3.0)]
    seconds: f64,

    /// Emit raw RGBA chunks instead of running ffmpeg.
    #[arg(long)]
    raw: bool,

    /// Download directory.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantChoice {
    Countdown,
    Instant,
    Classic,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FacingChoice {
    User,
    Environment,
}

impl From<FacingChoice> for FacingMode {
    fn from(v: FacingChoice) -> Self {
        match v {
            FacingChoice::User => FacingMode::User,
            FacingChoice::Environment => FacingMode::Environment,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Catalog(args) => cmd_catalog(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "photocard=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    Ok(match path {
        Some(p) => Catalog::load(p)?,
        None => Catalog::builtin()?,
    })
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<RecorderConfig> {
    let mut cfg = match &args.config {
        Some(p) => RecorderConfig::load(p)?,
        None => RecorderConfig::variant(match args.variant {
            VariantChoice::Countdown => Variant::Countdown,
            VariantChoice::Instant => Variant::Instant,
            VariantChoice::Classic => Variant::Classic,
        }),
    };
    cfg.apply_env()?;
    Ok(cfg)
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    match args.collection {
        None => {
            let names: Vec<&str> = catalog.collection_names().collect();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else {
                for n in names {
                    println!("{n}");
                }
            }
        }
        Some(c) => {
            let clips = catalog
                .clips(&c)
                .with_context(|| format!("unknown collection '{c}'"))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&clips)?);
            } else {
                for e in clips {
                    println!("{}\t{}", e.display_name, e.locator);
                }
            }
        }
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.config)?;
    let camera = photocard::load_still(&args.camera)?;
    let mut compositor = Compositor::new(cfg.compositor_settings())?;
    if let Some(p) = &args.overlay {
        compositor.set_overlay(Some(Box::new(StillOverlay::new(photocard::load_still(p)?))));
    }

    let transform = TransformState {
        x: args.x,
        y: args.y,
        scale: args.scale,
        rotation_deg: args.rotation,
    };
    let frame = compositor.render(
        CameraInput {
            frame: Some(&camera),
            facing: args.facing.into(),
        },
        transform,
    )?;
    write_png(frame, cfg.style.background.to_array(), &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png(frame: &FrameRGBA, bg: [u8; 4], out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    let rgba = frame.to_opaque_rgba8(bg)?;
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .context("frame buffer does not match its dimensions")?;
    img.save(out)
        .with_context(|| format!("write PNG '{}'", out.display()))?;
    Ok(())
}

fn is_still(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("png" | "jpg" | "jpeg" | "webp" | "bmp" | "gif")
    )
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.config)?;
    cfg.initial_facing = args.facing.into();
    let catalog = load_catalog(args.catalog.as_deref())?;
    let tuning = DecoderTuning::from_env();

    let camera: Box<dyn Camera> = if is_still(&args.camera) {
        Box::new(ImageCamera::from_path(&args.camera)?)
    } else {
        Box::new(FileCamera::new(&args.camera).with_tuning(tuning))
    };
    let microphone: Box<dyn Microphone> = match &args.audio {
        Some(p) => Box::new(FileMicrophone::new(p)),
        None => Box::new(NoMicrophone),
    };
    let record_for = Duration::from_secs_f64(args.seconds.max(0.0));
    let overlays: Box<dyn OverlayLoader> = match (&args.media_root, &args.overlay_image) {
        (Some(root), _) => Box::new(FileOverlayLoader::new(root).with_tuning(tuning)),
        (None, Some(img)) => Box::new(StillOverlayLoader::new(
            StillOverlay::new(photocard::load_still(img)?).with_clip_len(Some(record_for)),
        )),
        (None, None) => Box::new(StillOverlayLoader::new(StillOverlay::new(
            photocard::VideoFrame::solid(9, 16, 0, [255, 255, 255, 255])?,
        ))),
    };
    let encoders: Box<dyn EncoderFactory> = if args.raw || !photocard::is_ffmpeg_on_path() {
        if !args.raw {
            tracing::warn!("ffmpeg not found; recording raw frames");
        }
        Box::new(RawEncoderFactory)
    } else {
        Box::new(FfmpegEncoderFactory::new())
    };

    let fps = cfg.active_fps;
    let mut session = SessionController::new(
        cfg.clone(),
        catalog,
        Collaborators {
            camera,
            microphone,
            overlays,
            encoders,
        },
    )?;

    let mut now = Duration::ZERO;
    let step = Duration::from_secs_f64(1.0 / f64::from(fps));
    anyhow::ensure!(session.init_camera(now), "{}", session.status_text());

    if let Some(c) = &args.collection {
        session.select_collection(Some(c))?;
        if let Some(clip) = &args.clip {
            session.select_clip(clip)?;
        }
    }

    session.start(now)?;
    let limit = cfg.countdown_tick() * cfg.countdown_ticks + cfg.overlay_wait() + record_for;
    let mut capture_started: Option<Duration> = None;
    while now <= limit + Duration::from_secs(1) {
        now += step;
        session.tick(now)?;
        if matches!(session.state(), SessionState::Previewing { .. }) {
            break;
        }
        let capturing = matches!(
            session.state(),
            SessionState::Recording {
                phase: RecordingPhase::Capturing,
                ..
            }
        );
        if capturing {
            let began = *capture_started.get_or_insert(now);
            if now.saturating_sub(began) >= record_for {
                session.stop(now)?;
            }
        }
    }

    let file = session
        .recorded_file()
        .context("session did not produce a recording")?;
    tracing::info!(bytes = file.len(), mime = %file.mime_type, "recording finished");

    let timestamp_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut download = photocard::DownloadDir::new(&args.out_dir);
    let outcome = session.export(timestamp_ms, None, &mut download)?;
    if let Some(p) = download.last_path() {
        println!("{}", p.display());
    }
    tracing::debug!(?outcome, "export done");
    Ok(())
}
