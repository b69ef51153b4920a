use avatar_crop::controller::Input;
use avatar_crop::geometry::{self, CropArea, ImageDimensions, Preset, ZoomRange};
use avatar_crop::imaging::{self, CropOutput, RustBackend};
use avatar_crop::render::Renderer;
use avatar_crop::session::{CropSession, SessionError, SessionUpdate};
use avatar_crop::{config, output};
use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

/// How to place the crop window before extracting or previewing.
#[derive(clap::Args, Clone)]
struct ShapeArgs {
    /// Zoom factor; the window side is the short image side divided by this
    #[arg(long)]
    zoom: Option<f64>,

    /// Snap the window: left, right, top, bottom, center-x, center-y, center
    #[arg(long = "preset")]
    presets: Vec<Preset>,

    /// Move the window by DX,DY image pixels (repeatable)
    #[arg(long, value_parser = parse_nudge, allow_hyphen_values = true)]
    nudge: Vec<(f64, f64)>,
}

#[derive(Parser)]
#[command(name = "avatar-crop")]
#[command(about = "Square avatar cropper")]
#[command(long_about = "\
Square avatar cropper

Opens an image, places a square crop window over it and extracts that
window as a fixed-size avatar. The window starts as the largest centered
square and is always kept inside the image.

Window placement is applied in order:
  1. --zoom Z         side = min(width, height) / Z, clamped to the zoom range
  2. --preset P       left | right | top | bottom | center-x | center-y | center
  3. --nudge DX,DY    move by image pixels, clamped per axis

Run 'avatar-crop gen-config' to generate a documented avatar-crop.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log state transitions and timings (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an image's dimensions and its initial crop window
    Probe {
        image: PathBuf,
    },
    /// Extract a square avatar
    Crop {
        image: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Render the spotlight preview canvas to a PNG
    Preview {
        image: PathBuf,
        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        shape: ShapeArgs,
    },
    /// Feed recorded pointer/key/zoom events through an editing session, then confirm
    Replay {
        image: PathBuf,
        /// JSON array of inputs, e.g. [{"type":"pointer-down","x":200,"y":200}]
        #[arg(long)]
        events: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a stock avatar-crop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut config = config::load_config(cli.config.as_deref())?;
    let backend = RustBackend::new();

    match cli.command {
        Command::Probe { image } => {
            let dims = imaging::probe_dimensions(&backend, &image)?;
            output::print_probe(&image, dims, &geometry::initialize(dims), config.canvas.size);
        }
        Command::Crop {
            image,
            output: dest,
            shape,
        } => {
            let dims = imaging::probe_dimensions(&backend, &image)?;
            let area = place_window(dims, &shape, &config);
            let settings = config.output.for_destination(&dest);
            let avatar = imaging::extract_crop(&backend, &image, area, &settings)?;
            avatar.write_to(&dest)?;
            output::print_crop(&image, &dest, &area, &avatar);
        }
        Command::Preview {
            image,
            output: dest,
            shape,
        } => {
            let loaded = imaging::load_image(&backend, &image)?;
            let area = place_window(loaded.dims, &shape, &config);
            let renderer = Renderer::from_config(&config.overlay)?;
            let frame = renderer.render(&loaded.bitmap, loaded.dims, &area, config.canvas.size);
            frame.save(&dest)?;
            output::print_preview(&image, &dest, &area, config.canvas.size);
        }
        Command::Replay {
            image,
            events,
            output: dest,
        } => {
            let inputs: Vec<Input> = serde_json::from_str(&std::fs::read_to_string(&events)?)?;
            config.output = config.output.for_destination(&dest);
            let (area, avatar) = replay(backend, config, &image, inputs)?;
            avatar.write_to(&dest)?;
            output::print_crop(&image, &dest, &area, &avatar);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn parse_nudge(s: &str) -> Result<(f64, f64), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid offset '{v}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

fn place_window(dims: ImageDimensions, shape: &ShapeArgs, config: &config::CropConfig) -> CropArea {
    let range = ZoomRange {
        min: config.zoom.min,
        max: config.zoom.max,
    };
    let mut area = geometry::initialize(dims);
    if let Some(zoom) = shape.zoom {
        area = geometry::set_zoom(area, dims, range.clamp(zoom));
    }
    for preset in &shape.presets {
        area = geometry::apply_preset(area, dims, *preset);
    }
    for (dx, dy) in &shape.nudge {
        area = geometry::translate(area, dims, *dx, *dy);
    }
    area
}

/// Drive a full editing session: load, replay inputs, confirm, wait for the
/// completion callback.
fn replay(
    backend: RustBackend,
    config: config::CropConfig,
    image: &std::path::Path,
    inputs: Vec<Input>,
) -> Result<(CropArea, CropOutput), Box<dyn std::error::Error>> {
    let delivered: Rc<RefCell<Option<CropOutput>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&delivered);
    let mut session = CropSession::new(Arc::new(backend), config)?
        .on_complete(move |avatar| *sink.borrow_mut() = Some(avatar));

    session.select_file(image);
    while let Some(update) = session.wait() {
        if update? == SessionUpdate::Ready {
            break;
        }
    }

    for (i, input) in inputs.into_iter().enumerate() {
        let changed = session.handle_input(input);
        let area = session.area().ok_or(SessionError::NoImage)?;
        output::print_replay_step(i + 1, &input, changed.then_some(&area));
    }

    let area = session.area().ok_or(SessionError::NoImage)?;
    session.confirm()?;
    while let Some(update) = session.wait() {
        if update? == SessionUpdate::Completed {
            break;
        }
    }

    let avatar = delivered
        .borrow_mut()
        .take()
        .ok_or("session closed without producing an avatar")?;
    Ok((area, avatar))
}
