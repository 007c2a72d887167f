use anyhow::Context;
use clap::{Parser, Subcommand};
use geo::{Coord, Rect, coord};
use knob::config;
use knob::svg::SvgPainter;
use palette::Srgba;
use rotary::{ApproxTextMeasure, Knob, KnobSettings};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "knob", version, about, long_about = None)]
struct Cli {
    /// Settings file to use instead of the one in the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Write the default settings file (to --config if given) and print its path
    Init,
    /// Lay the dial out and render it as SVG
    Render {
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long, default_value_t = 96.0)]
        width: f64,
        #[arg(long, default_value_t = 120.0)]
        height: f64,
        /// Value to show instead of the configured one
        #[arg(long, allow_hyphen_values = true)]
        value: Option<f64>,
        /// Render the magnified drag overlay instead of the dial
        #[arg(long)]
        overlay: bool,
    },
    /// Drag the pointer around the dial and render the result
    Drag {
        #[arg(short, long)]
        out: PathBuf,
        /// Degrees to drag, positive is clockwise
        #[arg(long, allow_hyphen_values = true)]
        sweep: f64,
        #[arg(long, default_value_t = 12)]
        steps: u32,
        /// Pointer distance from the dial centre, in pixels
        #[arg(long, default_value_t = 48.0)]
        distance: f64,
        #[arg(long, default_value_t = 96.0)]
        width: f64,
        #[arg(long, default_value_t = 120.0)]
        height: f64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let path = config::write_default_config(cli.config.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Render {
            out,
            width,
            height,
            value,
            overlay,
        } => {
            let settings = config::load_config(cli.config.as_deref())?;
            render(&settings, &out, (width, height), value, overlay)
        }
        Commands::Drag {
            out,
            sweep,
            steps,
            distance,
            width,
            height,
        } => {
            let settings = config::load_config(cli.config.as_deref())?;
            drag(&settings, &out, (width, height), sweep, steps, distance)
        }
    }
}

fn laid_out(settings: &KnobSettings, (width, height): (f64, f64)) -> anyhow::Result<Knob> {
    let mut knob = Knob::new(settings).map_err(config::ConfigError::from)?;
    let bounds = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: width, y: height });
    knob.set_bounds(bounds, &ApproxTextMeasure::default());
    Ok(knob)
}

fn white() -> Srgba<f64> {
    Srgba::new(1.0, 1.0, 1.0, 1.0)
}

fn render(
    settings: &KnobSettings,
    out: &Path,
    size: (f64, f64),
    value: Option<f64>,
    overlay: bool,
) -> anyhow::Result<()> {
    let mut knob = laid_out(settings, size)?;
    if let Some(value) = value {
        knob.set_value(value);
    }

    let svg = if overlay {
        let (Some(frame), Some(center)) = (knob.overlay_frame().copied(), knob.overlay_center())
        else {
            anyhow::bail!("A {}x{} dial is too small for an overlay", size.0, size.1);
        };
        knob.drag_start(center);
        let mut painter = SvgPainter::new(frame.width, frame.height);
        painter.background(white());
        let mut painter = painter.with_origin(coord! { x: frame.padding, y: frame.padding });
        knob.draw_overlay(&mut painter)?;
        knob.drag_cancel();
        painter.finish()
    } else {
        primary_svg(&knob, size)?
    };

    fs_err::write(out, svg)?;
    println!("{} -> {}", knob.label(), out.display());
    Ok(())
}

fn primary_svg(knob: &Knob, (width, height): (f64, f64)) -> anyhow::Result<String> {
    let mut painter = SvgPainter::new(width, height);
    painter.background(white());
    knob.draw_primary(&mut painter)?;
    Ok(painter.finish())
}

/// Pointer position at math angle `deg` around `center`, in screen coordinates.
fn pointer(center: Coord<f64>, deg: f64, distance: f64) -> Coord<f64> {
    let a = deg.to_radians();
    coord! { x: center.x + distance * a.cos(), y: center.y - distance * a.sin() }
}

fn drag(
    settings: &KnobSettings,
    out: &Path,
    size: (f64, f64),
    sweep: f64,
    steps: u32,
    distance: f64,
) -> anyhow::Result<()> {
    let mut knob = laid_out(settings, size)?;
    knob.set_value_changed_listener(|value| println!("listener: {value}"));

    let center = knob
        .overlay_center()
        .context("dial is too small for an overlay")?;
    knob.drag_start(center);

    let steps = steps.max(1);
    let increment = sweep / f64::from(steps);
    // start straight above the centre and move clockwise for positive sweeps
    let mut angle = 90.0;
    for step in 1..=steps {
        let previous = pointer(center, angle, distance);
        angle -= increment;
        let current = pointer(center, angle, distance);
        let action = knob.drag_move(previous, current);
        if action.value_changed {
            println!(
                "step {step}: {} (rotation {:.1})",
                knob.label(),
                knob.rotation()
            );
        }
    }

    let action = knob.drag_end();
    log::info!("Drag finished, value changed: {}", action.value_changed);

    fs_err::write(out, primary_svg(&knob, size)?)?;
    println!("{} -> {}", knob.label(), out.display());
    Ok(())
}
