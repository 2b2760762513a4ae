use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sketchbook",
    author,
    version,
    about = "Full-screen WGSL shader sketchbook",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file; defaults to `sketchbook.toml` in the platform config directory.
    #[arg(long, global = true, value_name = "FILE", env = "SKETCHBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Route to open first (e.g. `/sketches/noise/dawn-1`); defaults to `/`.
    #[arg(long, value_name = "PATH")]
    pub route: Option<String>,

    /// Initial window size in logical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Frame-rate cap (0 = render on every redraw).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Upper bound for the device pixel ratio used to size the backing surface.
    #[arg(long, value_name = "RATIO", value_parser = parse_pixel_ratio)]
    pub max_pixel_ratio: Option<f32>,

    /// Advance time by a fixed number of seconds per frame instead of following the clock.
    #[arg(long, value_name = "SECONDS", value_parser = parse_frame_step)]
    pub frame_step: Option<f32>,

    /// Prefer the high-performance GPU adapter.
    #[arg(long)]
    pub high_performance: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every registered sketch in order.
    List(ListArgs),
    /// Print the sketch id a route resolves to, without opening a window.
    Route(RouteArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    #[arg(value_name = "PATH")]
    pub path: String,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{value}'; expected WIDTHxHEIGHT"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width '{}'", w.trim()))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height '{}'", h.trim()))?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid fps '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("fps must be a non-negative number".into());
    }
    Ok(fps)
}

pub fn parse_pixel_ratio(value: &str) -> Result<f32, String> {
    let ratio = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid pixel ratio '{value}'"))?;
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err("pixel ratio must be a positive number".into());
    }
    Ok(ratio)
}

pub fn parse_frame_step(value: &str) -> Result<f32, String> {
    let step = value
        .trim()
        .parse::<f32>()
        .map_err(|_| format!("invalid frame step '{value}'"))?;
    if !step.is_finite() || step <= 0.0 {
        return Err("frame step must be a positive number of seconds".into());
    }
    Ok(step)
}
