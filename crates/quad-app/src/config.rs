use std::path::PathBuf;

use clap::Parser;
use quad_core::Fit;
use thiserror::Error;

/// Present an image through a full-screen quad.
///
/// Without IMAGE the interpolated uv coordinates are shown.
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(
    name = "screen-quad",
    version,
    after_help = "Keys: F toggle fit, Space toggle uv view, Q/Esc quit.\nLogging is controlled with RUST_LOG."
)]
pub struct Cli {
    /// Image file to present
    pub image: Option<PathBuf>,

    /// Open a window instead of going fullscreen
    #[arg(long)]
    pub windowed: bool,

    /// Window size when windowed
    #[arg(long, value_name = "WxH", default_value = "800x600", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Frame rate cap, 0 for uncapped
    #[arg(long, value_name = "N", default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f64,

    /// How the image maps onto the screen
    #[arg(long, value_enum, default_value_t = Fit::Stretch)]
    pub fit: Fit,

    /// Window title
    #[arg(long, value_name = "TEXT", default_value = "Screen Quad")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub title: String,
    /// Inner size of the window when not fullscreen.
    pub size: (u32, u32),
    pub fullscreen: bool,
    pub target_fps: f64,
    pub fit: Fit,
    /// Clear color, and fill around a contained image.
    pub background: [f32; 4],
    pub image: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Screen Quad".to_string(),
            size: (800, 600),
            fullscreen: true,
            target_fps: 60.0,
            fit: Fit::Stretch,
            background: [0.2, 0.2, 0.2, 1.0],
            image: None,
        }
    }
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        Self {
            title: cli.title,
            size: cli.size,
            fullscreen: !cli.windowed,
            target_fps: cli.fps,
            fit: cli.fit,
            image: cli.image,
            ..Self::default()
        }
    }
}

/// Value errors reported by clap for `--size` and `--fps`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("expected WIDTHxHEIGHT with both sides above zero, got {0:?}")]
    Size(String),
    #[error("expected a frame rate of 0 or more, got {0:?}")]
    Fps(String),
}

fn parse_size(s: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::Size(s.to_string());
    let (w, h) = s.split_once(['x', 'X']).ok_or_else(invalid)?;
    let side = |v: &str| v.trim().parse::<u32>().ok().filter(|&n| n > 0);
    Ok((side(w).ok_or_else(invalid)?, side(h).ok_or_else(invalid)?))
}

fn parse_fps(s: &str) -> Result<f64, ConfigError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|fps| fps.is_finite() && *fps >= 0.0)
        .ok_or_else(|| ConfigError::Fps(s.to_string()))
}
