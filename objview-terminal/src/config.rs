/// Command line configuration for the terminal viewer
use clap::Parser;
use objview_core::{LoadOptions, ParseMode};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "objview",
    about = "Terminal wireframe viewer for OBJ models",
    long_about = "Loads the v/l/f directives of a Wavefront OBJ file, normalizes the model \
        into a unit cube and draws its edges as ASCII art.\n\n\
        CONTROLS:\n  \
        WASD / arrows  move up, down, left, right\n  \
        f / b          move forward, backward\n  \
        + / -          bigger, smaller\n  \
        x y z          rotate about an axis (shift reverses)\n  \
        p              toggle perspective / orthographic\n  \
        o              reload the file\n  \
        q / Esc        quit",
    version
)]
pub struct ViewerConfig {
    /// OBJ file to display; a unit cube is shown when omitted
    pub path: Option<PathBuf>,

    /// Fail on malformed v/l/f lines instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Keep the file's coordinates instead of mapping them into the unit cube
    #[arg(long)]
    pub no_normalize: bool,

    /// Frames per second of the render loop
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Distance moved per key press
    #[arg(long, default_value_t = 0.1)]
    pub move_step: f64,

    /// Relative size change per key press (0.1 = 10%)
    #[arg(long, default_value_t = 0.1)]
    pub scale_step: f64,

    /// Degrees rotated per key press
    #[arg(long, default_value_t = 10.0)]
    pub rotate_step: f64,

    /// Start in orthographic projection
    #[arg(long)]
    pub orthographic: bool,
}

impl ViewerConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            mode: if self.strict {
                ParseMode::Strict
            } else {
                ParseMode::Lenient
            },
            normalize: !self.no_normalize,
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::parse_from(["objview"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.path, None);
        assert_eq!(config.fps, 30);
        assert_eq!(config.load_options(), LoadOptions::default());
        assert_eq!(config.frame_time(), Duration::from_millis(33));
    }

    #[test]
    fn test_flags() {
        let config = ViewerConfig::parse_from([
            "objview",
            "model.obj",
            "--strict",
            "--no-normalize",
            "--rotate-step",
            "15",
            "--fps",
            "0",
        ]);
        assert_eq!(config.path, Some(PathBuf::from("model.obj")));
        assert_eq!(config.load_options().mode, ParseMode::Strict);
        assert!(!config.load_options().normalize);
        assert_eq!(config.rotate_step, 15.0);
        assert_eq!(config.frame_time(), Duration::from_millis(1000));
    }
}
