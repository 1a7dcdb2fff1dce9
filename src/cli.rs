// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::CanvasConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "canvas-loop")]
#[command(about = "Render loop bound to a resizable window surface", long_about = None)]
pub struct Cli {
    /// JSON canvas configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Display width in layout pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// Display height in layout pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Backing buffer width
    #[arg(long = "render-width")]
    pub render_width: Option<f64>,

    /// Backing buffer height
    #[arg(long = "render-height")]
    pub render_height: Option<f64>,

    /// Track the window size instead of a fixed size
    #[arg(long = "cover-viewport", default_value = "false")]
    pub cover_viewport: bool,

    /// Scale the backing buffer by the display's pixel ratio
    #[arg(long = "auto-scale-ratio", default_value = "false")]
    pub auto_scale_ratio: bool,

    /// Drive the canvas through a viewport tracker
    #[arg(long, default_value = "false")]
    pub viewport: bool,

    /// Class name passed through to the surface placement
    #[arg(long = "class-name")]
    pub class_name: Option<String>,
}

impl Cli {
    /// Canvas configuration from the config file (if any) with flag overrides applied
    pub fn canvas_config(&self) -> anyhow::Result<CanvasConfig> {
        let mut config = match &self.config {
            Some(path) => CanvasConfig::from_json_file(path)?,
            None => CanvasConfig::default(),
        };

        if self.width.is_some() {
            config.width = self.width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if self.render_width.is_some() {
            config.render_width = self.render_width;
        }
        if self.render_height.is_some() {
            config.render_height = self.render_height;
        }
        if self.class_name.is_some() {
            config.class_name = self.class_name.clone();
        }
        config.cover_viewport |= self.cover_viewport;
        config.auto_scale_ratio |= self.auto_scale_ratio;

        Ok(config)
    }
}
