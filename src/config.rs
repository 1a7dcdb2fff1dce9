// config.rs - Canvas configuration and visual placement
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Inline style declarations, property name to value
pub type Style = BTreeMap<String, String>;

/// Options the embedding application sets on a canvas
///
/// Keys are camelCase in JSON so a config file reads like the component's option list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Explicit display width
    pub width: Option<f64>,
    /// Explicit display height
    pub height: Option<f64>,
    /// Explicit backing buffer width
    pub render_width: Option<f64>,
    /// Explicit backing buffer height
    pub render_height: Option<f64>,
    /// Display size follows the host viewport
    pub cover_viewport: bool,
    /// Scale the backing buffer by the device pixel ratio
    pub auto_scale_ratio: bool,
    pub class_name: Option<String>,
    pub style: Style,
}

impl CanvasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid canvas configuration")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_render_size(mut self, width: f64, height: f64) -> Self {
        self.render_width = Some(width);
        self.render_height = Some(height);
        self
    }

    pub fn cover_viewport(mut self, enabled: bool) -> Self {
        self.cover_viewport = enabled;
        self
    }

    pub fn auto_scale_ratio(mut self, enabled: bool) -> Self {
        self.auto_scale_ratio = enabled;
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Visual placement passed through to the surface element
    ///
    /// Cover-viewport canvases become a fixed, non-interactive full-viewport overlay.
    /// User style entries win over the overlay defaults.
    pub fn placement(&self) -> Placement {
        let mut style = if self.cover_viewport {
            cover_viewport_style()
        } else {
            Style::new()
        };
        style.extend(self.style.iter().map(|(k, v)| (k.clone(), v.clone())));

        Placement {
            class_name: self.class_name.clone(),
            style,
        }
    }
}

/// Class name and inline style for the surface element; no effect on sizing or timing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Placement {
    pub class_name: Option<String>,
    pub style: Style,
}

fn cover_viewport_style() -> Style {
    [
        ("position", "fixed"),
        ("top", "0"),
        ("right", "0"),
        ("bottom", "0"),
        ("left", "0"),
        ("width", "100vw"),
        ("height", "100vh"),
        ("pointer-events", "none"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
