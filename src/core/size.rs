use serde::{Deserialize, Serialize};

/// Fallback display width when neither an explicit width nor viewport mode is configured
pub const DEFAULT_WIDTH: f64 = 300.0;
/// Fallback display height, mirrors the usual canvas default
pub const DEFAULT_HEIGHT: f64 = 150.0;

/// Width and height in pixels
///
/// Used both for display size (layout pixels) and backing size (buffer pixels).
/// Equality is component-wise and is the only change test the core uses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Multiply both components by a scale factor
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// True when either component has no area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whole-pixel dimensions for a GPU buffer, never smaller than 1x1
    pub fn to_physical(self) -> (u32, u32) {
        let clamp = |v: f64| {
            if v.is_finite() {
                v.round().clamp(1.0, u32::MAX as f64) as u32
            } else {
                1
            }
        };
        (clamp(self.width), clamp(self.height))
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// Result of size resolution for one evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSize {
    /// Size occupied in the layout
    pub display: Size,
    /// Resolution of the drawing buffer
    pub backing: Size,
}
