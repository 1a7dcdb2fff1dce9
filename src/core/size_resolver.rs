use crate::config::CanvasConfig;

use super::host::{effective_scale, HostEnvironment};
use super::size::{ResolvedSize, Size, DEFAULT_HEIGHT, DEFAULT_WIDTH};

/// Computes display and backing size from configuration and host metrics
///
/// Stateless: the same configuration and host state always resolve to the same sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeResolver;

impl SizeResolver {
    /// Resolve against the live host environment
    pub fn resolve(config: &CanvasConfig, host: &dyn HostEnvironment) -> ResolvedSize {
        let viewport = config.cover_viewport.then(|| host.viewport_size());
        Self::resolve_with(config, viewport, host.device_pixel_ratio())
    }

    /// Resolve from explicit host metrics
    ///
    /// `viewport` is only consulted in cover-viewport mode.
    pub fn resolve_with(
        config: &CanvasConfig,
        viewport: Option<Size>,
        device_pixel_ratio: Option<f64>,
    ) -> ResolvedSize {
        let display = match viewport {
            Some(viewport) if config.cover_viewport => viewport,
            _ => Size::new(
                config.width.unwrap_or(DEFAULT_WIDTH),
                config.height.unwrap_or(DEFAULT_HEIGHT),
            ),
        };

        let scaled = display.scaled(effective_scale(config.auto_scale_ratio, device_pixel_ratio));
        let backing = Size::new(
            config.render_width.unwrap_or(scaled.width),
            config.render_height.unwrap_or(scaled.height),
        );

        ResolvedSize { display, backing }
    }
}
