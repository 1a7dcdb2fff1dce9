use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

use super::host::{HostEnvironment, ResizeListeners};
use super::size::Size;

/// Host environment backed by a winit window
///
/// The window's logical inner size is the viewport, its scale factor the device pixel ratio,
/// and `request_redraw` schedules the next frame callback.
pub struct WinitHost {
    window: Arc<Window>,
    listeners: ResizeListeners,
}

impl WinitHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            listeners: ResizeListeners::new(),
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Forward viewport changes to resize listeners; returns true if the event was one
    pub fn handle_event(&self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.listeners.dispatch();
                true
            }
            _ => false,
        }
    }
}

impl HostEnvironment for WinitHost {
    fn viewport_size(&self) -> Size {
        let logical = self
            .window
            .inner_size()
            .to_logical::<f64>(self.window.scale_factor());
        Size::new(logical.width, logical.height)
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        Some(self.window.scale_factor())
    }

    fn request_frame(&self) {
        self.window.request_redraw();
    }

    fn resize_listeners(&self) -> &ResizeListeners {
        &self.listeners
    }
}
