use std::cell::Cell;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::config::CanvasConfig;

use super::host::{effective_scale, HostEnvironment, Subscription};
use super::renderer::DrawingSurface;
use super::scheduler::LoopState;
use super::surface::Canvas;

/// Canvas that follows the host viewport
///
/// Every host resize notification recomputes the display size from the viewport and the
/// backing size with the device pixel ratio rule, then makes the canvas re-evaluate its size.
/// There is no debouncing; the canvas only tells its renderer about real changes.
pub struct ViewportTracker<S: DrawingSurface + 'static> {
    canvas: Canvas<S>,
    host: Rc<dyn HostEnvironment>,
    auto_scale_ratio: bool,
    recomputations: Rc<Cell<u64>>,
    subscription: Option<Subscription>,
}

impl<S: DrawingSurface + 'static> ViewportTracker<S> {
    /// Wrap a new canvas; sizing options in `config` are replaced by viewport-derived ones
    pub fn new(config: CanvasConfig, host: Rc<dyn HostEnvironment>) -> Self {
        let auto_scale_ratio = config.auto_scale_ratio;
        let config = CanvasConfig {
            cover_viewport: false,
            ..config
        };

        Self {
            canvas: Canvas::new(config, host.clone()),
            host,
            auto_scale_ratio,
            recomputations: Rc::new(Cell::new(0)),
            subscription: None,
        }
    }

    /// The wrapped canvas, for installing the surface and renderer
    pub fn canvas(&self) -> &Canvas<S> {
        &self.canvas
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of size recomputations so far, including the one on attach
    pub fn recomputations(&self) -> u64 {
        self.recomputations.get()
    }

    /// Derive the size from the viewport, attach the canvas and start listening for resizes
    ///
    /// Like the canvas, a tracker attaches once; after a detach it stays inert.
    pub fn attach(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let loop_state = self.canvas.loop_state();
        if loop_state != LoopState::Idle {
            warn!("viewport tracker attach ignored, loop is {:?}", loop_state);
            return;
        }

        recompute(&self.canvas, self.host.as_ref(), self.auto_scale_ratio, &self.recomputations);
        self.canvas.attach();

        let canvas = self.canvas.downgrade();
        let host: Weak<dyn HostEnvironment> = Rc::downgrade(&self.host);
        let auto_scale_ratio = self.auto_scale_ratio;
        let recomputations = self.recomputations.clone();

        self.subscription = Some(self.host.resize_listeners().subscribe(move || {
            if let (Some(canvas), Some(host)) = (canvas.upgrade(), host.upgrade()) {
                recompute(&canvas, host.as_ref(), auto_scale_ratio, &recomputations);
            }
        }));
        debug!("viewport tracker attached");
    }

    /// Stop listening and detach the canvas
    pub fn detach(&mut self) {
        if self.subscription.take().is_some() {
            self.canvas.detach();
            debug!("viewport tracker detached");
        }
    }
}

impl<S: DrawingSurface + 'static> Drop for ViewportTracker<S> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn recompute<S: DrawingSurface + 'static>(
    canvas: &Canvas<S>,
    host: &dyn HostEnvironment,
    auto_scale_ratio: bool,
    recomputations: &Cell<u64>,
) {
    let viewport = host.viewport_size();
    let backing = viewport.scaled(effective_scale(auto_scale_ratio, host.device_pixel_ratio()));
    trace!("viewport {:?}, render size {:?}", viewport, backing);

    recomputations.set(recomputations.get() + 1);
    canvas.update_config(|config| {
        config.width = Some(viewport.width);
        config.height = Some(viewport.height);
        config.render_width = Some(backing.width);
        config.render_height = Some(backing.height);
    });
}
