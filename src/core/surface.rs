use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use log::{debug, trace, warn};

use crate::config::{CanvasConfig, Placement};

use super::host::{HostEnvironment, Subscription};
use super::renderer::{DrawingSurface, FrameContext, Renderer};
use super::resize_notifier::{ResizeNotifier, ResizeOutcome};
use super::scheduler::{advance_timestamp, LoopState, RenderLoopScheduler};
use super::size::Size;
use super::size_resolver::SizeResolver;
use super::timing::RenderTiming;

/// Mutable per-surface record, touched only by resize resolution and frame callbacks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceState {
    /// True from attach until detach
    pub is_active: bool,
    /// Display size the renderer last heard about
    pub last_notified_size: Option<Size>,
    /// Timestamp of the last rendered frame
    pub last_frame_timestamp: Option<Duration>,
}

struct CanvasInner<S: DrawingSurface> {
    config: CanvasConfig,
    host: Rc<dyn HostEnvironment>,
    surface: Option<S>,
    renderer: Option<Rc<dyn Renderer<S>>>,
    state: SurfaceState,
    scheduler: RenderLoopScheduler,
    viewport_subscription: Option<Subscription>,
    /// Set while the renderer holds the surface during a frame
    in_frame: bool,
    /// A size evaluation arrived while the surface was lent out
    size_dirty: bool,
    /// The surface was replaced or removed while lent out
    surface_replaced: bool,
}

/// A drawing surface bound into the host with its own render loop
///
/// Cheap to clone; all clones share one surface instance. Lifecycle is driven by three
/// events: [`Canvas::attach`], [`Canvas::detach`] and [`Canvas::set_config`]. The host
/// delivers frame callbacks through [`Canvas::on_frame`] and must never do so synchronously
/// from inside [`HostEnvironment::request_frame`].
pub struct Canvas<S: DrawingSurface + 'static> {
    inner: Rc<RefCell<CanvasInner<S>>>,
}

impl<S: DrawingSurface + 'static> Clone for Canvas<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Non-owning reference to a [`Canvas`], held by listeners
pub struct WeakCanvas<S: DrawingSurface + 'static> {
    inner: Weak<RefCell<CanvasInner<S>>>,
}

impl<S: DrawingSurface + 'static> WeakCanvas<S> {
    pub fn upgrade(&self) -> Option<Canvas<S>> {
        self.inner.upgrade().map(|inner| Canvas { inner })
    }
}

impl<S: DrawingSurface + 'static> Clone for WeakCanvas<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DrawingSurface + 'static> Canvas<S> {
    pub fn new(config: CanvasConfig, host: Rc<dyn HostEnvironment>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CanvasInner {
                config,
                host,
                surface: None,
                renderer: None,
                state: SurfaceState::default(),
                scheduler: RenderLoopScheduler::new(),
                viewport_subscription: None,
                in_frame: false,
                size_dirty: false,
                surface_replaced: false,
            })),
        }
    }

    pub fn downgrade(&self) -> WeakCanvas<S> {
        WeakCanvas {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Provide or remove the surface handle
    pub fn set_surface(&self, surface: Option<S>) {
        let mut inner = self.inner.borrow_mut();
        inner.surface_replaced = inner.in_frame;
        inner.surface = surface;
    }

    /// Provide or remove the renderer
    pub fn set_renderer(&self, renderer: Option<Rc<dyn Renderer<S>>>) {
        self.inner.borrow_mut().renderer = renderer;
    }

    /// Run `f` against the surface handle, if there is one
    ///
    /// Returns `None` from inside [`Renderer::render`], where the frame holds the surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.inner.borrow_mut().surface.as_mut().map(f)
    }

    pub fn config(&self) -> Ref<'_, CanvasConfig> {
        Ref::map(self.inner.borrow(), |inner| &inner.config)
    }

    pub fn placement(&self) -> Placement {
        self.inner.borrow().config.placement()
    }

    pub fn state(&self) -> SurfaceState {
        self.inner.borrow().state
    }

    pub fn loop_state(&self) -> LoopState {
        self.inner.borrow().scheduler.state()
    }

    pub fn is_frame_pending(&self) -> bool {
        self.inner.borrow().scheduler.is_frame_pending()
    }

    /// Whether this canvas currently listens for host resize notifications
    pub fn follows_viewport(&self) -> bool {
        self.inner.borrow().viewport_subscription.is_some()
    }

    /// onAttach: size the surface and start the render loop
    ///
    /// A canvas attaches once; a detached canvas stays stopped and a new instance is needed.
    pub fn attach(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.scheduler.state() != LoopState::Idle {
                warn!("canvas attach ignored, loop is {:?}", inner.scheduler.state());
                return;
            }
            inner.state.is_active = true;
        }
        debug!("canvas attached");

        self.adjust_size();
        self.sync_viewport_subscription();

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.scheduler.start(inner.host.as_ref());
    }

    /// onDetach: stop scheduling frames and release the resize listener
    ///
    /// A frame already requested from the host is not retracted; it runs once more and then
    /// ends the loop.
    pub fn detach(&self) {
        let subscription = {
            let mut inner = self.inner.borrow_mut();
            if !inner.state.is_active {
                return;
            }
            inner.state.is_active = false;
            inner.viewport_subscription.take()
        };
        drop(subscription);
        debug!("canvas detached");
    }

    /// onConfigChanged: replace the configuration and re-evaluate size and listeners
    pub fn set_config(&self, config: CanvasConfig) {
        let is_active = {
            let mut inner = self.inner.borrow_mut();
            inner.config = config;
            inner.state.is_active
        };
        if is_active {
            self.adjust_size();
            self.sync_viewport_subscription();
        }
    }

    /// Update the configuration in place, then re-evaluate like [`Canvas::set_config`]
    pub fn update_config(&self, f: impl FnOnce(&mut CanvasConfig)) {
        let mut config = self.config().clone();
        f(&mut config);
        self.set_config(config);
    }

    /// Resolve the current size, apply it to the surface and notify the renderer on change
    ///
    /// Does nothing while there is no surface handle. Called from inside a frame, the
    /// evaluation is deferred until the renderer hands the surface back.
    pub fn adjust_size(&self) -> Option<ResizeOutcome> {
        let (outcome, renderer) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let Some(surface) = inner.surface.as_mut() else {
                if inner.in_frame {
                    inner.size_dirty = true;
                }
                return None;
            };

            let resolved = SizeResolver::resolve(&inner.config, inner.host.as_ref());
            let outcome =
                ResizeNotifier::notify(&mut inner.state.last_notified_size, resolved.display);

            if outcome.changed() || surface.buffer_size() != resolved.backing {
                trace!(
                    "applying display {:?} backing {:?}",
                    resolved.display,
                    resolved.backing
                );
                surface.apply_size(resolved.display, resolved.backing);
            }

            (outcome, inner.renderer.clone())
        };

        // Hook runs outside the borrow so the renderer may inspect the canvas
        if let ResizeOutcome::Resized { size, prev } = outcome {
            debug!("canvas resized {:?} -> {:?}", prev, size);
            if let Some(renderer) = renderer {
                renderer.on_resized(size, prev);
            }
        }

        Some(outcome)
    }

    /// Frame callback delivered by the host with a monotonic timestamp
    pub fn on_frame(&self, ts: Duration) {
        let timing = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if !inner.scheduler.begin_frame() {
                trace!("ignoring unrequested frame callback at {:?}", ts);
                return;
            }

            let ready = inner.renderer.is_some()
                && inner
                    .surface
                    .as_ref()
                    .is_some_and(|surface| surface.context().is_some());
            ready.then(|| advance_timestamp(&mut inner.state.last_frame_timestamp, ts))
        };

        match timing {
            Some(time) => self.render_frame(time),
            None => trace!("frame skipped, renderer or drawing context unavailable"),
        }

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let is_active = inner.state.is_active;
        inner.scheduler.end_frame(is_active, inner.host.as_ref());
        if !is_active {
            debug!("render loop stopped");
        }
    }

    /// Lend the surface to the renderer with the canvas unborrowed, so the renderer may drive
    /// lifecycle events on its own canvas
    fn render_frame(&self, time: RenderTiming) {
        let (surface, renderer) = {
            let mut inner = self.inner.borrow_mut();
            inner.in_frame = true;
            inner.surface_replaced = false;
            (inner.surface.take(), inner.renderer.clone())
        };

        if let (Some(surface), Some(renderer)) = (&surface, &renderer) {
            if let Some(context) = surface.context() {
                renderer.render(&FrameContext {
                    surface,
                    context,
                    time,
                });
            }
        }

        let size_dirty = {
            let mut inner = self.inner.borrow_mut();
            inner.in_frame = false;
            if !std::mem::take(&mut inner.surface_replaced) {
                inner.surface = surface;
            }
            std::mem::take(&mut inner.size_dirty)
        };
        if size_dirty {
            trace!("applying size change requested during frame");
            self.adjust_size();
        }
    }

    /// Keep a resize listener registered exactly while attached in cover-viewport mode
    fn sync_viewport_subscription(&self) {
        let mut inner = self.inner.borrow_mut();
        let wanted = inner.state.is_active && inner.config.cover_viewport;

        match (wanted, inner.viewport_subscription.is_some()) {
            (true, false) => {
                let weak = self.downgrade();
                let subscription = inner.host.resize_listeners().subscribe(move || {
                    if let Some(canvas) = weak.upgrade() {
                        canvas.adjust_size();
                    }
                });
                inner.viewport_subscription = Some(subscription);
            }
            (false, true) => {
                let subscription = inner.viewport_subscription.take();
                drop(inner);
                drop(subscription);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::ResizeListeners;
    use std::cell::Cell;

    struct MockHost {
        viewport: Cell<Size>,
        requests: Cell<usize>,
        listeners: ResizeListeners,
    }

    impl MockHost {
        fn new(width: f64, height: f64) -> Rc<Self> {
            Rc::new(Self {
                viewport: Cell::new(Size::new(width, height)),
                requests: Cell::new(0),
                listeners: ResizeListeners::new(),
            })
        }
    }

    impl HostEnvironment for MockHost {
        fn viewport_size(&self) -> Size {
            self.viewport.get()
        }

        fn device_pixel_ratio(&self) -> Option<f64> {
            Some(2.0)
        }

        fn request_frame(&self) {
            self.requests.set(self.requests.get() + 1);
        }

        fn resize_listeners(&self) -> &ResizeListeners {
            &self.listeners
        }
    }

    struct MockSurface {
        display: Size,
        backing: Size,
        context: Option<()>,
    }

    impl MockSurface {
        fn new() -> Self {
            Self {
                display: Size::new(300.0, 150.0),
                backing: Size::new(300.0, 150.0),
                context: Some(()),
            }
        }
    }

    impl DrawingSurface for MockSurface {
        type Context = ();

        fn context(&self) -> Option<&()> {
            self.context.as_ref()
        }

        fn buffer_size(&self) -> Size {
            self.backing
        }

        fn apply_size(&mut self, display: Size, backing: Size) {
            self.display = display;
            self.backing = backing;
        }
    }

    #[derive(Default)]
    struct MockRenderer {
        frames: RefCell<Vec<f64>>,
        resizes: RefCell<Vec<(Size, Size)>>,
    }

    impl Renderer<MockSurface> for MockRenderer {
        fn render(&self, frame: &FrameContext<'_, MockSurface>) {
            self.frames.borrow_mut().push(frame.time.delta);
        }

        fn on_resized(&self, size: Size, prev: Size) {
            self.resizes.borrow_mut().push((size, prev));
        }
    }

    fn canvas(config: CanvasConfig, host: &Rc<MockHost>) -> (Canvas<MockSurface>, Rc<MockRenderer>) {
        let renderer = Rc::new(MockRenderer::default());
        let canvas = Canvas::new(config, host.clone());
        canvas.set_surface(Some(MockSurface::new()));
        canvas.set_renderer(Some(renderer.clone()));
        (canvas, renderer)
    }

    #[test]
    fn test_attach_sizes_surface_and_requests_frame() {
        let host = MockHost::new(1024.0, 768.0);
        let (canvas, renderer) = canvas(
            CanvasConfig::new().with_size(800.0, 600.0).auto_scale_ratio(true),
            &host,
        );

        canvas.attach();

        assert!(canvas.state().is_active);
        assert_eq!(canvas.state().last_notified_size, Some(Size::new(800.0, 600.0)));
        assert_eq!(
            canvas.with_surface(|s| (s.display, s.backing)),
            Some((Size::new(800.0, 600.0), Size::new(1600.0, 1200.0)))
        );
        assert_eq!(host.requests.get(), 1);
        assert_eq!(canvas.loop_state(), LoopState::Running);
        assert!(renderer.resizes.borrow().is_empty());
    }

    #[test]
    fn test_adjust_size_without_surface_is_noop() {
        let host = MockHost::new(800.0, 600.0);
        let canvas: Canvas<MockSurface> = Canvas::new(CanvasConfig::default(), host.clone());

        assert_eq!(canvas.adjust_size(), None);
        assert_eq!(canvas.state().last_notified_size, None);
    }

    #[test]
    fn test_second_attach_is_ignored() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, _) = canvas(CanvasConfig::default(), &host);

        canvas.attach();
        canvas.attach();
        assert_eq!(host.requests.get(), 1);
    }

    #[test]
    fn test_frames_render_with_timing() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::default(), &host);
        canvas.attach();

        canvas.on_frame(Duration::from_millis(1000));
        canvas.on_frame(Duration::from_millis(1020));

        let frames = renderer.frames.borrow();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], 0.0);
        assert!((frames[1] - 0.02).abs() < 1e-9);
        assert_eq!(host.requests.get(), 3);
    }

    #[test]
    fn test_missing_context_skips_but_keeps_scheduling() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::default(), &host);
        canvas.with_surface(|s| s.context = None);
        canvas.attach();

        canvas.on_frame(Duration::from_millis(16));

        assert!(renderer.frames.borrow().is_empty());
        assert_eq!(canvas.state().last_frame_timestamp, None);
        assert_eq!(host.requests.get(), 2);
        assert!(canvas.is_frame_pending());
    }

    #[test]
    fn test_detach_lets_pending_frame_finish_then_stops() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::default(), &host);
        canvas.attach();
        canvas.detach();

        canvas.on_frame(Duration::from_millis(16));
        assert_eq!(renderer.frames.borrow().len(), 1);
        assert_eq!(canvas.loop_state(), LoopState::Stopped);
        assert_eq!(host.requests.get(), 1);

        canvas.on_frame(Duration::from_millis(32));
        assert_eq!(renderer.frames.borrow().len(), 1);
    }

    #[test]
    fn test_config_change_notifies_renderer() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::new().with_size(800.0, 600.0), &host);
        canvas.attach();

        canvas.update_config(|config| {
            config.width = Some(1024.0);
            config.height = Some(768.0);
        });

        assert_eq!(
            *renderer.resizes.borrow(),
            vec![(Size::new(1024.0, 768.0), Size::new(800.0, 600.0))]
        );
    }

    #[test]
    fn test_backing_change_reapplies_without_notification() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::new().with_size(400.0, 300.0), &host);
        canvas.attach();

        canvas.update_config(|config| config.auto_scale_ratio = true);

        assert!(renderer.resizes.borrow().is_empty());
        assert_eq!(canvas.with_surface(|s| s.backing), Some(Size::new(800.0, 600.0)));
    }

    #[test]
    fn test_cover_viewport_subscription_follows_lifecycle() {
        let host = MockHost::new(800.0, 600.0);
        let (canvas, renderer) = canvas(CanvasConfig::new().cover_viewport(true), &host);

        canvas.attach();
        assert!(canvas.follows_viewport());
        assert_eq!(host.listeners.len(), 1);

        host.viewport.set(Size::new(1280.0, 720.0));
        host.listeners.dispatch();
        assert_eq!(
            *renderer.resizes.borrow(),
            vec![(Size::new(1280.0, 720.0), Size::new(800.0, 600.0))]
        );

        canvas.update_config(|config| config.cover_viewport = false);
        assert!(!canvas.follows_viewport());
        assert!(host.listeners.is_empty());

        canvas.update_config(|config| config.cover_viewport = true);
        assert_eq!(host.listeners.len(), 1);

        canvas.detach();
        assert!(host.listeners.is_empty());
    }
}
