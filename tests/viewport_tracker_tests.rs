use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use canvas_loop::{
    CanvasConfig, DrawingSurface, FrameContext, HostEnvironment, LoopState, Renderer,
    ResizeListeners, Size, ViewportTracker,
};

/// Mock host with a mutable window
struct MockHost {
    viewport: Cell<Size>,
    ratio: Cell<Option<f64>>,
    requests: Cell<usize>,
    listeners: ResizeListeners,
}

impl MockHost {
    fn new(width: f64, height: f64, ratio: f64) -> Rc<Self> {
        Rc::new(Self {
            viewport: Cell::new(Size::new(width, height)),
            ratio: Cell::new(Some(ratio)),
            requests: Cell::new(0),
            listeners: ResizeListeners::new(),
        })
    }

    fn resize(&self, width: f64, height: f64) {
        self.viewport.set(Size::new(width, height));
        self.listeners.dispatch();
    }
}

impl HostEnvironment for MockHost {
    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.ratio.get()
    }

    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }

    fn resize_listeners(&self) -> &ResizeListeners {
        &self.listeners
    }
}

#[derive(Default)]
struct MockSurface {
    display: Size,
    backing: Size,
    applied: usize,
}

impl DrawingSurface for MockSurface {
    type Context = ();

    fn context(&self) -> Option<&()> {
        Some(&())
    }

    fn buffer_size(&self) -> Size {
        self.backing
    }

    fn apply_size(&mut self, display: Size, backing: Size) {
        self.display = display;
        self.backing = backing;
        self.applied += 1;
    }
}

#[derive(Default)]
struct MockRenderer {
    renders: Cell<usize>,
    resizes: RefCell<Vec<(Size, Size)>>,
}

impl Renderer<MockSurface> for MockRenderer {
    fn render(&self, _frame: &FrameContext<'_, MockSurface>) {
        self.renders.set(self.renders.get() + 1);
    }

    fn on_resized(&self, size: Size, prev: Size) {
        self.resizes.borrow_mut().push((size, prev));
    }
}

fn tracker(
    host: &Rc<MockHost>,
    auto_scale_ratio: bool,
) -> (ViewportTracker<MockSurface>, Rc<MockRenderer>) {
    let renderer = Rc::new(MockRenderer::default());
    let tracker = ViewportTracker::new(
        CanvasConfig::new().auto_scale_ratio(auto_scale_ratio),
        host.clone(),
    );
    tracker.canvas().set_surface(Some(MockSurface::default()));
    tracker.canvas().set_renderer(Some(renderer.clone()));
    (tracker, renderer)
}

#[test]
fn test_attach_derives_size_from_viewport() {
    let host = MockHost::new(1280.0, 720.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, false);

    tracker.attach();

    assert!(tracker.is_attached());
    assert_eq!(tracker.recomputations(), 1);
    assert_eq!(
        tracker.canvas().with_surface(|s| s.display),
        Some(Size::new(1280.0, 720.0))
    );
    assert!(renderer.resizes.borrow().is_empty());
    assert_eq!(tracker.canvas().loop_state(), LoopState::Running);
}

#[test]
fn test_attach_registers_single_listener_and_detach_releases_it() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, _) = tracker(&host, false);

    tracker.attach();
    tracker.attach();
    assert_eq!(host.listeners.len(), 1);

    tracker.detach();
    assert!(host.listeners.is_empty());
    assert!(!tracker.is_attached());
    assert!(!tracker.canvas().state().is_active);
}

#[test]
fn test_drop_releases_listener() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    {
        let (mut tracker, _) = tracker(&host, false);
        tracker.attach();
        assert_eq!(host.listeners.len(), 1);
    }
    assert!(host.listeners.is_empty());
}

#[test]
fn test_every_notification_recomputes_once() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, false);
    tracker.attach();

    host.resize(800.0, 600.0);
    host.resize(1024.0, 768.0);
    host.resize(1024.0, 768.0);
    host.resize(640.0, 480.0);

    assert_eq!(tracker.recomputations(), 5);
    assert_eq!(
        *renderer.resizes.borrow(),
        vec![
            (Size::new(1024.0, 768.0), Size::new(800.0, 600.0)),
            (Size::new(640.0, 480.0), Size::new(1024.0, 768.0)),
        ]
    );
}

#[test]
fn test_auto_scale_ratio_scales_render_size() {
    let host = MockHost::new(800.0, 600.0, 2.0);
    let (mut tracker, _) = tracker(&host, true);
    tracker.attach();

    let config = tracker.canvas().config().clone();
    assert_eq!(config.render_width, Some(1600.0));
    assert_eq!(config.render_height, Some(1200.0));
    assert_eq!(
        tracker.canvas().with_surface(|s| s.backing),
        Some(Size::new(1600.0, 1200.0))
    );
}

#[test]
fn test_ratio_change_reapplies_backing_without_notifying() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, true);
    tracker.attach();

    host.ratio.set(Some(3.0));
    host.listeners.dispatch();

    assert!(renderer.resizes.borrow().is_empty());
    assert_eq!(
        tracker.canvas().with_surface(|s| (s.backing, s.applied)),
        Some((Size::new(2400.0, 1800.0), 2))
    );
}

#[test]
fn test_zero_ratio_is_treated_as_one() {
    let host = MockHost::new(800.0, 600.0, 0.0);
    let (mut tracker, _) = tracker(&host, true);
    tracker.attach();

    assert_eq!(
        tracker.canvas().with_surface(|s| s.backing),
        Some(Size::new(800.0, 600.0))
    );
}

#[test]
fn test_detached_tracker_ignores_resizes() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, false);
    tracker.attach();
    tracker.detach();

    host.resize(1920.0, 1080.0);

    assert_eq!(tracker.recomputations(), 1);
    assert!(renderer.resizes.borrow().is_empty());
}

#[test]
fn test_tracker_drives_render_loop() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, false);
    tracker.attach();

    for frame in 0..3 {
        tracker.canvas().on_frame(Duration::from_millis(frame * 16));
    }

    assert_eq!(renderer.renders.get(), 3);
    assert_eq!(host.requests.get(), 4);
}

#[test]
fn test_reattach_after_detach_is_refused() {
    let host = MockHost::new(800.0, 600.0, 1.0);
    let (mut tracker, renderer) = tracker(&host, false);
    tracker.attach();
    tracker.detach();

    // Before the trailing frame has run
    tracker.attach();
    assert!(!tracker.is_attached());
    assert!(host.listeners.is_empty());

    tracker.canvas().on_frame(Duration::from_millis(0));
    assert_eq!(tracker.canvas().loop_state(), LoopState::Stopped);

    tracker.attach();
    assert!(!tracker.is_attached());
    assert!(host.listeners.is_empty());
    assert!(!tracker.canvas().state().is_active);

    host.resize(1920.0, 1080.0);
    assert_eq!(tracker.recomputations(), 1);
    assert!(renderer.resizes.borrow().is_empty());
    assert_eq!(renderer.renders.get(), 1);
}
