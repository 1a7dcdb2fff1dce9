use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use canvas_loop::cli::Cli;
use canvas_loop::core::{
    Canvas, FrameClock, GpuSurface, HostEnvironment, SizeResolver, ViewportTracker, WinitHost,
};
use canvas_loop::demo::PulseRenderer;
use canvas_loop::CanvasConfig;
use clap::Parser;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

const INITIAL_WINDOW_WIDTH: f64 = 800.0;
const INITIAL_WINDOW_HEIGHT: f64 = 600.0;

/// Window for the canvas; only a window the canvas follows may be resized by the user
fn window_attributes(config: &CanvasConfig, track_viewport: bool) -> WindowAttributes {
    let follows_window = track_viewport || config.cover_viewport;
    let (width, height) = if follows_window {
        (INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT)
    } else {
        let display = SizeResolver::resolve_with(config, None, None).display;
        (display.width, display.height)
    };

    let title = match &config.class_name {
        Some(class_name) => format!("Canvas Loop - {class_name}"),
        None => "Canvas Loop".to_string(),
    };

    Window::default_attributes()
        .with_title(title)
        .with_inner_size(winit::dpi::LogicalSize::new(width, height))
        .with_resizable(follows_window)
}

/// How the window surface is bound
enum Binding {
    Canvas(Canvas<GpuSurface>),
    Viewport(ViewportTracker<GpuSurface>),
}

impl Binding {
    fn canvas(&self) -> &Canvas<GpuSurface> {
        match self {
            Binding::Canvas(canvas) => canvas,
            Binding::Viewport(tracker) => tracker.canvas(),
        }
    }

    fn detach(&mut self) {
        match self {
            Binding::Canvas(canvas) => canvas.detach(),
            Binding::Viewport(tracker) => tracker.detach(),
        }
    }
}

struct App {
    config: CanvasConfig,
    track_viewport: bool,
    host: Option<Rc<WinitHost>>,
    binding: Option<Binding>,
    renderer: Rc<PulseRenderer>,
    clock: FrameClock,
}

impl App {
    fn new(config: CanvasConfig, track_viewport: bool) -> Self {
        Self {
            config,
            track_viewport,
            host: None,
            binding: None,
            renderer: Rc::new(PulseRenderer::new()),
            clock: FrameClock::new(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attributes = window_attributes(&self.config, self.track_viewport);

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );
        let surface = pollster::block_on(GpuSurface::new(window.clone()))
            .context("failed to initialize GPU surface")?;

        let host = Rc::new(WinitHost::new(window));
        let dyn_host: Rc<dyn HostEnvironment> = host.clone();

        let mut binding = if self.track_viewport {
            Binding::Viewport(ViewportTracker::new(self.config.clone(), dyn_host))
        } else {
            Binding::Canvas(Canvas::new(self.config.clone(), dyn_host))
        };

        let canvas = binding.canvas();
        canvas.set_surface(Some(surface));
        canvas.set_renderer(Some(self.renderer.clone()));
        info!("Canvas placement: {:?}", canvas.placement());

        match &mut binding {
            Binding::Canvas(canvas) => canvas.attach(),
            Binding::Viewport(tracker) => tracker.attach(),
        }

        self.host = Some(host);
        self.binding = Some(binding);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(binding) = self.binding.as_mut() {
            binding.detach();
        }
        info!("Rendered {} frames", self.renderer.frames());
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.binding.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            error!("{e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(host) = &self.host {
            if host.handle_event(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => {
                if let Some(binding) = &self.binding {
                    binding.canvas().on_frame(self.clock.now());
                }
            }
            _ => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.canvas_config()?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, cli.viewport);

    info!("Canvas Loop - Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
