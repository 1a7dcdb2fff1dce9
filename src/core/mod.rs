pub mod gpu_surface;
pub mod host;
pub mod renderer;
pub mod resize_notifier;
pub mod scheduler;
pub mod size;
pub mod size_resolver;
pub mod surface;
pub mod timing;
pub mod viewport_tracker;
pub mod winit_host;

pub use gpu_surface::{GpuContext, GpuSurface};
pub use host::{effective_scale, HostEnvironment, ResizeListeners, Subscription};
pub use renderer::{DrawingSurface, FrameContext, Renderer};
pub use resize_notifier::{ResizeNotifier, ResizeOutcome};
pub use scheduler::{LoopState, RenderLoopScheduler};
pub use size::{ResolvedSize, Size, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use size_resolver::SizeResolver;
pub use surface::{Canvas, SurfaceState, WeakCanvas};
pub use timing::{FrameClock, RenderTiming};
pub use viewport_tracker::ViewportTracker;
pub use winit_host::WinitHost;
