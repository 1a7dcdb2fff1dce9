use super::size::Size;
use super::timing::RenderTiming;

/// Opaque drawing surface handle obtained from the environment
pub trait DrawingSurface {
    /// Drawing context handed to the renderer each frame
    type Context;

    /// Acquire the drawing context; `None` skips the frame
    fn context(&self) -> Option<&Self::Context>;

    /// Current resolution of the drawing buffer
    fn buffer_size(&self) -> Size;

    /// Place the surface at `display` layout size with a `backing` sized buffer
    fn apply_size(&mut self, display: Size, backing: Size);
}

/// Everything a renderer receives for one frame
pub struct FrameContext<'a, S: DrawingSurface> {
    pub surface: &'a S,
    pub context: &'a S::Context,
    pub time: RenderTiming,
}

/// Renderer capability supplied by the application
///
/// Shared by reference and never mutated by the render loop; renderers that keep state use
/// interior mutability.
pub trait Renderer<S: DrawingSurface> {
    /// Paint one frame
    fn render(&self, frame: &FrameContext<'_, S>);

    /// Display size changed from `prev` to `size`; called before the next `render`
    fn on_resized(&self, _size: Size, _prev: Size) {}
}
