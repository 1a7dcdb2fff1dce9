pub mod cli;
pub mod config;
pub mod core;
pub mod demo;

pub use crate::config::{CanvasConfig, Placement};
pub use crate::core::{
    Canvas, DrawingSurface, FrameContext, HostEnvironment, LoopState, Renderer, RenderTiming,
    ResizeListeners, Size, ViewportTracker,
};
