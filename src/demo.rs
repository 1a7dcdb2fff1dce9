// demo.rs - Renderer used by the demo binary
use std::cell::Cell;

use log::info;

use crate::core::{FrameContext, GpuSurface, Renderer, Size};

const FPS_UPDATE_INTERVAL: f64 = 1.0;

/// Clears the surface to a colour that cycles over time and reports frame rate and resizes
#[derive(Debug, Default)]
pub struct PulseRenderer {
    frames: Cell<u64>,
    fps_frames: Cell<u32>,
    fps_timer: Cell<f64>,
    last_size: Cell<Option<Size>>,
}

impl PulseRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    /// Latest display size reported through `on_resized`
    pub fn last_size(&self) -> Option<Size> {
        self.last_size.get()
    }

    /// Count a frame and log the rate once per interval; returns the rate when it is logged
    pub fn record_frame(&self, delta: f64) -> Option<f64> {
        self.frames.set(self.frames.get() + 1);
        self.fps_frames.set(self.fps_frames.get() + 1);
        self.fps_timer.set(self.fps_timer.get() + delta);

        if self.fps_timer.get() < FPS_UPDATE_INTERVAL {
            return None;
        }

        let fps = self.fps_frames.get() as f64 / self.fps_timer.get();
        info!("FPS: {:.1}", fps);
        self.fps_frames.set(0);
        self.fps_timer.set(0.0);
        Some(fps)
    }
}

/// Smoothly cycling RGB colour for a time in seconds
pub fn pulse_color(time: f64) -> wgpu::Color {
    let phase = std::f64::consts::TAU / 3.0;
    wgpu::Color {
        r: 0.5 + 0.5 * time.sin(),
        g: 0.5 + 0.5 * (time + phase).sin(),
        b: 0.5 + 0.5 * (time + 2.0 * phase).sin(),
        a: 1.0,
    }
}

impl Renderer<GpuSurface> for PulseRenderer {
    fn render(&self, frame: &FrameContext<'_, GpuSurface>) {
        let Some(output) = frame.surface.acquire_frame() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            frame
                .context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Pulse Encoder"),
                });

        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Pulse Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(pulse_color(frame.time.curr)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        frame.context.queue().submit(Some(encoder.finish()));
        output.present();

        self.record_frame(frame.time.delta);
    }

    fn on_resized(&self, size: Size, prev: Size) {
        info!(
            "Resized {}x{} -> {}x{}",
            prev.width, prev.height, size.width, size.height
        );
        self.last_size.set(Some(size));
    }
}
