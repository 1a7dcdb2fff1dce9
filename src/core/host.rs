use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::size::Size;

/// Host environment - window metrics and frame scheduling supplied by the embedding platform
///
/// The core never reads a global window; everything goes through this trait so tests can
/// substitute a fake host.
pub trait HostEnvironment {
    /// Current viewport size in layout pixels
    fn viewport_size(&self) -> Size;

    /// Ratio of physical to layout pixels, if the host knows it
    fn device_pixel_ratio(&self) -> Option<f64>;

    /// Ask the host to deliver one frame callback
    fn request_frame(&self);

    /// Registry notified whenever the host viewport changes size
    fn resize_listeners(&self) -> &ResizeListeners;
}

/// Scale applied to the backing buffer
///
/// Zero, negative, non-finite or missing ratios fall back to 1 so the buffer never collapses.
pub fn effective_scale(auto_scale_ratio: bool, device_pixel_ratio: Option<f64>) -> f64 {
    match device_pixel_ratio {
        Some(ratio) if auto_scale_ratio && ratio.is_finite() && ratio > 0.0 => ratio,
        _ => 1.0,
    }
}

type Listener = Rc<RefCell<dyn FnMut()>>;

#[derive(Default)]
struct Slots {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Resize listener registry
///
/// Single-threaded; listeners run to completion one at a time in registration order.
#[derive(Clone, Default)]
pub struct ResizeListeners {
    slots: Rc<RefCell<Slots>>,
}

impl ResizeListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered until the returned guard is dropped
    #[must_use = "dropping the subscription deregisters the listener immediately"]
    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> Subscription {
        let mut slots = self.slots.borrow_mut();
        let id = slots.next_id;
        slots.next_id += 1;

        let listener: Listener = Rc::new(RefCell::new(listener));
        slots.entries.push((id, listener));

        Subscription {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    /// Deliver one resize notification to every live listener
    pub fn dispatch(&self) {
        // Snapshot so listeners can subscribe or unsubscribe while we iterate
        let snapshot: Vec<(u64, Listener)> = self.slots.borrow().entries.clone();

        for (id, listener) in snapshot {
            if !self.is_live(id) {
                continue;
            }
            // A listener that re-enters dispatch is not called recursively
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (&mut *callback)();
            }
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.slots.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_live(&self, id: u64) -> bool {
        self.slots.borrow().entries.iter().any(|(live, _)| *live == id)
    }
}

/// Scoped listener registration, released on drop
pub struct Subscription {
    id: u64,
    slots: Weak<RefCell<Slots>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
