//! Browser scheduling: one pending animation frame, debounced timeouts.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;

/// Holds at most one pending animation frame.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    pending: Rc<RefCell<Option<AnimationFrame>>>,
    scheduled: Rc<Cell<bool>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a frame unless one is already pending; returns whether a new
    /// frame was requested. The callback receives the frame timestamp in ms.
    pub fn request(&self, callback: impl FnOnce(f64) + 'static) -> bool {
        if self.scheduled.replace(true) {
            return false;
        }
        let scheduled = Rc::clone(&self.scheduled);
        let frame = request_animation_frame(move |timestamp| {
            scheduled.set(false);
            callback(timestamp);
        });
        *self.pending.borrow_mut() = Some(frame);
        true
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
        self.scheduled.set(false);
    }
}

/// Runs the last submitted callback once `delay_ms` passes without another
/// submission.
#[derive(Clone)]
pub struct Debouncer {
    delay_ms: u32,
    pending: Rc<RefCell<Option<Timeout>>>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms, pending: Rc::new(RefCell::new(None)) }
    }

    pub fn submit(&self, callback: impl FnOnce() + 'static) {
        // dropping the previous Timeout clears it
        let timeout = Timeout::new(self.delay_ms, callback);
        *self.pending.borrow_mut() = Some(timeout);
    }

    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}
