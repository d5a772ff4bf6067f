use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use gloo::render::{request_animation_frame, AnimationFrame};


/// Self-rescheduling `requestAnimationFrame` loop.
///
/// Each frame schedules the next one until the loop is cancelled; dropping the
/// handle cancels it too, so a pending frame never outlives its owner.
pub struct FrameLoop {
    pending: Rc<RefCell<Option<AnimationFrame>>>,
    running: Rc<Cell<bool>>,
}

impl FrameLoop {
    /// Starts calling `callback` once per display refresh with the frame timestamp (ms)
    pub fn start<F: FnMut(f64) + 'static>(callback: F) -> Self {
        let pending = Rc::new(RefCell::new(None));
        let running = Rc::new(Cell::new(true));
        schedule(pending.clone(), running.clone(), Rc::new(RefCell::new(callback)));
        Self { pending, running }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stops the loop; the frame already requested is cancelled as well
    pub fn cancel(&self) {
        self.running.set(false);
        self.pending.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn schedule<F: FnMut(f64) + 'static>(
    pending: Rc<RefCell<Option<AnimationFrame>>>,
    running: Rc<Cell<bool>>,
    callback: Rc<RefCell<F>>,
) {
    let slot = pending.clone();
    let handle = request_animation_frame(move |timestamp| {
        if !running.get() {
            return;
        }
        (callback.borrow_mut())(timestamp);
        // the callback may have cancelled us
        if running.get() {
            schedule(pending, running, callback);
        }
    });
    *slot.borrow_mut() = Some(handle);
}
