//! Frame-stepped animation driver used by tests and the replay CLI.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::{AnimationDriver, AnimationHandle, PositionListener, Subscription};

/// Frames an `animate_to` call takes unless configured otherwise.
pub const DEFAULT_ANIMATION_FRAMES: u32 = 12;

/// Frame rate used to turn per-frame displacement into a velocity (px/s).
const FRAMES_PER_SECOND: f64 = 60.0;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Rc<RefCell<PositionListener>>)>,
}

impl Listeners {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(i, _)| *i == id)
    }
}

struct Running {
    handle: AnimationHandle,
    frames_left: u32,
}

/// Animation driver advanced explicitly, frame by frame.
///
/// `animate_to` only schedules the motion; `advance`/`finish` move the
/// position and notify listeners, so callers control timing completely.
pub struct ScriptedDriver {
    position: Cell<f64>,
    velocity: Cell<Option<f64>>,
    frames_per_animation: u32,
    running: RefCell<Option<Running>>,
    listeners: Rc<RefCell<Listeners>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::with_frames(DEFAULT_ANIMATION_FRAMES)
    }

    pub fn with_frames(frames_per_animation: u32) -> Self {
        Self {
            position: Cell::new(0.0),
            velocity: Cell::new(None),
            frames_per_animation: frames_per_animation.max(1),
            running: RefCell::new(None),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    /// Override the velocity sample reported to callers.
    pub fn set_velocity(&self, velocity: Option<f64>) {
        self.velocity.set(velocity);
    }

    pub fn is_animating(&self) -> bool {
        self.running.borrow().is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    /// Step the running animation by up to `frames` frames.
    pub fn advance(&self, frames: u32) {
        for _ in 0..frames {
            let step = {
                let mut running = self.running.borrow_mut();
                let Some(anim) = running.as_mut() else {
                    break;
                };
                let current = self.position.get();
                let next = if anim.frames_left <= 1 {
                    anim.handle.target()
                } else {
                    current + (anim.handle.target() - current) / f64::from(anim.frames_left)
                };
                anim.frames_left = anim.frames_left.saturating_sub(1);
                let done = anim.frames_left == 0;
                if done {
                    anim.handle.complete();
                    *running = None;
                }
                (current, next, done)
            };
            let (current, next, done) = step;
            self.velocity
                .set(Some(if done { 0.0 } else { (next - current) * FRAMES_PER_SECOND }));
            self.move_to(next);
        }
    }

    /// Run the current animation to completion.
    pub fn finish(&self) {
        while self.is_animating() {
            self.advance(self.frames_per_animation);
        }
    }

    fn move_to(&self, offset: f64) {
        if self.position.get() == offset {
            return;
        }
        self.position.set(offset);
        self.emit(offset);
    }

    fn emit(&self, offset: f64) {
        let snapshot: Vec<_> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(id, l)| (*id, Rc::clone(l)))
            .collect();
        for (id, listener) in snapshot {
            // Skip listeners dropped by an earlier callback in this round.
            if !self.listeners.borrow().contains(id) {
                continue;
            }
            if let Ok(mut callback) = listener.try_borrow_mut() {
                (*callback)(offset);
            }
        }
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver for ScriptedDriver {
    fn set_position(&self, offset: f64) {
        // Direct control interrupts any animation in flight.
        self.running.borrow_mut().take();
        self.move_to(offset);
    }

    fn position(&self) -> f64 {
        self.position.get()
    }

    fn velocity(&self) -> Option<f64> {
        self.velocity.get()
    }

    fn animate_to(&self, offset: f64) -> AnimationHandle {
        if self.position.get() == offset {
            self.running.borrow_mut().take();
            return AnimationHandle::finished(offset);
        }
        let handle = AnimationHandle::new(offset);
        *self.running.borrow_mut() = Some(Running {
            handle: handle.clone(),
            frames_left: self.frames_per_animation,
        });
        handle
    }

    fn subscribe(&self, listener: PositionListener) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Rc::new(RefCell::new(listener))));
            id
        };
        let registry = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().entries.retain(|(i, _)| *i != id);
            }
        })
    }
}
