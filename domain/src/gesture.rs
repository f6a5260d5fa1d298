//! Swipe-to-delete interaction for a single link card.
//!
//! A card follows the pointer horizontally. Releasing it either snaps it back
//! to rest or, on a fast enough fling, flies it out of the container. The card
//! is deleted the moment its bounding box stops intersecting the container's,
//! whether that happens mid-drag or at the end of a fling.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use crate::{
    AnimationDriver, AnimationHandle, LayoutProbe, LinkKey, ListDataSource, NotificationSink,
    Subscription,
};

/// Minimum fling speed (px/s) that turns a release into a delete.
pub const DEFAULT_MIN_FLING_VELOCITY: f64 = 500.0;

/// Message shown once a card has been swiped away.
pub const DEFAULT_DELETED_MESSAGE: &str = "Link deleted.";

/// Tunables for a card's swipe behaviour.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeConfig {
    pub min_fling_velocity: f64,
    pub deleted_message: String,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            min_fling_velocity: DEFAULT_MIN_FLING_VELOCITY,
            deleted_message: DEFAULT_DELETED_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction carried by a velocity sample. Speeds under 1 px/s have none.
    pub fn from_velocity(velocity: f64) -> Option<Self> {
        if velocity >= 1.0 {
            Some(SwipeDirection::Right)
        } else if velocity <= -1.0 {
            Some(SwipeDirection::Left)
        } else {
            None
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            SwipeDirection::Left => -1.0,
            SwipeDirection::Right => 1.0,
        }
    }
}

/// Outcome of releasing a drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    SnapBack,
    FlyAway(SwipeDirection),
}

impl Release {
    /// A release flies away only with a clear direction and a speed strictly
    /// above `min_velocity`. A missing sample snaps back.
    pub fn decide(velocity: Option<f64>, min_velocity: f64) -> Self {
        let Some(v) = velocity else {
            return Release::SnapBack;
        };
        match SwipeDirection::from_velocity(v) {
            Some(direction) if v.abs() > min_velocity => Release::FlyAway(direction),
            _ => Release::SnapBack,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Dragging,
    SnappingBack,
    FlyingAway(SwipeDirection),
    Removed,
}

/// Offset and velocity observed during a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureSample {
    pub offset: f64,
    pub velocity: Option<f64>,
}

struct CardState<L, N, P> {
    key: LinkKey,
    list: Rc<L>,
    notifier: Rc<N>,
    layout: P,
    deleted_message: String,
    phase: Phase,
    sample: GestureSample,
    constrained: bool,
    mounted: Rc<Cell<bool>>,
    /// Offset the running fly-away animates to.
    fling_target: Option<f64>,
    subscription: Option<Subscription>,
}

impl<L: ListDataSource, N: NotificationSink, P: LayoutProbe> CardState<L, N, P> {
    fn is_live(&self) -> bool {
        self.mounted.get() && self.phase != Phase::Removed
    }

    fn has_left_container(&self, offset: f64) -> bool {
        self.layout
            .measure()
            .is_some_and(|layout| layout.is_clear_at(offset))
    }

    /// A fly-away that reached its target is finished, even when rounding
    /// leaves the card touching the container.
    fn fling_landed(&self, offset: f64) -> bool {
        match (self.phase, self.fling_target) {
            (Phase::FlyingAway(direction), Some(target)) => {
                direction.sign() * offset >= direction.sign() * target
            }
            _ => false,
        }
    }

    fn on_position(&mut self, offset: f64) -> Option<Deletion<L, N>> {
        if !self.mounted.get() {
            // Unmounted while the state was busy; finish the teardown here.
            self.release_subscription();
            return None;
        }
        if !self.is_live() {
            return None;
        }
        if self.has_left_container(offset) || self.fling_landed(offset) {
            return self.confirm_deletion();
        }
        if self.phase == Phase::SnappingBack && offset == 0.0 {
            debug!(key = %self.key, "snapback settled");
            self.phase = Phase::Idle;
            self.constrained = true;
        }
        None
    }

    /// Move to `Removed` and hand back the collaborator calls, to be made
    /// once the state is no longer borrowed.
    fn confirm_deletion(&mut self) -> Option<Deletion<L, N>> {
        if !self.is_live() {
            return None;
        }
        self.phase = Phase::Removed;
        self.constrained = false;
        self.fling_target = None;
        Some(Deletion {
            key: self.key.clone(),
            message: self.deleted_message.clone(),
            list: Rc::clone(&self.list),
            notifier: Rc::clone(&self.notifier),
            subscription: self.subscription.take(),
        })
    }

    fn release_subscription(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

/// Confirmed deletion of a card. Running it may drop the card's controller
/// (a list that unmounts removed items), so it owns everything it needs.
struct Deletion<L, N> {
    key: LinkKey,
    message: String,
    list: Rc<L>,
    notifier: Rc<N>,
    subscription: Option<Subscription>,
}

impl<L: ListDataSource, N: NotificationSink> Deletion<L, N> {
    fn run(self) {
        if let Some(mut sub) = self.subscription {
            sub.unsubscribe();
        }
        info!(key = %self.key, "link card swiped away");
        self.notifier.notify(&self.message);
        if let Err(e) = self.list.remove_item(&self.key) {
            warn!(key = %self.key, err = %e, "failed to remove swiped card from list");
        }
    }
}

/// Feed an observed offset to the card. A busy state means the controller
/// itself is mid-update; it runs the same check once it is done.
fn observe<L, N, P>(state: &RefCell<CardState<L, N, P>>, offset: f64)
where
    L: ListDataSource,
    N: NotificationSink,
    P: LayoutProbe,
{
    let deletion = match state.try_borrow_mut() {
        Ok(mut state) => state.on_position(offset),
        Err(_) => return,
    };
    if let Some(deletion) = deletion {
        deletion.run();
    }
}

/// What the driver should do after a state change, applied once the card
/// state is no longer borrowed.
enum Motion {
    None,
    Jump(f64),
    Animate(f64),
}

/// Gesture-driven delete controller for one card.
///
/// Mounting registers exactly one position listener with the driver; it is
/// released on deletion, on `unmount`, or when the controller is dropped.
pub struct SwipeToDelete<D, L, N, P>
where
    D: AnimationDriver,
    L: ListDataSource + 'static,
    N: NotificationSink + 'static,
    P: LayoutProbe + 'static,
{
    driver: D,
    state: Rc<RefCell<CardState<L, N, P>>>,
    mounted: Rc<Cell<bool>>,
    animation: Option<AnimationHandle>,
}

impl<D, L, N, P> SwipeToDelete<D, L, N, P>
where
    D: AnimationDriver,
    L: ListDataSource + 'static,
    N: NotificationSink + 'static,
    P: LayoutProbe + 'static,
{
    pub fn mount(
        key: LinkKey,
        driver: D,
        list: L,
        notifier: N,
        layout: P,
        config: &SwipeConfig,
    ) -> Self {
        let mounted = Rc::new(Cell::new(true));
        let state = Rc::new(RefCell::new(CardState {
            key,
            list: Rc::new(list),
            notifier: Rc::new(notifier),
            layout,
            deleted_message: config.deleted_message.clone(),
            phase: Phase::Idle,
            sample: GestureSample::default(),
            constrained: true,
            mounted: Rc::clone(&mounted),
            fling_target: None,
            subscription: None,
        }));

        let weak: Weak<RefCell<CardState<L, N, P>>> = Rc::downgrade(&state);
        let subscription = driver.subscribe(Box::new(move |offset: f64| {
            if let Some(state) = weak.upgrade() {
                observe(&state, offset);
            }
        }));
        state.borrow_mut().subscription = Some(subscription);
        debug!(key = %state.borrow().key, "link card mounted");

        Self {
            driver,
            state,
            mounted,
            animation: None,
        }
    }

    pub fn key(&self) -> LinkKey {
        self.state.borrow().key.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn sample(&self) -> GestureSample {
        self.state.borrow().sample
    }

    /// False once the card may move freely (fling started or container cleared).
    pub fn is_constrained(&self) -> bool {
        self.state.borrow().constrained
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    pub fn is_subscribed(&self) -> bool {
        self.state
            .borrow()
            .subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Most recent animation started by the controller.
    pub fn animation(&self) -> Option<&AnimationHandle> {
        self.animation.as_ref()
    }

    /// Feed a drag sample. Starts a drag from rest or interrupts a snapback.
    pub fn on_drag_update(&mut self, offset: f64, velocity: Option<f64>) {
        {
            let mut state = self.state.borrow_mut();
            if !state.is_live() {
                return;
            }
            match state.phase {
                Phase::Idle | Phase::SnappingBack => {
                    debug!(key = %state.key, "drag started");
                    state.phase = Phase::Dragging;
                }
                Phase::Dragging => {}
                // Fly-away owns the position until the card is gone.
                Phase::FlyingAway(_) | Phase::Removed => return,
            }
            state.sample = GestureSample { offset, velocity };
            if state.constrained && state.has_left_container(offset) {
                state.constrained = false;
            }
        }
        self.animation = None;
        self.driver.set_position(offset);
        // The driver skips notifications when the offset did not change.
        observe(&self.state, offset);
    }

    /// Feed a drag sample read from the driver's own position and velocity.
    pub fn on_drag(&mut self) {
        let offset = self.driver.position();
        let velocity = self.driver.velocity();
        self.on_drag_update(offset, velocity);
    }

    /// End the active drag. Returns `None` when there was no drag to end.
    pub fn on_drag_release(&mut self, min_velocity: f64) -> Option<Release> {
        let (release, motion) = {
            let mut state = self.state.borrow_mut();
            if !state.is_live() || state.phase != Phase::Dragging {
                return None;
            }
            let sample = std::mem::take(&mut state.sample);
            let release = Release::decide(sample.velocity, min_velocity);
            let current = self.driver.position();

            let motion = match release {
                Release::FlyAway(direction) => match state.layout.measure() {
                    Some(layout) => {
                        debug!(key = %state.key, ?direction, "flying away");
                        let target = direction.sign() * layout.fly_away_distance();
                        state.phase = Phase::FlyingAway(direction);
                        state.constrained = false;
                        state.fling_target = Some(target);
                        Motion::Animate(target)
                    }
                    None => {
                        warn!(key = %state.key, "layout unavailable at release; resetting card");
                        state.phase = Phase::Idle;
                        Motion::Jump(0.0)
                    }
                },
                Release::SnapBack if current == 0.0 => {
                    state.phase = Phase::Idle;
                    Motion::None
                }
                Release::SnapBack => {
                    debug!(key = %state.key, from = current, "snapping back");
                    state.phase = Phase::SnappingBack;
                    Motion::Animate(0.0)
                }
            };
            (release, motion)
        };

        match motion {
            Motion::None => {}
            Motion::Jump(offset) => {
                self.animation = None;
                self.driver.set_position(offset);
            }
            Motion::Animate(offset) => {
                self.animation = Some(self.driver.animate_to(offset));
            }
        }
        // An animation that finished on the spot produces no notification.
        observe(&self.state, self.driver.position());

        Some(match release {
            Release::FlyAway(_) if self.phase() == Phase::Idle => Release::SnapBack,
            other => other,
        })
    }

    /// Tear down the position subscription. Safe to call repeatedly, and from
    /// inside a collaborator; after the first call nothing reaches the
    /// collaborators.
    pub fn unmount(&mut self) {
        if !self.mounted.replace(false) {
            return;
        }
        match self.state.try_borrow_mut() {
            Ok(mut state) => {
                state.release_subscription();
                debug!(key = %state.key, phase = ?state.phase, "link card unmounted");
            }
            // The listener is running; it drops the subscription on its way out.
            Err(_) => debug!("link card unmounted while busy"),
        }
    }
}

impl<D, L, N, P> Drop for SwipeToDelete<D, L, N, P>
where
    D: AnimationDriver,
    L: ListDataSource + 'static,
    N: NotificationSink + 'static,
    P: LayoutProbe + 'static,
{
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<D, L, N, P> std::fmt::Debug for SwipeToDelete<D, L, N, P>
where
    D: AnimationDriver,
    L: ListDataSource + 'static,
    N: NotificationSink + 'static,
    P: LayoutProbe + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SwipeToDelete")
            .field("key", &state.key)
            .field("phase", &state.phase)
            .field("constrained", &state.constrained)
            .field("mounted", &self.mounted.get())
            .finish()
    }
}
