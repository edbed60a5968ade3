use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seqex_core::SharedGui;
use tracing::debug;

use crate::error::EventError;
use crate::event::GuiEvent;
use crate::manager::{EventManager, ManagerState};
use crate::simple::SimpleEventManager;

/// Fires `()` once `millis` have elapsed since start.
#[derive(Debug)]
pub struct FixedTimeoutEventManager {
    millis: u64,
    inner: SimpleEventManager<()>,
}

impl FixedTimeoutEventManager {
    pub fn new(gui: SharedGui, millis: u64) -> Self {
        Self {
            millis,
            inner: SimpleEventManager::new("fixed_timeout")
                .bind(GuiEvent::timeout(gui, millis), ()),
        }
    }

    pub fn timeout_millis(&self) -> u64 {
        self.millis
    }
}

impl EventManager<()> for FixedTimeoutEventManager {
    fn state(&self) -> &ManagerState<()> {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut ManagerState<()> {
        self.inner.state_mut()
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        self.inner.on_start()
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        self.inner.on_stop()
    }

    fn clone_manager(&self) -> Box<dyn EventManager<()>> {
        Box::new(Self {
            millis: self.millis,
            inner: self.inner.fresh(),
        })
    }

    fn name(&self) -> &str {
        "fixed_timeout"
    }
}

/// Timeout whose duration is drawn uniformly from `min..=max` when the
/// instance is built. Every clone draws again.
///
/// A prototype and all of its clones share one generator seeded at
/// construction, so a seeded prototype yields a reproducible series of
/// durations.
pub struct RandomTimeoutEventManager {
    gui: SharedGui,
    min: u64,
    max: u64,
    millis: u64,
    rng: Rc<RefCell<StdRng>>,
    inner: SimpleEventManager<()>,
}

impl RandomTimeoutEventManager {
    pub fn new(gui: SharedGui, min: u64, max: u64) -> Result<Self, EventError> {
        Self::with_rng(gui, min, max, &mut rand::rng())
    }

    pub fn with_rng<R: Rng>(
        gui: SharedGui,
        min: u64,
        max: u64,
        rng: &mut R,
    ) -> Result<Self, EventError> {
        if min > max {
            return Err(EventError::InvalidTimeoutRange { min, max });
        }

        let millis = rng.random_range(min..=max);
        debug!(min, max, millis, "drew random timeout");

        let shared = Rc::new(RefCell::new(StdRng::from_rng(rng)));
        Ok(Self::bound(gui, min, max, millis, shared))
    }

    fn bound(
        gui: SharedGui,
        min: u64,
        max: u64,
        millis: u64,
        rng: Rc<RefCell<StdRng>>,
    ) -> Self {
        let inner = SimpleEventManager::new("random_timeout")
            .bind(GuiEvent::timeout(gui.clone(), millis), ());
        Self {
            gui,
            min,
            max,
            millis,
            rng,
            inner,
        }
    }

    pub fn timeout_millis(&self) -> u64 {
        self.millis
    }

    pub fn range(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    fn redraw(&self) -> Self {
        let millis = self.rng.borrow_mut().random_range(self.min..=self.max);
        debug!(millis, "redrew random timeout");
        Self::bound(self.gui.clone(), self.min, self.max, millis, Rc::clone(&self.rng))
    }
}

impl fmt::Debug for RandomTimeoutEventManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomTimeoutEventManager")
            .field("range", &(self.min..=self.max))
            .field("millis", &self.millis)
            .field("inner", &self.inner)
            .finish()
    }
}

impl EventManager<()> for RandomTimeoutEventManager {
    fn state(&self) -> &ManagerState<()> {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut ManagerState<()> {
        self.inner.state_mut()
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        self.inner.on_start()
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        self.inner.on_stop()
    }

    fn clone_manager(&self) -> Box<dyn EventManager<()>> {
        Box::new(self.redraw())
    }

    fn name(&self) -> &str {
        "random_timeout"
    }
}
