use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::callbacks::{CallbackId, CallbackList};
use crate::error::EventError;

/// Payload carried by an "advance" signal. `()` is used when a manager has
/// nothing to report beyond the fact that it fired.
pub trait Outcome: Clone + fmt::Debug + 'static {}

impl<T: Clone + fmt::Debug + 'static> Outcome for T {}

pub type ResultCallback<T> = Rc<dyn Fn(T)>;

/// Running flag and result callbacks shared by every [`EventManager`].
pub struct ManagerState<T> {
    running: bool,
    callbacks: Rc<CallbackList<T>>,
}

impl<T: Outcome> ManagerState<T> {
    pub fn new() -> Self {
        Self {
            running: false,
            callbacks: Rc::new(CallbackList::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn callbacks(&self) -> &CallbackList<T> {
        &self.callbacks
    }

    /// Handle that fires this manager's callbacks from inside event
    /// subscriptions without borrowing the manager itself.
    pub fn trigger(&self) -> Trigger<T> {
        Trigger {
            callbacks: Rc::downgrade(&self.callbacks),
        }
    }
}

impl<T: Outcome> Default for ManagerState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ManagerState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerState")
            .field("running", &self.running)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

/// Weak handle onto a manager's result callbacks. Firing after the manager
/// has been dropped does nothing.
pub struct Trigger<T> {
    callbacks: Weak<CallbackList<T>>,
}

impl<T: Outcome> Trigger<T> {
    pub fn fire(&self, value: T) {
        if let Some(callbacks) = self.callbacks.upgrade() {
            callbacks.trigger(value);
        }
    }
}

impl<T> Clone for Trigger<T> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Weak::clone(&self.callbacks),
        }
    }
}

/// Typed wrapper turning one or more raw events into a single "advance with
/// result `T`" signal.
///
/// Implementors provide the state accessors, the `on_start`/`on_stop` hooks and
/// `clone_manager`; the lifecycle checks live in the provided methods.
pub trait EventManager<T: Outcome>: fmt::Debug {
    fn state(&self) -> &ManagerState<T>;

    fn state_mut(&mut self) -> &mut ManagerState<T>;

    /// Wires up and starts the underlying events or children.
    fn on_start(&mut self) -> Result<(), EventError>;

    fn on_stop(&mut self) -> Result<(), EventError>;

    /// A fresh, idle instance with the same configuration and no callbacks.
    fn clone_manager(&self) -> Box<dyn EventManager<T>>;

    fn name(&self) -> &str;

    fn register_callback(&mut self, callback: ResultCallback<T>) -> CallbackId {
        let id = self.state().callbacks.register(callback);
        debug!(manager = self.name(), %id, "registered callback");
        id
    }

    fn deregister_callback(&mut self, id: CallbackId) -> Result<(), EventError> {
        if !self.state().callbacks.deregister(id) {
            return Err(EventError::NotRegistered(id));
        }
        debug!(manager = self.name(), %id, "deregistered callback");
        Ok(())
    }

    fn start(&mut self) -> Result<(), EventError> {
        if self.is_running() {
            return Err(EventError::AlreadyRunning);
        }
        if self.state().callbacks.is_empty() {
            return Err(EventError::NoCallbacks);
        }

        self.on_start()?;
        self.state_mut().running = true;
        debug!(manager = self.name(), "event manager started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EventError> {
        if !self.is_running() {
            return Err(EventError::NotRunning);
        }

        self.state_mut().running = false;
        debug!(manager = self.name(), "event manager stopped");
        self.on_stop()
    }

    fn is_running(&self) -> bool {
        self.state().is_running()
    }

    fn callback_count(&self) -> usize {
        self.state().callbacks.len()
    }

    /// Invokes every registered callback in registration order.
    fn trigger_callbacks(&self, value: T) {
        debug!(manager = self.name(), ?value, "triggering callbacks");
        self.state().callbacks.trigger(value);
    }
}
