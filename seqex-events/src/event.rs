use std::fmt;
use std::rc::Rc;

use seqex_core::{EventCallback, EventId, EventKind, Key, SharedGui};
use tracing::debug;

use crate::callbacks::{CallbackId, CallbackList};
use crate::error::EventError;

/// Listener for one raw external signal.
///
/// Subscribers are plain zero-argument callbacks and may be added or removed
/// at any time. Listening is a strict `start_listening`/`stop_listening` cycle.
pub trait Event: fmt::Debug {
    fn start_listening(&mut self) -> Result<(), EventError>;

    fn stop_listening(&mut self) -> Result<(), EventError>;

    fn is_listening(&self) -> bool;

    fn subscribe(&mut self, callback: EventCallback) -> CallbackId;

    fn unsubscribe(&mut self, id: CallbackId) -> Result<(), EventError>;

    fn subscriber_count(&self) -> usize;

    /// A fresh, idle instance with the same configuration and no subscribers.
    fn clone_event(&self) -> Box<dyn Event>;
}

/// An [`Event`] backed by a gui subscription (key press or timeout).
pub struct GuiEvent {
    gui: SharedGui,
    kind: EventKind,
    gui_subscription: Option<EventId>,
    subscribers: Rc<CallbackList<()>>,
}

impl GuiEvent {
    pub fn new(gui: SharedGui, kind: EventKind) -> Self {
        Self {
            gui,
            kind,
            gui_subscription: None,
            subscribers: Rc::new(CallbackList::new()),
        }
    }

    pub fn key_press(gui: SharedGui, key: Key) -> Self {
        Self::new(gui, EventKind::KeyPress(key))
    }

    pub fn timeout(gui: SharedGui, millis: u64) -> Self {
        Self::new(gui, EventKind::Timeout { millis })
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Invokes every subscriber as if the gui had delivered the signal.
    pub fn trigger_callbacks(&self) {
        debug!(kind = ?self.kind, "triggering event subscribers");
        self.subscribers.trigger(());
    }
}

impl Event for GuiEvent {
    fn start_listening(&mut self) -> Result<(), EventError> {
        if self.gui_subscription.is_some() {
            return Err(EventError::AlreadyListening);
        }

        debug!(kind = ?self.kind, "starting to listen for events");

        let subscribers = Rc::clone(&self.subscribers);
        let id = self
            .gui
            .subscribe_to_event_and_get_id(self.kind, Rc::new(move || subscribers.trigger(())));
        self.gui_subscription = Some(id);
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), EventError> {
        let id = self.gui_subscription.ok_or(EventError::NotListening)?;

        debug!(kind = ?self.kind, "stopping listening for events");

        self.gui.unsubscribe_from_event_by_id(id)?;
        self.gui_subscription = None;
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.gui_subscription.is_some()
    }

    fn subscribe(&mut self, callback: EventCallback) -> CallbackId {
        self.subscribers.register(Rc::new(move |()| callback()))
    }

    fn unsubscribe(&mut self, id: CallbackId) -> Result<(), EventError> {
        if self.subscribers.deregister(id) {
            Ok(())
        } else {
            Err(EventError::NotSubscribed(id))
        }
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn clone_event(&self) -> Box<dyn Event> {
        Box::new(GuiEvent::new(Rc::clone(&self.gui), self.kind))
    }
}

impl fmt::Debug for GuiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuiEvent")
            .field("kind", &self.kind)
            .field("listening", &self.gui_subscription.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
