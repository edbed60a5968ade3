use std::fmt;
use std::rc::Rc;

use crate::callbacks::CallbackId;
use crate::error::EventError;
use crate::event::Event;
use crate::manager::{EventManager, ManagerState, Outcome};

struct Binding<T> {
    event: Box<dyn Event>,
    payload: T,
    /// Our subscription on `event` while the manager is running.
    wiring: Option<CallbackId>,
}

/// Manager over raw events, each mapped to a fixed payload.
///
/// Starting subscribes a forwarder to every event and starts it; stopping
/// stops every event and removes the forwarders again, so an instance may be
/// restarted without double-wiring.
pub struct SimpleEventManager<T> {
    name: &'static str,
    state: ManagerState<T>,
    bindings: Vec<Binding<T>>,
}

impl<T: Outcome> SimpleEventManager<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: ManagerState::new(),
            bindings: Vec::new(),
        }
    }

    /// Fires `payload` whenever `event` does.
    pub fn bind(mut self, event: impl Event + 'static, payload: T) -> Self {
        self.push_binding(Box::new(event), payload);
        self
    }

    fn push_binding(&mut self, event: Box<dyn Event>, payload: T) {
        self.bindings.push(Binding {
            event,
            payload,
            wiring: None,
        });
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Idle copy with cloned events and no callbacks.
    pub fn fresh(&self) -> Self {
        let mut clone = Self::new(self.name);
        for binding in &self.bindings {
            clone.push_binding(binding.event.clone_event(), binding.payload.clone());
        }
        clone
    }
}

impl<T: Outcome> EventManager<T> for SimpleEventManager<T> {
    fn state(&self) -> &ManagerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ManagerState<T> {
        &mut self.state
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        for binding in &mut self.bindings {
            let trigger = self.state.trigger();
            let payload = binding.payload.clone();
            let id = binding
                .event
                .subscribe(Rc::new(move || trigger.fire(payload.clone())));
            binding.wiring = Some(id);
        }

        for binding in &mut self.bindings {
            binding.event.start_listening()?;
        }
        Ok(())
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        let mut first_error = None;

        for binding in &mut self.bindings {
            if binding.event.is_listening() {
                if let Err(err) = binding.event.stop_listening() {
                    first_error.get_or_insert(err);
                }
            }
            if let Some(id) = binding.wiring.take() {
                if let Err(err) = binding.event.unsubscribe(id) {
                    first_error.get_or_insert(err);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn clone_manager(&self) -> Box<dyn EventManager<T>> {
        Box::new(self.fresh())
    }

    fn name(&self) -> &str {
        self.name
    }
}

impl<T> fmt::Debug for SimpleEventManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleEventManager")
            .field("name", &self.name)
            .field("state", &self.state)
            .field(
                "events",
                &self.bindings.iter().map(|b| &b.event).collect::<Vec<_>>(),
            )
            .finish()
    }
}
