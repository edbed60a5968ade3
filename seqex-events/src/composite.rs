use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::callbacks::CallbackId;
use crate::error::EventError;
use crate::manager::{EventManager, ManagerState, Outcome};

/// Races its children: whichever fires first is forwarded unmodified.
///
/// Children are not cancelled when one of them wins. Stopping the composite
/// stops every child, which releases the losers' pending timers and listeners.
pub struct CompositeEventManager<T: Outcome> {
    state: ManagerState<T>,
    children: Vec<Box<dyn EventManager<T>>>,
    forwarders: Vec<Option<CallbackId>>,
}

impl<T: Outcome> CompositeEventManager<T> {
    pub fn new(children: Vec<Box<dyn EventManager<T>>>) -> Result<Self, EventError> {
        if children.is_empty() {
            return Err(EventError::EmptyComposite);
        }

        let forwarders = vec![None; children.len()];
        Ok(Self {
            state: ManagerState::new(),
            children,
            forwarders,
        })
    }

    pub fn children(&self) -> &[Box<dyn EventManager<T>>] {
        &self.children
    }
}

impl<T: Outcome> EventManager<T> for CompositeEventManager<T> {
    fn state(&self) -> &ManagerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ManagerState<T> {
        &mut self.state
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        for (child, forwarder) in self.children.iter_mut().zip(&mut self.forwarders) {
            let trigger = self.state.trigger();
            let id = child.register_callback(Rc::new(move |value| trigger.fire(value)));
            *forwarder = Some(id);
            child.start()?;
        }
        Ok(())
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        let mut first_error = None;

        for (child, forwarder) in self.children.iter_mut().zip(&mut self.forwarders) {
            if child.is_running() {
                if let Err(err) = child.stop() {
                    first_error.get_or_insert(err);
                }
            }
            if let Some(id) = forwarder.take() {
                if let Err(err) = child.deregister_callback(id) {
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = &first_error {
            debug!(%err, "composite stop reported a child failure");
        }
        first_error.map_or(Ok(()), Err)
    }

    fn clone_manager(&self) -> Box<dyn EventManager<T>> {
        let children: Vec<_> = self
            .children
            .iter()
            .map(|child| child.clone_manager())
            .collect();
        let forwarders = vec![None; children.len()];
        Box::new(Self {
            state: ManagerState::new(),
            children,
            forwarders,
        })
    }

    fn name(&self) -> &str {
        "composite"
    }
}

impl<T: Outcome> fmt::Debug for CompositeEventManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEventManager")
            .field("state", &self.state)
            .field("children", &self.children)
            .finish()
    }
}
