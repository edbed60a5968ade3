use std::fmt;
use std::rc::Rc;

use crate::callbacks::CallbackId;
use crate::error::EventError;
use crate::manager::{EventManager, ManagerState, Outcome};

/// Converts every result of the wrapped manager with `map` before
/// forwarding it.
///
/// Lets managers of different result types race inside one
/// [`CompositeEventManager`](crate::CompositeEventManager).
pub struct MappedEventManager<A: Outcome, B: Outcome> {
    state: ManagerState<B>,
    inner: Box<dyn EventManager<A>>,
    map: Rc<dyn Fn(A) -> B>,
    forwarder: Option<CallbackId>,
}

impl<A: Outcome, B: Outcome> MappedEventManager<A, B> {
    pub fn new(inner: Box<dyn EventManager<A>>, map: impl Fn(A) -> B + 'static) -> Self {
        Self {
            state: ManagerState::new(),
            inner,
            map: Rc::new(map),
            forwarder: None,
        }
    }

    pub fn inner(&self) -> &dyn EventManager<A> {
        self.inner.as_ref()
    }
}

impl<A: Outcome, B: Outcome> EventManager<B> for MappedEventManager<A, B> {
    fn state(&self) -> &ManagerState<B> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ManagerState<B> {
        &mut self.state
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        let trigger = self.state.trigger();
        let map = Rc::clone(&self.map);
        let id = self
            .inner
            .register_callback(Rc::new(move |value| trigger.fire(map(value))));
        self.forwarder = Some(id);
        self.inner.start()
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        let stopped = if self.inner.is_running() {
            self.inner.stop()
        } else {
            Ok(())
        };
        if let Some(id) = self.forwarder.take() {
            self.inner.deregister_callback(id)?;
        }
        stopped
    }

    fn clone_manager(&self) -> Box<dyn EventManager<B>> {
        Box::new(Self {
            state: ManagerState::new(),
            inner: self.inner.clone_manager(),
            map: Rc::clone(&self.map),
            forwarder: None,
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

impl<A: Outcome, B: Outcome> fmt::Debug for MappedEventManager<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedEventManager")
            .field("state", &self.state)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::CompositeEventManager;
    use crate::correct_incorrect::CorrectIncorrectEventManager;
    use crate::key_press::KeyPressEventManager;
    use seqex_core::{HeadlessGui, Key};
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Answer {
        Skipped,
        Given(bool),
    }

    #[test]
    fn test_results_are_converted_before_forwarding() {
        let gui = Rc::new(HeadlessGui::default());
        let mut manager = MappedEventManager::new(
            Box::new(CorrectIncorrectEventManager::new(gui.clone(), Key::A, Key::B)),
            Answer::Given,
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        manager.register_callback(Rc::new(move |answer| sink.borrow_mut().push(answer)));

        manager.start().unwrap();
        gui.press(Key::B);
        gui.press(Key::A);

        assert_eq!(*seen.borrow(), vec![Answer::Given(false), Answer::Given(true)]);
    }

    #[test]
    fn test_mixed_result_types_race_in_a_composite() {
        let gui = Rc::new(HeadlessGui::default());
        let mut composite = CompositeEventManager::new(vec![
            Box::new(MappedEventManager::new(
                Box::new(KeyPressEventManager::new(gui.clone(), Key::Space)),
                |()| Answer::Skipped,
            )) as Box<dyn EventManager<Answer>>,
            Box::new(MappedEventManager::new(
                Box::new(CorrectIncorrectEventManager::new(gui.clone(), Key::A, Key::B)),
                Answer::Given,
            )),
        ])
        .unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        composite.register_callback(Rc::new(move |answer| sink.borrow_mut().push(answer)));

        composite.start().unwrap();
        gui.press(Key::Space);
        composite.stop().unwrap();
        gui.press(Key::A);

        assert_eq!(*seen.borrow(), vec![Answer::Skipped]);
        assert_eq!(gui.subscription_count(), 0);
    }

    #[test]
    fn test_stop_releases_the_inner_manager() {
        let gui = Rc::new(HeadlessGui::default());
        let mut manager =
            MappedEventManager::new(Box::new(KeyPressEventManager::new(gui.clone(), Key::C)), |()| 1u8);
        manager.register_callback(Rc::new(|_| {}));

        manager.start().unwrap();
        assert!(manager.inner().is_running());
        assert_eq!(manager.inner().callback_count(), 1);

        manager.stop().unwrap();
        assert!(!manager.inner().is_running());
        assert_eq!(manager.inner().callback_count(), 0);

        let clone = manager.clone_manager();
        assert!(!clone.is_running());
        assert_eq!(clone.name(), "key_press");
    }
}
