use seqex_core::{Key, SharedGui};

use crate::error::EventError;
use crate::event::GuiEvent;
use crate::manager::{EventManager, ManagerState};
use crate::simple::SimpleEventManager;

/// Fires `true` on the correct key and `false` on the incorrect one.
#[derive(Debug)]
pub struct CorrectIncorrectEventManager {
    correct: Key,
    incorrect: Key,
    inner: SimpleEventManager<bool>,
}

impl CorrectIncorrectEventManager {
    pub fn new(gui: SharedGui, correct: Key, incorrect: Key) -> Self {
        let inner = SimpleEventManager::new("correct_incorrect")
            .bind(GuiEvent::key_press(gui.clone(), correct), true)
            .bind(GuiEvent::key_press(gui, incorrect), false);
        Self {
            correct,
            incorrect,
            inner,
        }
    }

    pub fn keys(&self) -> (Key, Key) {
        (self.correct, self.incorrect)
    }
}

impl EventManager<bool> for CorrectIncorrectEventManager {
    fn state(&self) -> &ManagerState<bool> {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut ManagerState<bool> {
        self.inner.state_mut()
    }

    fn on_start(&mut self) -> Result<(), EventError> {
        self.inner.on_start()
    }

    fn on_stop(&mut self) -> Result<(), EventError> {
        self.inner.on_stop()
    }

    fn clone_manager(&self) -> Box<dyn EventManager<bool>> {
        Box::new(Self {
            correct: self.correct,
            incorrect: self.incorrect,
            inner: self.inner.fresh(),
        })
    }

    fn name(&self) -> &str {
        "correct_incorrect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqex_core::HeadlessGui;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_maps_keys_to_answers() {
        let gui = Rc::new(HeadlessGui::default());
        let mut manager = CorrectIncorrectEventManager::new(gui.clone(), Key::ShiftLeft, Key::ShiftRight);
        let answers = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&answers);
        manager.register_callback(Rc::new(move |answer| sink.borrow_mut().push(answer)));

        manager.start().unwrap();
        gui.press(Key::ShiftRight);
        gui.press(Key::Space);
        gui.press(Key::ShiftLeft);

        assert_eq!(*answers.borrow(), vec![false, true]);
    }

    #[test]
    fn test_stop_unsubscribes_both_keys() {
        let gui = Rc::new(HeadlessGui::default());
        let mut manager = CorrectIncorrectEventManager::new(gui.clone(), Key::A, Key::B);
        manager.register_callback(Rc::new(|_| {}));

        manager.start().unwrap();
        assert_eq!(gui.subscription_count(), 2);
        manager.stop().unwrap();
        assert_eq!(gui.subscription_count(), 0);
    }
}
