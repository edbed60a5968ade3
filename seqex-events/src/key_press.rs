use seqex_core::{Key, SharedGui};

use crate::error::EventError;
use crate::event::GuiEvent;
use crate::manager::{EventManager, ManagerState};
use crate::simple::SimpleEventManager;

/// Fires `()` when `key` is pressed.
#[derive(Debug)]
pub struct KeyPressEventManager {
    key: Key,
    inner: SimpleEventManager<()>,
}

impl KeyPressEventManager {
    pub fn new(gui: SharedGui, key: Key) -> Self {
        Self {
            key,
            inner: SimpleEventManager::new("key_press").bind(GuiEvent::key_press(gui, key), ()),
        }
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl EventManager<()> for KeyPressEventManager {
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
            key: self.key,
            inner: self.inner.fresh(),
        })
    }

    fn name(&self) -> &str {
        "key_press"
    }
}
