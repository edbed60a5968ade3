use std::fmt;

use seqex_core::Screen;
use seqex_events::{CallbackId, EventManager, Outcome, ResultCallback};
use tracing::debug;

use crate::error::{CallOrderViolation, Result};

/// One screen bound to the event manager that ends it.
///
/// Single use: the manager must be a fresh instance (usually a clone of a
/// prototype) and the screen can be shown once and exited once.
pub struct EventfulScreen<T: Outcome> {
    screen: Box<dyn Screen>,
    event_manager: Box<dyn EventManager<T>>,
    show_hook: Option<Box<dyn FnOnce()>>,
    end_callback: Option<CallbackId>,
    shown: bool,
}

impl<T: Outcome> EventfulScreen<T> {
    pub fn new(screen: impl Screen + 'static, event_manager: Box<dyn EventManager<T>>) -> Self {
        Self {
            screen: Box::new(screen),
            event_manager,
            show_hook: None,
            end_callback: None,
            shown: false,
        }
    }

    /// Runs `hook` right after the screen has been drawn.
    pub fn with_show_hook(mut self, hook: impl FnOnce() + 'static) -> Self {
        self.show_hook = Some(Box::new(hook));
        self
    }

    /// Starts the event manager with `end_callback` registered, draws the
    /// screen, then runs the show hook.
    pub fn show(&mut self, end_callback: ResultCallback<T>) -> Result<()> {
        if self.shown {
            return Err(CallOrderViolation::ScreenAlreadyShown.into());
        }
        self.shown = true;

        let id = self.event_manager.register_callback(end_callback);
        self.end_callback = Some(id);
        self.event_manager.start()?;

        debug!(screen = ?self.screen, "showing screen");
        self.screen.show();

        if let Some(hook) = self.show_hook.take() {
            hook();
        }
        Ok(())
    }

    /// Deregisters the end callback and stops the event manager.
    pub fn exit(&mut self) -> Result<()> {
        let id = self
            .end_callback
            .take()
            .ok_or(CallOrderViolation::ScreenNotShown)?;

        self.event_manager.deregister_callback(id)?;
        self.event_manager.stop()?;
        debug!(screen = ?self.screen, "exited screen");
        Ok(())
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    pub fn event_manager(&self) -> &dyn EventManager<T> {
        self.event_manager.as_ref()
    }
}

impl<T: Outcome> fmt::Debug for EventfulScreen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventfulScreen")
            .field("screen", &self.screen)
            .field("event_manager", &self.event_manager.name())
            .field("shown", &self.shown)
            .finish()
    }
}
