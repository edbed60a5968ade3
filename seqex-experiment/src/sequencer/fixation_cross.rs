use seqex_core::{FixationCrossScreen, ScreenStyle};
use seqex_events::{EventManager, Outcome};
use tracing::debug;

use super::{ScreenSequencer, SequencerContext, SequencerState};
use crate::error::Result;
use crate::eventful_screen::EventfulScreen;

/// Inserts a fixation cross before every screen of the wrapped sequencer.
///
/// Even slots are fixation crosses, odd slots are the wrapped sequencer's
/// screens. The next real screen is fetched while the cross before it is
/// handed out, so the sequence ends on a cross slot once the wrapped
/// sequencer runs dry. The result of a real screen is forwarded to the
/// wrapped sequencer right before its next screen is fetched; results of
/// cross screens are dropped.
pub struct FixationCrossScreenSequencer<T: Outcome> {
    state: SequencerState<T>,
    context: SequencerContext,
    child: Box<dyn ScreenSequencer<T>>,
    prototype: Box<dyn EventManager<T>>,
    style: ScreenStyle,
    slot: usize,
    pending: Option<EventfulScreen<T>>,
    child_fetched: bool,
}

impl<T: Outcome> FixationCrossScreenSequencer<T> {
    pub fn new(
        context: SequencerContext,
        child: Box<dyn ScreenSequencer<T>>,
        prototype: Box<dyn EventManager<T>>,
    ) -> Self {
        Self {
            state: SequencerState::new(),
            context,
            child,
            prototype,
            style: ScreenStyle::default(),
            slot: 0,
            pending: None,
            child_fetched: false,
        }
    }

    pub fn with_style(mut self, style: ScreenStyle) -> Self {
        self.style = style;
        self
    }

    pub fn is_at_fixation_cross(&self) -> bool {
        self.slot % 2 == 0
    }

    /// Makes the next screen a fixation cross again without consuming another
    /// screen of the wrapped sequencer. No-op if it already is one.
    pub fn reset(&mut self) {
        if !self.is_at_fixation_cross() {
            self.slot -= 1;
            debug!(slot = self.slot, "fixation cross sequencer reset");
        }
    }

    fn fetch_child_screen(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }

        if self.child_fetched {
            self.child
                .pass_previous_result(self.state.previous_result()?)?;
        }
        self.child_fetched = true;

        self.pending = self.child.get_next()?;
        Ok(self.pending.is_some())
    }

    fn fixation_cross(&self) -> EventfulScreen<T> {
        let screen = FixationCrossScreen::new(self.context.gui().clone(), self.style.clone());
        EventfulScreen::new(screen, self.prototype.clone_manager())
    }
}

impl<T: Outcome> ScreenSequencer<T> for FixationCrossScreenSequencer<T> {
    fn state(&self) -> &SequencerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<T> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<T>>> {
        if self.is_at_fixation_cross() {
            if !self.fetch_child_screen()? {
                return Ok(None);
            }
            self.slot += 1;
            return Ok(Some(self.fixation_cross()));
        }

        self.slot += 1;
        Ok(self.pending.take())
    }

    fn name(&self) -> &str {
        "fixation_cross"
    }
}
