use std::collections::VecDeque;

use seqex_events::Outcome;

use super::{ScreenSequencer, SequencerState};
use crate::error::Result;
use crate::eventful_screen::EventfulScreen;

/// Hands out a fixed list of pre-built screens in order.
pub struct PredefinedScreenSequencer<T: Outcome> {
    state: SequencerState<T>,
    screens: VecDeque<EventfulScreen<T>>,
}

impl<T: Outcome> PredefinedScreenSequencer<T> {
    pub fn new(screens: Vec<EventfulScreen<T>>) -> Self {
        Self {
            state: SequencerState::new(),
            screens: screens.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.screens.len()
    }
}

impl<T: Outcome> ScreenSequencer<T> for PredefinedScreenSequencer<T> {
    fn state(&self) -> &SequencerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<T> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<T>>> {
        Ok(self.screens.pop_front())
    }

    fn name(&self) -> &str {
        "predefined"
    }
}
