//! Producers of [`EventfulScreen`]s fed back with each screen's result.

mod block;
mod fixation_cross;
mod predefined;
mod reading;
mod simple;

pub use block::{BlockCallback, BlockScreenSequencer};
pub use fixation_cross::FixationCrossScreenSequencer;
pub use predefined::PredefinedScreenSequencer;
pub use reading::{PendingQuestion, ReadingTrialSequencer, SentenceSequencer};
pub use simple::{
    ScreenSource, SequencerContext, ShowHook, SimpleScreenSequencer, TextScreenSequencer,
    TextScreens,
};

use seqex_events::Outcome;
use tracing::debug;

use crate::error::{CallOrderViolation, Result};
use crate::eventful_screen::EventfulScreen;

/// Alternation bookkeeping shared by every [`ScreenSequencer`].
#[derive(Debug)]
pub struct SequencerState<T> {
    first_screen_gotten: bool,
    result_provided: bool,
    previous_result: Option<T>,
    exhausted: bool,
}

impl<T: Outcome> SequencerState<T> {
    pub fn new() -> Self {
        Self {
            first_screen_gotten: false,
            result_provided: false,
            previous_result: None,
            exhausted: false,
        }
    }

    pub fn was_first_screen_gotten(&self) -> bool {
        self.first_screen_gotten
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn check_result_provided(&self) -> Result<()> {
        if self.first_screen_gotten && !self.result_provided {
            return Err(CallOrderViolation::ResultNotProvided.into());
        }
        Ok(())
    }

    /// Result passed for the most recently handed out screen.
    pub fn previous_result(&self) -> Result<T> {
        self.check_result_provided()?;
        self.previous_result
            .clone()
            .ok_or_else(|| CallOrderViolation::ResultNotProvided.into())
    }
}

impl<T: Outcome> Default for SequencerState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful generator of screens with strict get/pass-result alternation.
///
/// Implementors supply `next_screen`, returning `Ok(None)` once they have
/// nothing left; `get_next` and `pass_previous_result` enforce the call order
/// and remember exhaustion.
pub trait ScreenSequencer<T: Outcome> {
    fn state(&self) -> &SequencerState<T>;

    fn state_mut(&mut self) -> &mut SequencerState<T>;

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<T>>>;

    fn name(&self) -> &str;

    /// Next screen, or `Ok(None)` at the end of the sequence.
    ///
    /// Every call after the first requires a `pass_previous_result` since the
    /// previous one.
    fn get_next(&mut self) -> Result<Option<EventfulScreen<T>>> {
        if self.state().exhausted {
            return Ok(None);
        }
        self.state().check_result_provided()?;

        match self.next_screen()? {
            Some(screen) => {
                let state = self.state_mut();
                state.first_screen_gotten = true;
                state.result_provided = false;
                debug!(sequencer = self.name(), ?screen, "got next screen");
                Ok(Some(screen))
            }
            None => {
                self.state_mut().exhausted = true;
                debug!(sequencer = self.name(), "no more screens in the sequence");
                Ok(None)
            }
        }
    }

    fn pass_previous_result(&mut self, result: T) -> Result<()> {
        let state = self.state_mut();
        if !state.first_screen_gotten {
            return Err(CallOrderViolation::FirstScreenNotGotten.into());
        }
        if state.result_provided {
            return Err(CallOrderViolation::ResultAlreadyProvided.into());
        }

        debug!(sequencer = self.name(), ?result, "got previous result");
        let state = self.state_mut();
        state.previous_result = Some(result);
        state.result_provided = true;
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.state().exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExperimentError;
    use seqex_core::{BlankScreen, HeadlessGui, ScreenStyle};
    use seqex_events::SimpleEventManager;
    use std::rc::Rc;

    /// Hands out `remaining` blank screens.
    struct Countdown {
        state: SequencerState<u8>,
        gui: Rc<HeadlessGui>,
        remaining: usize,
        calls: usize,
    }

    impl Countdown {
        fn new(remaining: usize) -> Self {
            Self {
                state: SequencerState::new(),
                gui: Rc::new(HeadlessGui::default()),
                remaining,
                calls: 0,
            }
        }
    }

    impl ScreenSequencer<u8> for Countdown {
        fn state(&self) -> &SequencerState<u8> {
            &self.state
        }

        fn state_mut(&mut self) -> &mut SequencerState<u8> {
            &mut self.state
        }

        fn next_screen(&mut self) -> Result<Option<EventfulScreen<u8>>> {
            self.calls += 1;
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            Ok(Some(EventfulScreen::new(
                BlankScreen::new(self.gui.clone(), &ScreenStyle::default()),
                Box::new(SimpleEventManager::<u8>::new("never")),
            )))
        }

        fn name(&self) -> &str {
            "countdown"
        }
    }

    #[test]
    fn test_first_get_next_needs_no_result() {
        let mut sequencer = Countdown::new(2);
        assert!(sequencer.get_next().unwrap().is_some());
    }

    #[test]
    fn test_second_get_next_without_result_fails() {
        let mut sequencer = Countdown::new(2);
        sequencer.get_next().unwrap();

        let err = sequencer.get_next().unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::CallOrder(CallOrderViolation::ResultNotProvided)
        ));
    }

    #[test]
    fn test_result_before_first_screen_fails() {
        let mut sequencer = Countdown::new(2);

        let err = sequencer.pass_previous_result(1).unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::CallOrder(CallOrderViolation::FirstScreenNotGotten)
        ));
    }

    #[test]
    fn test_passing_result_twice_fails() {
        let mut sequencer = Countdown::new(2);
        sequencer.get_next().unwrap();
        sequencer.pass_previous_result(1).unwrap();

        let err = sequencer.pass_previous_result(2).unwrap_err();
        assert!(matches!(
            err,
            ExperimentError::CallOrder(CallOrderViolation::ResultAlreadyProvided)
        ));
    }

    #[test]
    fn test_previous_result_is_kept_until_next_screen() {
        let mut sequencer = Countdown::new(2);
        sequencer.get_next().unwrap();
        sequencer.pass_previous_result(7).unwrap();

        assert_eq!(sequencer.state().previous_result().unwrap(), 7);
        sequencer.get_next().unwrap();
        assert!(sequencer.state().previous_result().is_err());
    }

    #[test]
    fn test_exhausted_sequencer_stays_exhausted_without_asking_again() {
        let mut sequencer = Countdown::new(1);
        sequencer.get_next().unwrap();
        sequencer.pass_previous_result(0).unwrap();

        assert!(sequencer.get_next().unwrap().is_none());
        assert!(sequencer.is_exhausted());
        assert!(sequencer.get_next().unwrap().is_none());
        assert_eq!(sequencer.calls, 2);
    }
}
