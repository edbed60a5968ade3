use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use seqex_core::SharedGui;
use seqex_events::Outcome;
use tracing::{error, info, warn};

use crate::error::{ExperimentError, Result};
use crate::eventful_screen::EventfulScreen;
use crate::sequencer::ScreenSequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    WaitingForGui,
    Running,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub screens_shown: usize,
}

pub type ResultObserver<T> = Box<dyn FnMut(usize, &T)>;

pub type EndCallback = Box<dyn FnOnce(Result<RunSummary>)>;

enum Message<T> {
    Start,
    ScreenEnded { index: usize, result: T },
}

struct RunnerState<T: Outcome> {
    sequencer: Box<dyn ScreenSequencer<T>>,
    current: Option<EventfulScreen<T>>,
    status: RunStatus,
    run_requested: bool,
    screens_shown: usize,
    on_end: Option<EndCallback>,
}

struct Shared<T: Outcome> {
    state: RefCell<RunnerState<T>>,
    mailbox: RefCell<VecDeque<Message<T>>>,
    observer: RefCell<Option<ResultObserver<T>>>,
    finished: RefCell<VecDeque<(usize, T)>>,
}

/// Drives a sequencer to completion from gui callbacks.
///
/// Nothing blocks: [`ExperimentRunner::run`] registers for the gui's init
/// signal and returns. Each screen's end callback exits that screen, feeds
/// the result back to the sequencer and shows the next one. Signals that
/// arrive while the runner is busy (for example a key pressed from a show
/// hook) are queued and handled once the current step is done.
///
/// Observers and the end callback run once the runner has released its
/// state, so they may query it.
pub struct ExperimentRunner<T: Outcome> {
    gui: SharedGui,
    shared: Rc<Shared<T>>,
}

impl<T: Outcome> ExperimentRunner<T> {
    pub fn new(gui: SharedGui, sequencer: Box<dyn ScreenSequencer<T>>) -> Self {
        let state = RunnerState {
            sequencer,
            current: None,
            status: RunStatus::WaitingForGui,
            run_requested: false,
            screens_shown: 0,
            on_end: None,
        };
        Self {
            gui,
            shared: Rc::new(Shared {
                state: RefCell::new(state),
                mailbox: RefCell::new(VecDeque::new()),
                observer: RefCell::new(None),
                finished: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Called with the 0-based screen index and result of every finished
    /// screen, in order, after the runner has moved on to the next screen.
    pub fn on_result(self, observer: impl FnMut(usize, &T) + 'static) -> Self {
        *self.shared.observer.borrow_mut() = Some(Box::new(observer));
        self
    }

    /// Called once when the sequence is exhausted or the run fails.
    pub fn on_end(self, callback: impl FnOnce(Result<RunSummary>) + 'static) -> Self {
        self.shared.state.borrow_mut().on_end = Some(Box::new(callback));
        self
    }

    /// Shows the first screen as soon as the gui reports it is ready.
    pub fn run(&self) {
        {
            let mut state = self.shared.state.borrow_mut();
            if state.run_requested {
                warn!("experiment runner already started, ignoring");
                return;
            }
            state.run_requested = true;
        }

        let shared = Rc::downgrade(&self.shared);
        self.gui.on_init(Box::new(move || post(&shared, Message::Start)));
    }

    pub fn status(&self) -> RunStatus {
        self.shared.state.borrow().status
    }

    pub fn screens_shown(&self) -> usize {
        self.shared.state.borrow().screens_shown
    }
}

impl<T: Outcome> fmt::Debug for ExperimentRunner<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ExperimentRunner")
            .field("status", &state.status)
            .field("screens_shown", &state.screens_shown)
            .finish_non_exhaustive()
    }
}

fn post<T: Outcome>(shared: &Weak<Shared<T>>, message: Message<T>) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    shared.mailbox.borrow_mut().push_back(message);
    pump(&shared);
}

/// Handles queued messages unless an outer call is already doing so.
fn pump<T: Outcome>(shared: &Rc<Shared<T>>) {
    loop {
        let Ok(mut state) = shared.state.try_borrow_mut() else {
            return;
        };
        let Some(message) = shared.mailbox.borrow_mut().pop_front() else {
            return;
        };

        let outcome = state.handle(message, shared);
        let on_end = if outcome.is_some() {
            state.on_end.take()
        } else {
            None
        };
        drop(state);

        report_results(shared);
        if let (Some(outcome), Some(on_end)) = (outcome, on_end) {
            on_end(outcome);
        }
    }
}

/// Hands finished results to the observer with no runner state borrowed.
fn report_results<T: Outcome>(shared: &Shared<T>) {
    let Ok(mut observer) = shared.observer.try_borrow_mut() else {
        return;
    };
    let Some(observer) = observer.as_mut() else {
        shared.finished.borrow_mut().clear();
        return;
    };

    loop {
        let Some((index, result)) = shared.finished.borrow_mut().pop_front() else {
            return;
        };
        observer(index, &result);
    }
}

impl<T: Outcome> RunnerState<T> {
    /// Returns the run's outcome once it has ended.
    fn handle(
        &mut self,
        message: Message<T>,
        shared: &Rc<Shared<T>>,
    ) -> Option<Result<RunSummary>> {
        let step = match message {
            Message::Start => {
                if self.status != RunStatus::WaitingForGui {
                    return None;
                }
                self.status = RunStatus::Running;
                info!("starting experiment");
                self.show_next(shared)
            }
            Message::ScreenEnded { index, result } => {
                let current = self.screens_shown.checked_sub(1);
                if self.status != RunStatus::Running || current != Some(index) {
                    warn!(index, ?result, "ignoring result of a screen that already ended");
                    return None;
                }
                self.go_to_next_screen(index, result, shared)
            }
        };

        match step {
            Ok(true) => None,
            Ok(false) => {
                self.status = RunStatus::Finished;
                info!(screens = self.screens_shown, "experiment finished");
                Some(Ok(RunSummary {
                    screens_shown: self.screens_shown,
                }))
            }
            Err(err) => {
                self.status = RunStatus::Failed;
                error!(%err, "experiment failed");
                if let Some(mut screen) = self.current.take() {
                    if let Err(exit_err) = screen.exit() {
                        warn!(%exit_err, "could not exit screen after failure");
                    }
                }
                Some(Err(err))
            }
        }
    }

    fn go_to_next_screen(
        &mut self,
        index: usize,
        result: T,
        shared: &Rc<Shared<T>>,
    ) -> Result<bool> {
        let mut previous = self.current.take().ok_or(ExperimentError::NoPreviousScreen)?;
        previous.exit()?;

        shared.finished.borrow_mut().push_back((index, result.clone()));
        self.sequencer.pass_previous_result(result)?;
        self.show_next(shared)
    }

    /// Returns false once the sequence is exhausted.
    fn show_next(&mut self, shared: &Rc<Shared<T>>) -> Result<bool> {
        let Some(mut screen) = self.sequencer.get_next()? else {
            return Ok(false);
        };

        let index = self.screens_shown;
        self.screens_shown += 1;

        let weak = Rc::downgrade(shared);
        info!(index, ?screen, "showing screen");
        screen.show(Rc::new(move |result| {
            post(&weak, Message::ScreenEnded { index, result })
        }))?;
        self.current = Some(screen);
        Ok(true)
    }
}
