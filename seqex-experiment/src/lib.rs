//! Screen sequencing: screens bound to the events that end them, sequencers
//! that hand them out in strict get/result alternation, and the runner that
//! drives a sequence from gui callbacks.

pub mod builder;
pub mod config;
pub mod error;
pub mod eventful_screen;
pub mod reading;
pub mod runner;
pub mod sequencer;

pub use builder::ReadingExperimentBuilder;
pub use config::ExperimentConfig;
pub use error::{CallOrderViolation, ExperimentError, Result};
pub use eventful_screen::EventfulScreen;
pub use reading::{AnswerTally, Question, ReadingOutcome, Sentence};
pub use runner::{EndCallback, ExperimentRunner, ResultObserver, RunStatus, RunSummary};
pub use sequencer::{
    BlockCallback, BlockScreenSequencer, FixationCrossScreenSequencer, PendingQuestion,
    PredefinedScreenSequencer, ReadingTrialSequencer, ScreenSequencer, ScreenSource,
    SentenceSequencer, SequencerContext, SequencerState, ShowHook, SimpleScreenSequencer,
    TextScreenSequencer, TextScreens,
};
