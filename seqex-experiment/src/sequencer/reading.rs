use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;
use seqex_core::{Key, ScreenStyle, TextScreen};
use seqex_events::{CorrectIncorrectEventManager, EventManager, MappedEventManager};
use tracing::{debug, info};

use super::{FixationCrossScreenSequencer, ScreenSequencer, SequencerContext, SequencerState};
use crate::error::{ExperimentError, Result};
use crate::eventful_screen::EventfulScreen;
use crate::reading::{Question, ReadingOutcome, Sentence};

/// Question of the sentence handed out last, if one should be asked.
pub type PendingQuestion = Rc<RefCell<Option<Question>>>;

struct SentenceTrial {
    sentence: Sentence,
    ask: bool,
}

/// One text screen per sentence, each ended by a fresh clone of `prototype`.
///
/// A sentence whose screen ended with [`ReadingOutcome::Paused`] is handed
/// out again. Every fetch publishes the sentence's question to
/// [`pending_question`](Self::pending_question) if it was selected for
/// asking, and clears it otherwise.
pub struct SentenceSequencer {
    state: SequencerState<ReadingOutcome>,
    context: SequencerContext,
    trials: Vec<SentenceTrial>,
    cursor: usize,
    prototype: Box<dyn EventManager<ReadingOutcome>>,
    style: ScreenStyle,
    pending_question: PendingQuestion,
}

impl SentenceSequencer {
    pub fn new(
        context: SequencerContext,
        sentences: Vec<Sentence>,
        prototype: Box<dyn EventManager<ReadingOutcome>>,
    ) -> Result<Self> {
        if sentences.is_empty() {
            return Err(ExperimentError::EmptySequence("sentence sequence"));
        }

        Ok(Self {
            state: SequencerState::new(),
            context,
            trials: sentences
                .into_iter()
                .map(|sentence| SentenceTrial {
                    sentence,
                    ask: false,
                })
                .collect(),
            cursor: 0,
            prototype,
            style: ScreenStyle::default(),
            pending_question: Rc::new(RefCell::new(None)),
        })
    }

    pub fn with_style(mut self, style: ScreenStyle) -> Self {
        self.style = style;
        self
    }

    pub fn shuffled<R: Rng>(mut self, rng: &mut R) -> Self {
        self.trials[self.cursor..].shuffle(rng);
        self
    }

    /// Selects `floor(len * ratio)` sentences to be followed by their
    /// question, drawn from the sentences that have one.
    pub fn ask_questions<R: Rng>(mut self, ratio: f64, rng: &mut R) -> Self {
        let wanted = (self.trials.len() as f64 * ratio) as usize;
        let candidates: Vec<usize> = self
            .trials
            .iter()
            .enumerate()
            .filter(|(_, trial)| trial.sentence.question.is_some())
            .map(|(position, _)| position)
            .collect();
        let amount = wanted.min(candidates.len());

        for picked in index::sample(rng, candidates.len(), amount) {
            self.trials[candidates[picked]].ask = true;
        }
        debug!(
            questions = amount,
            sentences = self.trials.len(),
            "selected comprehension questions"
        );
        self
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.trials.iter().map(|trial| &trial.sentence)
    }

    pub fn question_count(&self) -> usize {
        self.trials.iter().filter(|trial| trial.ask).count()
    }

    pub fn pending_question(&self) -> PendingQuestion {
        Rc::clone(&self.pending_question)
    }
}

impl ScreenSequencer<ReadingOutcome> for SentenceSequencer {
    fn state(&self) -> &SequencerState<ReadingOutcome> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<ReadingOutcome> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<ReadingOutcome>>> {
        if self.state.was_first_screen_gotten()
            && self.state.previous_result()? == ReadingOutcome::Paused
        {
            self.cursor = self.cursor.saturating_sub(1);
            debug!(position = self.cursor, "repeating paused sentence");
        }

        let Some(trial) = self.trials.get(self.cursor) else {
            *self.pending_question.borrow_mut() = None;
            return Ok(None);
        };
        self.cursor += 1;

        *self.pending_question.borrow_mut() =
            trial.sentence.question.clone().filter(|_| trial.ask);

        let text = trial.sentence.text.as_str();
        let screen = TextScreen::new(self.context.gui().clone(), text, self.style.clone());
        let mut eventful = EventfulScreen::new(screen, self.prototype.clone_manager());
        if let Some(hook) = self.context.hook_for(text) {
            eventful = eventful.with_show_hook(hook);
        }
        Ok(Some(eventful))
    }

    fn name(&self) -> &str {
        "sentence"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Trial,
    Pause,
    Question,
}

/// Fixation crosses and sentences, interrupted by pauses and followed by
/// comprehension questions.
///
/// A [`ReadingOutcome::Paused`] result of a cross or sentence brings up the
/// pause screen. Once it ends the cross is shown again, followed by the same
/// sentence. A sentence selected for a question is followed by a question
/// screen answered with the yes or no key.
pub struct ReadingTrialSequencer {
    state: SequencerState<ReadingOutcome>,
    context: SequencerContext,
    trials: FixationCrossScreenSequencer<ReadingOutcome>,
    pending_question: PendingQuestion,
    unpause: Box<dyn EventManager<ReadingOutcome>>,
    pause_text: String,
    yes_key: Key,
    no_key: Key,
    style: ScreenStyle,
    stage: Stage,
}

impl ReadingTrialSequencer {
    pub fn new(
        context: SequencerContext,
        sentences: SentenceSequencer,
        cross_prototype: Box<dyn EventManager<ReadingOutcome>>,
        unpause_prototype: Box<dyn EventManager<ReadingOutcome>>,
    ) -> Self {
        let pending_question = sentences.pending_question();
        let trials =
            FixationCrossScreenSequencer::new(context.clone(), Box::new(sentences), cross_prototype);
        Self {
            state: SequencerState::new(),
            context,
            trials,
            pending_question,
            unpause: unpause_prototype,
            pause_text: "Paused.".to_string(),
            yes_key: Key::A,
            no_key: Key::B,
            style: ScreenStyle::default(),
            stage: Stage::Trial,
        }
    }

    pub fn with_pause_text(mut self, text: impl Into<String>) -> Self {
        self.pause_text = text.into();
        self
    }

    pub fn with_answer_keys(mut self, yes: Key, no: Key) -> Self {
        self.yes_key = yes;
        self.no_key = no;
        self
    }

    pub fn with_style(mut self, style: ScreenStyle) -> Self {
        self.trials = self.trials.with_style(style.clone());
        self.style = style;
        self
    }

    fn next_trial(&mut self) -> Result<Option<EventfulScreen<ReadingOutcome>>> {
        self.stage = Stage::Trial;
        self.trials.get_next()
    }

    fn text_screen(
        &self,
        text: &str,
        manager: Box<dyn EventManager<ReadingOutcome>>,
    ) -> EventfulScreen<ReadingOutcome> {
        let screen = TextScreen::new(self.context.gui().clone(), text, self.style.clone());
        let eventful = EventfulScreen::new(screen, manager);
        match self.context.hook_for(text) {
            Some(hook) => eventful.with_show_hook(hook),
            None => eventful,
        }
    }

    fn question_screen(&self, question: &Question) -> EventfulScreen<ReadingOutcome> {
        let (correct, incorrect) = if question.answer {
            (self.yes_key, self.no_key)
        } else {
            (self.no_key, self.yes_key)
        };
        let answers =
            CorrectIncorrectEventManager::new(self.context.gui().clone(), correct, incorrect);
        let text = format!(
            "{}\n\n{} = yes, {} = no",
            question.text, self.yes_key, self.no_key
        );
        self.text_screen(
            &text,
            Box::new(MappedEventManager::new(
                Box::new(answers),
                ReadingOutcome::Answered,
            )),
        )
    }
}

impl ScreenSequencer<ReadingOutcome> for ReadingTrialSequencer {
    fn state(&self) -> &SequencerState<ReadingOutcome> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<ReadingOutcome> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<ReadingOutcome>>> {
        if !self.state.was_first_screen_gotten() {
            return self.next_trial();
        }

        let previous = self.state.previous_result()?;
        match self.stage {
            Stage::Trial if previous == ReadingOutcome::Paused => {
                info!(at_cross = !self.trials.is_at_fixation_cross(), "paused");
                self.stage = Stage::Pause;
                Ok(Some(
                    self.text_screen(&self.pause_text, self.unpause.clone_manager()),
                ))
            }
            Stage::Trial => {
                self.trials.pass_previous_result(previous)?;
                // Still the sentence's question until the next sentence is fetched.
                if self.trials.is_at_fixation_cross() {
                    if let Some(question) = self.pending_question.borrow_mut().take() {
                        self.stage = Stage::Question;
                        return Ok(Some(self.question_screen(&question)));
                    }
                }
                self.next_trial()
            }
            Stage::Pause => {
                info!("unpaused");
                self.trials.pass_previous_result(ReadingOutcome::Paused)?;
                self.trials.reset();
                self.next_trial()
            }
            Stage::Question => {
                if let ReadingOutcome::Answered(correct) = previous {
                    info!(correct, "question answered");
                }
                self.next_trial()
            }
        }
    }

    fn name(&self) -> &str {
        "reading_trial"
    }
}
