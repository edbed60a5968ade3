use rand::Rng;
use seqex_core::{Key, ScreenStyle, SharedGui, TextScreen};
use seqex_events::{
    CompositeEventManager, EventManager, FixedTimeoutEventManager, KeyPressEventManager,
    MappedEventManager, Outcome, RandomTimeoutEventManager,
};
use tracing::debug;

use crate::config::ExperimentConfig;
use crate::error::Result;
use crate::eventful_screen::EventfulScreen;
use crate::reading::{ReadingOutcome, Sentence};
use crate::sequencer::{
    BlockCallback, BlockScreenSequencer, PredefinedScreenSequencer, ReadingTrialSequencer,
    ScreenSequencer, SentenceSequencer, SequencerContext,
};

/// Assembles the screen sequence of a reading experiment from its config.
///
/// Each configured block becomes an instruction screen (ended by the continue
/// key), then a fixation cross before every sentence, then a relax screen.
/// A fixation cross lasts a random time within the configured range and a
/// sentence ends on the advance key or after the sentence timeout, whichever
/// comes first. The pause key interrupts crosses and sentences, and some
/// sentences are followed by their comprehension question.
pub struct ReadingExperimentBuilder<'a> {
    config: &'a ExperimentConfig,
    context: SequencerContext,
    on_block_start: Option<BlockCallback>,
    on_block_end: Option<BlockCallback>,
}

impl<'a> ReadingExperimentBuilder<'a> {
    pub fn new(gui: SharedGui, config: &'a ExperimentConfig) -> Self {
        Self {
            config,
            context: SequencerContext::new(gui),
            on_block_start: None,
            on_block_end: None,
        }
    }

    /// Called with the text of every text screen once it is visible.
    pub fn with_show_hook(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.context = self.context.with_show_hook(hook);
        self
    }

    pub fn on_block_start(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_block_start = Some(Box::new(callback));
        self
    }

    pub fn on_block_end(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_block_end = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<BlockScreenSequencer<ReadingOutcome>> {
        self.build_with_rng(&mut rand::rng())
    }

    /// Uses `rng` for sentence order, question selection and every fixation
    /// duration, so a seeded `rng` reproduces the whole sequence.
    pub fn build_with_rng<R: Rng>(
        self,
        rng: &mut R,
    ) -> Result<BlockScreenSequencer<ReadingOutcome>> {
        self.config.validate()?;

        let mut blocks: Vec<Box<dyn ScreenSequencer<ReadingOutcome>>> = Vec::new();
        for (index, sentences) in self.config.blocks.iter().enumerate() {
            debug!(block = index + 1, sentences = sentences.len(), "building block");
            blocks.push(Box::new(self.block(sentences, &mut *rng)?));
        }

        let mut sequencer = BlockScreenSequencer::new(blocks)?;
        if let Some(callback) = self.on_block_start {
            sequencer = sequencer.on_block_start(callback);
        }
        if let Some(callback) = self.on_block_end {
            sequencer = sequencer.on_block_end(callback);
        }
        Ok(sequencer)
    }

    fn block<R: Rng>(
        &self,
        sentences: &[Sentence],
        rng: &mut R,
    ) -> Result<BlockScreenSequencer<ReadingOutcome>> {
        let gui = self.context.gui();
        let config = self.config;
        let style = &config.style;

        let instruction = self.text_screen(
            &config.instruction_text,
            style,
            self.key(config.continue_key, ReadingOutcome::Advanced),
        );

        let sentence_end = CompositeEventManager::new(vec![
            self.key(config.advance_key, ReadingOutcome::Advanced),
            mapped(
                FixedTimeoutEventManager::new(gui.clone(), config.sentence_timeout_ms),
                |()| ReadingOutcome::TimedOut,
            ),
            self.key(config.pause_key, ReadingOutcome::Paused),
        ])?;
        let mut sentences =
            SentenceSequencer::new(self.context.clone(), sentences.to_vec(), Box::new(sentence_end))?
                .with_style(style.clone());
        if config.shuffle {
            sentences = sentences.shuffled(&mut *rng);
        }
        let sentences = sentences.ask_questions(config.question_ratio, &mut *rng);

        let (min, max) = config.fixation_range_ms;
        let cross_end = CompositeEventManager::new(vec![
            mapped(
                RandomTimeoutEventManager::with_rng(gui.clone(), min, max, &mut *rng)?,
                |()| ReadingOutcome::Advanced,
            ),
            self.key(config.pause_key, ReadingOutcome::Paused),
        ])?;

        let trials = ReadingTrialSequencer::new(
            self.context.clone(),
            sentences,
            Box::new(cross_end),
            self.key(config.unpause_key, ReadingOutcome::Advanced),
        )
        .with_pause_text(config.pause_text.clone())
        .with_answer_keys(config.yes_key, config.no_key)
        .with_style(style.clone());

        let relax = self.text_screen(
            &config.relax_text,
            style,
            mapped(
                FixedTimeoutEventManager::new(gui.clone(), config.relax_timeout_ms),
                |()| ReadingOutcome::Advanced,
            ),
        );

        BlockScreenSequencer::new(vec![
            Box::new(PredefinedScreenSequencer::new(vec![instruction]))
                as Box<dyn ScreenSequencer<ReadingOutcome>>,
            Box::new(trials),
            Box::new(PredefinedScreenSequencer::new(vec![relax])),
        ])
    }

    fn key(&self, key: Key, outcome: ReadingOutcome) -> Box<dyn EventManager<ReadingOutcome>> {
        mapped(
            KeyPressEventManager::new(self.context.gui().clone(), key),
            move |()| outcome,
        )
    }

    fn text_screen(
        &self,
        text: &str,
        style: &ScreenStyle,
        event_manager: Box<dyn EventManager<ReadingOutcome>>,
    ) -> EventfulScreen<ReadingOutcome> {
        let screen = TextScreen::new(self.context.gui().clone(), text, style.clone());
        let eventful = EventfulScreen::new(screen, event_manager);
        match self.context.hook_for(text) {
            Some(hook) => eventful.with_show_hook(hook),
            None => eventful,
        }
    }
}

fn mapped<A: Outcome>(
    manager: impl EventManager<A> + 'static,
    map: impl Fn(A) -> ReadingOutcome + 'static,
) -> Box<dyn EventManager<ReadingOutcome>> {
    Box::new(MappedEventManager::new(Box::new(manager), map))
}
