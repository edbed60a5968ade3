use std::fmt;
use std::rc::Rc;

use rand::Rng;
use rand::seq::SliceRandom;
use seqex_core::{ScreenStyle, SharedGui, TextScreen};
use seqex_events::{EventManager, Outcome};

use super::{ScreenSequencer, SequencerState};
use crate::error::{ExperimentError, Result};
use crate::eventful_screen::EventfulScreen;

/// Called with a label (for text screens, the text) once a screen is visible.
pub type ShowHook = Rc<dyn Fn(&str)>;

/// Gui handle and optional show hook shared by screen generators.
#[derive(Clone)]
pub struct SequencerContext {
    gui: SharedGui,
    show_hook: Option<ShowHook>,
}

impl SequencerContext {
    pub fn new(gui: SharedGui) -> Self {
        Self {
            gui,
            show_hook: None,
        }
    }

    pub fn with_show_hook(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.show_hook = Some(Rc::new(hook));
        self
    }

    pub fn gui(&self) -> &SharedGui {
        &self.gui
    }

    /// The show hook bound to `label`, ready to attach to an
    /// [`EventfulScreen`].
    pub fn hook_for(&self, label: &str) -> Option<impl FnOnce() + 'static> {
        let hook = self.show_hook.clone()?;
        let label = label.to_string();
        Some(move || hook(&label))
    }
}

impl fmt::Debug for SequencerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequencerContext")
            .field("show_hook", &self.show_hook.is_some())
            .finish_non_exhaustive()
    }
}

/// Decides, call by call, which screen a [`SimpleScreenSequencer`] hands out.
pub trait ScreenSource<T: Outcome> {
    fn next_screen(&mut self, context: &SequencerContext) -> Result<Option<EventfulScreen<T>>>;

    fn name(&self) -> &str {
        "simple"
    }
}

/// Sequencer whose screens come from a [`ScreenSource`].
pub struct SimpleScreenSequencer<T: Outcome, S> {
    state: SequencerState<T>,
    context: SequencerContext,
    source: S,
}

impl<T: Outcome, S: ScreenSource<T>> SimpleScreenSequencer<T, S> {
    pub fn new(context: SequencerContext, source: S) -> Self {
        Self {
            state: SequencerState::new(),
            context,
            source,
        }
    }

    pub fn context(&self) -> &SequencerContext {
        &self.context
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<T: Outcome, S: ScreenSource<T>> ScreenSequencer<T> for SimpleScreenSequencer<T, S> {
    fn state(&self) -> &SequencerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<T> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<T>>> {
        self.source.next_screen(&self.context)
    }

    fn name(&self) -> &str {
        self.source.name()
    }
}

/// One [`TextScreen`] per text, each ended by a fresh clone of `prototype`.
pub struct TextScreens<T: Outcome> {
    texts: Vec<String>,
    cursor: usize,
    prototype: Box<dyn EventManager<T>>,
    style: ScreenStyle,
}

impl<T: Outcome> TextScreens<T> {
    pub fn new(texts: Vec<String>, prototype: Box<dyn EventManager<T>>) -> Result<Self> {
        if texts.is_empty() {
            return Err(ExperimentError::EmptySequence("text sequence"));
        }

        Ok(Self {
            texts,
            cursor: 0,
            prototype,
            style: ScreenStyle::default(),
        })
    }

    pub fn with_style(mut self, style: ScreenStyle) -> Self {
        self.style = style;
        self
    }

    /// Shuffles the texts that have not been handed out yet.
    pub fn shuffled<R: Rng>(mut self, rng: &mut R) -> Self {
        self.texts[self.cursor..].shuffle(rng);
        self
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn remaining(&self) -> usize {
        self.texts.len() - self.cursor
    }
}

impl<T: Outcome> ScreenSource<T> for TextScreens<T> {
    fn next_screen(&mut self, context: &SequencerContext) -> Result<Option<EventfulScreen<T>>> {
        let Some(text) = self.texts.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;

        let screen = TextScreen::new(context.gui().clone(), text.as_str(), self.style.clone());
        let mut eventful = EventfulScreen::new(screen, self.prototype.clone_manager());
        if let Some(hook) = context.hook_for(text) {
            eventful = eventful.with_show_hook(hook);
        }
        Ok(Some(eventful))
    }

    fn name(&self) -> &str {
        "text"
    }
}

pub type TextScreenSequencer<T> = SimpleScreenSequencer<T, TextScreens<T>>;

impl<T: Outcome> SimpleScreenSequencer<T, TextScreens<T>> {
    pub fn from_texts(
        context: SequencerContext,
        texts: Vec<String>,
        prototype: Box<dyn EventManager<T>>,
    ) -> Result<Self> {
        Ok(Self::new(context, TextScreens::new(texts, prototype)?))
    }
}
