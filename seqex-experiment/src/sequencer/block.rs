use seqex_events::Outcome;
use tracing::debug;

use super::{ScreenSequencer, SequencerState};
use crate::error::{ExperimentError, Result};
use crate::eventful_screen::EventfulScreen;

/// Receives a 1-based block number.
pub type BlockCallback = Box<dyn FnMut(usize)>;

/// Concatenates child sequencers, each forming one block.
///
/// The start callback fires right before a block's first screen is requested
/// and the end callback right after the block reports it is exhausted.
pub struct BlockScreenSequencer<T: Outcome> {
    state: SequencerState<T>,
    blocks: Vec<Box<dyn ScreenSequencer<T>>>,
    active: usize,
    block_started: bool,
    on_block_start: BlockCallback,
    on_block_end: BlockCallback,
}

impl<T: Outcome> BlockScreenSequencer<T> {
    pub fn new(blocks: Vec<Box<dyn ScreenSequencer<T>>>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(ExperimentError::EmptySequence("block list"));
        }

        Ok(Self {
            state: SequencerState::new(),
            blocks,
            active: 0,
            block_started: false,
            on_block_start: Box::new(|_| {}),
            on_block_end: Box::new(|_| {}),
        })
    }

    pub fn on_block_start(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_block_start = Box::new(callback);
        self
    }

    pub fn on_block_end(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_block_end = Box::new(callback);
        self
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// 1-based number of the block currently being played, if any is left.
    pub fn active_block(&self) -> Option<usize> {
        (self.active < self.blocks.len()).then_some(self.active + 1)
    }
}

impl<T: Outcome> ScreenSequencer<T> for BlockScreenSequencer<T> {
    fn state(&self) -> &SequencerState<T> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SequencerState<T> {
        &mut self.state
    }

    fn next_screen(&mut self) -> Result<Option<EventfulScreen<T>>> {
        while let Some(block) = self.blocks.get_mut(self.active) {
            let number = self.active + 1;

            if self.block_started {
                block.pass_previous_result(self.state.previous_result()?)?;
            } else {
                self.block_started = true;
                debug!(block = number, "block started");
                (self.on_block_start)(number);
            }

            if let Some(screen) = block.get_next()? {
                return Ok(Some(screen));
            }

            debug!(block = number, "block ended");
            (self.on_block_end)(number);
            self.active += 1;
            self.block_started = false;
        }

        Ok(None)
    }

    fn name(&self) -> &str {
        "block"
    }
}
