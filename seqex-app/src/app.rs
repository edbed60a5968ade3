use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use seqex_core::{DrawCommand, HeadlessGui, Key, TrialRecord};
use seqex_experiment::{
    AnswerTally, ExperimentConfig, ExperimentRunner, ReadingExperimentBuilder, ReadingOutcome,
    RunStatus, RunSummary,
};
use seqex_timing::{HighPrecisionTimer, Timer};
use tracing::{info, warn};

use crate::input;

type Records = Rc<RefCell<Vec<TrialRecord<ReadingOutcome>>>>;

/// Runs a reading experiment in the terminal.
///
/// The headless gui's virtual clock follows the wall clock, text screens are
/// printed to stdout and every stdin line is a key press.
pub struct App {
    config: ExperimentConfig,
    timer: HighPrecisionTimer,
}

impl App {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            timer: HighPrecisionTimer::new(),
        }
    }

    pub fn run(self) -> Result<()> {
        println!("=== SEQEX READING EXPERIMENT ===");
        println!(
            "Blocks: {}, sentences: {}",
            self.config.blocks.len(),
            self.config.sentence_count()
        );
        println!(
            "Pause with {}, answer questions with {} (yes) or {} (no).",
            self.config.pause_key, self.config.yes_key, self.config.no_key
        );
        println!("Type a key name and press Enter. An empty line is Enter, a space is Space.\n");

        let keys = input::spawn_key_reader();
        let gui = Rc::new(HeadlessGui::default());
        let records: Records = Rc::new(RefCell::new(Vec::new()));
        let outcome = Rc::new(RefCell::new(None));

        let runner = self.runner(&gui, &records, &outcome)?;
        runner.run();
        gui.init();

        let aborted = self.drive(&gui, &runner, &keys)?;
        print_frame(&gui);

        if let Some(path) = &self.config.results_path {
            write_records(path, &records.borrow())?;
            info!(path = %path.display(), records = records.borrow().len(), "results written");
        }

        let tally =
            AnswerTally::from_outcomes(records.borrow().iter().map(|record| &record.outcome));
        if tally.total > 0 {
            info!(correct = tally.correct, total = tally.total, "comprehension answers");
            println!("\nComprehension: {tally}.");
        }

        if aborted {
            println!("\nExperiment aborted.");
            return Ok(());
        }

        match outcome.borrow_mut().take() {
            Some(Ok(summary)) => {
                println!("\nExperiment completed, {} screens shown.", summary.screens_shown);
                Ok(())
            }
            Some(Err(err)) => Err(err).context("experiment failed"),
            None => bail!("experiment stopped without reporting an outcome"),
        }
    }

    fn runner(
        &self,
        gui: &Rc<HeadlessGui>,
        records: &Records,
        outcome: &Rc<RefCell<Option<seqex_experiment::Result<RunSummary>>>>,
    ) -> Result<ExperimentRunner<ReadingOutcome>> {
        let sequencer = ReadingExperimentBuilder::new(gui.clone(), &self.config)
            .on_block_start(|block| info!(block, "block started"))
            .on_block_end(|block| info!(block, "block finished"))
            .build()
            .context("could not build the experiment")?;

        let clock = Rc::clone(gui);
        let records = Rc::clone(records);
        let outcome = Rc::clone(outcome);
        Ok(ExperimentRunner::new(gui.clone(), Box::new(sequencer))
            .on_result(move |screen_index, result: &ReadingOutcome| {
                records.borrow_mut().push(TrialRecord {
                    screen_index,
                    outcome: *result,
                    timestamp_ms: clock.now_ms(),
                })
            })
            .on_end(move |result| *outcome.borrow_mut() = Some(result)))
    }

    /// Pumps wall-clock time and key presses into the gui until the run
    /// ends. Returns `true` if the participant pressed Escape.
    fn drive(
        &self,
        gui: &HeadlessGui,
        runner: &ExperimentRunner<ReadingOutcome>,
        keys: &Receiver<Key>,
    ) -> Result<bool> {
        let mut input_open = true;
        loop {
            gui.advance_to(self.timer.now_millis());
            print_frame(gui);
            if runner.status() != RunStatus::Running {
                return Ok(false);
            }

            let deadline = gui.next_deadline();
            if !input_open {
                match deadline {
                    Some(deadline) => {
                        self.timer.sleep_until_millis(deadline);
                        continue;
                    }
                    None => bail!("stdin closed while the experiment waits for a key"),
                }
            }

            let received = match deadline {
                Some(deadline) => {
                    let wait = deadline.saturating_sub(self.timer.now_millis());
                    keys.recv_timeout(Duration::from_millis(wait))
                }
                None => keys.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(Key::Escape) => {
                    warn!(screens = runner.screens_shown(), "aborted by participant");
                    return Ok(true);
                }
                Ok(key) => {
                    gui.advance_to(self.timer.now_millis());
                    gui.press(key);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    info!("stdin closed, only timeouts can advance the experiment");
                    input_open = false;
                }
            }
        }
    }
}

fn print_frame(gui: &HeadlessGui) {
    let mut cross_printed = false;
    for command in gui.take_draw_log() {
        match command {
            DrawCommand::Background(_) => println!(),
            DrawCommand::Text { text, .. } => println!("{text}"),
            // Two bars per cross.
            DrawCommand::Rectangle { .. } if !cross_printed => {
                println!("+");
                cross_printed = true;
            }
            DrawCommand::Rectangle { .. } => {}
        }
    }
}

fn write_records(path: &Path, records: &[TrialRecord<ReadingOutcome>]) -> Result<()> {
    let json = serde_json::to_string_pretty(records).context("could not serialize results")?;
    fs::write(path, json).with_context(|| format!("could not write {}", path.display()))
}
