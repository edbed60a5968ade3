use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use seqex_core::{DrawCommand, HeadlessGui, Key, TrialRecord};
use seqex_experiment::ReadingOutcome::{Advanced, Answered, Paused, TimedOut};
use seqex_experiment::{
    AnswerTally, ExperimentConfig, ExperimentRunner, ReadingExperimentBuilder, ReadingOutcome,
    RunStatus, RunSummary, Sentence,
};

fn config() -> ExperimentConfig {
    ExperimentConfig {
        blocks: vec![vec!["s1".into(), "s2".into()]],
        shuffle: false,
        fixation_range_ms: (100, 100),
        sentence_timeout_ms: 1_000,
        relax_timeout_ms: 500,
        ..ExperimentConfig::default()
    }
}

fn shown_texts(gui: &HeadlessGui) -> Vec<String> {
    gui.take_draw_log()
        .into_iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text),
            _ => None,
        })
        .collect()
}

type Shared<T> = Rc<RefCell<Vec<T>>>;

/// A started run of the reading sequence that records every result and
/// every text shown.
struct Session {
    gui: Rc<HeadlessGui>,
    runner: ExperimentRunner<ReadingOutcome>,
    records: Shared<TrialRecord<ReadingOutcome>>,
    shown: Shared<String>,
    summary: Rc<RefCell<Option<RunSummary>>>,
}

impl Session {
    fn start(config: &ExperimentConfig, seed: u64) -> Self {
        let gui = Rc::new(HeadlessGui::default());

        let shown: Shared<String> = Rc::default();
        let shown_sink = Rc::clone(&shown);
        let sequencer = ReadingExperimentBuilder::new(gui.clone(), config)
            .with_show_hook(move |text| shown_sink.borrow_mut().push(text.to_string()))
            .build_with_rng(&mut StdRng::seed_from_u64(seed))
            .unwrap();

        let records: Shared<TrialRecord<ReadingOutcome>> = Rc::default();
        let record_sink = Rc::clone(&records);
        let clock = gui.clone();
        let summary = Rc::new(RefCell::new(None));
        let summary_sink = Rc::clone(&summary);
        let runner = ExperimentRunner::new(gui.clone(), Box::new(sequencer))
            .on_result(move |screen_index, result: &ReadingOutcome| {
                record_sink.borrow_mut().push(TrialRecord {
                    screen_index,
                    outcome: *result,
                    timestamp_ms: clock.now_ms(),
                })
            })
            .on_end(move |outcome| *summary_sink.borrow_mut() = Some(outcome.unwrap()));

        runner.run();
        assert_eq!(runner.status(), RunStatus::WaitingForGui);
        gui.init();
        assert_eq!(shown_texts(&gui), vec![config.instruction_text.clone()]);

        Self {
            gui,
            runner,
            records,
            shown,
            summary,
        }
    }

    fn outcomes(&self) -> Vec<ReadingOutcome> {
        self.records.borrow().iter().map(|record| record.outcome).collect()
    }
}

#[test]
fn test_reading_block_runs_to_completion_on_keys_and_timeouts() {
    let config = config();
    let session = Session::start(&config, 7);
    let headless = &session.gui;
    let runner = &session.runner;

    // Only the continue key leaves the instructions.
    headless.press(Key::Enter);
    assert_eq!(runner.screens_shown(), 1);
    headless.press(Key::Space);
    assert_eq!(runner.screens_shown(), 2);

    headless.advance(100);
    assert_eq!(shown_texts(headless), vec!["s1"]);

    headless.advance(250);
    headless.press(Key::Space);
    headless.press(Key::Enter);
    headless.advance(100);
    assert_eq!(shown_texts(headless), vec!["s2"]);

    headless.advance(1_000);
    assert_eq!(shown_texts(headless), vec![config.relax_text.clone()]);
    assert_eq!(runner.status(), RunStatus::Running);

    headless.advance(500);
    assert_eq!(runner.status(), RunStatus::Finished);
    assert_eq!(*session.summary.borrow(), Some(RunSummary { screens_shown: 6 }));
    assert_eq!(headless.subscription_count(), 0);

    let timeline: Vec<(usize, u64)> = session
        .records
        .borrow()
        .iter()
        .map(|record| (record.screen_index, record.timestamp_ms))
        .collect();
    assert_eq!(
        timeline,
        vec![(0, 0), (1, 100), (2, 350), (3, 450), (4, 1_450), (5, 1_950)]
    );
    assert_eq!(
        session.outcomes(),
        vec![Advanced, Advanced, Advanced, Advanced, TimedOut, Advanced]
    );
    assert_eq!(
        *session.shown.borrow(),
        vec![
            config.instruction_text.clone(),
            "s1".to_string(),
            "s2".to_string(),
            config.relax_text.clone(),
        ]
    );
}

#[test]
fn test_pausing_repeats_the_interrupted_trial() {
    let config = config();
    let session = Session::start(&config, 7);
    let headless = &session.gui;
    headless.press(Key::Space);

    // Paused on the cross: no timeout runs while the pause screen is up.
    headless.press(config.pause_key);
    assert_eq!(shown_texts(headless), vec![config.pause_text.clone()]);
    assert_eq!(headless.next_deadline(), None);
    headless.advance(5_000);
    headless.press(config.unpause_key);
    headless.advance(100);
    assert_eq!(shown_texts(headless), vec!["s1"]);

    // Paused on the sentence: the cross and the same sentence come back.
    headless.advance(200);
    headless.press(config.pause_key);
    headless.press(config.unpause_key);
    assert_eq!(headless.next_deadline(), Some(5_400));
    headless.advance(100);
    assert_eq!(
        shown_texts(headless),
        vec![config.pause_text.clone(), "s1".to_string()]
    );

    headless.press(Key::Enter);
    headless.advance(100);
    headless.press(Key::Enter);
    headless.advance(500);

    assert_eq!(session.runner.status(), RunStatus::Finished);
    assert_eq!(
        session.outcomes(),
        vec![
            Advanced, Paused, Advanced, Advanced, Paused, Advanced, Advanced, Advanced, Advanced,
            Advanced, Advanced,
        ]
    );
    assert_eq!(
        *session.shown.borrow(),
        vec![
            config.instruction_text.clone(),
            config.pause_text.clone(),
            "s1".to_string(),
            config.pause_text.clone(),
            "s1".to_string(),
            "s2".to_string(),
            config.relax_text.clone(),
        ]
    );
    assert_eq!(headless.subscription_count(), 0);
}

#[test]
fn test_questions_follow_their_sentences_and_are_tallied() {
    let config = ExperimentConfig {
        blocks: vec![vec![
            Sentence::new("s1").with_question("Q1?", true),
            Sentence::new("s2").with_question("Q2?", false),
        ]],
        question_ratio: 1.0,
        ..config()
    };
    let session = Session::start(&config, 3);
    let headless = &session.gui;
    let question =
        |text: &str| format!("{text}\n\n{} = yes, {} = no", config.yes_key, config.no_key);

    headless.press(Key::Space);
    headless.advance(100);
    headless.press(Key::Enter);
    assert_eq!(shown_texts(headless), vec!["s1".to_string(), question("Q1?")]);

    // Questions wait for an answer and ignore the advance key.
    headless.advance(20_000);
    headless.press(Key::Enter);
    headless.press(config.yes_key);
    headless.advance(100);
    headless.press(Key::Enter);
    headless.press(config.yes_key);
    headless.advance(500);

    assert_eq!(session.runner.status(), RunStatus::Finished);
    assert_eq!(
        session.outcomes(),
        vec![
            Advanced,
            Advanced,
            Advanced,
            Answered(true),
            Advanced,
            Advanced,
            Answered(false),
            Advanced,
        ]
    );
    assert_eq!(
        AnswerTally::from_outcomes(&session.outcomes()),
        AnswerTally {
            correct: 1,
            total: 2
        }
    );
    assert_eq!(
        *session.shown.borrow(),
        vec![
            config.instruction_text.clone(),
            "s1".to_string(),
            question("Q1?"),
            "s2".to_string(),
            question("Q2?"),
            config.relax_text.clone(),
        ]
    );
}

#[test]
fn test_shuffled_blocks_show_every_sentence_once() {
    let headless = Rc::new(HeadlessGui::default());
    let config = ExperimentConfig {
        blocks: vec![
            (1..=5).map(|n| Sentence::new(format!("a{n}"))).collect(),
            (1..=3).map(|n| Sentence::new(format!("b{n}"))).collect(),
        ],
        shuffle: true,
        ..config()
    };

    let shown = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&shown);
    let blocks = Rc::new(RefCell::new(Vec::new()));
    let block_sink = Rc::clone(&blocks);
    let sequencer = ReadingExperimentBuilder::new(headless.clone(), &config)
        .with_show_hook(move |text| sink.borrow_mut().push(text.to_string()))
        .on_block_start(move |block| block_sink.borrow_mut().push(block))
        .build_with_rng(&mut StdRng::seed_from_u64(42))
        .unwrap();
    let runner = ExperimentRunner::new(headless.clone(), Box::new(sequencer));

    runner.run();
    headless.init();
    while runner.status() == RunStatus::Running {
        headless.press(Key::Space);
        headless.advance(1_000);
    }

    assert_eq!(runner.status(), RunStatus::Finished);
    assert_eq!(*blocks.borrow(), vec![1, 2]);

    let texts = |sentences: &[Sentence]| {
        let mut texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
        texts.sort();
        texts
    };
    let sentences: Vec<String> = shown
        .borrow()
        .iter()
        .filter(|text| **text != config.instruction_text && **text != config.relax_text)
        .cloned()
        .collect();
    let (first, second) = sentences.split_at(5);
    let mut first = first.to_vec();
    let mut second = second.to_vec();
    first.sort();
    second.sort();
    assert_eq!(first, texts(&config.blocks[0]));
    assert_eq!(second, texts(&config.blocks[1]));
}
