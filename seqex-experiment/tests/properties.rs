use std::cell::RefCell;
use std::rc::Rc;

use seqex_core::{BlankScreen, HeadlessGui, Key, ScreenStyle, SharedGui};
use seqex_events::{
    CompositeEventManager, CorrectIncorrectEventManager, EventError, EventManager,
    FixedTimeoutEventManager, KeyPressEventManager, RandomTimeoutEventManager,
};
use seqex_experiment::{
    BlockScreenSequencer, CallOrderViolation, EventfulScreen, ExperimentError,
    FixationCrossScreenSequencer, PredefinedScreenSequencer, ScreenSequencer, SequencerContext,
    TextScreenSequencer,
};

fn unit_managers(gui: &SharedGui) -> Vec<Box<dyn EventManager<()>>> {
    vec![
        Box::new(KeyPressEventManager::new(gui.clone(), Key::Space)),
        Box::new(FixedTimeoutEventManager::new(gui.clone(), 100)),
        Box::new(RandomTimeoutEventManager::new(gui.clone(), 10, 20).unwrap()),
        Box::new(
            CompositeEventManager::new(vec![
                Box::new(KeyPressEventManager::new(gui.clone(), Key::Enter))
                    as Box<dyn EventManager<()>>,
                Box::new(FixedTimeoutEventManager::new(gui.clone(), 50)),
            ])
            .unwrap(),
        ),
    ]
}

#[test]
fn test_every_manager_enforces_its_start_lifecycle() {
    let gui: SharedGui = Rc::new(HeadlessGui::default());

    for mut manager in unit_managers(&gui) {
        assert_eq!(manager.start(), Err(EventError::NoCallbacks), "{manager:?}");

        manager.register_callback(Rc::new(|()| {}));
        assert_eq!(manager.start(), Ok(()), "{manager:?}");
        assert_eq!(manager.start(), Err(EventError::AlreadyRunning), "{manager:?}");

        manager.stop().unwrap();
        assert_eq!(manager.stop(), Err(EventError::NotRunning), "{manager:?}");
    }

    let mut answers = CorrectIncorrectEventManager::new(gui.clone(), Key::A, Key::B);
    assert_eq!(answers.start(), Err(EventError::NoCallbacks));
    answers.register_callback(Rc::new(|_| {}));
    answers.start().unwrap();
    assert_eq!(answers.start(), Err(EventError::AlreadyRunning));
}

#[test]
fn test_starting_a_clone_never_touches_the_original() {
    let headless = Rc::new(HeadlessGui::default());
    let gui: SharedGui = headless.clone();

    for mut original in unit_managers(&gui) {
        let fired = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&fired);
        original.register_callback(Rc::new(move |()| *counter.borrow_mut() += 1));

        let mut clone = original.clone_manager();
        clone.register_callback(Rc::new(|()| {}));
        clone.start().unwrap();

        assert!(!original.is_running(), "{original:?}");
        assert_eq!(original.callback_count(), 1, "{original:?}");

        headless.press(Key::Space);
        headless.press(Key::Enter);
        headless.advance(1_000);
        assert_eq!(*fired.borrow(), 0, "{original:?}");

        clone.stop().unwrap();
    }
    assert_eq!(headless.subscription_count(), 0);
}

#[test]
fn test_composite_forwards_the_first_child_and_stops_the_rest() {
    let headless = Rc::new(HeadlessGui::default());
    let gui: SharedGui = headless.clone();
    let mut composite = CompositeEventManager::new(vec![
        Box::new(KeyPressEventManager::new(gui.clone(), Key::A)) as Box<dyn EventManager<()>>,
        Box::new(FixedTimeoutEventManager::new(gui.clone(), 5)),
    ])
    .unwrap();
    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);
    let clock = headless.clone();
    composite.register_callback(Rc::new(move |()| sink.borrow_mut().push(clock.now_ms())));

    composite.start().unwrap();
    headless.advance(1);
    headless.press(Key::A);
    assert_eq!(*fired.borrow(), vec![1]);

    composite.stop().unwrap();
    assert!(composite.children().iter().all(|child| !child.is_running()));
    headless.advance(10);
    assert_eq!(*fired.borrow(), vec![1]);
}

fn blank_screens(gui: &SharedGui, count: usize) -> Vec<EventfulScreen<()>> {
    (0..count)
        .map(|_| {
            EventfulScreen::new(
                BlankScreen::new(gui.clone(), &ScreenStyle::default()),
                Box::new(KeyPressEventManager::new(gui.clone(), Key::Space))
                    as Box<dyn EventManager<()>>,
            )
        })
        .collect()
}

fn texts(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("sentence {n}")).collect()
}

fn all_sequencers(gui: &SharedGui) -> Vec<Box<dyn ScreenSequencer<()>>> {
    let context = SequencerContext::new(gui.clone());
    let prototype = || Box::new(KeyPressEventManager::new(gui.clone(), Key::Space));
    vec![
        Box::new(PredefinedScreenSequencer::new(blank_screens(gui, 3))),
        Box::new(
            TextScreenSequencer::<()>::from_texts(context.clone(), texts(3), prototype()).unwrap(),
        ),
        Box::new(
            BlockScreenSequencer::new(vec![
                Box::new(PredefinedScreenSequencer::new(blank_screens(gui, 2)))
                    as Box<dyn ScreenSequencer<()>>,
                Box::new(PredefinedScreenSequencer::new(blank_screens(gui, 2))),
            ])
            .unwrap(),
        ),
        Box::new(FixationCrossScreenSequencer::new(
            context.clone(),
            Box::new(
                TextScreenSequencer::<()>::from_texts(context, texts(3), prototype()).unwrap(),
            ),
            prototype(),
        )),
    ]
}

#[test]
fn test_every_sequencer_enforces_get_and_result_alternation() {
    let gui: SharedGui = Rc::new(HeadlessGui::default());

    for mut sequencer in all_sequencers(&gui) {
        let name = sequencer.name().to_string();

        assert!(matches!(
            sequencer.pass_previous_result(()),
            Err(ExperimentError::CallOrder(CallOrderViolation::FirstScreenNotGotten))
        ), "{name}");

        assert!(sequencer.get_next().unwrap().is_some(), "{name}");
        assert!(matches!(
            sequencer.get_next(),
            Err(ExperimentError::CallOrder(CallOrderViolation::ResultNotProvided))
        ), "{name}");

        sequencer.pass_previous_result(()).unwrap();
        assert!(matches!(
            sequencer.pass_previous_result(()),
            Err(ExperimentError::CallOrder(CallOrderViolation::ResultAlreadyProvided))
        ), "{name}");

        assert!(sequencer.get_next().unwrap().is_some(), "{name}");
    }
}

#[test]
fn test_fixation_cross_alternates_and_reset_repeats_the_cross() {
    let gui: SharedGui = Rc::new(HeadlessGui::default());
    let context = SequencerContext::new(gui.clone());
    let n = 4;
    let make = || {
        FixationCrossScreenSequencer::new(
            context.clone(),
            Box::new(
                TextScreenSequencer::<()>::from_texts(
                    context.clone(),
                    texts(n),
                    Box::new(KeyPressEventManager::new(gui.clone(), Key::Space)),
                )
                .unwrap(),
            ),
            Box::new(FixedTimeoutEventManager::new(gui.clone(), 300)),
        )
    };
    let is_cross =
        |screen: &EventfulScreen<()>| format!("{:?}", screen.screen()) == "FixationCrossScreen";

    let mut sequencer = make();
    for call in 0..2 * n {
        let screen = sequencer.get_next().unwrap().unwrap();
        assert_eq!(is_cross(&screen), call % 2 == 0, "call {call}");
        sequencer.pass_previous_result(()).unwrap();
    }
    assert!(sequencer.get_next().unwrap().is_none());

    let mut sequencer = make();
    let mut real_screens = Vec::new();
    for call in 0..2 * n {
        let screen = sequencer.get_next().unwrap().unwrap();
        if is_cross(&screen) {
            sequencer.pass_previous_result(()).unwrap();
            sequencer.reset();
            let again = sequencer.get_next().unwrap().unwrap();
            assert!(is_cross(&again), "call {call}");
        } else {
            real_screens.push(format!("{:?}", screen.screen()));
        }
        sequencer.pass_previous_result(()).unwrap();
    }
    assert!(sequencer.get_next().unwrap().is_none());
    assert_eq!(
        real_screens,
        texts(n)
            .iter()
            .map(|text| format!("TextScreen {{ text: {text:?}, .. }}"))
            .collect::<Vec<_>>()
    );
}

#[test]
fn test_block_callbacks_follow_block_boundaries() {
    let gui: SharedGui = Rc::new(HeadlessGui::default());
    let events = Rc::new(RefCell::new(Vec::new()));
    let starts = Rc::clone(&events);
    let ends = Rc::clone(&events);
    let mut sequencer = BlockScreenSequencer::new(vec![
        Box::new(PredefinedScreenSequencer::new(blank_screens(&gui, 2)))
            as Box<dyn ScreenSequencer<()>>,
        Box::new(PredefinedScreenSequencer::new(blank_screens(&gui, 3))),
    ])
    .unwrap()
    .on_block_start(move |n| starts.borrow_mut().push(("start", n)))
    .on_block_end(move |n| ends.borrow_mut().push(("end", n)));

    let mut calls = 0;
    while sequencer.get_next().unwrap().is_some() {
        calls += 1;
        events.borrow_mut().push(("screen", calls));
        sequencer.pass_previous_result(()).unwrap();
    }

    assert_eq!(calls, 5);
    assert_eq!(
        *events.borrow(),
        vec![
            ("start", 1),
            ("screen", 1),
            ("screen", 2),
            ("end", 1),
            ("start", 2),
            ("screen", 3),
            ("screen", 4),
            ("screen", 5),
            ("end", 2),
        ]
    );
}
