use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::GuiError;
use crate::gui::{
    Color, ElementSize, EventCallback, EventId, EventKind, Gui, InitCallback, Key, Point,
};

/// A draw call recorded by [`HeadlessGui`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Color),
    Text {
        text: String,
        font_size: u32,
        color: Color,
    },
    Rectangle {
        color: Color,
        top_left: Point,
        width: u32,
        height: u32,
    },
}

struct Subscription {
    kind: EventKind,
    callback: EventCallback,
    /// Next firing time for timeouts, in virtual milliseconds.
    due_ms: Option<u64>,
}

#[derive(Default)]
struct State {
    now_ms: u64,
    next_id: u64,
    initialized: bool,
    init_callbacks: Vec<InitCallback>,
    subscriptions: BTreeMap<EventId, Subscription>,
    draw_log: Vec<DrawCommand>,
}

/// In-memory [`Gui`] driven by an explicit virtual clock.
///
/// Nothing happens on its own: the owner calls [`HeadlessGui::init`],
/// [`HeadlessGui::press`] and [`HeadlessGui::advance`] and every callback runs
/// synchronously on the calling thread. Draw calls are recorded instead of
/// rendered.
pub struct HeadlessGui {
    size: ElementSize,
    state: RefCell<State>,
}

impl HeadlessGui {
    pub fn new(size: ElementSize) -> Self {
        Self {
            size,
            state: RefCell::new(State::default()),
        }
    }

    /// Marks the gui as ready and fires every pending init callback.
    pub fn init(&self) {
        let callbacks = {
            let mut state = self.state.borrow_mut();
            state.initialized = true;
            std::mem::take(&mut state.init_callbacks)
        };
        debug!(count = callbacks.len(), "gui initialized");
        for callback in callbacks {
            callback();
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Dispatches a key press to every subscription listening for `key`, in
    /// subscription order.
    pub fn press(&self, key: Key) {
        let matching: Vec<EventId> = self
            .state
            .borrow()
            .subscriptions
            .iter()
            .filter(|(_, sub)| sub.kind == EventKind::KeyPress(key))
            .map(|(id, _)| *id)
            .collect();

        trace!(%key, listeners = matching.len(), "key pressed");

        for id in matching {
            // An earlier callback may have unsubscribed this one.
            let callback = self
                .state
                .borrow()
                .subscriptions
                .get(&id)
                .map(|sub| Rc::clone(&sub.callback));
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    pub fn advance(&self, millis: u64) {
        let target = self.now_ms().saturating_add(millis);
        self.advance_to(target);
    }

    /// Moves the clock forward to `target_ms`, firing due timeouts in deadline
    /// order. Repeating timeouts fire once per elapsed period.
    pub fn advance_to(&self, target_ms: u64) {
        loop {
            let due = {
                let state = self.state.borrow();
                state
                    .subscriptions
                    .iter()
                    .filter_map(|(id, sub)| sub.due_ms.map(|due| (due, *id)))
                    .filter(|(due, _)| *due <= target_ms)
                    .min()
            };

            let Some((due_ms, id)) = due else {
                break;
            };

            let callback = {
                let mut state = self.state.borrow_mut();
                state.now_ms = state.now_ms.max(due_ms);
                match state.subscriptions.get_mut(&id) {
                    Some(sub) => {
                        if let EventKind::Timeout { millis } = sub.kind {
                            sub.due_ms = Some(due_ms + millis.max(1));
                        }
                        Some(Rc::clone(&sub.callback))
                    }
                    None => None,
                }
            };

            if let Some(callback) = callback {
                trace!(%id, due_ms, "timeout fired");
                callback();
            }
        }

        let mut state = self.state.borrow_mut();
        state.now_ms = state.now_ms.max(target_ms);
    }

    /// Earliest pending timeout, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.state
            .borrow()
            .subscriptions
            .values()
            .filter_map(|sub| sub.due_ms)
            .min()
    }

    pub fn subscription_count(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }

    pub fn draw_log(&self) -> Vec<DrawCommand> {
        self.state.borrow().draw_log.clone()
    }

    pub fn take_draw_log(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.state.borrow_mut().draw_log)
    }

    fn record(&self, command: DrawCommand) {
        trace!(?command, "draw");
        self.state.borrow_mut().draw_log.push(command);
    }
}

impl Default for HeadlessGui {
    fn default() -> Self {
        Self::new(ElementSize {
            width: 800,
            height: 600,
        })
    }
}

impl fmt::Debug for HeadlessGui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessGui")
            .field("size", &self.size)
            .field("now_ms", &state.now_ms)
            .field("subscriptions", &state.subscriptions.len())
            .finish()
    }
}

impl Gui for HeadlessGui {
    fn on_init(&self, callback: InitCallback) {
        let ready = self.state.borrow().initialized;
        if ready {
            callback();
        } else {
            self.state.borrow_mut().init_callbacks.push(callback);
        }
    }

    fn window_size(&self) -> ElementSize {
        self.size
    }

    fn draw_uniform_background(&self, color: Color) {
        self.record(DrawCommand::Background(color));
    }

    fn draw_text(&self, text: &str, font_size: u32, color: Color) {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            font_size,
            color,
        });
    }

    fn draw_rectangle(&self, color: Color, top_left: Point, width: u32, height: u32) {
        self.record(DrawCommand::Rectangle {
            color,
            top_left,
            width,
            height,
        });
    }

    fn subscribe_to_event_and_get_id(&self, event: EventKind, callback: EventCallback) -> EventId {
        let mut state = self.state.borrow_mut();
        let id = EventId(state.next_id);
        state.next_id += 1;

        let due_ms = match event {
            EventKind::Timeout { millis } => Some(state.now_ms + millis),
            EventKind::KeyPress(_) => None,
        };
        state.subscriptions.insert(
            id,
            Subscription {
                kind: event,
                callback,
                due_ms,
            },
        );

        trace!(%id, ?event, "subscribed");
        id
    }

    fn unsubscribe_from_event_by_id(&self, id: EventId) -> Result<(), GuiError> {
        match self.state.borrow_mut().subscriptions.remove(&id) {
            Some(_) => {
                trace!(%id, "unsubscribed");
                Ok(())
            }
            None => Err(GuiError::NotSubscribed(id)),
        }
    }
}
