use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuiError;

/// Straight (non-premultiplied) RGBA.
pub type Color = [u8; 4];

/// Zero-argument callback fired by the gui when a subscribed event occurs.
pub type EventCallback = Rc<dyn Fn()>;

pub type InitCallback = Box<dyn FnOnce()>;

pub type SharedGui = Rc<dyn Gui>;

/// Keys an experiment can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    AltLeft,
    AltRight,
    ControlLeft,
    ControlRight,
    Enter,
    Escape,
    ShiftLeft,
    ShiftRight,
    Space,
    A,
    B,
    C,
}

impl Key {
    pub const ALL: [Key; 12] = [
        Key::AltLeft,
        Key::AltRight,
        Key::ControlLeft,
        Key::ControlRight,
        Key::Enter,
        Key::Escape,
        Key::ShiftLeft,
        Key::ShiftRight,
        Key::Space,
        Key::A,
        Key::B,
        Key::C,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Key::AltLeft => "alt_left",
            Key::AltRight => "alt_right",
            Key::ControlLeft => "control_left",
            Key::ControlRight => "control_right",
            Key::Enter => "enter",
            Key::Escape => "escape",
            Key::ShiftLeft => "shift_left",
            Key::ShiftRight => "shift_right",
            Key::Space => "space",
            Key::A => "a",
            Key::B => "b",
            Key::C => "c",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = GuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Key::ALL
            .into_iter()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| GuiError::UnknownKey(s.to_string()))
    }
}

/// Descriptor of an external signal a gui can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyPress(Key),
    /// Fires every `millis` until unsubscribed.
    Timeout { millis: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementSize {
    pub width: u32,
    pub height: u32,
}

/// Rendering and input boundary.
///
/// All methods take `&self`: implementations are shared through [`SharedGui`]
/// and are re-entered from their own callbacks (a key callback typically stops
/// listeners, which unsubscribes from the gui). Implementations must not hold
/// internal borrows while invoking callbacks.
pub trait Gui {
    /// Registers a callback fired once the gui is ready to show screens.
    fn on_init(&self, callback: InitCallback);

    fn window_size(&self) -> ElementSize;

    fn draw_uniform_background(&self, color: Color);

    fn draw_text(&self, text: &str, font_size: u32, color: Color);

    fn draw_rectangle(&self, color: Color, top_left: Point, width: u32, height: u32);

    /// Returns an id that can later be passed to
    /// [`Gui::unsubscribe_from_event_by_id`].
    fn subscribe_to_event_and_get_id(&self, event: EventKind, callback: EventCallback) -> EventId;

    fn unsubscribe_from_event_by_id(&self, id: EventId) -> Result<(), GuiError>;
}
