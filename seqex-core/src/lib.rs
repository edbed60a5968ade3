pub mod error;
pub mod gui;
pub mod headless;
pub mod screen;
pub mod trial;

pub use error::GuiError;
pub use gui::{
    Color, ElementSize, EventCallback, EventId, EventKind, Gui, InitCallback, Key, Point,
    SharedGui,
};
pub use headless::{DrawCommand, HeadlessGui};
pub use screen::{BlankScreen, FixationCrossScreen, Screen, ScreenStyle, TextScreen};
pub use trial::TrialRecord;
