//! Event sources and the typed managers that race them.
//!
//! An [`Event`] wraps one raw gui signal. An [`EventManager`] turns one or
//! more events into a single "advance with result `T`" signal. Managers are
//! configured once as prototypes and cloned per trial; a clone is always idle
//! and has no callbacks.

pub mod callbacks;
pub mod composite;
pub mod correct_incorrect;
pub mod error;
pub mod event;
pub mod key_press;
pub mod manager;
pub mod mapped;
pub mod simple;
pub mod timeout;

pub use callbacks::{CallbackId, CallbackList};
pub use composite::CompositeEventManager;
pub use correct_incorrect::CorrectIncorrectEventManager;
pub use error::EventError;
pub use event::{Event, GuiEvent};
pub use key_press::KeyPressEventManager;
pub use manager::{EventManager, ManagerState, Outcome, ResultCallback, Trigger};
pub use mapped::MappedEventManager;
pub use simple::SimpleEventManager;
pub use timeout::{FixedTimeoutEventManager, RandomTimeoutEventManager};
