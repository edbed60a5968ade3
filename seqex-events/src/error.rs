use seqex_core::GuiError;
use thiserror::Error;

use crate::callbacks::CallbackId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event is already listening")]
    AlreadyListening,

    #[error("event has not started listening yet")]
    NotListening,

    #[error("subscriber {0} is not subscribed to this event")]
    NotSubscribed(CallbackId),

    #[error("event manager is already running")]
    AlreadyRunning,

    #[error("event manager is not running")]
    NotRunning,

    #[error("event manager cannot start without registered callbacks")]
    NoCallbacks,

    #[error("callback {0} is not registered")]
    NotRegistered(CallbackId),

    #[error("invalid timeout range: {min}..={max} ms")]
    InvalidTimeoutRange { min: u64, max: u64 },

    #[error("composite event manager needs at least one child")]
    EmptyComposite,

    #[error("gui error: {0}")]
    Gui(#[from] GuiError),
}

impl EventError {
    /// True for lifecycle misuse (start/stop/register out of order), as
    /// opposed to construction or gui failures.
    pub fn is_call_order(&self) -> bool {
        matches!(
            self,
            Self::AlreadyListening
                | Self::NotListening
                | Self::NotSubscribed(_)
                | Self::AlreadyRunning
                | Self::NotRunning
                | Self::NoCallbacks
                | Self::NotRegistered(_)
        )
    }
}
