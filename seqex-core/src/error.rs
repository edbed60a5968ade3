use thiserror::Error;

use crate::gui::EventId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuiError {
    #[error("event id {0} is not subscribed")]
    NotSubscribed(EventId),

    #[error("unknown key name: {0}")]
    UnknownKey(String),
}
