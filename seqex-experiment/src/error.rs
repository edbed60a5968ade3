use std::path::PathBuf;

use seqex_events::EventError;
use thiserror::Error;

/// Methods of a screen or sequencer called outside their prescribed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CallOrderViolation {
    #[error("previous result must be passed before getting the next screen")]
    ResultNotProvided,

    #[error("first screen not yet gotten")]
    FirstScreenNotGotten,

    #[error("previous result already provided")]
    ResultAlreadyProvided,

    #[error("screen is already shown")]
    ScreenAlreadyShown,

    #[error("screen is not shown")]
    ScreenNotShown,
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("call order violation: {0}")]
    CallOrder(#[from] CallOrderViolation),

    #[error("{0} must not be empty")]
    EmptySequence(&'static str),

    #[error("no previous screen to exit")]
    NoPreviousScreen,

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ExperimentError {
    /// Lifecycle misuse, either of a sequencer/screen or of an underlying
    /// event manager.
    pub fn is_call_order(&self) -> bool {
        match self {
            Self::CallOrder(_) | Self::NoPreviousScreen => true,
            Self::Event(err) => err.is_call_order(),
            _ => false,
        }
    }
}

pub type Result<T, E = ExperimentError> = std::result::Result<T, E>;
