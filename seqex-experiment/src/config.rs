use std::fs;
use std::path::{Path, PathBuf};

use seqex_core::{Key, ScreenStyle};
use serde::{Deserialize, Serialize};

use crate::error::{ExperimentError, Result};
use crate::reading::Sentence;

/// Settings of a reading experiment, loaded from JSON.
///
/// Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Advances instruction screens.
    pub continue_key: Key,
    /// Ends a sentence screen before its timeout.
    pub advance_key: Key,
    pub sentence_timeout_ms: u64,
    pub fixation_range_ms: (u64, u64),
    pub relax_timeout_ms: u64,
    /// Interrupts a fixation cross or sentence.
    pub pause_key: Key,
    /// Ends the pause screen. May equal `pause_key`.
    pub unpause_key: Key,
    pub pause_text: String,
    /// Share of each block's sentences followed by their question.
    pub question_ratio: f64,
    pub yes_key: Key,
    pub no_key: Key,
    pub instruction_text: String,
    pub relax_text: String,
    pub blocks: Vec<Vec<Sentence>>,
    pub shuffle: bool,
    pub style: ScreenStyle,
    pub results_path: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            continue_key: Key::Space,
            advance_key: Key::Enter,
            sentence_timeout_ms: 10_000,
            fixation_range_ms: (500, 1500),
            relax_timeout_ms: 5_000,
            pause_key: Key::ControlLeft,
            unpause_key: Key::ControlLeft,
            pause_text: "Paused. Press the pause key to continue.".to_string(),
            question_ratio: 0.2,
            yes_key: Key::A,
            no_key: Key::B,
            instruction_text: "Read each sentence, then press Enter. Press Space to start."
                .to_string(),
            relax_text: "Relax for a moment.".to_string(),
            blocks: Vec::new(),
            shuffle: true,
            style: ScreenStyle::default(),
            results_path: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ExperimentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(ExperimentError::InvalidConfig(
                "at least one block of sentences is required".to_string(),
            ));
        }
        if let Some(index) = self.blocks.iter().position(Vec::is_empty) {
            return Err(ExperimentError::InvalidConfig(format!(
                "block {} has no sentences",
                index + 1
            )));
        }

        let (min, max) = self.fixation_range_ms;
        if min > max {
            return Err(ExperimentError::InvalidConfig(format!(
                "fixation range {min}..={max} ms is empty"
            )));
        }

        if !(0.0..=1.0).contains(&self.question_ratio) {
            return Err(ExperimentError::InvalidConfig(format!(
                "question ratio {} is outside 0..=1",
                self.question_ratio
            )));
        }
        if self.yes_key == self.no_key {
            return Err(ExperimentError::InvalidConfig(
                "yes and no keys must differ".to_string(),
            ));
        }
        if self.pause_key == self.advance_key {
            return Err(ExperimentError::InvalidConfig(
                "pause and advance keys must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn sentence_count(&self) -> usize {
        self.blocks.iter().map(Vec::len).sum()
    }
}
