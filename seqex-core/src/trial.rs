use serde::{Deserialize, Serialize};

/// Recorded outcome of one completed screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord<R> {
    /// 0-based position in the whole run.
    pub screen_index: usize,
    pub outcome: R,
    pub timestamp_ms: u64,
}
