//! Stage events: the audit trail of a generation run.
//!
//! RULE: Stages report what they did ONLY through events.
//! The engine persists every event in emission order.

use crate::types::{AppealId, RunId};
use serde::{Deserialize, Serialize};

/// Every event emitted during a run.
/// Variants may be added, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    StageCompleted {
        stage: String,
        rows: usize,
    },
    /// A stage had no input to work from and produced an empty table.
    StageSkipped {
        stage: String,
        reason: String,
    },
    AppealSkipped {
        appeal_id: AppealId,
        reason: String,
    },
}

impl GenEvent {
    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::StageCompleted { .. } => "stage_completed",
            Self::StageSkipped { .. } => "stage_skipped",
            Self::AppealSkipped { .. } => "appeal_skipped",
        }
    }
}

/// One row of the persisted event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub seq: u64,
    pub stage: String,
    pub event_type: String,
    pub payload: String,
}
