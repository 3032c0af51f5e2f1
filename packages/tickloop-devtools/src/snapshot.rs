use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickloop_core::SimulatorState;

pub const SCHEMA_VERSION: &str = "tickloop-state-v1";

#[derive(Debug, Error)]
pub enum DevtoolsError {
    #[error("snapshot is not valid JSON for this schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot schema '{found}' does not match '{expected}'")]
    SchemaMismatch {
        found: String,
        expected: &'static str,
    },
}

/// A serializable copy of a state, tagged with the schema it was written with.
/// Queues keep their order; the registry round-trips as a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema: String,
    pub state: SimulatorState,
}

impl Snapshot {
    pub fn capture(state: &SimulatorState) -> Self {
        Self {
            schema: SCHEMA_VERSION.to_string(),
            state: state.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, DevtoolsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DevtoolsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DevtoolsError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if snapshot.schema != SCHEMA_VERSION {
            return Err(DevtoolsError::SchemaMismatch {
                found: snapshot.schema,
                expected: SCHEMA_VERSION,
            });
        }
        tracing::trace!(
            "restored snapshot at t={} step {}",
            snapshot.state.now,
            snapshot.state.step
        );
        Ok(snapshot)
    }

    pub fn restore(self) -> SimulatorState {
        self.state
    }
}

/// Serializes a state and reads it back.
pub fn round_trip(state: &SimulatorState) -> Result<SimulatorState, DevtoolsError> {
    let json = Snapshot::capture(state).to_json()?;
    Ok(Snapshot::from_json(&json)?.restore())
}
