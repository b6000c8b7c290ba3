//! Control messages posted by the application

use serde::{Deserialize, Serialize};

/// Instruction sent from the application to the proxy.
///
/// Wire shape is `{ "type": "SKIP_WAITING" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Promote a pending installed version to active without waiting for
    /// the natural handoff.
    SkipWaiting,
}

impl ControlMessage {
    /// Interpret an arbitrary posted value.
    ///
    /// Returns `None` for anything that is not a known control message;
    /// such messages are ignored rather than treated as errors.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}
